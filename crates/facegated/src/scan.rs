//! One upload, one inference call, one rendered result.

use crate::gemini::{InferenceService, ServiceError};
use chrono::{DateTime, Utc};
use facegate_core::{
    assemble, build_gallery, classify, parse_verdict, Classification, ClassifyMode, Gallery,
    GalleryError, GalleryOrder, Panel, Probe, ProbeError, Verdict, VerdictError,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Verdict(#[from] VerdictError),
    #[error("gallery task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Terminal state of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Rendered,
    ParseFailed,
    Failed,
}

/// Everything produced by one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub state: ScanState,
    pub gallery_size: usize,
    pub verdict: Option<Verdict>,
    pub classification: Option<Classification>,
    pub panel: Panel,
}

/// Runs scans against an inference service using a gallery directory.
#[derive(Clone)]
pub struct Scanner {
    service: Arc<dyn InferenceService>,
    gallery_dir: PathBuf,
    gallery_order: GalleryOrder,
    classify_mode: ClassifyMode,
}

impl Scanner {
    pub fn new(
        service: Arc<dyn InferenceService>,
        gallery_dir: PathBuf,
        gallery_order: GalleryOrder,
        classify_mode: ClassifyMode,
    ) -> Self {
        Self {
            service,
            gallery_dir,
            gallery_order,
            classify_mode,
        }
    }

    pub fn from_config(service: Arc<dyn InferenceService>, config: &crate::Config) -> Self {
        Self::new(
            service,
            config.gallery_dir.clone(),
            config.gallery_order,
            config.classify_mode,
        )
    }

    /// Rebuild the gallery from disk off the async runtime.
    pub async fn load_gallery(&self) -> Result<Gallery, ScanError> {
        let dir = self.gallery_dir.clone();
        let order = self.gallery_order;
        let gallery = tokio::task::spawn_blocking(move || build_gallery(&dir, order)).await??;
        Ok(gallery)
    }

    /// Scan one uploaded image. Never fails; failures become error panels.
    pub async fn scan(&self, upload: &[u8]) -> ScanOutcome {
        let scan_id = Uuid::new_v4();
        let span = tracing::info_span!("scan", %scan_id);

        async move {
            let mut gallery_size = 0;
            let result = self.run(upload, &mut gallery_size).await;
            let scanned_at = Utc::now();

            match result {
                Ok(verdict) => {
                    let classification = classify(&verdict.status, self.classify_mode);
                    tracing::info!(
                        status = %verdict.status,
                        confidence = verdict.confidence_score,
                        ?classification,
                        "scan complete"
                    );
                    ScanOutcome {
                        scan_id,
                        scanned_at,
                        state: ScanState::Rendered,
                        gallery_size,
                        panel: Panel::for_verdict(&verdict, classification),
                        verdict: Some(verdict),
                        classification: Some(classification),
                    }
                }
                Err(ScanError::Verdict(VerdictError::Malformed(detail))) => {
                    tracing::warn!(%detail, "unparseable verdict");
                    ScanOutcome {
                        scan_id,
                        scanned_at,
                        state: ScanState::ParseFailed,
                        gallery_size,
                        verdict: None,
                        classification: None,
                        panel: Panel::parse_failure(),
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "scan failed");
                    ScanOutcome {
                        scan_id,
                        scanned_at,
                        state: ScanState::Failed,
                        gallery_size,
                        verdict: None,
                        classification: None,
                        panel: Panel::error(&err),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, upload: &[u8], gallery_size: &mut usize) -> Result<Verdict, ScanError> {
        let probe = Probe::from_upload(upload)?;
        let gallery = self.load_gallery().await?;
        *gallery_size = gallery.len();
        tracing::debug!(
            people = gallery.len(),
            probe_width = probe.width,
            probe_height = probe.height,
            "request assembled"
        );

        let request = assemble(&gallery, probe.payload);
        let text = self.service.generate(&request).await?;
        Ok(parse_verdict(&text)?)
    }
}
