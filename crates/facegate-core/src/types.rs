use serde::{Deserialize, Serialize};

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

/// An encoded image ready to be sent inline to the inference service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One authorized person's reference photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Person identifier, taken from the subdirectory name.
    pub person: String,
    pub image: ImagePayload,
}

/// Authorized-user gallery, in the order it will be presented to the model.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    pub entries: Vec<ReferenceEntry>,
}

impl Gallery {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn people(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.person.as_str())
    }
}

/// Summary of a gallery entry without the image bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GallerySummary {
    pub person: String,
    pub mime_type: String,
    pub bytes: usize,
}

impl From<&ReferenceEntry> for GallerySummary {
    fn from(entry: &ReferenceEntry) -> Self {
        Self {
            person: entry.person.clone(),
            mime_type: entry.image.mime_type.clone(),
            bytes: entry.image.len(),
        }
    }
}

/// Structured verdict returned by the inference service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub status: String,
    /// Reported confidence. Nominally 0–100 but never clamped here.
    pub confidence_score: i64,
    pub reasoning: String,
}

/// The four statuses the model is instructed to emit, plus a catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VerdictStatus {
    Match(String),
    Spoof,
    Unknown,
    NonHuman,
    Unrecognized(String),
}

/// Which presentation branch a verdict falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Match,
    SpoofAlert,
    Warning,
}

/// How status strings are mapped to a [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyMode {
    /// Substring precedence: "Match Found", then "SPOOF", then warning.
    #[default]
    Substring,
    /// Exact parse of the four known statuses.
    Exact,
}

impl std::str::FromStr for ClassifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown classify mode: {other}")),
        }
    }
}
