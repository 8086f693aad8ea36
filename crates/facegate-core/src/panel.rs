//! Presentation model for a scan result, independent of any markup.

use crate::types::{Classification, Verdict};
use serde::{Deserialize, Serialize};

pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    /// Bold lead-in, e.g. "SECURITY ALERT:".
    pub heading: String,
    pub body: String,
}

impl Alert {
    fn new(level: AlertLevel, heading: &str, body: impl Into<String>) -> Self {
        Self {
            level,
            heading: heading.to_string(),
            body: body.into(),
        }
    }

    /// Heading and body joined as plain text.
    pub fn text(&self) -> String {
        if self.heading.is_empty() {
            self.body.clone()
        } else {
            format!("{} {}", self.heading, self.body)
        }
    }
}

/// Everything shown for one scan: metric, status alert, progress, analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// Confidence metric, e.g. "92%". Absent when no verdict was parsed.
    pub metric: Option<String>,
    pub alert: Alert,
    /// Progress bar fill in percent, shown only for matches.
    pub progress: Option<u8>,
    pub analysis: Option<Alert>,
}

impl Panel {
    pub fn for_verdict(verdict: &Verdict, classification: Classification) -> Self {
        let score = verdict.confidence_score;
        let (alert, progress) = match classification {
            Classification::Match => (
                Alert::new(
                    AlertLevel::Success,
                    "Match Found Successfully:",
                    verdict.status.as_str(),
                ),
                Some(progress_fill(score)),
            ),
            Classification::SpoofAlert => (
                Alert::new(
                    AlertLevel::Error,
                    "SECURITY ALERT:",
                    format!("{} (Certainty: {score}%)", verdict.status),
                ),
                None,
            ),
            Classification::Warning => (
                Alert::new(AlertLevel::Warning, "Match Not Found:", verdict.status.as_str()),
                None,
            ),
        };

        Self {
            metric: Some(format!("{score}%")),
            alert,
            progress,
            analysis: Some(Alert::new(AlertLevel::Info, "Analysis:", verdict.reasoning.as_str())),
        }
    }

    pub fn parse_failure() -> Self {
        Self::bare(Alert::new(AlertLevel::Error, "", PARSE_FAILURE_MESSAGE))
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::bare(Alert::new(AlertLevel::Error, "Error:", message.to_string()))
    }

    fn bare(alert: Alert) -> Self {
        Self {
            metric: None,
            alert,
            progress: None,
            analysis: None,
        }
    }
}

/// Progress fill for a reported confidence; out-of-range values are clamped.
pub fn progress_fill(confidence: i64) -> u8 {
    confidence.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(status: &str, score: i64, reasoning: &str) -> Verdict {
        Verdict {
            status: status.into(),
            confidence_score: score,
            reasoning: reasoning.into(),
        }
    }

    #[test]
    fn test_match_panel() {
        let v = verdict("Match Found: Alice", 92, "facial landmarks align");
        let panel = Panel::for_verdict(&v, Classification::Match);
        assert_eq!(panel.metric.as_deref(), Some("92%"));
        assert_eq!(panel.alert.level, AlertLevel::Success);
        assert_eq!(panel.alert.text(), "Match Found Successfully: Match Found: Alice");
        assert_eq!(panel.progress, Some(92));
        assert_eq!(panel.analysis.unwrap().text(), "Analysis: facial landmarks align");
    }

    #[test]
    fn test_spoof_panel() {
        let v = verdict("BLOCK: SPOOF", 10, "screen glare detected");
        let panel = Panel::for_verdict(&v, Classification::SpoofAlert);
        assert_eq!(panel.alert.level, AlertLevel::Error);
        assert_eq!(panel.alert.text(), "SECURITY ALERT: BLOCK: SPOOF (Certainty: 10%)");
        assert_eq!(panel.progress, None);
        assert_eq!(panel.metric.as_deref(), Some("10%"));
        assert!(panel.analysis.is_some());
    }

    #[test]
    fn test_warning_panel() {
        let v = verdict("BLOCK: NON_HUMAN", 70, "");
        let panel = Panel::for_verdict(&v, Classification::Warning);
        assert_eq!(panel.alert.level, AlertLevel::Warning);
        assert_eq!(panel.alert.text(), "Match Not Found: BLOCK: NON_HUMAN");
        assert_eq!(panel.analysis.unwrap().text(), "Analysis: ");
    }

    #[test]
    fn test_failure_panels_have_no_metric() {
        let panel = Panel::parse_failure();
        assert_eq!(panel.metric, None);
        assert_eq!(panel.alert.text(), PARSE_FAILURE_MESSAGE);
        assert_eq!(panel.analysis, None);

        let panel = Panel::error("connection refused");
        assert_eq!(panel.metric, None);
        assert_eq!(panel.alert.text(), "Error: connection refused");
    }

    #[test]
    fn test_progress_clamped_metric_verbatim() {
        let v = verdict("Match Found: Bob", 130, "x");
        let panel = Panel::for_verdict(&v, Classification::Match);
        assert_eq!(panel.metric.as_deref(), Some("130%"));
        assert_eq!(panel.progress, Some(100));
        assert_eq!(progress_fill(-3), 0);
    }
}
