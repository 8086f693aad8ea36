//! Prompt and schema contract sent to the inference service.

use crate::types::{Gallery, ImagePayload};
use serde_json::{json, Value};

pub const CONTEXT_PROMPT: &str =
    "CONTEXT: These images represent authorized users allowed to access the system.";

pub const TASK_PROMPT: &str = "TASK: Analyze the final image for IDENTITY and SPOOFING.";

pub const PROTOCOL_PROMPT: &str = "\
SECURITY PROTOCOL:
1. Check for 'Photo-of-a-photo' or 'Screen-replay' artifacts.
2. IDENTITY: Compare against known users.

OUTPUT INSTRUCTIONS:
- status: 'Match Found: [Name]', 'BLOCK: SPOOF', 'BLOCK: UNKNOWN', or 'BLOCK: NON_HUMAN'.
- confidence_score: An integer 0-100 representing how certain you are of the identity match.
- reasoning: Brief explanation of the score.";

/// One ordered element of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Image(ImagePayload),
}

/// Fully assembled request: ordered parts plus the output schema hint.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub parts: Vec<Part>,
    pub response_schema: Value,
}

impl ScanRequest {
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Image(_)))
            .count()
    }

    /// Total inline image bytes, before base64.
    pub fn payload_bytes(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                Part::Image(img) => img.len(),
                Part::Text(_) => 0,
            })
            .sum()
    }
}

/// Label text placed immediately before a reference image.
pub fn name_label(person: &str) -> String {
    format!("NAME: {person}")
}

/// Build the ordered request: context, labelled gallery, task, probe, protocol.
pub fn assemble(gallery: &Gallery, probe: ImagePayload) -> ScanRequest {
    let mut parts = Vec::with_capacity(gallery.len() * 2 + 4);
    parts.push(Part::Text(CONTEXT_PROMPT.to_string()));
    for entry in &gallery.entries {
        parts.push(Part::Text(name_label(&entry.person)));
        parts.push(Part::Image(entry.image.clone()));
    }
    parts.push(Part::Text(TASK_PROMPT.to_string()));
    parts.push(Part::Image(probe));
    parts.push(Part::Text(PROTOCOL_PROMPT.to_string()));

    ScanRequest {
        parts,
        response_schema: response_schema(),
    }
}

/// Structured-output schema: exactly three required fields.
///
/// Uses the OpenAPI-subset type names the Gemini API expects.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "status": { "type": "STRING" },
            "confidence_score": { "type": "INTEGER" },
            "reasoning": { "type": "STRING" },
        },
        "required": ["status", "confidence_score", "reasoning"],
    })
}
