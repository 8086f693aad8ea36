//! facegated — web front end for the face gate.
//!
//! Rebuilds the authorized-user gallery on every upload, sends it with the
//! probe to the inference service, and renders the verdict.

pub mod config;
pub mod gemini;
pub mod render;
pub mod scan;
pub mod server;

pub use config::Config;
pub use gemini::{GeminiClient, InferenceService, ServiceError};
pub use scan::{ScanError, ScanOutcome, ScanState, Scanner};
pub use server::{build_router, AppState};
