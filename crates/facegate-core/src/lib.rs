//! facegate-core — Gallery assembly, request contract, and verdict handling.
//!
//! All face reasoning is delegated to an external multimodal model; this
//! crate builds what is sent to it and interprets what comes back.

pub mod gallery;
pub mod panel;
pub mod probe;
pub mod request;
pub mod types;
pub mod verdict;

pub use gallery::{build_gallery, GalleryError, GalleryOrder};
pub use panel::{Alert, AlertLevel, Panel};
pub use probe::{check_format, Probe, ProbeError};
pub use request::{assemble, response_schema, Part, ScanRequest};
pub use types::{
    Classification, ClassifyMode, Gallery, GallerySummary, ImagePayload, ReferenceEntry, Verdict,
    VerdictStatus,
};
pub use verdict::{classify, parse_status, parse_verdict, VerdictError};
