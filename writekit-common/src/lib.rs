//! WriteKit Common Types
//!
//! Shared types used by both the capability session layer and the HTTP
//! service: capability kinds, availability states, per-capability option
//! surfaces, and download-progress events.

pub mod capability;
pub mod envelope;
pub mod options;
pub mod progress;

pub use capability::{Availability, CapabilityKind};
pub use envelope::GenerationResponse;
pub use options::{
    CapabilityOptions, DetectorOptions, OutputFormat, OutputLength, RewriteLength, RewriteTone,
    RewriterFormat, RewriterOptions, SummarizerOptions, SummaryType, WriterOptions, WriterTone,
};
pub use progress::DownloadProgress;
