//! Capability kinds and availability states.

use serde::{Deserialize, Serialize};

/// The text-generation capabilities a host runtime can expose.
///
/// These are logical capability kinds, not specific models. Each host
/// maps a kind to whatever model or resource backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Condense a passage of text
    Summarizer,
    /// Draft new text from a writing task
    Writer,
    /// Reword existing text
    Rewriter,
    /// Identify the language of a passage
    LanguageDetector,
}

impl CapabilityKind {
    /// All capability variants for iteration.
    pub const ALL: [CapabilityKind; 4] = [
        CapabilityKind::Summarizer,
        CapabilityKind::Writer,
        CapabilityKind::Rewriter,
        CapabilityKind::LanguageDetector,
    ];

    /// Whether this capability can produce incremental output.
    ///
    /// Language detection yields a single short answer and is invoked
    /// one-shot only.
    pub fn supports_streaming(&self) -> bool {
        !matches!(self, CapabilityKind::LanguageDetector)
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityKind::Summarizer => write!(f, "summarizer"),
            CapabilityKind::Writer => write!(f, "writer"),
            CapabilityKind::Rewriter => write!(f, "rewriter"),
            CapabilityKind::LanguageDetector => write!(f, "language_detector"),
        }
    }
}

/// Host-reported readiness of a capability.
///
/// `Unknown` covers both "the host does not expose this at all" and
/// "the availability query failed"; invocation treats it exactly like
/// `Unavailable`, but callers may surface the distinction in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Ready to provision immediately
    Available,
    /// Present but the backing resource must be downloaded first
    Downloadable,
    /// Present but not usable
    Unavailable,
    /// Absent from the host, or the query could not be completed
    Unknown,
}

impl Availability {
    /// Whether provisioning a session may proceed.
    pub fn permits_provisioning(&self) -> bool {
        matches!(self, Availability::Available | Availability::Downloadable)
    }

    /// Whether provisioning would need a download first.
    pub fn requires_download(&self) -> bool {
        matches!(self, Availability::Downloadable)
    }
}
