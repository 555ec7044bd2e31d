//! Error taxonomy for capability invocations.

use writekit_common::{Availability, CapabilityKind};

/// Failures surfaced to the immediate caller of a capability operation.
///
/// None of these are retried internally; retry policy, if any, belongs
/// to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host does not expose this capability at all.
    #[error("Capability not supported by host: {0}")]
    NotSupported(CapabilityKind),

    /// The capability exists but cannot be used right now. Covers both
    /// a host-reported `unavailable` and an indeterminate query result.
    #[error("Capability {kind} is not usable (availability: {availability:?})")]
    Unavailable {
        kind: CapabilityKind,
        availability: Availability,
    },

    /// Empty or whitespace-only input, rejected before provisioning.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The host rejected session creation.
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// The host rejected the generation call itself.
    #[error("Invocation failed: {0}")]
    Invocation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
