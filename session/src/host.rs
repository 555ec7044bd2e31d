//! Host runtime abstraction.
//!
//! The session layer talks to any runtime that exposes capabilities
//! behind these two traits. Unit tests satisfy them with a scripted
//! double; production binds them to a real inference endpoint.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use tokio_util::sync::CancellationToken;
use writekit_common::{Availability, CapabilityKind, CapabilityOptions};

use crate::progress::ProgressEmitter;

/// A failure reported by the host runtime.
///
/// The session layer folds these into its own error taxonomy depending
/// on which phase of the flow they occur in.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Raw text deltas produced by a streaming invocation.
pub type DeltaStream = Pin<Box<dyn Stream<Item = HostResult<String>> + Send>>;

/// Per-invocation parameters forwarded to the host.
pub struct InvokeContext<'a> {
    /// Extra background for this one invocation
    pub context: Option<&'a str>,
    /// Cooperative cancellation for the call
    pub cancel: &'a CancellationToken,
}

/// A runtime exposing provisioned text-generation capabilities.
#[async_trait]
pub trait CapabilityHost: Send + Sync {
    /// Whether the host exposes this capability at all.
    ///
    /// Pure membership probe: no network traffic, no downloads.
    fn supports(&self, kind: CapabilityKind) -> bool;

    /// One asynchronous readiness query for the capability.
    async fn availability(&self, kind: CapabilityKind) -> HostResult<Availability>;

    /// Provision a session for one invocation.
    ///
    /// While the backing resource downloads, the host reports fractions
    /// through `progress`. A fired `cancel` abandons provisioning.
    async fn create_session(
        &self,
        options: &CapabilityOptions,
        progress: &mut ProgressEmitter,
        cancel: &CancellationToken,
    ) -> HostResult<Box<dyn CapabilitySession>>;
}

/// A provisioned, single-use handle to a capability instance.
///
/// Owned exclusively by the invocation that created it; never pooled,
/// never shared between concurrent callers.
#[async_trait]
pub trait CapabilitySession: Send + Sync {
    /// Single-shot generation.
    async fn generate(&self, input: &str, ctx: InvokeContext<'_>) -> HostResult<String>;

    /// Streamed generation, yielding raw deltas until completion.
    async fn generate_streaming(
        &self,
        input: &str,
        ctx: InvokeContext<'_>,
    ) -> HostResult<DeltaStream>;
}
