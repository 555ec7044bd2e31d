//! The capability session broker.
//!
//! One generic implementation of the four public operations shared by
//! every capability kind: support probing, availability checks, session
//! provisioning with progress bridging, and one-shot or streaming
//! invocation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use writekit_common::{Availability, CapabilityKind, CapabilityOptions};

use crate::error::{Error, Result};
use crate::host::{CapabilityHost, CapabilitySession, InvokeContext};
use crate::progress::{attach_percent_bridge, MonitorHook, ProgressCallback, ProgressEmitter};
use crate::stream::TextStream;

/// Receives descriptions of failures the broker swallowed, such as a
/// progress-monitor attach error. Purely observational.
pub type DiagnosticSink = Box<dyn Fn(&str) + Send + Sync>;

/// Per-call configuration shared by all capability kinds.
///
/// Consumed by one invocation, matching the single-use session model.
#[derive(Default)]
pub struct InvokeConfig {
    /// Extra background for this one invocation
    pub context: Option<String>,
    /// Cooperative cancellation, threaded into provisioning and streaming.
    /// Timeouts are the caller's concern: pair one with this token.
    pub cancel: CancellationToken,
    /// Receives download percentages while the capability provisions
    pub on_progress: Option<ProgressCallback>,
    /// Caller-supplied monitor, attached before the internal bridge
    pub monitor: Option<MonitorHook>,
}

impl InvokeConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stateless front door to a capability host.
///
/// Holds no per-call state; every invocation provisions its own
/// single-use session.
pub struct SessionBroker {
    host: Arc<dyn CapabilityHost>,
    diagnostics: Option<DiagnosticSink>,
}

impl SessionBroker {
    pub fn new(host: Arc<dyn CapabilityHost>) -> Self {
        Self {
            host,
            diagnostics: None,
        }
    }

    /// Observe failures the broker otherwise swallows.
    pub fn with_diagnostics(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }

    /// Whether the host exposes this capability at all. Never fails.
    pub fn is_supported(&self, kind: CapabilityKind) -> bool {
        self.host.supports(kind)
    }

    /// Query the capability's readiness.
    ///
    /// Returns `Unknown` immediately for an unsupported capability, and
    /// folds every query failure into `Unknown` rather than propagating
    /// it: callers must treat an indeterminate result as unusable.
    pub async fn check_availability(&self, kind: CapabilityKind) -> Availability {
        if !self.host.supports(kind) {
            return Availability::Unknown;
        }
        match self.host.availability(kind).await {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!("Availability query for {} failed: {}", kind, e);
                self.report(&format!("availability query failed: {}", e));
                Availability::Unknown
            }
        }
    }

    /// Provision a session, bridging download progress to the caller.
    ///
    /// Fails with `NotSupported` before the availability query is ever
    /// made, and with `Unavailable` when the host reports `unavailable`
    /// or the result is indeterminate.
    pub async fn ensure_session(
        &self,
        options: &CapabilityOptions,
        config: InvokeConfig,
    ) -> Result<Box<dyn CapabilitySession>> {
        let InvokeConfig {
            cancel,
            on_progress,
            monitor,
            ..
        } = config;
        self.provision(options, monitor, on_progress, &cancel).await
    }

    /// Run one single-shot generation.
    ///
    /// Rejects empty or whitespace-only input before any session is
    /// provisioned. Exactly one session is created per call.
    pub async fn invoke_once(
        &self,
        options: &CapabilityOptions,
        input: &str,
        config: InvokeConfig,
    ) -> Result<String> {
        check_input(input)?;

        let InvokeConfig {
            context,
            cancel,
            on_progress,
            monitor,
        } = config;

        let session = self.provision(options, monitor, on_progress, &cancel).await?;
        let ctx = InvokeContext {
            context: context.as_deref(),
            cancel: &cancel,
        };
        session
            .generate(input, ctx)
            .await
            .map_err(|e| Error::Invocation(e.to_string()))
    }

    /// Run one streaming generation, yielding cumulative text.
    ///
    /// Same empty-input precondition as [`invoke_once`]. The returned
    /// stream stops producing when the host stream completes or the
    /// cancellation token fires; cancellation is not reported as an
    /// error.
    ///
    /// [`invoke_once`]: SessionBroker::invoke_once
    pub async fn invoke_streaming(
        &self,
        options: &CapabilityOptions,
        input: &str,
        config: InvokeConfig,
    ) -> Result<TextStream> {
        check_input(input)?;

        let kind = options.kind();
        if !kind.supports_streaming() {
            return Err(Error::Invocation(format!(
                "{} is invoked one-shot only",
                kind
            )));
        }

        let InvokeConfig {
            context,
            cancel,
            on_progress,
            monitor,
        } = config;

        let session = self.provision(options, monitor, on_progress, &cancel).await?;
        let ctx = InvokeContext {
            context: context.as_deref(),
            cancel: &cancel,
        };
        let deltas = session
            .generate_streaming(input, ctx)
            .await
            .map_err(|e| Error::Invocation(e.to_string()))?;

        Ok(TextStream::new(deltas, cancel))
    }

    /// The linear provisioning flow shared by every operation:
    /// supported? → available? → create with progress bridging.
    async fn provision(
        &self,
        options: &CapabilityOptions,
        monitor: Option<MonitorHook>,
        on_progress: Option<ProgressCallback>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn CapabilitySession>> {
        let kind = options.kind();

        if !self.host.supports(kind) {
            return Err(Error::NotSupported(kind));
        }

        let availability = self.check_availability(kind).await;
        if !availability.permits_provisioning() {
            return Err(Error::Unavailable { kind, availability });
        }

        let mut progress = ProgressEmitter::new();

        // A caller-supplied monitor subscribes first; an attach failure
        // must never derail provisioning.
        if let Some(attach) = monitor {
            if let Err(e) = attach(&mut progress) {
                tracing::warn!("Progress monitor attach failed for {}: {}", kind, e);
                self.report(&format!("progress monitor attach failed: {}", e));
            }
        }
        if let Some(callback) = on_progress {
            attach_percent_bridge(&mut progress, callback);
        }

        self.host
            .create_session(options, &mut progress, cancel)
            .await
            .map_err(|e| Error::Provisioning(e.to_string()))
    }

    fn report(&self, message: &str) {
        if let Some(sink) = &self.diagnostics {
            sink(message);
        }
    }
}

fn check_input(input: &str) -> Result<()> {
    if input.trim().is_empty() {
        return Err(Error::InvalidInput(
            "input must not be empty or whitespace-only".to_string(),
        ));
    }
    Ok(())
}
