//! Capability session layer.
//!
//! Sits between application code and a host runtime that exposes
//! text-generation capabilities (summarize, write, rewrite, detect) as
//! independently provisioned features. One call runs a linear flow:
//! supported? → available? → provision (bridging download progress to
//! the caller) → invoke once or stream cumulative text.
//!
//! Sessions are single-owner and single-use: each invocation provisions
//! its own session and nothing is pooled or retried. Cancellation is
//! cooperative, threaded through an explicit token into both
//! provisioning and streaming.

pub mod broker;
pub mod error;
pub mod host;
pub mod progress;
pub mod stream;

pub use broker::{InvokeConfig, SessionBroker};
pub use error::{Error, Result};
pub use host::{
    CapabilityHost, CapabilitySession, DeltaStream, HostError, HostResult, InvokeContext,
};
pub use progress::{MonitorHook, ProgressCallback, ProgressEmitter};
pub use stream::TextStream;
