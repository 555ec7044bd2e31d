//! Download-progress events emitted while a capability provisions.

use serde::{Deserialize, Serialize};

/// A provisioning download-progress notification.
///
/// `loaded` is the fraction of the backing resource fetched so far, in
/// [0, 1], and is non-decreasing across the events of one provisioning.
/// Progress is only reported while provisioning, never during invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub loaded: f64,
}

impl DownloadProgress {
    pub fn new(loaded: f64) -> Self {
        Self { loaded }
    }

    /// The consumer-visible form: `round(loaded * 100)`, clamped to [0, 100].
    pub fn percent(&self) -> u8 {
        (self.loaded.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
