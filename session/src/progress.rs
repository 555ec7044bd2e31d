//! Download-progress bridging.
//!
//! During provisioning the host pushes fraction-loaded events into a
//! [`ProgressEmitter`]. Subscribers run in subscription order, which is
//! how the caller-first composition guarantee is kept: a caller-supplied
//! monitor attaches before the internal percent bridge.

use writekit_common::DownloadProgress;

use crate::host::HostResult;

type Subscriber = Box<dyn FnMut(DownloadProgress) + Send>;

/// Caller-supplied hook given a chance to subscribe to the emitter
/// before the internal bridge does.
pub type MonitorHook = Box<dyn FnOnce(&mut ProgressEmitter) -> HostResult<()> + Send>;

/// Receives normalized integer percentages in [0, 100].
pub type ProgressCallback = Box<dyn FnMut(u8) + Send>;

/// Ordered fan-out point for provisioning download progress.
#[derive(Default)]
pub struct ProgressEmitter {
    subscribers: Vec<Subscriber>,
}

impl ProgressEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subscriber. Subscribers fire in attachment order.
    pub fn subscribe(&mut self, subscriber: impl FnMut(DownloadProgress) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Deliver one event to every subscriber, in attachment order.
    pub fn emit(&mut self, event: DownloadProgress) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Attach the internal bridge forwarding `round(loaded * 100)` percents.
///
/// The host contract promises non-decreasing fractions; regressing
/// values are dropped so the caller-visible sequence stays monotonic
/// even against a misbehaving host.
pub(crate) fn attach_percent_bridge(emitter: &mut ProgressEmitter, mut callback: ProgressCallback) {
    let mut last: Option<u8> = None;
    emitter.subscribe(move |event| {
        let percent = event.percent();
        if last.is_some_and(|p| percent < p) {
            return;
        }
        last = Some(percent);
        callback(percent);
    });
}
