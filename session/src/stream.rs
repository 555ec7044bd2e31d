//! Cumulative text streaming.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error::{Error, Result};
use crate::host::DeltaStream;

/// Cumulative text produced by one streaming invocation.
///
/// Each element is the full text generated so far, not the newest delta.
/// The stream is finite and non-restartable: once the host stream
/// completes, an error is surfaced, or the cancellation token fires,
/// no further elements are produced. Cancellation ends the stream
/// without an error.
pub struct TextStream {
    deltas: DeltaStream,
    accumulated: String,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    done: bool,
}

impl TextStream {
    pub(crate) fn new(deltas: DeltaStream, cancel: CancellationToken) -> Self {
        Self {
            deltas,
            accumulated: String::new(),
            cancelled: Box::pin(cancel.cancelled_owned()),
            done: false,
        }
    }

    /// The text accumulated so far.
    pub fn text(&self) -> &str {
        &self.accumulated
    }
}

impl Stream for TextStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        if this.cancelled.as_mut().poll(cx).is_ready() {
            this.done = true;
            return Poll::Ready(None);
        }

        match this.deltas.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(delta))) => {
                this.accumulated.push_str(&delta);
                Poll::Ready(Some(Ok(this.accumulated.clone())))
            }
            Poll::Ready(Some(Err(e))) => {
                this.done = true;
                Poll::Ready(Some(Err(Error::Invocation(e.to_string()))))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
