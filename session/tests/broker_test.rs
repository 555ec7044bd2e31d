//! Integration tests for the session broker against a scripted host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use tokio_util::sync::CancellationToken;

use writekit_common::{
    Availability, CapabilityKind, CapabilityOptions, DetectorOptions, DownloadProgress,
    SummarizerOptions, WriterOptions,
};
use writekit_session::{
    CapabilityHost, CapabilitySession, DeltaStream, Error, HostError, HostResult, InvokeConfig,
    InvokeContext, ProgressEmitter, SessionBroker,
};

/// Scripted host double: configurable support set, availability answer,
/// provisioning progress, and generation output.
struct MockHost {
    supported: Vec<CapabilityKind>,
    availability: HostResult<Availability>,
    progress_events: Vec<f64>,
    reply: String,
    deltas: Vec<&'static str>,
    hang_after_deltas: bool,
    availability_calls: AtomicUsize,
    create_calls: AtomicUsize,
    seen_context: Arc<Mutex<Option<String>>>,
}

impl MockHost {
    fn new(availability: HostResult<Availability>) -> Self {
        Self {
            supported: CapabilityKind::ALL.to_vec(),
            availability,
            progress_events: Vec::new(),
            reply: "generated text".to_string(),
            deltas: Vec::new(),
            hang_after_deltas: false,
            availability_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            seen_context: Arc::new(Mutex::new(None)),
        }
    }

    fn available() -> Self {
        Self::new(Ok(Availability::Available))
    }
}

struct MockSession {
    reply: String,
    deltas: Vec<&'static str>,
    hang_after_deltas: bool,
    seen_context: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl CapabilityHost for MockHost {
    fn supports(&self, kind: CapabilityKind) -> bool {
        self.supported.contains(&kind)
    }

    async fn availability(&self, _kind: CapabilityKind) -> HostResult<Availability> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        match &self.availability {
            Ok(state) => Ok(*state),
            Err(e) => Err(HostError::new(e.to_string())),
        }
    }

    async fn create_session(
        &self,
        _options: &CapabilityOptions,
        progress: &mut ProgressEmitter,
        _cancel: &CancellationToken,
    ) -> HostResult<Box<dyn CapabilitySession>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        for loaded in &self.progress_events {
            progress.emit(DownloadProgress::new(*loaded));
        }
        Ok(Box::new(MockSession {
            reply: self.reply.clone(),
            deltas: self.deltas.clone(),
            hang_after_deltas: self.hang_after_deltas,
            seen_context: self.seen_context.clone(),
        }))
    }
}

#[async_trait]
impl CapabilitySession for MockSession {
    async fn generate(&self, _input: &str, ctx: InvokeContext<'_>) -> HostResult<String> {
        *self.seen_context.lock().unwrap() = ctx.context.map(str::to_string);
        Ok(self.reply.clone())
    }

    async fn generate_streaming(
        &self,
        _input: &str,
        _ctx: InvokeContext<'_>,
    ) -> HostResult<DeltaStream> {
        let items: Vec<HostResult<String>> =
            self.deltas.iter().map(|d| Ok(d.to_string())).collect();
        let finite = stream::iter(items);
        if self.hang_after_deltas {
            Ok(Box::pin(finite.chain(stream::pending())))
        } else {
            Ok(Box::pin(finite))
        }
    }
}

fn broker(host: Arc<MockHost>) -> SessionBroker {
    SessionBroker::new(host)
}

fn summarizer_options() -> CapabilityOptions {
    CapabilityOptions::Summarizer(SummarizerOptions::default())
}

#[tokio::test]
async fn test_is_supported_reflects_host_membership() {
    let mut host = MockHost::available();
    host.supported = vec![CapabilityKind::Summarizer];
    let broker = broker(Arc::new(host));

    assert!(broker.is_supported(CapabilityKind::Summarizer));
    assert!(!broker.is_supported(CapabilityKind::Writer));
    assert!(!broker.is_supported(CapabilityKind::LanguageDetector));
}

#[tokio::test]
async fn test_check_availability_returns_unknown_when_query_fails() {
    let host = Arc::new(MockHost::new(Err(HostError::new("query rejected"))));
    let broker = broker(host.clone());

    let state = broker.check_availability(CapabilityKind::Writer).await;

    assert_eq!(state, Availability::Unknown);
    assert_eq!(host.availability_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_check_availability_skips_query_for_unsupported_capability() {
    let mut host = MockHost::available();
    host.supported = vec![];
    let host = Arc::new(host);
    let broker = broker(host.clone());

    let state = broker.check_availability(CapabilityKind::Rewriter).await;

    assert_eq!(state, Availability::Unknown);
    assert_eq!(host.availability_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ensure_session_rejects_unsupported_without_availability_query() {
    let mut host = MockHost::available();
    host.supported = vec![CapabilityKind::Writer];
    let host = Arc::new(host);
    let broker = broker(host.clone());

    let err = broker
        .ensure_session(&summarizer_options(), InvokeConfig::new())
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        Error::NotSupported(CapabilityKind::Summarizer)
    ));
    assert_eq!(host.availability_calls.load(Ordering::SeqCst), 0);
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ensure_session_rejects_unavailable_and_unknown() {
    for scripted in [Ok(Availability::Unavailable), Err(HostError::new("down"))] {
        let host = Arc::new(MockHost::new(scripted));
        let broker = broker(host.clone());

        let err = broker
            .ensure_session(&summarizer_options(), InvokeConfig::new())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::Unavailable { .. }));
        assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_ensure_session_provisions_downloadable_capability() {
    let host = Arc::new(MockHost::new(Ok(Availability::Downloadable)));
    let broker = broker(host.clone());

    broker
        .ensure_session(&summarizer_options(), InvokeConfig::new())
        .await
        .unwrap();

    assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_progress_percentages_are_bridged_and_rounded() {
    let mut host = MockHost::available();
    host.progress_events = vec![0.25, 0.9];
    let broker = broker(Arc::new(host));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let config = InvokeConfig {
        on_progress: Some(Box::new(move |p| sink.lock().unwrap().push(p))),
        ..InvokeConfig::new()
    };

    broker
        .ensure_session(&summarizer_options(), config)
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![25, 90]);
}

#[tokio::test]
async fn test_caller_monitor_fires_before_internal_bridge() {
    let mut host = MockHost::available();
    host.progress_events = vec![0.25, 0.9];
    let broker = broker(Arc::new(host));

    let order = Arc::new(Mutex::new(Vec::new()));

    let monitor_order = order.clone();
    let bridge_order = order.clone();
    let config = InvokeConfig {
        monitor: Some(Box::new(move |emitter: &mut ProgressEmitter| {
            emitter.subscribe(move |event| {
                monitor_order
                    .lock()
                    .unwrap()
                    .push(format!("monitor:{}", event.percent()));
            });
            Ok(())
        })),
        on_progress: Some(Box::new(move |p| {
            bridge_order.lock().unwrap().push(format!("bridge:{}", p));
        })),
        ..InvokeConfig::new()
    };

    broker
        .ensure_session(&summarizer_options(), config)
        .await
        .unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        vec!["monitor:25", "bridge:25", "monitor:90", "bridge:90"]
    );
}

#[tokio::test]
async fn test_monitor_attach_failure_is_swallowed_but_observable() {
    let host = Arc::new(MockHost::available());
    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let sink = diagnostics.clone();

    let broker = SessionBroker::new(host.clone())
        .with_diagnostics(move |msg| sink.lock().unwrap().push(msg.to_string()));

    let config = InvokeConfig {
        monitor: Some(Box::new(|_: &mut ProgressEmitter| {
            Err(HostError::new("emitter gone"))
        })),
        ..InvokeConfig::new()
    };

    // Provisioning must succeed despite the attach failure.
    broker
        .ensure_session(&summarizer_options(), config)
        .await
        .unwrap();

    let seen = diagnostics.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("emitter gone"));
}

#[tokio::test]
async fn test_invoke_once_rejects_empty_input_before_provisioning() {
    let host = Arc::new(MockHost::available());
    let broker = broker(host.clone());

    for input in ["", "   "] {
        let err = broker
            .invoke_once(&summarizer_options(), input, InvokeConfig::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(host.availability_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invoke_once_returns_host_text_verbatim() {
    let mut host = MockHost::available();
    host.reply = "  exact text, untrimmed  ".to_string();
    let host = Arc::new(host);
    let broker = broker(host.clone());

    let text = broker
        .invoke_once(
            &CapabilityOptions::Writer(WriterOptions::default()),
            "draft a note",
            InvokeConfig::new(),
        )
        .await
        .unwrap();

    assert_eq!(text, "  exact text, untrimmed  ");
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invocation_context_reaches_the_session() {
    let host = Arc::new(MockHost::available());
    let broker = broker(host.clone());

    let config = InvokeConfig {
        context: Some("audience: beginners".to_string()),
        ..InvokeConfig::new()
    };

    broker
        .invoke_once(&summarizer_options(), "explain lifetimes", config)
        .await
        .unwrap();

    assert_eq!(
        host.seen_context.lock().unwrap().as_deref(),
        Some("audience: beginners")
    );
}

#[tokio::test]
async fn test_invoke_streaming_accumulates_cumulative_text() {
    let mut host = MockHost::available();
    host.deltas = vec!["Once ", "upon ", "a time"];
    let broker = broker(Arc::new(host));

    let mut stream = broker
        .invoke_streaming(&summarizer_options(), "a story", InvokeConfig::new())
        .await
        .unwrap();

    let mut seen = Vec::new();
    while let Some(item) = stream.next().await {
        seen.push(item.unwrap());
    }

    assert_eq!(seen, vec!["Once ", "Once upon ", "Once upon a time"]);
}

#[tokio::test]
async fn test_invoke_streaming_rejects_empty_input_before_provisioning() {
    let host = Arc::new(MockHost::available());
    let broker = broker(host.clone());

    let err = broker
        .invoke_streaming(&summarizer_options(), "  ", InvokeConfig::new())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invoke_streaming_rejects_one_shot_only_capability() {
    let host = Arc::new(MockHost::available());
    let broker = broker(host.clone());

    let err = broker
        .invoke_streaming(
            &CapabilityOptions::LanguageDetector(DetectorOptions::default()),
            "bonjour",
            InvokeConfig::new(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::Invocation(_)));
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelling_mid_stream_stops_further_yields() {
    let mut host = MockHost::available();
    host.deltas = vec!["first ", "second "];
    host.hang_after_deltas = true;
    let broker = broker(Arc::new(host));

    let cancel = CancellationToken::new();
    let config = InvokeConfig {
        cancel: cancel.clone(),
        ..InvokeConfig::new()
    };

    // Without cancellation the host stream would hang after two deltas.
    let mut stream = broker
        .invoke_streaming(&summarizer_options(), "a story", config)
        .await
        .unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "first ");
    assert_eq!(stream.next().await.unwrap().unwrap(), "first second ");

    cancel.cancel();

    // No further elements, and no error from the cancellation.
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());
}
