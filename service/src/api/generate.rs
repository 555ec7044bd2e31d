//! Generation endpoints, one-shot and streaming, per capability.
//!
//! Streaming endpoints answer with Server-Sent Events: `progress`
//! events (integer percent) while a model downloads, then `text` events
//! carrying the cumulative text-so-far, then a final `done` event.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::UnboundedReceiverStream;

use writekit_common::{
    CapabilityOptions, DetectorOptions, GenerationResponse, RewriterOptions, SummarizerOptions,
    WriterOptions,
};
use writekit_session::InvokeConfig;

use crate::error::Result;
use crate::state::AppState;

/// Build the generation router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summarize", post(summarize))
        .route("/summarize/stream", post(summarize_stream))
        .route("/write", post(write))
        .route("/write/stream", post(write_stream))
        .route("/rewrite", post(rewrite))
        .route("/rewrite/stream", post(rewrite_stream))
        .route("/detect-language", post(detect_language))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub input: String,
    #[serde(default)]
    pub options: SummarizerOptions,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub input: String,
    #[serde(default)]
    pub options: WriterOptions,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub input: String,
    #[serde(default)]
    pub options: RewriterOptions,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetectLanguageRequest {
    pub input: String,
    #[serde(default)]
    pub expected_input_languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DetectLanguageResponse {
    pub language: String,
}

/// POST /v1/summarize - one-shot summary.
async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<GenerationResponse>> {
    run_once(
        &state,
        CapabilityOptions::Summarizer(request.options),
        &request.input,
        request.context,
    )
    .await
}

/// POST /v1/summarize/stream - cumulative summary stream.
async fn summarize_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Sse<EventStream>> {
    run_stream(
        &state,
        CapabilityOptions::Summarizer(request.options),
        &request.input,
        request.context,
    )
    .await
}

/// POST /v1/write - one-shot draft.
async fn write(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WriteRequest>,
) -> Result<Json<GenerationResponse>> {
    run_once(
        &state,
        CapabilityOptions::Writer(request.options),
        &request.input,
        request.context,
    )
    .await
}

/// POST /v1/write/stream - cumulative draft stream.
async fn write_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WriteRequest>,
) -> Result<Sse<EventStream>> {
    run_stream(
        &state,
        CapabilityOptions::Writer(request.options),
        &request.input,
        request.context,
    )
    .await
}

/// POST /v1/rewrite - one-shot rewording.
async fn rewrite(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<GenerationResponse>> {
    run_once(
        &state,
        CapabilityOptions::Rewriter(request.options),
        &request.input,
        request.context,
    )
    .await
}

/// POST /v1/rewrite/stream - cumulative rewording stream.
async fn rewrite_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RewriteRequest>,
) -> Result<Sse<EventStream>> {
    run_stream(
        &state,
        CapabilityOptions::Rewriter(request.options),
        &request.input,
        request.context,
    )
    .await
}

/// POST /v1/detect-language - identify the language of a passage.
async fn detect_language(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetectLanguageRequest>,
) -> Result<Json<DetectLanguageResponse>> {
    let options = CapabilityOptions::LanguageDetector(DetectorOptions {
        expected_input_languages: request.expected_input_languages,
    });
    let text = state
        .broker
        .invoke_once(&options, &request.input, InvokeConfig::new())
        .await?;

    Ok(Json(DetectLanguageResponse {
        language: text.trim().to_string(),
    }))
}

async fn run_once(
    state: &AppState,
    options: CapabilityOptions,
    input: &str,
    context: Option<String>,
) -> Result<Json<GenerationResponse>> {
    let kind = options.kind();
    let config = InvokeConfig {
        context,
        ..InvokeConfig::new()
    };
    let text = state.broker.invoke_once(&options, input, config).await?;
    Ok(Json(GenerationResponse::new(kind, text)))
}

type EventStream = BoxStream<'static, std::result::Result<Event, axum::Error>>;

#[derive(Debug, Serialize)]
struct ProgressEvent {
    percent: u8,
}

#[derive(Debug, Serialize)]
struct TextEvent {
    text: String,
}

async fn run_stream(
    state: &AppState,
    options: CapabilityOptions,
    input: &str,
    context: Option<String>,
) -> Result<Sse<EventStream>> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<u8>();
    let config = InvokeConfig {
        context,
        on_progress: Some(Box::new(move |percent| {
            let _ = tx.send(percent);
        })),
        ..InvokeConfig::new()
    };

    let text_stream = state.broker.invoke_streaming(&options, input, config).await?;

    // Provisioning has completed by the time invoke_streaming returns,
    // so the progress sender is dropped and the receiver stream below
    // is already finite.
    let progress_events = UnboundedReceiverStream::new(rx)
        .map(|percent| Event::default().event("progress").json_data(ProgressEvent { percent }));
    let text_events = text_stream.map(|item| match item {
        Ok(text) => Event::default().event("text").json_data(TextEvent { text }),
        Err(e) => Ok(Event::default().event("error").data(e.to_string())),
    });
    let done = stream::once(async { Ok(Event::default().event("done").data("[DONE]")) });

    let events = progress_events.chain(text_events).chain(done).boxed();
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
