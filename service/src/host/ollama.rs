//! Ollama capability host.
//!
//! Maps each capability kind to a configured model. Model presence in
//! `/api/tags` drives availability; an absent model is pulled on demand
//! through `/api/pull` (surfacing download progress) when downloads are
//! allowed. Sessions invoke `/api/generate`, one-shot or streamed.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use writekit_common::{Availability, CapabilityKind, CapabilityOptions, DownloadProgress};
use writekit_session::{
    CapabilityHost, CapabilitySession, DeltaStream, HostError, HostResult, InvokeContext,
    ProgressEmitter,
};

use super::prompt::build_prompt;
use crate::config::Config;

/// Ollama-backed capability host.
pub struct OllamaHost {
    http_client: Client,
    base_url: String,
    allow_download: bool,
    models: HashMap<CapabilityKind, String>,
}

impl OllamaHost {
    pub fn new(
        base_url: &str,
        allow_download: bool,
        models: HashMap<CapabilityKind, String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            allow_download,
            models,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let models = CapabilityKind::ALL
            .iter()
            .filter_map(|kind| {
                config
                    .models
                    .model_for(*kind)
                    .map(|model| (*kind, model.to_string()))
            })
            .collect();
        Self::new(
            &config.ollama.base_url,
            config.ollama.allow_download,
            models,
        )
    }

    async fn list_model_names(&self) -> HostResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| HostError::new(format!("tags request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HostError::new(format!(
                "Ollama returned {}",
                response.status()
            )));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| HostError::new(format!("invalid tags response: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn model_present(&self, model: &str) -> HostResult<bool> {
        Ok(self
            .list_model_names()
            .await?
            .iter()
            .any(|name| name == model))
    }

    /// Pull a model, forwarding download progress fractions.
    async fn pull_model(
        &self,
        model: &str,
        progress: &mut ProgressEmitter,
        cancel: &CancellationToken,
    ) -> HostResult<()> {
        let url = format!("{}/api/pull", self.base_url);
        let request = OllamaPullRequest {
            name: model.to_string(),
            stream: true,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| HostError::new(format!("pull request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::new(format!("pull failed: {}: {}", status, body)));
        }

        let mut body = response.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Err(HostError::new("model pull cancelled")),
                chunk = body.next() => chunk,
            };
            let Some(chunk) = chunk else {
                if let Some(line) = take_tail(&mut buf) {
                    apply_pull_line(&line, progress)?;
                }
                break;
            };
            let bytes =
                chunk.map_err(|e| HostError::new(format!("pull stream error: {}", e)))?;
            buf.extend_from_slice(&bytes);
            for line in drain_lines(&mut buf) {
                apply_pull_line(&line, progress)?;
            }
        }

        tracing::info!("Model {} pulled", model);
        Ok(())
    }
}

/// One Ollama session: a provisioned model plus the options the session
/// was created with.
struct OllamaSession {
    http_client: Client,
    base_url: String,
    model: String,
    options: CapabilityOptions,
}

#[async_trait]
impl CapabilityHost for OllamaHost {
    fn supports(&self, kind: CapabilityKind) -> bool {
        self.models.contains_key(&kind)
    }

    async fn availability(&self, kind: CapabilityKind) -> HostResult<Availability> {
        let Some(model) = self.models.get(&kind) else {
            return Ok(Availability::Unknown);
        };

        if self.model_present(model).await? {
            Ok(Availability::Available)
        } else if self.allow_download {
            Ok(Availability::Downloadable)
        } else {
            Ok(Availability::Unavailable)
        }
    }

    async fn create_session(
        &self,
        options: &CapabilityOptions,
        progress: &mut ProgressEmitter,
        cancel: &CancellationToken,
    ) -> HostResult<Box<dyn CapabilitySession>> {
        let kind = options.kind();
        let model = self
            .models
            .get(&kind)
            .ok_or_else(|| HostError::new(format!("no model configured for {}", kind)))?;

        if !self.model_present(model).await? {
            if !self.allow_download {
                return Err(HostError::new(format!(
                    "model {} is not present and downloads are disabled",
                    model
                )));
            }
            self.pull_model(model, progress, cancel).await?;
        }

        Ok(Box::new(OllamaSession {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.clone(),
            options: options.clone(),
        }))
    }
}

#[async_trait]
impl CapabilitySession for OllamaSession {
    async fn generate(&self, input: &str, ctx: InvokeContext<'_>) -> HostResult<String> {
        let prompt = build_prompt(&self.options, ctx.context, input);
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };
        let url = format!("{}/api/generate", self.base_url);

        tracing::debug!("Sending generate request to Ollama: {} model={}", url, self.model);

        let send = self.http_client.post(&url).json(&request).send();
        let response = tokio::select! {
            _ = ctx.cancel.cancelled() => return Err(HostError::new("generation cancelled")),
            response = send => {
                response.map_err(|e| HostError::new(format!("generate request failed: {}", e)))?
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::new(format!("{}: {}", status, body)));
        }

        let reply: OllamaGenerateChunk = response
            .json()
            .await
            .map_err(|e| HostError::new(format!("invalid generate response: {}", e)))?;

        if let Some(error) = reply.error {
            return Err(HostError::new(error));
        }
        Ok(reply.response)
    }

    async fn generate_streaming(
        &self,
        input: &str,
        ctx: InvokeContext<'_>,
    ) -> HostResult<DeltaStream> {
        let prompt = build_prompt(&self.options, ctx.context, input);
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: true,
        };
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| HostError::new(format!("generate request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::new(format!("{}: {}", status, body)));
        }

        let (tx, rx) = mpsc::channel::<HostResult<String>>(32);
        let cancel = ctx.cancel.clone();
        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buf: Vec<u8> = Vec::new();
            loop {
                let chunk = tokio::select! {
                    _ = cancel.cancelled() => return,
                    chunk = body.next() => chunk,
                };
                let Some(chunk) = chunk else {
                    if let Some(line) = take_tail(&mut buf) {
                        let _ = forward_generate_line(&line, &tx).await;
                    }
                    return;
                };
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(HostError::new(format!("generate stream error: {}", e))))
                            .await;
                        return;
                    }
                };
                buf.extend_from_slice(&bytes);
                for line in drain_lines(&mut buf) {
                    if matches!(
                        forward_generate_line(&line, &tx).await,
                        LineOutcome::Stop
                    ) {
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

// ============================================================================
// Ollama API types
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// One NDJSON line of a generate response; also the full body of a
/// non-streaming generate.
#[derive(Debug, Deserialize)]
struct OllamaGenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaPullRequest {
    name: String,
    stream: bool,
}

/// One NDJSON status line of a pull response.
#[derive(Debug, Deserialize)]
struct OllamaPullStatus {
    #[serde(default)]
    completed: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// Response from /api/tags endpoint.
#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModelInfo>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelInfo {
    name: String,
}

enum LineOutcome {
    Continue,
    Stop,
}

fn apply_pull_line(line: &str, progress: &mut ProgressEmitter) -> HostResult<()> {
    let status: OllamaPullStatus = match serde_json::from_str(line) {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!("Skipping unparseable pull line: {}", e);
            return Ok(());
        }
    };
    if let Some(error) = status.error {
        return Err(HostError::new(format!("pull failed: {}", error)));
    }
    if let (Some(completed), Some(total)) = (status.completed, status.total) {
        if total > 0 {
            progress.emit(DownloadProgress::new(completed as f64 / total as f64));
        }
    }
    Ok(())
}

async fn forward_generate_line(
    line: &str,
    tx: &mpsc::Sender<HostResult<String>>,
) -> LineOutcome {
    let part: OllamaGenerateChunk = match serde_json::from_str(line) {
        Ok(part) => part,
        Err(e) => {
            tracing::debug!("Skipping unparseable generate line: {}", e);
            return LineOutcome::Continue;
        }
    };
    if let Some(error) = part.error {
        let _ = tx.send(Err(HostError::new(error))).await;
        return LineOutcome::Stop;
    }
    if !part.response.is_empty() && tx.send(Ok(part.response)).await.is_err() {
        return LineOutcome::Stop;
    }
    if part.done {
        LineOutcome::Stop
    } else {
        LineOutcome::Continue
    }
}

/// Split complete newline-terminated lines out of the buffer.
fn drain_lines(buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
        let raw: Vec<u8> = buf.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Whatever is left in the buffer once the body ends.
fn take_tail(buf: &mut Vec<u8>) -> Option<String> {
    if buf.is_empty() {
        return None;
    }
    let line = String::from_utf8_lossy(buf).trim().to_string();
    buf.clear();
    (!line.is_empty()).then_some(line)
}
