//! WriteKit service library.
//!
//! Exposes assisted-writing capabilities (summarize, write, rewrite,
//! language detection) over HTTP, backed by an Ollama host binding.

pub mod api;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod state;

pub use config::{ApiConfig, Config, ModelsConfig, OllamaConfig};
pub use error::Error;
pub use host::OllamaHost;
pub use state::AppState;
