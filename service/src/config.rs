//! Configuration for the WriteKit service.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use writekit_common::CapabilityKind;

/// Main configuration structure for the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Ollama endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Whether an absent model may be pulled on demand. When false, an
    /// absent model makes its capability unavailable instead of
    /// downloadable.
    #[serde(default = "default_true")]
    pub allow_download: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            allow_download: default_true(),
        }
    }
}

/// Capability-to-model mappings.
///
/// A capability with no model configured is not supported by the
/// service at all.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_model")]
    pub summarizer: Option<String>,
    #[serde(default = "default_model")]
    pub writer: Option<String>,
    #[serde(default = "default_model")]
    pub rewriter: Option<String>,
    #[serde(default = "default_model")]
    pub language_detector: Option<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            summarizer: default_model(),
            writer: default_model(),
            rewriter: default_model(),
            language_detector: default_model(),
        }
    }
}

impl ModelsConfig {
    /// The model backing a capability, if one is configured.
    pub fn model_for(&self, kind: CapabilityKind) -> Option<&str> {
        match kind {
            CapabilityKind::Summarizer => self.summarizer.as_deref(),
            CapabilityKind::Writer => self.writer.as_deref(),
            CapabilityKind::Rewriter => self.rewriter.as_deref(),
            CapabilityKind::LanguageDetector => self.language_detector.as_deref(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> Option<String> {
    Some("llama3.2:3b".to_string())
}
fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (WRITEKIT__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            // Set defaults
            .set_default("api.host", default_host())?
            .set_default("api.port", default_port() as i64)?
            .set_default("ollama.base_url", default_ollama_url())?
            .set_default("ollama.allow_download", true)?
            // Load from config.toml if exists
            .add_source(File::with_name("config").required(false))
            // Override with environment variables (WRITEKIT__SECTION__KEY format)
            .add_source(
                Environment::with_prefix("WRITEKIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let api = ApiConfig::default();
        assert_eq!(api.host, "0.0.0.0");
        assert_eq!(api.port, 8080);
    }

    #[test]
    fn test_default_ollama_config() {
        let ollama = OllamaConfig::default();
        assert_eq!(ollama.base_url, "http://localhost:11434");
        assert!(ollama.allow_download);
    }

    #[test]
    fn test_models_config_lookup() {
        let models = ModelsConfig {
            summarizer: Some("llama3.2:3b".to_string()),
            writer: None,
            rewriter: Some("qwen2.5:7b".to_string()),
            language_detector: None,
        };
        assert_eq!(
            models.model_for(CapabilityKind::Summarizer),
            Some("llama3.2:3b")
        );
        assert_eq!(models.model_for(CapabilityKind::Writer), None);
        assert_eq!(
            models.model_for(CapabilityKind::Rewriter),
            Some("qwen2.5:7b")
        );
    }

    #[test]
    fn test_models_config_defaults_cover_every_capability() {
        let models = ModelsConfig::default();
        for kind in CapabilityKind::ALL {
            assert!(models.model_for(kind).is_some());
        }
    }

    #[test]
    fn test_config_deserializes_from_toml_fragment() {
        let raw = r#"
            [api]
            port = 9090

            [ollama]
            base_url = "http://inference:11434"
            allow_download = false

            [models]
            summarizer = "gemma2:2b"
        "#;
        let config: Config = toml_from_str(raw);
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.ollama.base_url, "http://inference:11434");
        assert!(!config.ollama.allow_download);
        assert_eq!(
            config.models.model_for(CapabilityKind::Summarizer),
            Some("gemma2:2b")
        );
    }

    fn toml_from_str(raw: &str) -> Config {
        ConfigLoader::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
