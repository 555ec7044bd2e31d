//! Per-capability option surfaces.
//!
//! Each capability kind keeps its own typed configuration struct; the
//! `CapabilityOptions` enum carries whichever one a session is created
//! with. All fields are optional and default to the host's behavior
//! when absent.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKind;

/// What kind of summary to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    Tldr,
    KeyPoints,
    Teaser,
    Headline,
}

/// Output formatting shared by the summarizer and writer surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Markdown,
    PlainText,
}

/// Output length shared by the summarizer and writer surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLength {
    Short,
    Medium,
    Long,
}

/// Writing tone for freshly drafted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterTone {
    Formal,
    Neutral,
    Casual,
}

/// Tone adjustment when rewording existing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteTone {
    AsIs,
    MoreFormal,
    MoreCasual,
}

/// Length adjustment when rewording existing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteLength {
    AsIs,
    Shorter,
    Longer,
}

/// Formatting for rewritten text. `AsIs` preserves whatever the input used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriterFormat {
    AsIs,
    PlainText,
    Markdown,
}

/// Options for a summarizer session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizerOptions {
    /// Background shared by every invocation of the session
    #[serde(default)]
    pub shared_context: Option<String>,
    #[serde(default)]
    pub summary_type: Option<SummaryType>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub length: Option<OutputLength>,
    /// BCP-47 tag the output should be written in
    #[serde(default)]
    pub output_language: Option<String>,
}

/// Options for a writer session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriterOptions {
    #[serde(default)]
    pub shared_context: Option<String>,
    #[serde(default)]
    pub tone: Option<WriterTone>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub length: Option<OutputLength>,
    #[serde(default)]
    pub output_language: Option<String>,
}

/// Options for a rewriter session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriterOptions {
    #[serde(default)]
    pub shared_context: Option<String>,
    #[serde(default)]
    pub tone: Option<RewriteTone>,
    #[serde(default)]
    pub length: Option<RewriteLength>,
    #[serde(default)]
    pub format: Option<RewriterFormat>,
    #[serde(default)]
    pub output_language: Option<String>,
}

/// Options for a language-detector session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorOptions {
    /// BCP-47 tags the caller expects the input to be drawn from
    #[serde(default)]
    pub expected_input_languages: Vec<String>,
}

/// The option surface a session is created with, one variant per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "capability")]
pub enum CapabilityOptions {
    Summarizer(SummarizerOptions),
    Writer(WriterOptions),
    Rewriter(RewriterOptions),
    LanguageDetector(DetectorOptions),
}

impl CapabilityOptions {
    /// The capability kind these options belong to.
    pub fn kind(&self) -> CapabilityKind {
        match self {
            CapabilityOptions::Summarizer(_) => CapabilityKind::Summarizer,
            CapabilityOptions::Writer(_) => CapabilityKind::Writer,
            CapabilityOptions::Rewriter(_) => CapabilityKind::Rewriter,
            CapabilityOptions::LanguageDetector(_) => CapabilityKind::LanguageDetector,
        }
    }

    /// Session-wide background context, if the surface carries one.
    pub fn shared_context(&self) -> Option<&str> {
        match self {
            CapabilityOptions::Summarizer(o) => o.shared_context.as_deref(),
            CapabilityOptions::Writer(o) => o.shared_context.as_deref(),
            CapabilityOptions::Rewriter(o) => o.shared_context.as_deref(),
            CapabilityOptions::LanguageDetector(_) => None,
        }
    }
}
