//! Instruction assembly for the generative backend.
//!
//! Each capability's option surface is turned into a plain-text
//! instruction prompt wrapped around the caller's input.

use writekit_common::{
    CapabilityOptions, OutputFormat, OutputLength, RewriteLength, RewriteTone, RewriterFormat,
    SummaryType, WriterTone,
};

/// Build the full prompt for one invocation.
pub fn build_prompt(options: &CapabilityOptions, context: Option<&str>, input: &str) -> String {
    let mut lines = Vec::new();

    match options {
        CapabilityOptions::Summarizer(opts) => {
            lines.push(
                match opts.summary_type {
                    Some(SummaryType::KeyPoints) => {
                        "Summarize the following text as a bulleted list of its key points."
                    }
                    Some(SummaryType::Teaser) => {
                        "Write a short teaser that makes a reader want to read the following text."
                    }
                    Some(SummaryType::Headline) => {
                        "Write a single headline that captures the following text."
                    }
                    Some(SummaryType::Tldr) | None => "Summarize the following text concisely.",
                }
                .to_string(),
            );
            if let Some(length) = opts.length {
                lines.push(output_length_hint(length).to_string());
            }
            if let Some(format) = opts.format {
                lines.push(output_format_hint(format).to_string());
            }
            if let Some(language) = &opts.output_language {
                lines.push(format!("Respond in the language tagged '{}'.", language));
            }
        }
        CapabilityOptions::Writer(opts) => {
            lines.push("Write a piece of text that fulfills the task below.".to_string());
            if let Some(tone) = opts.tone {
                lines.push(
                    match tone {
                        WriterTone::Formal => "Use a formal tone.",
                        WriterTone::Neutral => "Use a neutral tone.",
                        WriterTone::Casual => "Use a casual tone.",
                    }
                    .to_string(),
                );
            }
            if let Some(length) = opts.length {
                lines.push(output_length_hint(length).to_string());
            }
            if let Some(format) = opts.format {
                lines.push(output_format_hint(format).to_string());
            }
            if let Some(language) = &opts.output_language {
                lines.push(format!("Respond in the language tagged '{}'.", language));
            }
        }
        CapabilityOptions::Rewriter(opts) => {
            lines.push("Rewrite the following text, preserving its meaning.".to_string());
            match opts.tone {
                Some(RewriteTone::MoreFormal) => lines.push("Make it more formal.".to_string()),
                Some(RewriteTone::MoreCasual) => lines.push("Make it more casual.".to_string()),
                Some(RewriteTone::AsIs) | None => {}
            }
            match opts.length {
                Some(RewriteLength::Shorter) => lines.push("Make it shorter.".to_string()),
                Some(RewriteLength::Longer) => lines.push("Make it longer.".to_string()),
                Some(RewriteLength::AsIs) | None => {}
            }
            match opts.format {
                Some(RewriterFormat::PlainText) => {
                    lines.push(output_format_hint(OutputFormat::PlainText).to_string())
                }
                Some(RewriterFormat::Markdown) => {
                    lines.push(output_format_hint(OutputFormat::Markdown).to_string())
                }
                Some(RewriterFormat::AsIs) | None => {}
            }
            if let Some(language) = &opts.output_language {
                lines.push(format!("Respond in the language tagged '{}'.", language));
            }
        }
        CapabilityOptions::LanguageDetector(opts) => {
            lines.push(
                "Identify the language of the following text. \
                 Reply with only its BCP-47 language tag, nothing else."
                    .to_string(),
            );
            if !opts.expected_input_languages.is_empty() {
                lines.push(format!(
                    "The text is expected to be in one of: {}.",
                    opts.expected_input_languages.join(", ")
                ));
            }
        }
    }

    if let Some(shared) = options.shared_context() {
        lines.push(format!("Background: {}", shared));
    }
    if let Some(context) = context {
        lines.push(format!("Additional context: {}", context));
    }

    lines.push(String::new());
    lines.push(format!("Text:\n{}", input));

    lines.join("\n")
}

fn output_length_hint(length: OutputLength) -> &'static str {
    match length {
        OutputLength::Short => "Keep the output to one or two sentences.",
        OutputLength::Medium => "Keep the output to a short paragraph.",
        OutputLength::Long => "The output may run to several paragraphs.",
    }
}

fn output_format_hint(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Markdown => "Format the output as Markdown.",
        OutputFormat::PlainText => "Use plain text only, with no markup.",
    }
}
