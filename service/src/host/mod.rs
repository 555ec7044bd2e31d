//! Host runtime bindings.
//!
//! This module binds the session layer's `CapabilityHost` abstraction to
//! a concrete backend. The only production binding is Ollama; unit tests
//! elsewhere use scripted doubles.

mod ollama;
mod prompt;

pub use ollama::OllamaHost;
