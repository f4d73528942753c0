//! LLM backend implementations for CropFlow.
//!
//! All backends implement the `cropflow_core::LlmClient` trait. The
//! orchestrator only ever talks to the trait, so any OpenAI-compatible
//! endpoint (OpenAI, OpenRouter, Gemini via proxy, Ollama, vLLM) works.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatClient;
