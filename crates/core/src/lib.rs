//! # CropFlow Core
//!
//! Domain types, traits, and error definitions for the CropFlow advisory
//! orchestrator. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem seam is defined as a trait here: advisory agents
//! ([`AdvisorAgent`]), agent selection ([`Selector`]), and LLM backends
//! ([`LlmClient`]). Implementations live in their respective crates.
//! This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod error;
pub mod llm;
pub mod query;
pub mod report;
pub mod result;
pub mod selection;

// Re-export key types at crate root for ergonomics
pub use agent::{AdvisorAgent, AgentDescriptor, AgentId, AgentRegistry};
pub use error::{AgentError, Error, LlmError, Result, SelectionError};
pub use llm::{LlmClient, LlmRequest, LlmResponse};
pub use query::{Query, QueryContext, ResponseStyle};
pub use report::AgentReport;
pub use result::{AgentInvocationResult, OrchestrationResult};
pub use selection::{SelectionDecision, SelectionSource, Selector};
