//! CLI command implementations.

pub mod agents;
pub mod ask;
pub mod status;
pub mod workflows;
