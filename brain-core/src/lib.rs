//! Core of the brain service: an agent loop that alternates between a
//! language model and remote MCP tool servers, the registry that discovers
//! and invokes those tools, and the retry policy shared by every network
//! call.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, retry, tooling};
pub use domain::types;
pub use infrastructure::{metrics, model};
