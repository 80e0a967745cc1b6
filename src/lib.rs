//! cypher-mend - Runs Cypher statements and repairs failures with an LLM.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod logging;
pub mod output;
pub mod repair;
pub mod statements;
