// Library root: re-exports all modules so the CLI, integration tests and
// other consumers can reach the ranking pipeline.

pub mod cache;
pub mod config;
pub mod export;
pub mod names;
pub mod pipeline;
pub mod position;
pub mod valuation;
