//! CLI command implementations.

pub mod filter;
pub mod profile;
pub mod report;
pub mod serve;
