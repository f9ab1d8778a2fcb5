//! MATCHDAY — live soccer scoreboard aggregator.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod odds;
pub mod window;
pub mod feed;
pub mod engine;
pub mod dashboard;
