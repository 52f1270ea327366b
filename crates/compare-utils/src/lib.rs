//! Shared utilities for stock-compare
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and small helpers for reading configuration from the
//! environment.

pub mod config;
pub mod logging;

pub use config::{env_flag, env_parse, env_string, lookup_parse, lookup_string};
pub use logging::{init_tracing, LogFormat};
