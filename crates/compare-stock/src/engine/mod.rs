//! Comparison engine
//!
//! Coordination layer between the fundamentals source, scoring and the LLM.

pub mod comparison_engine;

pub use comparison_engine::ComparisonEngine;
