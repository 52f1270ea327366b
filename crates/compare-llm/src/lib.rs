//! LLM provider abstraction layer for stock-compare
//!
//! This crate provides provider-agnostic types for asking a hosted Large
//! Language Model for commentary:
//!
//! - Message types for chat conversations
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible chat-completions provider (Groq by default)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
