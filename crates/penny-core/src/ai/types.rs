//! Completion request types
//!
//! These types are backend-agnostic and used across all implementations.

/// Temperature used for assistant replies
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens per reply
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Generation parameters sent with every completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}
