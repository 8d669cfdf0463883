//! Generative-AI flows.
//!
//! Two prompt flows send structured text to the model and parse structured
//! JSON back: the ad platform recommendation and the live chat summary. The
//! model is reached through the Anthropic Messages API with a forced tool
//! call whose input schema is the flow's output schema.
//!
//! Flows depend on [`GenerativeModel`] rather than the HTTP client so they
//! can run against a scripted model in tests.

mod client;
mod error;
pub mod flows;
pub mod types;

pub use client::ClaudeClient;
pub use error::AiError;
pub use flows::{
    AdPlatformInput, AdPlatformRecommendation, ChatSummary, ChatSummaryInput,
    recommend_ad_platform, summarize_live_chat,
};

use async_trait::async_trait;

use types::Tool;

/// One structured generation: a system prompt, a user message and the tool
/// the model must answer through.
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub system: String,
    pub user: String,
    pub tool: Tool,
}

/// A model that answers a [`StructuredPrompt`] with the tool's input JSON.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// # Errors
    ///
    /// Returns `AiError` if the call fails or the model does not use the tool.
    async fn generate(&self, prompt: StructuredPrompt) -> Result<serde_json::Value, AiError>;
}
