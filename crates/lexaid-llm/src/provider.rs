//! Inference provider capability
//!
//! Everything the operations need from a text/vision model: a single-shot
//! call, a streamed call, and a streamed multi-turn conversation. Vendor
//! errors are normalised here into [`ProviderError`] so nothing above this
//! layer inspects raw error text.

use async_trait::async_trait;
use futures_util::Stream;
use lexaid_common::{ApiKey, HistoryEntry};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

/// Incremental text fragments of one response, in provider order
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Normalised provider failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Quota or rate limit hit for the key that made the call
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The call was abandoned because the caller cancelled
    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Classify a vendor failure by HTTP status and message text
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == Some(429) || message.contains("429") || message.contains("RESOURCE_EXHAUSTED") {
            ProviderError::RateLimited(message)
        } else {
            ProviderError::Other(message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

/// Content sent with one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    /// Text instruction with an attached image or document
    Multimodal {
        text: String,
        content: Vec<u8>,
        content_type: String,
    },
}

impl Payload {
    pub fn text(&self) -> &str {
        match self {
            Payload::Text(text) => text,
            Payload::Multimodal { text, .. } => text,
        }
    }
}

/// Vendor safety filter threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// Per-request generation settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    /// Fixed behavioural preamble sent as the system instruction
    pub system: Option<String>,
    pub safety: Option<SafetyThreshold>,
    /// Ask for machine-readable JSON only
    pub json_only: bool,
}

impl GenerationConfig {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_safety(mut self, safety: SafetyThreshold) -> Self {
        self.safety = Some(safety);
        self
    }

    pub fn json_only(mut self) -> Self {
        self.json_only = true;
        self
    }
}

/// A multi-turn exchange seeded with prior history
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub history: Vec<HistoryEntry>,
    pub config: GenerationConfig,
}

/// A text/vision model reachable with an API key
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Generate a complete response in one call
    async fn generate_once(
        &self,
        key: &ApiKey,
        payload: &Payload,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError>;

    /// Generate a response as a stream of fragments
    async fn generate_stream(
        &self,
        key: &ApiKey,
        payload: &Payload,
        config: &GenerationConfig,
    ) -> Result<FragmentStream, ProviderError>;

    /// Start a conversation. History is kept as given.
    fn open_conversation(&self, history: &[HistoryEntry], config: &GenerationConfig) -> Conversation {
        Conversation {
            history: history.to_vec(),
            config: config.clone(),
        }
    }

    /// Send the next user message of a conversation and stream the reply
    async fn send_turn(
        &self,
        key: &ApiKey,
        conversation: &Conversation,
        message: &str,
    ) -> Result<FragmentStream, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limits() {
        assert!(ProviderError::classify(Some(429), "Too Many Requests").is_rate_limited());
        assert!(ProviderError::classify(None, "status 429 from upstream").is_rate_limited());
        assert!(ProviderError::classify(None, "RESOURCE_EXHAUSTED: quota").is_rate_limited());
        assert_eq!(
            ProviderError::classify(Some(500), "internal"),
            ProviderError::Other("internal".to_string())
        );
    }

    #[test]
    fn test_generation_config_builder() {
        let config = GenerationConfig::default()
            .with_temperature(0.2)
            .with_system("be brief")
            .json_only();
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.system.as_deref(), Some("be brief"));
        assert!(config.json_only);
        assert!(config.safety.is_none());
    }

    #[test]
    fn test_payload_text() {
        let payload = Payload::Multimodal {
            text: "read this".into(),
            content: vec![1, 2, 3],
            content_type: "image/png".into(),
        };
        assert_eq!(payload.text(), "read this");
    }
}
