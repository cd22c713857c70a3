//! `genai` backed inference provider
//!
//! Builds a client bound to the key of each call, converts payloads and
//! history into genai chat requests, and normalises genai errors.

use crate::provider::{
    Conversation, FragmentStream, GenerationConfig, InferenceProvider, Payload, ProviderError,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::StreamExt;
use genai::Client as GenaiClient;
use genai::ModelIden;
use genai::chat::{
    ChatMessage as GenaiChatMessage, ChatOptions, ChatRequest, ChatResponseFormat,
    ChatStreamEvent, ContentPart, MessageContent,
};
use genai::resolver::{AuthData, AuthResolver};
use lexaid_common::{ApiKey, HistoryEntry, Role};
use tracing::debug;

/// Inference provider talking to a hosted model through `genai`
pub struct GenaiProvider {
    /// Model identifier, e.g. "gemini-2.0-flash"
    model: String,
}

impl GenaiProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// A client that authenticates every request with `key`
    fn client_for(&self, key: &ApiKey) -> GenaiClient {
        let secret = key.expose().to_string();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(secret.clone())))
            },
        );

        GenaiClient::builder()
            .with_auth_resolver(auth_resolver)
            .build()
    }

    fn chat_options(config: &GenerationConfig) -> ChatOptions {
        let mut options = ChatOptions::default();
        if let Some(temperature) = config.temperature {
            options = options.with_temperature(temperature);
        }
        if config.json_only {
            options = options.with_response_format(ChatResponseFormat::JsonMode);
        }
        if let Some(safety) = config.safety {
            // genai exposes no per-request safety settings; the vendor default applies
            debug!("Safety threshold {:?} not forwarded by genai adapter", safety);
        }
        options
    }

    fn user_message(payload: &Payload) -> GenaiChatMessage {
        match payload {
            Payload::Text(text) => GenaiChatMessage::user(text.clone()),
            Payload::Multimodal {
                text,
                content,
                content_type,
            } => GenaiChatMessage::user(MessageContent::from_parts(vec![
                ContentPart::from_text(text.clone()),
                ContentPart::from_image_base64(content_type.clone(), BASE64.encode(content)),
            ])),
        }
    }

    fn history_message(entry: &HistoryEntry) -> GenaiChatMessage {
        match entry.role {
            Role::User => GenaiChatMessage::user(entry.text.clone()),
            Role::Assistant => GenaiChatMessage::assistant(entry.text.clone()),
        }
    }

    fn build_request(
        messages: Vec<GenaiChatMessage>,
        config: &GenerationConfig,
    ) -> ChatRequest {
        let mut chat_req = ChatRequest::new(messages);
        if let Some(system) = &config.system {
            chat_req = chat_req.with_system(system.clone());
        }
        chat_req
    }

    async fn open_stream(
        &self,
        key: &ApiKey,
        chat_req: ChatRequest,
        config: &GenerationConfig,
    ) -> Result<FragmentStream, ProviderError> {
        let options = Self::chat_options(config);
        let response = self
            .client_for(key)
            .exec_chat_stream(&self.model, chat_req, Some(&options))
            .await
            .map_err(normalize_error)?;

        let fragments = response.stream.filter_map(|event| async move {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => Some(Ok(chunk.content)),
                Ok(_) => None,
                Err(e) => Some(Err(normalize_error(e))),
            }
        });

        Ok(Box::pin(fragments))
    }
}

/// Text of a single-shot answer, including text carried in content parts
fn response_text(contents: Vec<MessageContent>) -> String {
    let mut text = String::new();
    for content in contents {
        match content {
            MessageContent::Text(t) => text.push_str(&t),
            MessageContent::Parts(parts) => {
                for part in parts {
                    if let ContentPart::Text(t) = part {
                        text.push_str(&t);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

/// Map a genai error onto the closed provider error set
fn normalize_error(err: genai::Error) -> ProviderError {
    // Status codes only surface in the debug rendering of web errors
    let detail = format!("{} ({:?})", err, err);
    match ProviderError::classify(None, detail) {
        ProviderError::RateLimited(_) => ProviderError::RateLimited(err.to_string()),
        _ => ProviderError::Other(format!("GenAI API error: {}", err)),
    }
}

#[async_trait]
impl InferenceProvider for GenaiProvider {
    async fn generate_once(
        &self,
        key: &ApiKey,
        payload: &Payload,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        debug!("Single-shot request to {} with key {}", self.model, key);

        let chat_req = Self::build_request(vec![Self::user_message(payload)], config);
        let options = Self::chat_options(config);

        let response = self
            .client_for(key)
            .exec_chat(&self.model, chat_req, Some(&options))
            .await
            .map_err(normalize_error)?;

        let text = response_text(response.content);

        debug!("Response received: {} chars", text.len());
        Ok(text)
    }

    async fn generate_stream(
        &self,
        key: &ApiKey,
        payload: &Payload,
        config: &GenerationConfig,
    ) -> Result<FragmentStream, ProviderError> {
        debug!("Streaming request to {} with key {}", self.model, key);
        let chat_req = Self::build_request(vec![Self::user_message(payload)], config);
        self.open_stream(key, chat_req, config).await
    }

    async fn send_turn(
        &self,
        key: &ApiKey,
        conversation: &Conversation,
        message: &str,
    ) -> Result<FragmentStream, ProviderError> {
        debug!(
            "Conversation turn with {} prior messages, key {}",
            conversation.history.len(),
            key
        );

        let mut messages: Vec<GenaiChatMessage> = conversation
            .history
            .iter()
            .map(Self::history_message)
            .collect();
        messages.push(GenaiChatMessage::user(message.to_string()));

        let chat_req = Self::build_request(messages, &conversation.config);
        self.open_stream(key, chat_req, &conversation.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_init() {
        let provider = GenaiProvider::new("gemini-2.0-flash");
        assert_eq!(provider.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_response_text_reads_parts() {
        let contents = vec![
            MessageContent::Text("[\"a\", ".to_string()),
            MessageContent::from_parts(vec![
                ContentPart::from_text("\"b\""),
                ContentPart::from_text("]"),
            ]),
        ];
        assert_eq!(response_text(contents), "[\"a\", \"b\"]");
        assert_eq!(response_text(Vec::new()), "");
    }

    #[test]
    fn test_request_carries_system_preamble() {
        let config = GenerationConfig::default().with_system("You are a legal assistant.");
        let chat_req = GenaiProvider::build_request(
            vec![GenaiProvider::user_message(&Payload::Text("hello".into()))],
            &config,
        );
        assert_eq!(chat_req.system.as_deref(), Some("You are a legal assistant."));
        assert_eq!(chat_req.messages.len(), 1);
    }
}
