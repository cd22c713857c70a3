//! Scripted inference provider for driving operations in tests

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use lexaid_common::{ApiKey, HistoryEntry};
use lexaid_llm::{
    Conversation, CredentialPool, FragmentStream, GenerationConfig, InferenceProvider,
    LegalAssistant, Payload, ProviderError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the provider answers calls made with one key
#[derive(Debug, Clone)]
pub enum Script {
    RateLimited,
    Fail(String),
    Fragments(Vec<String>),
    /// Streams the fragments, then fails with a rate limit
    FragmentsThenRateLimited(Vec<String>),
}

impl Script {
    pub fn text(text: &str) -> Self {
        Script::Fragments(vec![text.to_string()])
    }

    pub fn fragments(parts: &[&str]) -> Self {
        Script::Fragments(parts.iter().map(|p| p.to_string()).collect())
    }
}

/// One recorded provider call
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: &'static str,
    pub key: String,
    pub prompt: String,
    pub content_type: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub config: GenerationConfig,
}

#[derive(Default)]
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    pub calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, key: &str, script: Script) -> Self {
        self.scripts.insert(key.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        kind: &'static str,
        key: &ApiKey,
        prompt: &str,
        payload: Option<&Payload>,
        history: &[HistoryEntry],
        config: &GenerationConfig,
    ) {
        let content_type = match payload {
            Some(Payload::Multimodal { content_type, .. }) => Some(content_type.clone()),
            _ => None,
        };
        self.calls.lock().unwrap().push(Call {
            kind,
            key: key.expose().to_string(),
            prompt: prompt.to_string(),
            content_type,
            history: history.to_vec(),
            config: config.clone(),
        });
    }

    fn quota_error() -> ProviderError {
        ProviderError::classify(Some(429), "RESOURCE_EXHAUSTED: quota exceeded")
    }

    fn respond(&self, key: &ApiKey) -> Result<Vec<Result<String, ProviderError>>, ProviderError> {
        match self.scripts.get(key.expose()) {
            Some(Script::RateLimited) => Err(Self::quota_error()),
            Some(Script::Fail(msg)) => Err(ProviderError::Other(msg.clone())),
            Some(Script::Fragments(parts)) => Ok(parts.iter().cloned().map(Ok).collect()),
            Some(Script::FragmentsThenRateLimited(parts)) => Ok(parts
                .iter()
                .cloned()
                .map(Ok)
                .chain(std::iter::once(Err(Self::quota_error())))
                .collect()),
            None => Err(ProviderError::Other(format!("no script for {}", key))),
        }
    }

    fn as_stream(items: Vec<Result<String, ProviderError>>) -> FragmentStream {
        Box::pin(stream::iter(items))
    }
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    async fn generate_once(
        &self,
        key: &ApiKey,
        payload: &Payload,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        self.record("once", key, payload.text(), Some(payload), &[], config);
        self.respond(key)?.into_iter().collect()
    }

    async fn generate_stream(
        &self,
        key: &ApiKey,
        payload: &Payload,
        config: &GenerationConfig,
    ) -> Result<FragmentStream, ProviderError> {
        self.record("stream", key, payload.text(), Some(payload), &[], config);
        Ok(Self::as_stream(self.respond(key)?))
    }

    async fn send_turn(
        &self,
        key: &ApiKey,
        conversation: &Conversation,
        message: &str,
    ) -> Result<FragmentStream, ProviderError> {
        self.record(
            "turn",
            key,
            message,
            None,
            &conversation.history,
            &conversation.config,
        );
        Ok(Self::as_stream(self.respond(key)?))
    }
}

/// Assistant over `provider` with the given keys and no rotation delay
pub fn assistant(provider: Arc<ScriptedProvider>, keys: &[&str]) -> LegalAssistant {
    let pool = CredentialPool::new(keys.iter().map(|k| ApiKey::new(*k)).collect())
        .with_rotation_delay(Duration::ZERO);
    LegalAssistant::new(provider, Arc::new(pool))
}
