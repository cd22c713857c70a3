//! Legal-assistance operations
//!
//! Each operation builds its prompt, runs one provider call through the
//! key pool and either forwards fragments to a sink as they arrive or
//! accumulates the text and parses it. Cancellation surfaces as
//! [`lexaid_common::LexError::Cancelled`], exhausted keys as
//! [`lexaid_common::LexError::CredentialsExhausted`], anything else as the provider's
//! own error. Only [`LegalAssistant::semantic_search`] swallows failures.

use crate::analysis::{FlowchartResult, StructuredAnalysis};
use crate::postprocess::{parse_ranked_ids, parse_structured_analysis, split_flowchart};
use crate::prompts::{self, build_prompt};
use crate::provider::{GenerationConfig, InferenceProvider, Payload, SafetyThreshold};
use crate::rotation::CredentialPool;
use crate::streaming::{StreamRequest, forward_fragments, until_cancelled};
use lexaid_common::{Language, Result, generate_short_id};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

/// Temperature for answers that must follow a strict format
const STRICT_TEMPERATURE: f64 = 0.2;

/// A document the semantic search may rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub id: String,
    pub snippet: String,
}

impl SearchCandidate {
    pub fn new(id: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            snippet: snippet.into(),
        }
    }
}

/// Entry point for every model-backed feature
pub struct LegalAssistant {
    provider: Arc<dyn InferenceProvider>,
    pool: Arc<CredentialPool>,
    temperature: f64,
}

impl LegalAssistant {
    pub fn new(provider: Arc<dyn InferenceProvider>, pool: Arc<CredentialPool>) -> Self {
        Self {
            provider,
            pool,
            temperature: lexaid_common::DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    fn free_form(&self) -> GenerationConfig {
        GenerationConfig::default().with_temperature(self.temperature)
    }

    /// One streamed call through the key pool
    async fn stream_payload<S>(
        &self,
        operation: &'static str,
        payload: Payload,
        config: GenerationConfig,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let span = info_span!("operation", op = operation, id = %generate_short_id());
        async {
            info!("Starting streamed {}", operation);
            let text = self
                .pool
                .execute(async |key| {
                    let stream = until_cancelled(
                        cancel,
                        self.provider.generate_stream(&key, &payload, &config),
                    )
                    .await?;
                    forward_fragments(stream, &mut *sink, cancel).await
                })
                .await?;
            debug!("{} produced {} chars", operation, text.len());
            Ok(text)
        }
        .instrument(span)
        .await
    }

    /// One single-shot call through the key pool
    async fn generate_payload(
        &self,
        operation: &'static str,
        payload: Payload,
        config: GenerationConfig,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let span = info_span!("operation", op = operation, id = %generate_short_id());
        async {
            info!("Starting {}", operation);
            self.pool
                .execute(async |key| {
                    until_cancelled(cancel, self.provider.generate_once(&key, &payload, &config))
                        .await
                })
                .await
        }
        .instrument(span)
        .await
    }

    /// Chat turn against the static legal preamble, seeded with prior turns.
    ///
    /// A multimodal payload is sent as a single streamed request; the
    /// history only applies to text turns.
    pub async fn chat<S>(&self, request: &StreamRequest, sink: &mut S) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let config = self
            .free_form()
            .with_system(prompts::LEGAL_ASSISTANT_PREAMBLE)
            .with_safety(SafetyThreshold::BlockMediumAndAbove);
        let message = match prompts::language_directive(&request.language) {
            Some(directive) => format!("{}\n\n{}", directive, request.payload.text()),
            None => request.payload.text().to_string(),
        };

        if let Payload::Multimodal {
            content,
            content_type,
            ..
        } = &request.payload
        {
            let payload = Payload::Multimodal {
                text: message,
                content: content.clone(),
                content_type: content_type.clone(),
            };
            return self
                .stream_payload("chat", payload, config, sink, &request.cancel)
                .await;
        }

        let conversation = self.provider.open_conversation(&request.history, &config);
        let cancel = &request.cancel;
        let span = info_span!("operation", op = "chat", id = %generate_short_id());
        async {
            info!("Chat turn with {} prior messages", request.history.len());
            self.pool
                .execute(async |key| {
                    let stream =
                        until_cancelled(cancel, self.provider.send_turn(&key, &conversation, &message))
                            .await?;
                    forward_fragments(stream, &mut *sink, cancel).await
                })
                .await
        }
        .instrument(span)
        .await
    }

    /// Analyse an uploaded document; the answer is returned whole
    pub async fn analyze_document(
        &self,
        content: &[u8],
        content_type: &str,
        instruction: &str,
        language: &Language,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let input = if instruction.trim().is_empty() {
            String::new()
        } else {
            format!("User request: {}", instruction.trim())
        };
        let payload = Payload::Multimodal {
            text: build_prompt(prompts::DOCUMENT_ANALYSIS, &input, language),
            content: content.to_vec(),
            content_type: content_type.to_string(),
        };
        self.generate_payload("document_analysis", payload, self.free_form(), cancel)
            .await
    }

    /// Read the text in an image and explain it, streamed
    pub async fn explain_image<S>(
        &self,
        image: &[u8],
        content_type: &str,
        question: &str,
        language: &Language,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Multimodal {
            text: build_prompt(prompts::OCR_EXPLAIN, question, language),
            content: image.to_vec(),
            content_type: content_type.to_string(),
        };
        self.stream_payload("ocr_explain", payload, self.free_form(), sink, cancel)
            .await
    }

    pub async fn find_jurisdiction<S>(
        &self,
        details: &str,
        language: &Language,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Text(build_prompt(prompts::JURISDICTION, details, language));
        self.stream_payload("jurisdiction", payload, self.free_form(), sink, cancel)
            .await
    }

    pub async fn action_plan<S>(
        &self,
        situation: &str,
        language: &Language,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Text(build_prompt(prompts::ACTION_PLAN, situation, language));
        self.stream_payload("action_plan", payload, self.free_form(), sink, cancel)
            .await
    }

    /// Rewrite legal text in plain language
    pub async fn simplify<S>(
        &self,
        text: &str,
        language: &Language,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Text(build_prompt(prompts::SIMPLIFY, text, language));
        self.stream_payload("simplify", payload, self.free_form(), sink, cancel)
            .await
    }

    pub async fn analyze_scam<S>(
        &self,
        message: &str,
        language: &Language,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Text(build_prompt(prompts::SCAM_ANALYSIS, message, language));
        // The message under review may itself be abusive
        let config = self.free_form().with_safety(SafetyThreshold::BlockOnlyHigh);
        self.stream_payload("scam_analysis", payload, config, sink, cancel)
            .await
    }

    pub async fn case_study<S>(
        &self,
        topic: &str,
        language: &Language,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Text(build_prompt(prompts::CASE_STUDY, topic, language));
        self.stream_payload("case_study", payload, self.free_form(), sink, cancel)
            .await
    }

    /// Diagram plus explanation for a legal procedure. Not streamed.
    pub async fn generate_flowchart(
        &self,
        description: &str,
        language: &Language,
        cancel: &CancellationToken,
    ) -> Result<FlowchartResult> {
        let payload = Payload::Text(build_prompt(
            &prompts::flowchart_instruction(),
            description,
            language,
        ));
        let config = GenerationConfig::default().with_temperature(STRICT_TEMPERATURE);
        let text = self
            .generate_payload("flowchart", payload, config, cancel)
            .await?;

        let result = split_flowchart(&text);
        if result.explanation.is_empty() {
            warn!("Flowchart response had no explanation marker");
        }
        Ok(result)
    }

    /// Structured analysis of a judgment.
    ///
    /// `progress` receives the raw fragments for activity indication only.
    /// `Ok(None)` means the model answered but not with valid JSON.
    pub async fn analyze_judgment<S>(
        &self,
        judgment: &str,
        language: &Language,
        progress: &mut S,
        cancel: &CancellationToken,
    ) -> Result<Option<StructuredAnalysis>>
    where
        S: FnMut(&str) + ?Sized,
    {
        let payload = Payload::Text(build_prompt(prompts::JUDGMENT_ANALYSIS, judgment, language));
        let config = GenerationConfig::default()
            .with_temperature(STRICT_TEMPERATURE)
            .json_only();
        let text = self
            .stream_payload("judgment_analysis", payload, config, progress, cancel)
            .await?;
        Ok(parse_structured_analysis(&text))
    }

    /// Rank candidate ids by relevance to `query`.
    ///
    /// Best effort: any failure, including a malformed answer, yields an
    /// empty list.
    pub async fn semantic_search(&self, query: &str, candidates: &[SearchCandidate]) -> Vec<String> {
        if query.trim().is_empty() || candidates.is_empty() {
            return Vec::new();
        }

        let prompt = prompts::semantic_search_prompt(
            query,
            candidates
                .iter()
                .map(|c| (c.id.as_str(), c.snippet.as_str())),
        );
        let config = GenerationConfig::default()
            .with_temperature(0.0)
            .json_only();

        // Nothing cancels a background ranking
        let cancel = CancellationToken::new();
        match self
            .generate_payload("semantic_search", Payload::Text(prompt), config, &cancel)
            .await
        {
            Ok(text) => parse_ranked_ids(&text).unwrap_or_default(),
            Err(e) => {
                warn!("Semantic search failed, returning no results: {}", e);
                Vec::new()
            }
        }
    }
}
