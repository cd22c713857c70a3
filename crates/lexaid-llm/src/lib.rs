//! Inference integration and streaming operations for Lexaid
//!
//! This crate wraps an external text/vision model behind the
//! [`InferenceProvider`] capability, spreads calls over a pool of API keys
//! with [`CredentialPool`], and exposes the legal-assistance operations on
//! [`LegalAssistant`].

pub mod analysis;
pub mod genai_provider;
pub mod operations;
pub mod postprocess;
pub mod prompts;
pub mod provider;
pub mod rotation;
pub mod streaming;

// Re-export key types for convenience
pub use analysis::{
    CitedCase, FlowchartResult, Parties, StatuteReference, StructuredAnalysis, TimelineStep,
};
pub use genai_provider::GenaiProvider;
pub use operations::{LegalAssistant, SearchCandidate};
pub use provider::{
    Conversation, FragmentStream, GenerationConfig, InferenceProvider, Payload, ProviderError,
    SafetyThreshold,
};
pub use rotation::CredentialPool;
pub use streaming::StreamRequest;
pub use tokio_util::sync::CancellationToken;
