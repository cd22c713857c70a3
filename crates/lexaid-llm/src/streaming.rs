//! Streaming response handling
//!
//! Reads provider fragments and hands each one to the caller's sink as it
//! arrives, in provider order, without buffering or coalescing. The
//! cancellation token is checked around every suspension point: once it
//! fires no further fragment reaches the sink and the provider stream is
//! dropped.
//!
//! A rate limit that arrives after a fragment was delivered is reported as
//! a plain failure so the key pool does not replay the answer on another
//! key.

use crate::provider::{FragmentStream, Payload, ProviderError};
use futures_util::StreamExt;
use lexaid_common::{HistoryEntry, Language};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Input of one streaming operation
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub payload: Payload,
    pub language: Language,
    /// Prior turns, oldest first
    pub history: Vec<HistoryEntry>,
    pub cancel: CancellationToken,
}

impl StreamRequest {
    pub fn new(payload: Payload, cancel: CancellationToken) -> Self {
        Self {
            payload,
            language: Language::default(),
            history: Vec::new(),
            cancel,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }
}

/// Await a provider call unless the token fires first
pub async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    if cancel.is_cancelled() {
        return Err(ProviderError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = fut => result,
    }
}

/// Drain `stream` into `sink`, returning the full text.
///
/// Fails with [`ProviderError::Cancelled`] when the token fires, even if
/// the provider still has data.
pub async fn forward_fragments<S>(
    mut stream: FragmentStream,
    sink: &mut S,
    cancel: &CancellationToken,
) -> Result<String, ProviderError>
where
    S: FnMut(&str) + ?Sized,
{
    let mut full_text = String::new();
    let mut fragments = 0usize;

    loop {
        let next = until_cancelled(cancel, async { Ok(stream.next().await) }).await?;
        match next {
            Some(Ok(fragment)) => {
                // The token may have fired while we were suspended
                if cancel.is_cancelled() {
                    debug!("Cancelled after {} fragments", fragments);
                    return Err(ProviderError::Cancelled);
                }
                sink(&fragment);
                full_text.push_str(&fragment);
                fragments += 1;
            }
            Some(Err(ProviderError::RateLimited(detail))) if fragments > 0 => {
                warn!("Rate limited after {} fragments, not retrying", fragments);
                return Err(ProviderError::Other(format!(
                    "rate limited after partial output: {}",
                    detail
                )));
            }
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }

    debug!("Stream finished: {} fragments, {} chars", fragments, full_text.len());
    Ok(full_text)
}

/// Drain `stream` without a sink
pub async fn collect_fragments(
    stream: FragmentStream,
    cancel: &CancellationToken,
) -> Result<String, ProviderError> {
    forward_fragments(stream, &mut |_: &str| {}, cancel).await
}
