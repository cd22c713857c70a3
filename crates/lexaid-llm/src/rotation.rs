//! API key rotation
//!
//! A [`CredentialPool`] owns the ordered key list and a cursor shared by
//! every call made through it. A rate-limited attempt moves the cursor to
//! the next key and retries, at most once per key per call. The cursor is
//! sticky: a successful key stays current for the next call.
//!
//! Concurrent calls share the cursor, so one call's rotation can move the
//! key out from under another. The pool models the budget of the whole
//! process, not of a single call.
//!
//! Only failures before any output reached the caller rotate. A stream
//! cut off by a rate limit midway is reported as a plain failure instead,
//! so a sink never sees the same prefix twice.

use crate::provider::ProviderError;
use lexaid_common::{ApiKey, LexConfig, LexError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub struct CredentialPool {
    keys: Vec<ApiKey>,
    cursor: AtomicUsize,
    rotation_delay: Duration,
}

impl CredentialPool {
    pub fn new(keys: Vec<ApiKey>) -> Self {
        Self {
            keys,
            cursor: AtomicUsize::new(0),
            rotation_delay: Duration::from_millis(lexaid_common::DEFAULT_ROTATION_DELAY_MS),
        }
    }

    pub fn from_config(config: &LexConfig) -> Self {
        Self::new(config.credentials())
            .with_rotation_delay(Duration::from_millis(config.provider.rotation_delay_ms))
    }

    pub fn with_rotation_delay(mut self, delay: Duration) -> Self {
        self.rotation_delay = delay;
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the key the next attempt will use
    pub fn current_index(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<ApiKey> {
        self.keys.get(self.current_index()).cloned()
    }

    /// Move the cursor to the next key, wrapping after the last one
    fn advance(&self) -> usize {
        let len = self.keys.len().max(1);
        let previous = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| Some((i + 1) % len))
            .unwrap_or_default();
        (previous + 1) % len
    }

    /// Run `op` with the current key, rotating on rate limits.
    ///
    /// Cancellation and any other failure are returned at once. After one
    /// rate-limited attempt per key the call fails with
    /// [`LexError::CredentialsExhausted`].
    pub async fn execute<T, F>(&self, mut op: F) -> Result<T, LexError>
    where
        F: AsyncFnMut(ApiKey) -> Result<T, ProviderError>,
    {
        if self.keys.is_empty() {
            return Err(LexError::Config(
                "No API keys configured. Set LEXAID_API_KEYS or GEMINI_API_KEY.".to_string(),
            ));
        }

        let mut attempts = 0usize;
        loop {
            let Some(key) = self.current() else {
                return Err(LexError::Config("Key cursor out of range".to_string()));
            };
            attempts += 1;
            debug!("Attempt {} with key #{} ({})", attempts, self.current_index(), key);

            match op(key).await {
                Ok(value) => return Ok(value),
                Err(ProviderError::Cancelled) => return Err(LexError::Cancelled),
                Err(ProviderError::Other(detail)) => return Err(LexError::Provider(detail)),
                Err(ProviderError::RateLimited(detail)) => {
                    if attempts >= self.keys.len() {
                        warn!("All {} API keys rate limited: {}", attempts, detail);
                        return Err(LexError::CredentialsExhausted { attempts });
                    }
                    let next = self.advance();
                    warn!("Key rate limited, switching to key #{}: {}", next, detail);
                    tokio::time::sleep(self.rotation_delay).await;
                }
            }
        }
    }
}
