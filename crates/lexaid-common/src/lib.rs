//! Lexaid Common - Shared utilities and types
//!
//! This crate provides the error taxonomy, configuration structs, shared
//! request types and the identity capability used across all Lexaid crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::{LexConfig, ProviderConfig};
pub use constants::*;
pub use error::{LexError, Result};
pub use identity::{AuthSession, IdentityError, IdentityProvider, UserIdentity};
pub use types::{ApiKey, HistoryEntry, Language, Role};
pub use utils::*;
