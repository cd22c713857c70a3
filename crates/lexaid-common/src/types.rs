//! Common types used across Lexaid components

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque API key. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for handing to the provider SDK only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Last four characters, enough to tell keys apart in logs
    pub fn fingerprint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("…{}", tail)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.fingerprint())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fingerprint())
    }
}

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One prior turn. History is passed through as given; alternation of
/// roles is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Target response language, stored as a lowercase ISO code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language(String);

impl Language {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// True for the language that needs no directive
    pub fn is_default(&self) -> bool {
        self.0.is_empty() || self.0 == crate::constants::DEFAULT_LANGUAGE
    }

    /// Human readable name, falling back to the code itself
    pub fn display_name(&self) -> &str {
        match self.0.as_str() {
            "en" => "English",
            "hi" => "Hindi",
            "bn" => "Bengali",
            "ta" => "Tamil",
            "te" => "Telugu",
            "mr" => "Marathi",
            "gu" => "Gujarati",
            "kn" => "Kannada",
            "ml" => "Malayalam",
            "pa" => "Punjabi",
            "ur" => "Urdu",
            "or" => "Odia",
            "as" => "Assamese",
            other => other,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_LANGUAGE)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("AIzaSySecretValue1234");
        assert_eq!(format!("{:?}", key), "ApiKey(…1234)");
        assert!(!key.to_string().contains("Secret"));
        assert_eq!(key.expose(), "AIzaSySecretValue1234");
    }

    #[test]
    fn test_short_key_fingerprint() {
        assert_eq!(ApiKey::new("ab").fingerprint(), "…ab");
    }

    #[test]
    fn test_language() {
        assert!(Language::new("EN ").is_default());
        assert!(Language::new("").is_default());
        assert!(!Language::new("hi").is_default());
        assert_eq!(Language::new("ta").display_name(), "Tamil");
        assert_eq!(Language::new("xx").display_name(), "xx");
    }

    #[test]
    fn test_history_roles_serialize_lowercase() {
        let json = serde_json::to_string(&HistoryEntry::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","text":"hi"}"#);
    }
}
