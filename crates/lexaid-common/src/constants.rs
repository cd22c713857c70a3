//! Common constants used across Lexaid

/// Delay before retrying with the next key after a rate limit (ms)
pub const DEFAULT_ROTATION_DELAY_MS: u64 = 300;

/// Default sampling temperature for free-form answers
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Language code that needs no response-language directive
pub const DEFAULT_LANGUAGE: &str = "en";

/// Marker separating the diagram from its explanation in flowchart output
pub const EXPLANATION_MARKER: &str = "---EXPLANATION---";

/// Semantic ID search limits
pub mod search {
    /// Maximum number of ids the ranking may return
    pub const MAX_RANKED_IDS: usize = 20;
    /// Snippets are cut to this many characters before prompting
    pub const SNIPPET_CHARS: usize = 200;
}

/// Common model identifiers
pub mod models {
    pub const GEMINI_2_FLASH: &str = "gemini-2.0-flash";
    pub const GEMINI_2_5_FLASH: &str = "gemini-2.5-flash";
    pub const GEMINI_2_5_PRO: &str = "gemini-2.5-pro";
}

/// Environment variables read by the configuration layer
pub mod env {
    /// Comma separated list of API keys
    pub const API_KEYS: &str = "LEXAID_API_KEYS";
    /// First single-key variable; `_2` .. `_9` suffixes are read as well
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const MAX_NUMBERED_KEYS: usize = 9;
    pub const MODEL: &str = "LEXAID_MODEL";
    pub const LANGUAGE: &str = "LEXAID_LANGUAGE";
}
