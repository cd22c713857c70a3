//! Structured results parsed from model output

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Diagram text plus a markdown explanation, split from one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowchartResult {
    /// Graph description (Mermaid), rendered by the client
    pub diagram: String,
    pub explanation: String,
}

/// One stage of how the case moved through the courts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineStep {
    #[serde(deserialize_with = "lenient_step")]
    pub step: u32,
    #[serde(deserialize_with = "lenient_string")]
    pub stage: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatuteReference {
    /// e.g. "Section 302"
    #[serde(deserialize_with = "lenient_string")]
    pub section: String,
    /// e.g. "Indian Penal Code, 1860"
    #[serde(deserialize_with = "lenient_string")]
    pub act: String,
    /// What the provision means in plain English
    #[serde(deserialize_with = "lenient_string")]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CitedCase {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub citation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub relevance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parties {
    #[serde(deserialize_with = "lenient_string")]
    pub petitioner: String,
    #[serde(deserialize_with = "lenient_string")]
    pub respondent: String,
}

/// Analysis of a court judgment.
///
/// Missing or `null` fields default to empty and a step number may come
/// as a string; a response that is not a JSON object
/// yields no analysis at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuredAnalysis {
    /// Exactly three short classification tags are requested
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timeline: Vec<TimelineStep>,
    #[serde(deserialize_with = "null_as_default")]
    pub statutes: Vec<StatuteReference>,
    #[serde(deserialize_with = "null_as_default")]
    pub cited_cases: Vec<CitedCase>,
    #[serde(deserialize_with = "lenient_string")]
    pub court: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub judges: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub parties: Parties,
    #[serde(deserialize_with = "lenient_string")]
    pub outcome: String,
    #[serde(deserialize_with = "lenient_string")]
    pub case_type: String,
}

/// `null` or a missing value becomes the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text field that tolerates `null` and bare numbers or booleans
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Step number given as `1`, `"1"` or `null`
fn lenient_step<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}
