//! Catalog document format

use chrono::{DateTime, Utc};
use lexaid_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// One judgment or order known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Unique id derived from the filename
    pub id: String,
    pub case_number: String,
    pub year: Option<i32>,
    pub court: String,
    pub document_type: String,
    /// ISO `YYYY-MM-DD`
    pub date: Option<String>,
    pub language: Option<String>,
    /// Which naming convention produced the record
    pub source: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vernacular: Option<bool>,
}

impl CatalogRecord {
    /// One-line description used when ranking records by relevance
    pub fn snippet(&self) -> String {
        let when = match (&self.date, self.year) {
            (Some(date), _) => date.clone(),
            (None, Some(year)) => year.to_string(),
            (None, None) => "undated".to_string(),
        };
        format!(
            "{} | {} | {} | {}",
            self.case_number, self.court, self.document_type, when
        )
    }
}

/// The whole catalog as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    /// Distinct years, newest first
    pub years: Vec<i32>,
    /// Distinct document types, alphabetical
    pub document_types: Vec<String>,
    pub records: Vec<CatalogRecord>,
}

impl CatalogDocument {
    /// Wrap already sorted records, deriving the summary fields
    pub fn from_records(records: Vec<CatalogRecord>, generated_at: DateTime<Utc>) -> Self {
        let years: BTreeSet<i32> = records.iter().filter_map(|r| r.year).collect();
        let document_types: BTreeSet<String> =
            records.iter().map(|r| r.document_type.clone()).collect();

        Self {
            generated_at,
            total_records: records.len(),
            years: years.into_iter().rev().collect(),
            document_types: document_types.into_iter().collect(),
            records,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let document: Self = serde_json::from_str(&raw)?;
        info!("Loaded catalog with {} records from {:?}", document.total_records, path);
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Wrote catalog with {} records to {:?}", self.total_records, path);
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&CatalogRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}
