//! Local filtering over a loaded catalog

use crate::schema::{CatalogDocument, CatalogRecord};

/// Filter criteria; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub year: Option<i32>,
    pub document_type: Option<String>,
    pub court: Option<String>,
    /// Case-insensitive substring of the case number or filename
    pub text: Option<String>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    pub fn with_court(mut self, court: impl Into<String>) -> Self {
        self.court = Some(court.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then(|| text.trim().to_lowercase());
        self
    }

    pub fn matches(&self, record: &CatalogRecord) -> bool {
        if self.year.is_some_and(|year| record.year != Some(year)) {
            return false;
        }
        if let Some(kind) = &self.document_type {
            if !record.document_type.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        if let Some(court) = &self.court {
            if !record.court.to_lowercase().contains(&court.to_lowercase()) {
                return false;
            }
        }
        match &self.text {
            Some(text) => {
                record.case_number.to_lowercase().contains(text)
                    || record.filename.to_lowercase().contains(text)
            }
            None => true,
        }
    }
}

impl CatalogDocument {
    /// Records matching `query`, in catalog order
    pub fn search(&self, query: &CatalogQuery) -> Vec<&CatalogRecord> {
        self.records.iter().filter(|r| query.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, year: i32, court: &str, document_type: &str) -> CatalogRecord {
        CatalogRecord {
            id: id.to_string(),
            case_number: format!("{} No. {} of {}", document_type, id, year),
            year: Some(year),
            court: court.to_string(),
            document_type: document_type.to_string(),
            date: None,
            language: None,
            source: "court".to_string(),
            filename: format!("{}_{}.pdf", id, year),
            is_vernacular: None,
        }
    }

    fn catalog() -> CatalogDocument {
        CatalogDocument::from_records(
            vec![
                record("101", 2023, "Supreme Court of India", "Judgment"),
                record("202", 2023, "High Court of Delhi", "Order"),
                record("303", 2021, "Bombay High Court", "Judgment"),
            ],
            Utc::now(),
        )
    }

    fn ids(records: Vec<&CatalogRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert_eq!(catalog().search(&CatalogQuery::new()).len(), 3);
    }

    #[test]
    fn test_filters_combine() {
        let doc = catalog();
        assert_eq!(ids(doc.search(&CatalogQuery::new().with_year(2023))), vec!["101", "202"]);
        assert_eq!(
            ids(doc.search(&CatalogQuery::new().with_year(2023).with_document_type("judgment"))),
            vec!["101"]
        );
        assert_eq!(
            ids(doc.search(&CatalogQuery::new().with_court("high court"))),
            vec!["202", "303"]
        );
    }

    #[test]
    fn test_text_filter() {
        let doc = catalog();
        assert_eq!(ids(doc.search(&CatalogQuery::new().with_text("ORDER NO"))), vec!["202"]);
        assert_eq!(ids(doc.search(&CatalogQuery::new().with_text("303_2021"))), vec!["303"]);
        // blank text is no filter
        assert_eq!(doc.search(&CatalogQuery::new().with_text("   ")).len(), 3);
    }
}
