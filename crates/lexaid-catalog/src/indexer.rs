//! Filename indexer
//!
//! Derives catalog records from judgment filenames. Conventions are tried
//! in a fixed order and the first match wins:
//!
//! 1. registry: `<diary>_<year>_<n>_<n>_<n>_Judgement_<DD>-<Mon>-<YYYY>[_<LANG>].pdf`
//! 2. neutral citation: `<year>_INSC_<number>[_<lang>].pdf`
//! 3. court prefixed: `<COURT>_<Type>_<number>_<year>[_<YYYY-MM-DD>][_<lang>].pdf`
//!
//! Anything else becomes a raw record carrying only the filename.

use crate::schema::{CatalogDocument, CatalogRecord};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use lexaid_common::{LexError, Result, slugify};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const SUPREME_COURT: &str = "Supreme Court of India";

type RecordBuilder = fn(&Captures<'_>, &str) -> CatalogRecord;

struct Convention {
    name: &'static str,
    pattern: Regex,
    build: RecordBuilder,
}

/// Turns a list of filenames into a [`CatalogDocument`]
pub struct CatalogIndexer {
    conventions: Vec<Convention>,
}

impl CatalogIndexer {
    pub fn new() -> Result<Self> {
        let conventions = vec![
            Convention {
                name: "registry",
                pattern: compile(
                    r"(?i)^(?P<diary>\d+)_(?P<year>\d{4})_\d+_\d+_\d+_(?P<kind>judgement|judgment|order)_(?P<date>\d{2}-[a-z]{3}-\d{4})(?:_(?P<lang>[a-z]{2,3}))?\.pdf$",
                )?,
                build: registry_record,
            },
            Convention {
                name: "neutral",
                pattern: compile(r"(?i)^(?P<year>\d{4})_INSC_(?P<num>\d+)(?:_(?P<lang>[a-z]{2,3}))?\.pdf$")?,
                build: neutral_record,
            },
            Convention {
                name: "court",
                pattern: compile(
                    r"(?i)^(?P<court>[a-z]{2,10})_(?P<kind>[a-z]+)_(?P<num>\d+)_(?P<year>\d{4})(?:_(?P<date>\d{4}-\d{2}-\d{2}))?(?:_(?P<lang>[a-z]{2,3}))?\.pdf$",
                )?,
                build: court_record,
            },
        ];
        Ok(Self { conventions })
    }

    /// Record for one filename, falling back to a raw record
    pub fn parse_filename(&self, filename: &str) -> CatalogRecord {
        for convention in &self.conventions {
            if let Some(caps) = convention.pattern.captures(filename) {
                debug!("{} matched convention {}", filename, convention.name);
                return (convention.build)(&caps, filename);
            }
        }
        debug!("{} matched no convention", filename);
        raw_record(filename)
    }

    pub fn build<I, S>(&self, filenames: I) -> CatalogDocument
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.build_at(filenames, Utc::now())
    }

    /// Parse, de-duplicate by id (first wins) and sort by year, newest first
    pub fn build_at<I, S>(&self, filenames: I, generated_at: DateTime<Utc>) -> CatalogDocument
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut records: Vec<CatalogRecord> = filenames
            .into_iter()
            .map(|name| self.parse_filename(name.as_ref()))
            .filter(|record| seen.insert(record.id.clone()))
            .collect();

        records.sort_by(|a, b| {
            // Records without a year go last
            b.year
                .unwrap_or(i32::MIN)
                .cmp(&a.year.unwrap_or(i32::MIN))
                .then_with(|| a.id.cmp(&b.id))
        });

        CatalogDocument::from_records(records, generated_at)
    }

    /// Index every `.pdf` directly inside `dir`
    pub fn scan_dir(&self, dir: &Path) -> Result<CatalogDocument> {
        let mut filenames = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.to_lowercase().ends_with(".pdf") {
                filenames.push(name);
            }
        }
        filenames.sort();
        info!("Indexing {} PDF files from {:?}", filenames.len(), dir);
        Ok(self.build(filenames))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| LexError::Catalog(format!("bad filename pattern: {}", e)))
}

/// Lowercased language tag and whether it marks a vernacular copy
fn language(caps: &Captures<'_>) -> (Option<String>, Option<bool>) {
    match caps.name("lang").map(|m| m.as_str().to_lowercase()) {
        Some(lang) => {
            let vernacular = (lang != "en" && lang != "eng").then_some(true);
            (Some(lang), vernacular)
        }
        None => (None, None),
    }
}

fn with_language_suffix(id: String, lang: &Option<String>, vernacular: Option<bool>) -> String {
    match (lang, vernacular) {
        (Some(lang), Some(true)) => format!("{}-{}", id, lang),
        _ => id,
    }
}

fn year(caps: &Captures<'_>, group: &str) -> Option<i32> {
    caps.name(group).and_then(|m| m.as_str().parse().ok())
}

fn registry_record(caps: &Captures<'_>, filename: &str) -> CatalogRecord {
    let diary = &caps["diary"];
    let diary_year = &caps["year"];
    let kind = &caps["kind"];
    let date = NaiveDate::parse_from_str(&caps["date"], "%d-%b-%Y").ok();
    let (lang, vernacular) = language(caps);

    let document_type = if kind.eq_ignore_ascii_case("order") {
        "Order"
    } else {
        "Judgment"
    };
    let id = format!(
        "sci-{}-{}-{}-{}",
        diary,
        diary_year,
        document_type.to_lowercase(),
        date.map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_else(|| slugify(&caps["date"]))
    );

    CatalogRecord {
        id: with_language_suffix(id, &lang, vernacular),
        case_number: format!("Diary No. {}/{}", diary, diary_year),
        year: date.map(|d| d.year()).or_else(|| year(caps, "year")),
        court: SUPREME_COURT.to_string(),
        document_type: document_type.to_string(),
        date: date.map(|d| d.format("%Y-%m-%d").to_string()),
        language: lang,
        source: "sci".to_string(),
        filename: filename.to_string(),
        is_vernacular: vernacular,
    }
}

fn neutral_record(caps: &Captures<'_>, filename: &str) -> CatalogRecord {
    let number = match caps["num"].trim_start_matches('0') {
        "" => "0",
        n => n,
    };
    let (lang, vernacular) = language(caps);
    let id = format!("insc-{}-{}", &caps["year"], number);

    CatalogRecord {
        id: with_language_suffix(id, &lang, vernacular),
        case_number: format!("{} INSC {}", &caps["year"], number),
        year: year(caps, "year"),
        court: SUPREME_COURT.to_string(),
        document_type: "Judgment".to_string(),
        date: None,
        language: lang,
        source: "insc".to_string(),
        filename: filename.to_string(),
        is_vernacular: vernacular,
    }
}

fn court_record(caps: &Captures<'_>, filename: &str) -> CatalogRecord {
    let code = caps["court"].to_uppercase();
    let document_type = split_camel_case(&caps["kind"]);
    let number = &caps["num"];
    let case_year = &caps["year"];
    let date = caps
        .name("date")
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok());
    let (lang, vernacular) = language(caps);
    let id = format!(
        "{}-{}-{}-{}",
        code.to_lowercase(),
        slugify(&document_type),
        number,
        case_year
    );

    CatalogRecord {
        id: with_language_suffix(id, &lang, vernacular),
        case_number: format!("{} No. {} of {}", document_type, number, case_year),
        year: year(caps, "year"),
        court: court_name(&code),
        document_type,
        date: date.map(|d| d.format("%Y-%m-%d").to_string()),
        language: lang,
        source: "court".to_string(),
        filename: filename.to_string(),
        is_vernacular: vernacular,
    }
}

fn raw_record(filename: &str) -> CatalogRecord {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());

    CatalogRecord {
        id: format!("raw-{}", slugify(&stem)),
        case_number: stem,
        year: None,
        court: "Unknown".to_string(),
        document_type: "Unknown".to_string(),
        date: None,
        language: None,
        source: "raw".to_string(),
        filename: filename.to_string(),
        is_vernacular: None,
    }
}

fn court_name(code: &str) -> String {
    match code {
        "SC" | "SCI" => SUPREME_COURT,
        "DHC" => "High Court of Delhi",
        "BHC" => "Bombay High Court",
        "MHC" => "Madras High Court",
        "CHC" => "Calcutta High Court",
        "AHC" => "Allahabad High Court",
        "KHC" => "Karnataka High Court",
        "NCDRC" => "National Consumer Disputes Redressal Commission",
        "NGT" => "National Green Tribunal",
        other => other,
    }
    .to_string()
}

/// "CivilAppeal" -> "Civil Appeal", "WRIT" -> "Writ"
fn split_camel_case(s: &str) -> String {
    if s.chars().all(|c| c.is_ascii_uppercase()) || s.chars().all(|c| c.is_ascii_lowercase()) {
        let mut chars = s.chars();
        return match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_lowercase(),
            None => String::new(),
        };
    }

    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexer() -> CatalogIndexer {
        CatalogIndexer::new().unwrap()
    }

    #[test]
    fn test_registry_convention() {
        let r = indexer().parse_filename("12345_2019_3_1501_43210_Judgement_14-May-2023.pdf");
        assert_eq!(r.source, "sci");
        assert_eq!(r.case_number, "Diary No. 12345/2019");
        assert_eq!(r.year, Some(2023));
        assert_eq!(r.date.as_deref(), Some("2023-05-14"));
        assert_eq!(r.document_type, "Judgment");
        assert_eq!(r.id, "sci-12345-2019-judgment-20230514");
        assert_eq!(r.is_vernacular, None);
    }

    #[test]
    fn test_registry_vernacular_copy() {
        let r = indexer().parse_filename("12345_2019_3_1501_43210_Judgement_14-May-2023_HIN.pdf");
        assert_eq!(r.language.as_deref(), Some("hin"));
        assert_eq!(r.is_vernacular, Some(true));
        assert_eq!(r.id, "sci-12345-2019-judgment-20230514-hin");
    }

    #[test]
    fn test_neutral_citation() {
        let r = indexer().parse_filename("2023_INSC_0512.pdf");
        assert_eq!(r.id, "insc-2023-512");
        assert_eq!(r.case_number, "2023 INSC 512");
        assert_eq!(r.year, Some(2023));
        assert_eq!(r.court, SUPREME_COURT);
    }

    #[test]
    fn test_court_prefixed() {
        let r = indexer().parse_filename("DHC_CivilAppeal_118_2020_2021-02-03_en.pdf");
        assert_eq!(r.court, "High Court of Delhi");
        assert_eq!(r.document_type, "Civil Appeal");
        assert_eq!(r.case_number, "Civil Appeal No. 118 of 2020");
        assert_eq!(r.date.as_deref(), Some("2021-02-03"));
        assert_eq!(r.language.as_deref(), Some("en"));
        assert_eq!(r.is_vernacular, None);
        assert_eq!(r.id, "dhc-civil-appeal-118-2020");
    }

    #[test]
    fn test_unknown_court_code_kept() {
        let r = indexer().parse_filename("XYZ_WRIT_5_2018.pdf");
        assert_eq!(r.court, "XYZ");
        assert_eq!(r.document_type, "Writ");
    }

    #[test]
    fn test_raw_fallback() {
        let r = indexer().parse_filename("Some Judgment (final).pdf");
        assert_eq!(r.source, "raw");
        assert_eq!(r.id, "raw-some-judgment-final");
        assert_eq!(r.case_number, "Some Judgment (final)");
        assert_eq!(r.year, None);
    }

    #[test]
    fn test_build_dedups_and_sorts() {
        let doc = indexer().build(vec![
            "2019_INSC_10.pdf",
            "notes.pdf",
            "2023_INSC_5.pdf",
            "2019_INSC_010.pdf",
            "SC_CriminalAppeal_7_2021.pdf",
        ]);

        let ids: Vec<&str> = doc.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["insc-2023-5", "sc-criminal-appeal-7-2021", "insc-2019-10", "raw-notes"]
        );
        assert_eq!(doc.total_records, 4);
        assert_eq!(doc.years, vec![2023, 2021, 2019]);
        // first occurrence wins
        assert_eq!(doc.find("insc-2019-10").unwrap().filename, "2019_INSC_10.pdf");
    }

    #[test]
    fn test_scan_dir_only_reads_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2022_INSC_1.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("2022_INSC_2.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let doc = indexer().scan_dir(dir.path()).unwrap();
        assert_eq!(doc.total_records, 2);
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("CivilAppeal"), "Civil Appeal");
        assert_eq!(split_camel_case("WRIT"), "Writ");
        assert_eq!(split_camel_case("slp"), "Slp");
    }
}
