//! Terminal rendering for structured results

use colored::*;
use lexaid_catalog::{CatalogDocument, CatalogRecord};
use lexaid_common::LexError;
use lexaid_llm::{FlowchartResult, StructuredAnalysis};

/// The one line a user sees when an operation fails
pub fn failure_message(err: &LexError) -> &'static str {
    if err.is_cancelled() {
        "stopped by user"
    } else if err.is_rate_limited() {
        "rate limited, try later"
    } else {
        "failed, retry"
    }
}

pub const NO_STRUCTURED_DATA: &str = "no structured data extracted";

fn heading(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
}

pub fn print_flowchart(result: &FlowchartResult) {
    heading("Diagram");
    println!("{}", result.diagram);
    if !result.explanation.is_empty() {
        heading("Explanation");
        println!("{}", result.explanation);
    }
}

pub fn print_analysis(analysis: &StructuredAnalysis) {
    if !analysis.tags.is_empty() {
        let tags: Vec<String> = analysis
            .tags
            .iter()
            .map(|t| format!("#{}", t).bright_magenta().to_string())
            .collect();
        println!("{}", tags.join(" "));
    }

    let facts = [
        ("Court", &analysis.court),
        ("Date", &analysis.date),
        ("Case type", &analysis.case_type),
        ("Petitioner", &analysis.parties.petitioner),
        ("Respondent", &analysis.parties.respondent),
        ("Outcome", &analysis.outcome),
    ];
    for (label, value) in facts.iter().filter(|(_, v)| !v.is_empty()) {
        println!("{} {}", format!("{}:", label).bright_yellow(), value);
    }
    if !analysis.judges.is_empty() {
        println!("{} {}", "Judges:".bright_yellow(), analysis.judges.join(", "));
    }

    if !analysis.summary.is_empty() {
        heading("Summary");
        println!("{}", analysis.summary);
    }

    if !analysis.timeline.is_empty() {
        heading("Timeline");
        for step in &analysis.timeline {
            println!(
                "{}. {} - {}",
                step.step.to_string().bright_yellow(),
                step.stage.bright_green(),
                step.description
            );
        }
    }

    if !analysis.statutes.is_empty() {
        heading("Statutes");
        for statute in &analysis.statutes {
            println!(
                "• {} {}: {}",
                statute.section.bright_green(),
                statute.act,
                statute.explanation
            );
        }
    }

    if !analysis.cited_cases.is_empty() {
        heading("Cited cases");
        for case in &analysis.cited_cases {
            println!(
                "• {} ({}): {}",
                case.name.bright_green(),
                case.citation,
                case.relevance
            );
        }
    }
}

pub fn print_record(record: &CatalogRecord) {
    println!(
        "{} {} {}",
        record.id.bright_blue(),
        record.case_number.bright_green().bold(),
        format!("[{}]", record.snippet()).white()
    );
}

pub fn print_catalog_summary(document: &CatalogDocument) {
    let years: Vec<String> = document.years.iter().map(|y| y.to_string()).collect();
    println!(
        "{} {} records, generated {}",
        "Catalog:".bright_cyan().bold(),
        document.total_records,
        document.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("{} {}", "Years:".bright_yellow(), years.join(", "));
    println!(
        "{} {}",
        "Types:".bright_yellow(),
        document.document_types.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(failure_message(&LexError::Cancelled), "stopped by user");
        assert_eq!(
            failure_message(&LexError::CredentialsExhausted { attempts: 3 }),
            "rate limited, try later"
        );
        assert_eq!(
            failure_message(&LexError::Provider("boom".into())),
            "failed, retry"
        );
        assert_eq!(
            failure_message(&LexError::Config("no keys".into())),
            "failed, retry"
        );
    }
}
