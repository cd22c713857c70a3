//! Prompt templates
//!
//! Every operation concatenates a fixed instruction with the caller's text.
//! A non-default language adds a directive in front that keeps diagram
//! node ids, section numbers and case citations untranslated.

use lexaid_common::search::SNIPPET_CHARS;
use lexaid_common::{EXPLANATION_MARKER, Language, truncate_chars};

/// System instruction for the chat assistant
pub const LEGAL_ASSISTANT_PREAMBLE: &str = "You are Lexaid, a legal information assistant for Indian law. \
Answer clearly in markdown. Cite the relevant statute (for example the Bharatiya Nyaya Sanhita, \
the Indian Penal Code, the Code of Criminal Procedure, the Consumer Protection Act or the \
Constitution of India) and the section number wherever it applies. Explain legal terms in plain \
language. You provide legal information, not legal advice: when a matter needs a lawyer, say so \
and suggest free legal aid through the District Legal Services Authority.";

pub const DOCUMENT_ANALYSIS: &str = "Analyse the attached legal document. Identify the type of \
document, the parties, the key obligations and deadlines, any clauses that are unusual or unfair, \
and what the reader should do next. Use markdown headings.";

pub const OCR_EXPLAIN: &str = "Read all text in the attached image exactly as written, then explain \
what it means legally in simple terms. Structure the answer as: '## Extracted text', \
'## What this means', '## What you should do'.";

pub const JURISDICTION: &str = "Determine which court, tribunal, commission or authority has \
jurisdiction over the matter below. Consider subject matter, territorial and pecuniary \
jurisdiction. Name the forum, explain why, list the documents needed to file, any limitation \
period, and the approximate court fee.";

pub const ACTION_PLAN: &str = "Create a step-by-step legal action plan for the situation below. \
Number each step, say who to approach, what documents to prepare, which law applies and the \
typical time each step takes. End with a short checklist.";

pub const SIMPLIFY: &str = "Rewrite the following legal text in plain language that a person with \
no legal training can understand. Keep every obligation, right and deadline. Explain any Latin or \
technical term the first time it appears.";

pub const SCAM_ANALYSIS: &str = "Analyse the message below for signs of fraud or a scam. Give a \
risk level (Low, Medium, High), list the red flags you found, explain the likely scheme, and tell \
the reader what to do now, including how to report it on the National Cyber Crime Reporting \
Portal (cybercrime.gov.in) or helpline 1930.";

pub const CASE_STUDY: &str = "Write an educational case study on the topic below for a law \
student. Include: background facts, legal issues, relevant statutes with section numbers, \
arguments on both sides, the court's reasoning, the outcome, and three discussion questions.";

/// Flowchart prompt; the answer is the diagram, the marker, then prose
pub fn flowchart_instruction() -> String {
    format!(
        "Create a Mermaid flowchart (graph TD) of the legal procedure described below. \
Output ONLY the Mermaid code first, without code fences. Use short node ids such as A, B, C and \
put readable labels in square brackets. Then output a line containing exactly {} followed by a \
markdown explanation of every step.",
        EXPLANATION_MARKER
    )
}

pub const JUDGMENT_ANALYSIS: &str = "Analyse the court judgment below and return ONLY a JSON object, \
with no markdown and no commentary, in exactly this shape:
{
  \"tags\": [\"three\", \"short\", \"tags\"],
  \"summary\": \"narrative summary of the case\",
  \"timeline\": [{\"step\": 1, \"stage\": \"stage name\", \"description\": \"what happened\"}],
  \"statutes\": [{\"section\": \"Section 302\", \"act\": \"Indian Penal Code, 1860\", \"explanation\": \"plain English meaning\"}],
  \"citedCases\": [{\"name\": \"case name\", \"citation\": \"citation\", \"relevance\": \"why it was cited\"}],
  \"court\": \"court name\",
  \"date\": \"YYYY-MM-DD\",
  \"judges\": [\"judge name\"],
  \"parties\": {\"petitioner\": \"name\", \"respondent\": \"name\"},
  \"outcome\": \"one line outcome\",
  \"caseType\": \"Civil, Criminal, Constitutional, ...\"
}";

/// Directive placed before the prompt for a non-default language
pub fn language_directive(language: &Language) -> Option<String> {
    if language.is_default() {
        return None;
    }
    Some(format!(
        "Respond entirely in {}. Keep Mermaid node ids, section numbers, act names and case \
citations exactly as in the original; translate only the surrounding text.",
        language.display_name()
    ))
}

/// Compose instruction, caller input and the optional language directive
pub fn build_prompt(instruction: &str, input: &str, language: &Language) -> String {
    let body = format!("{}\n\n{}", instruction, input.trim());
    match language_directive(language) {
        Some(directive) => format!("{}\n\n{}", directive, body),
        None => body,
    }
}

/// Ranking prompt over `(id, snippet)` candidates
pub fn semantic_search_prompt<'a, I>(query: &str, candidates: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let listing: Vec<String> = candidates
        .into_iter()
        .map(|(id, snippet)| format!("[{}] {}", id, truncate_chars(snippet.trim(), SNIPPET_CHARS)))
        .collect();

    format!(
        "You rank legal documents by relevance to a search query.\n\
Query: {}\n\n\
Documents:\n{}\n\n\
Return ONLY a JSON array of the ids of the relevant documents, most relevant first, \
with between 0 and 20 entries. Example: [\"id1\", \"id2\"]",
        query.trim(),
        listing.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_has_no_directive() {
        let prompt = build_prompt(SIMPLIFY, "  The lessee shall indemnify.  ", &Language::default());
        assert!(prompt.starts_with(SIMPLIFY));
        assert!(prompt.ends_with("The lessee shall indemnify."));
    }

    #[test]
    fn test_directive_is_prepended() {
        let prompt = build_prompt(ACTION_PLAN, "My landlord kept my deposit", &Language::new("hi"));
        assert!(prompt.starts_with("Respond entirely in Hindi."));
        assert!(prompt.contains("case citations exactly"));
        assert!(prompt.ends_with("My landlord kept my deposit"));
    }

    #[test]
    fn test_flowchart_instruction_names_marker() {
        assert!(flowchart_instruction().contains("---EXPLANATION---"));
    }

    #[test]
    fn test_semantic_search_prompt_truncates_snippets() {
        let long = "x".repeat(500);
        let prompt = semantic_search_prompt("bail", vec![("c1", long.as_str()), ("c2", "short")]);
        assert!(prompt.contains("Query: bail"));
        assert!(prompt.contains(&format!("[c1] {}…", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));
        assert!(prompt.contains("[c2] short"));
    }
}
