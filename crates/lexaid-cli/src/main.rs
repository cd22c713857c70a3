mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use lexaid_catalog::{CatalogDocument, CatalogIndexer, CatalogQuery};
use lexaid_common::{HistoryEntry, Language, LexConfig, LexError};
use lexaid_llm::{
    CancellationToken, CredentialPool, GenaiProvider, LegalAssistant, Payload, SearchCandidate,
    StreamRequest,
};
use std::future::Future;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for the Lexaid CLI
#[derive(Parser)]
#[command(name = "lexaid", about = "Lexaid - legal information assistant for Indian law")]
pub struct Args {
    /// Path to a TOML config file
    #[clap(short, long, default_value = "lexaid.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    /// Model to use, overrides the config file
    #[clap(long)]
    model: Option<String>,

    /// Response language code, e.g. hi, ta, bn
    #[clap(short, long)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Free text given inline, from a file, or on stdin
#[derive(clap::Args)]
struct TextInput {
    /// Text to send; read from stdin when empty
    text: Vec<String>,

    /// Read the text from a file instead
    #[clap(short, long)]
    file: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CatalogFilter {
    #[clap(long)]
    year: Option<i32>,

    /// Document type, e.g. Judgment or Order
    #[clap(long = "type")]
    document_type: Option<String>,

    /// Part of the court name
    #[clap(long)]
    court: Option<String>,
}

impl CatalogFilter {
    fn query(&self) -> CatalogQuery {
        let mut query = CatalogQuery::new();
        if let Some(year) = self.year {
            query = query.with_year(year);
        }
        if let Some(kind) = &self.document_type {
            query = query.with_document_type(kind.clone());
        }
        if let Some(court) = &self.court {
            query = query.with_court(court.clone());
        }
        query
    }
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the assistant; interactive when no message is given
    Chat {
        message: Vec<String>,

        /// Attach an image to the message
        #[clap(long)]
        image: Option<PathBuf>,
    },
    /// Rewrite legal text in plain language
    Simplify(TextInput),
    /// Find the court or authority that hears a matter
    Jurisdiction(TextInput),
    /// Step-by-step plan for a legal problem
    ActionPlan(TextInput),
    /// Check a message for signs of fraud
    Scam(TextInput),
    /// Educational case study on a topic
    CaseStudy(TextInput),
    /// Flowchart of a legal procedure
    Flowchart(TextInput),
    /// Structured analysis of a judgment
    Judgment {
        #[command(flatten)]
        input: TextInput,

        /// Print the analysis as JSON
        #[clap(long)]
        json: bool,
    },
    /// Analyse a legal document (PDF or image)
    Analyze {
        path: PathBuf,

        /// What you want to know about the document
        #[clap(short, long, default_value = "")]
        prompt: String,
    },
    /// Read the text in an image and explain it
    Ocr {
        path: PathBuf,

        /// Question about the image
        question: Vec<String>,
    },
    /// Rank catalog records by relevance to a query
    Search {
        query: Vec<String>,

        #[clap(long, default_value = "catalog.json")]
        catalog: PathBuf,

        #[command(flatten)]
        filter: CatalogFilter,
    },
    /// Build the case catalog from a directory of judgment PDFs
    Index {
        dir: PathBuf,

        #[clap(short, long, default_value = "catalog.json")]
        out: PathBuf,
    },
    /// Browse the case catalog
    Catalog {
        #[clap(long, default_value = "catalog.json")]
        catalog: PathBuf,

        /// Show a single record
        #[clap(long)]
        id: Option<String>,

        /// Substring of the case number or filename
        #[clap(long)]
        text: Option<String>,

        #[command(flatten)]
        filter: CatalogFilter,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(input: &TextInput) -> Result<String> {
    if let Some(path) = &input.file {
        return std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path));
    }
    if !input.text.is_empty() {
        return Ok(input.text.join(" "));
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Streams fragments straight to stdout
fn stdout_sink(fragment: &str) {
    print!("{}", fragment);
    let _ = io::stdout().flush();
}

/// Run `fut`, cancelling `cancel` if Ctrl-C arrives first
async fn interruptible<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> T {
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let output = fut.await;
    watcher.abort();
    output
}

/// Print the failure line; `None` when the operation failed
fn finish<T>(result: std::result::Result<T, LexError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            if !e.is_cancelled() {
                error!("Operation failed: {}", e);
            }
            eprintln!();
            eprintln!("{}", render::failure_message(&e).red());
            None
        }
    }
}

fn exit_code<T>(outcome: Option<T>) -> ExitCode {
    if outcome.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn chat(
    assistant: &LegalAssistant,
    language: &Language,
    message: Vec<String>,
    image: Option<PathBuf>,
) -> Result<ExitCode> {
    if !message.is_empty() || image.is_some() {
        let text = message.join(" ");
        let payload = match image {
            Some(path) => Payload::Multimodal {
                text,
                content: std::fs::read(&path).with_context(|| format!("reading {:?}", path))?,
                content_type: content_type_for(&path).to_string(),
            },
            None => Payload::Text(text),
        };
        let cancel = CancellationToken::new();
        let request = StreamRequest::new(payload, cancel.clone()).with_language(language.clone());
        let mut sink = stdout_sink;
        let outcome = finish(interruptible(&cancel, assistant.chat(&request, &mut sink)).await);
        println!();
        return Ok(exit_code(outcome));
    }

    println!(
        "{}",
        "💬 Ask a legal question. Type 'quit' or 'exit' to stop, Ctrl-C stops an answer."
            .bright_green()
    );
    let mut history: Vec<HistoryEntry> = Vec::new();

    loop {
        print!("{}", "You: ".bright_cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            println!("{}", "👋 Goodbye!".bright_green());
            break;
        }

        print!("{}", "Lexaid: ".bright_green().bold());
        io::stdout().flush()?;

        let cancel = CancellationToken::new();
        let request = StreamRequest::new(Payload::Text(input.to_string()), cancel.clone())
            .with_language(language.clone())
            .with_history(history.clone());
        let mut sink = stdout_sink;
        if let Some(answer) = finish(interruptible(&cancel, assistant.chat(&request, &mut sink)).await)
        {
            history.push(HistoryEntry::user(input));
            history.push(HistoryEntry::assistant(answer));
        }
        println!();
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

async fn search(
    assistant: &LegalAssistant,
    query: &str,
    catalog: &Path,
    filter: &CatalogFilter,
) -> Result<ExitCode> {
    let document = CatalogDocument::load(catalog)?;
    let candidates: Vec<SearchCandidate> = document
        .search(&filter.query())
        .into_iter()
        .map(|r| SearchCandidate::new(r.id.clone(), r.snippet()))
        .collect();
    info!("Ranking {} catalog records", candidates.len());

    let ranked = assistant.semantic_search(query, &candidates).await;
    let matches: Vec<_> = ranked.iter().filter_map(|id| document.find(id)).collect();
    if matches.is_empty() {
        println!("{}", "No matching cases found.".yellow());
        return Ok(ExitCode::SUCCESS);
    }
    for record in matches {
        render::print_record(record);
    }
    Ok(ExitCode::SUCCESS)
}

fn index(dir: &Path, out: &Path) -> Result<ExitCode> {
    let indexer = CatalogIndexer::new()?;
    let document = indexer.scan_dir(dir)?;
    document.save(out)?;
    render::print_catalog_summary(&document);
    println!("{} {:?}", "Written to".bright_green(), out);
    Ok(ExitCode::SUCCESS)
}

fn browse(
    catalog: &Path,
    id: Option<&str>,
    text: Option<&str>,
    filter: &CatalogFilter,
) -> Result<ExitCode> {
    let document = CatalogDocument::load(catalog)?;

    if let Some(id) = id {
        return match document.find(id) {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(record)?);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("{}", format!("No record with id {}", id).red());
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let mut query = filter.query();
    if let Some(text) = text {
        query = query.with_text(text);
    }
    render::print_catalog_summary(&document);
    println!();
    for record in document.search(&query) {
        render::print_record(record);
    }
    Ok(ExitCode::SUCCESS)
}

/// Run one of the single-input streamed operations
async fn stream_text(
    assistant: &LegalAssistant,
    command: Command,
    language: &Language,
) -> Result<ExitCode> {
    let cancel = CancellationToken::new();
    let mut sink = stdout_sink;

    let result = match command {
        Command::Simplify(input) => {
            let text = read_input(&input)?;
            interruptible(&cancel, assistant.simplify(&text, language, &mut sink, &cancel)).await
        }
        Command::Jurisdiction(input) => {
            let text = read_input(&input)?;
            interruptible(
                &cancel,
                assistant.find_jurisdiction(&text, language, &mut sink, &cancel),
            )
            .await
        }
        Command::ActionPlan(input) => {
            let text = read_input(&input)?;
            interruptible(&cancel, assistant.action_plan(&text, language, &mut sink, &cancel))
                .await
        }
        Command::Scam(input) => {
            let text = read_input(&input)?;
            interruptible(&cancel, assistant.analyze_scam(&text, language, &mut sink, &cancel))
                .await
        }
        Command::CaseStudy(input) => {
            let text = read_input(&input)?;
            interruptible(&cancel, assistant.case_study(&text, language, &mut sink, &cancel)).await
        }
        Command::Ocr { path, question } => {
            let image = std::fs::read(&path).with_context(|| format!("reading {:?}", path))?;
            interruptible(
                &cancel,
                assistant.explain_image(
                    &image,
                    content_type_for(&path),
                    &question.join(" "),
                    language,
                    &mut sink,
                    &cancel,
                ),
            )
            .await
        }
        _ => anyhow::bail!("not a streamed text command"),
    };

    let outcome = finish(result);
    println!();
    Ok(exit_code(outcome))
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = LexConfig::load(Some(args.config.as_path()))?;
    if let Some(model) = args.model {
        config.provider.model = model;
    }
    let language = args
        .lang
        .map(Language::new)
        .unwrap_or_else(|| config.default_language.clone());

    let assistant = || {
        let pool = CredentialPool::from_config(&config);
        info!(
            "Using model {} with {} API key(s)",
            config.provider.model,
            pool.len()
        );
        LegalAssistant::new(
            Arc::new(GenaiProvider::new(config.provider.model.clone())),
            Arc::new(pool),
        )
        .with_temperature(config.provider.temperature)
    };

    match args.command {
        Command::Index { dir, out } => index(&dir, &out),
        Command::Catalog {
            catalog,
            id,
            text,
            filter,
        } => browse(&catalog, id.as_deref(), text.as_deref(), &filter),
        Command::Chat { message, image } => chat(&assistant(), &language, message, image).await,
        Command::Search {
            query,
            catalog,
            filter,
        } => search(&assistant(), &query.join(" "), &catalog, &filter).await,
        Command::Flowchart(input) => {
            let description = read_input(&input)?;
            let cancel = CancellationToken::new();
            let outcome = finish(
                interruptible(
                    &cancel,
                    assistant().generate_flowchart(&description, &language, &cancel),
                )
                .await,
            );
            if let Some(result) = &outcome {
                render::print_flowchart(result);
            }
            Ok(exit_code(outcome))
        }
        Command::Judgment { input, json } => {
            let judgment = read_input(&input)?;
            let cancel = CancellationToken::new();
            // Fragments are raw JSON, so only show activity
            let mut progress = |_: &str| {
                eprint!(".");
            };
            let outcome = finish(
                interruptible(
                    &cancel,
                    assistant().analyze_judgment(&judgment, &language, &mut progress, &cancel),
                )
                .await,
            );
            eprintln!();
            match outcome {
                Some(Some(analysis)) if json => {
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                    Ok(ExitCode::SUCCESS)
                }
                Some(Some(analysis)) => {
                    render::print_analysis(&analysis);
                    Ok(ExitCode::SUCCESS)
                }
                Some(None) => {
                    eprintln!("{}", render::NO_STRUCTURED_DATA.yellow());
                    Ok(ExitCode::FAILURE)
                }
                None => Ok(ExitCode::FAILURE),
            }
        }
        Command::Analyze { path, prompt } => {
            let content = std::fs::read(&path).with_context(|| format!("reading {:?}", path))?;
            let cancel = CancellationToken::new();
            let outcome = finish(
                interruptible(
                    &cancel,
                    assistant().analyze_document(
                        &content,
                        content_type_for(&path),
                        &prompt,
                        &language,
                        &cancel,
                    ),
                )
                .await,
            );
            if let Some(text) = &outcome {
                println!("{}", text);
            }
            Ok(exit_code(outcome))
        }
        command => stream_text(&assistant(), command, &language).await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.debug);
    run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a/notice.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("scan.png")), "image/png");
        assert_eq!(content_type_for(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_catalog_filter_query() {
        let filter = CatalogFilter {
            year: Some(2023),
            document_type: Some("Order".into()),
            court: None,
        };
        let query = filter.query();
        assert_eq!(query.year, Some(2023));
        assert_eq!(query.document_type.as_deref(), Some("Order"));
        assert!(query.court.is_none());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["lexaid", "--lang", "hi", "simplify", "the", "lessee"])
            .unwrap();
        assert_eq!(args.lang.as_deref(), Some("hi"));
        match args.command {
            Command::Simplify(input) => assert_eq!(input.text, vec!["the", "lessee"]),
            _ => panic!("expected simplify"),
        }
    }

    #[tokio::test]
    async fn test_interruptible_passes_output_through() {
        let cancel = CancellationToken::new();
        let value = interruptible(&cancel, async { 42 }).await;
        assert_eq!(value, 42);
        assert!(!cancel.is_cancelled());
    }
}
