//! Command-line client over the catalog core.
//!
//! # Responsibility
//! - Seed a browse session from a query string, load every option level and
//!   print the projected note list.
//! - Run against the REST backend or the bundled offline catalog.
//! - Summarize a local PDF through the backend.

use clap::Parser;
use log::info;
use pathsala_core::model::note::format_file_size;
use pathsala_core::{
    init_from_config, load_fixture, CatalogSource, ClientConfig, HttpCatalog, NotesBrowser,
    SqliteCatalog, SummaryPlatform,
};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pathsala", version, about = "Browse the notes catalog from a query string")]
struct Args {
    /// Browse query, e.g. `?college=col_001&search=python`.
    #[arg(default_value = "")]
    query: String,

    /// Backend origin; overrides PATHSALA_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Use the local catalog instead of the backend.
    #[arg(long)]
    offline: bool,

    /// Local catalog file (implies --offline); in-memory when omitted.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute log directory; overrides PATHSALA_LOG_DIR.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level; overrides PATHSALA_LOG_LEVEL.
    #[arg(long)]
    log_level: Option<String>,

    /// Summarize this PDF instead of browsing.
    #[arg(long, value_name = "PDF")]
    summarize: Option<PathBuf>,

    /// Summary provider: groq or openrouter.
    #[arg(long, default_value = "groq", value_parser = parse_platform)]
    platform: SummaryPlatform,
}

fn parse_platform(value: &str) -> Result<SummaryPlatform, String> {
    SummaryPlatform::parse(value).ok_or_else(|| format!("unknown platform `{value}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = args.api_url.clone() {
        config.api_url = api_url;
    }
    if let Some(log_dir) = args.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }
    if let Some(log_level) = args.log_level.clone() {
        config.log_level = log_level;
    }
    init_from_config(&config)?;

    if let Some(pdf) = args.summarize.as_deref() {
        let filename = pdf
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(pdf)?;
        info!("event=cli_run module=cli status=start mode=summarize");
        let summary = HttpCatalog::new(&config)?
            .summarize_pdf(args.platform, &filename, bytes)
            .await?;
        println!(
            "{} via {} ({}): {} words, {} chunks",
            summary.filename, summary.platform, summary.model, summary.word_count,
            summary.chunks_processed
        );
        println!("{}", summary.summary);
        return Ok(());
    }

    if args.offline || args.db.is_some() {
        let catalog = match args.db.as_deref() {
            Some(path) => SqliteCatalog::open(path)?,
            None => SqliteCatalog::in_memory()?,
        };
        if catalog.stats().await?.colleges == 0 {
            catalog.seed(&load_fixture()?)?;
        }
        info!("event=cli_run module=cli status=start mode=offline");
        browse(catalog, &args.query, config.notes_limit).await;
    } else {
        let catalog = HttpCatalog::new(&config)?;
        info!("event=cli_run module=cli status=start mode=http");
        browse(catalog, &args.query, config.notes_limit).await;
    }
    Ok(())
}

async fn browse<S: CatalogSource>(source: S, query: &str, notes_limit: Option<u32>) {
    let browser = NotesBrowser::from_query(source, query).with_notes_limit(notes_limit);
    browser.refresh_all().await;
    let snapshot = browser.snapshot();

    println!("query: ?{}", pathsala_core::encode_query(&snapshot.filters));
    println!(
        "colleges: {} ({})",
        snapshot.colleges.len(),
        snapshot.statuses.colleges.as_str()
    );
    println!("programs ({}):", snapshot.statuses.programs.as_str());
    for program in &snapshot.programs {
        println!("  {} {} [{}]", program.id, program.name, program.short_name);
    }
    println!("subjects ({}):", snapshot.statuses.subjects.as_str());
    for subject in &snapshot.subjects {
        println!("  {} sem {} {}", subject.id, subject.semester, subject.label());
    }
    println!(
        "notes: {} of {} ({})",
        snapshot.notes.len(),
        snapshot.total_notes,
        snapshot.statuses.notes.as_str()
    );
    if let Some(notice) = snapshot.notes_notice() {
        println!("  {notice}");
    }
    for note in &snapshot.notes {
        println!(
            "  {} {} | {} downloads | {} | {}",
            note.id,
            note.title,
            note.downloads,
            format_file_size(note.file_size),
            note.created_at.format("%Y-%m-%d")
        );
    }
}
