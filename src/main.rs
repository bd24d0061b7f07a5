// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so stdout stays clean for JSON/CSV output)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = some pages failed, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - crawl options
mod crawl;     // src/crawl/ - traversal, scope, dedup
mod export;    // src/export.rs - JSON/CSV/table output
mod extract;   // src/extract/ - link + metadata extraction
mod fetch;     // src/fetch/ - page fetching

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, CrawlArgs};
use crawl::{CrawlEngine, CrawlResult, Termination};
use extract::HtmlLinkExtractor;
use fetch::HttpFetcher;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise -v/-vv pick the level for our own crate
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn,linkmap=info",
        1 => "warn,linkmap=debug",
        _ => "info,linkmap=trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

// Returns:
//   Ok(0) = crawl finished, every page fetched fine
//   Ok(1) = crawl finished, but some pages failed
//   Err   = could not start, or could not write results
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Crawl(args) => handle_crawl(&args).await,
        Commands::Convert { input, output } => handle_convert(&input, output.as_deref()),
    }
}

async fn handle_crawl(args: &CrawlArgs) -> Result<i32> {
    let options = args.options();
    eprintln!("🔍 Mapping website: {}", args.seed_url);
    eprintln!("📊 Max crawl depth: {}", options.max_depth);
    if options.use_sitemap {
        eprintln!("🗺️  Searching for sitemaps...");
    }

    let fetcher = HttpFetcher::new(&args.user_agent).context("failed to create HTTP client")?;
    let engine = CrawlEngine::new(fetcher, HtmlLinkExtractor::new(), options);

    let result = engine.run(&args.seed_url, interrupted()).await?;
    if result.termination == Termination::Interrupted {
        eprintln!("🛑 Interrupted! Saving what was collected so far");
    }

    eprintln!(
        "📄 Crawled {} page(s), found {} link(s)",
        result.pages_fetched,
        result.edges.len()
    );

    write_output(args.output.as_deref(), |out| {
        export::write_edges(&result, args.format, out)
    })?;

    if let Some(path) = &args.pages_output {
        write_pages(&result, path)?;
        eprintln!("🗂️  Wrote {} page record(s) to {}", result.pages.len(), path.display());
    }

    if result.failures.is_empty() {
        Ok(0)
    } else {
        eprintln!("⚠️  {} page(s) could not be fetched", result.failures.len());
        Ok(1)
    }
}

// Completes on the first Ctrl-C; the crawl then stops starting new fetches
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C, crawl can't be interrupted");
        std::future::pending::<()>().await;
    }
}

fn handle_convert(input: &Path, output: Option<&Path>) -> Result<i32> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let mut rows = 0;
    write_output(output, |out| {
        rows = export::json_to_csv(&json, out)
            .with_context(|| format!("failed to convert {}", input.display()))?;
        Ok(())
    })?;

    eprintln!("✅ Converted {} row(s)", rows);
    Ok(0)
}

fn write_pages(result: &CrawlResult, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    write_output(Some(path), |out| {
        if is_json {
            export::write_pages_json(&result.pages, out)
        } else {
            export::write_pages_csv(&result.pages, out)
        }
    })
}

// Runs `write` against the given file, or stdout when there is none
fn write_output<F>(path: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
