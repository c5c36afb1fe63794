//! photo-album command line client
//!
//! ```bash
//! photo-album upload cat.png dog.jpg
//! photo-album search "cats" --output gallery.html
//! photo-album search "cats" --json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use photo_album::{
    config,
    encoding::SelectedFile,
    upload::{BatchSummary, UploadOutcome},
    AppState, SearchOutcome,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Upload images to a photo album and search them.
#[derive(Parser)]
#[command(name = "photo-album", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload one or more images
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Search uploaded images
    Search {
        /// Free-text query
        query: String,

        /// Write the gallery page to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load(cli.config.as_deref())?;

    let filter = if cli.verbose || settings.general.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("photo-album v{}", photo_album::VERSION);
    settings.validate()?;

    let app = AppState::new(settings).context("failed to initialize session")?;
    app.auth
        .initialize()
        .await
        .context("failed to obtain credentials")?;
    info!("Credentials ready ({} provider)", app.auth.provider_name());

    let failed = match cli.command {
        Command::Upload { files } => run_upload(&app, files).await,
        Command::Search {
            query,
            output,
            json,
        } => run_search(&app, &query, output, json).await?,
    };

    debug!("Session metrics: {:?}", app.metrics.snapshot());

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns true when any upload failed
async fn run_upload(app: &AppState, files: Vec<PathBuf>) -> bool {
    let files = files.iter().map(SelectedFile::from_path).collect();
    let batch = app.upload(files);
    if let Some(status) = app.status.text() {
        println!("{}", status);
    }

    let submitted = batch.submitted;
    let mut results = Vec::with_capacity(submitted);
    let mut stream = batch.into_stream();
    while let Some(result) = stream.next().await {
        match &result.outcome {
            UploadOutcome::Success => println!("uploaded {}", result.filename),
            UploadOutcome::Failure(e) => println!("failed   {}: {}", result.filename, e),
        }
        results.push(result);
    }

    let summary = BatchSummary::from_results(submitted, &results);
    println!(
        "{} of {} upload(s) succeeded",
        summary.succeeded, summary.submitted
    );
    !summary.all_succeeded()
}

/// Returns true when the search failed
async fn run_search(
    app: &AppState,
    query: &str,
    output: Option<PathBuf>,
    json: bool,
) -> Result<bool> {
    let rendered = if json {
        match app.search.search(query).await {
            Ok(Some(set)) => serde_json::to_string_pretty(&set)?,
            Ok(None) => {
                eprintln!("Empty query, nothing to search");
                return Ok(false);
            }
            Err(e) => {
                eprintln!("Search failed: {}", e);
                return Ok(true);
            }
        }
    } else {
        match app.search(query).await {
            SearchOutcome::Rendered { count, .. } => {
                info!("{} result(s) for '{}'", count, query);
                app.render_page()?
            }
            SearchOutcome::Skipped => {
                eprintln!("Empty query, nothing to search");
                return Ok(false);
            }
            SearchOutcome::Stale { .. } => return Ok(false),
            SearchOutcome::Failed(e) => {
                eprintln!("Search failed: {}", e);
                return Ok(true);
            }
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote results to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(false)
}
