use anyhow::{Context, Result};
use arxiv_digest::{Config, DigestError, Pipeline};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Download recent arXiv papers from an advanced-search URL and summarize them with an LLM
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding api.txt and url.json
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,
    /// Directory for the summary files
    #[arg(short, long, default_value = "summary")]
    output_dir: PathBuf,
    /// Directory for downloaded PDFs
    #[arg(long, default_value = "data/downloaded_pdfs")]
    download_dir: PathBuf,
    /// Directory summarized PDFs are moved to
    #[arg(long, default_value = "data/summarized_pdfs")]
    processed_dir: PathBuf,
    /// Only keep papers submitted within this many days
    #[arg(short, long, default_value_t = 7)]
    days: u32,
    /// Number of search result pages to walk
    #[arg(long, default_value_t = 2)]
    pages: usize,
    /// Results per search page
    #[arg(long, default_value_t = 50)]
    page_size: usize,
    /// Model identifier sent to the completion endpoint
    #[arg(short, long)]
    model: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[arg(long)]
    api_base: Option<String>,
    /// Timeout for each network request, in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
    /// Papers processed at the same time
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(args: &Args) -> Result<Config, DigestError> {
    let mut config = Config::load(&args.config_dir)?;
    config.output_dir = args.output_dir.clone();
    config.download_dir = args.download_dir.clone();
    config.processed_dir = args.processed_dir.clone();
    config.days = args.days;
    config.pages = args.pages;
    config.page_size = args.page_size;
    config.request_timeout = Duration::from_secs(args.timeout_secs);
    config.concurrency = args.concurrency;
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(api_base) = &args.api_base {
        config.set_api_base(api_base)?;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = build_config(&args)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config_dir))?;
    let pipeline = Pipeline::new(&config)?;

    let today = chrono::Local::now().date_naive();
    let report = pipeline.run(today).await?;

    for paper in &report.summarized {
        info!("{} -> {:?}", paper.id, paper.output);
    }
    for paper in &report.failed {
        warn!("{} failed during {}: {}", paper.id, paper.stage, paper.error);
    }
    info!(
        "Summarized {}/{} papers into {:?}",
        report.summarized.len(),
        report.discovered,
        config.output_dir
    );

    Ok(())
}
