use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use feedreport::config::Config;
use feedreport::feed::{aggregate, build_client, order_articles, read_url_list};
use feedreport::model::Cutoff;
use feedreport::report::{render, write_report, OutputFormat, ReportContext};

#[derive(Parser, Debug)]
#[command(
    name = "feedreport",
    version,
    about = "Fetch recent articles from RSS/Atom feeds and generate a static report"
)]
struct Args {
    /// File containing feed URLs (one per line)
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Number of days back to check
    #[arg(long, value_name = "N")]
    days: Option<u32>,

    /// Output file
    #[arg(long, value_name = "FILE")]
    output: PathBuf,

    /// Config file (default: ~/.config/feedreport/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of feeds fetched at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-feed timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => Config::default(),
        },
    };

    if let Some(days) = args.days {
        config.days_back = days;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = args.format {
        config.format = format;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let urls = read_url_list(&args.input).await?;
    if urls.is_empty() {
        tracing::warn!(path = %args.input.display(), "Feed list is empty");
    }

    let client = build_client(&config.user_agent).context("Failed to create HTTP client")?;

    let now = Utc::now();
    let cutoff = Cutoff::days_back(now, config.days_back);
    let run = aggregate(&client, &urls, cutoff, &config.aggregate_options()).await;

    let articles = order_articles(run.articles);
    let ctx = ReportContext {
        generated_at: now,
        days_back: config.days_back,
        articles: &articles,
    };
    let contents = render(&ctx, config.format)?;
    write_report(&args.output, &contents)?;

    for failure in &run.failures {
        eprintln!("Failed: {} ({})", failure.url, failure.error);
    }
    for malformed in &run.malformed {
        eprintln!("Malformed: {} ({})", malformed.url, malformed.reason);
    }
    println!(
        "Wrote {} articles from {} feeds ({} failed) to {}",
        articles.len(),
        run.feeds_attempted,
        run.failures.len(),
        args.output.display()
    );

    Ok(())
}
