use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendscope::prelude::*;

#[derive(Parser)]
#[command(
    name = "trendscope",
    version,
    about = "Category analytics over short-form video trend records",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file containing an array of trend records
    #[arg(short, long, global = true, default_value = "records.json")]
    records: PathBuf,

    /// Restrict analysis to one platform (youtube, tiktok, x, instagram)
    #[arg(short, long, global = true)]
    platform: Option<Platform>,

    /// TOML configuration file; environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Phrase insights with the configured Ollama narrator
    #[arg(long, global = true)]
    narrate: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-category metrics, growth, clusters and insights
    Categories(WindowArgs),

    /// Newly appearing or rapidly growing categories
    Emerging(WindowArgs),

    /// Correlation matrix and category clusters
    Relations(WindowArgs),
}

#[derive(Args)]
struct WindowArgs {
    /// ISO week number
    #[arg(short, long, conflicts_with = "month", required_unless_present = "month")]
    week: Option<u32>,

    /// Calendar month number
    #[arg(short, long)]
    month: Option<u32>,

    /// Year of the window
    #[arg(short, long)]
    year: i32,
}

impl WindowArgs {
    fn window(&self) -> trendscope::Result<Window> {
        let window = match (self.week, self.month) {
            (Some(week), _) => Window::week(week, self.year)?,
            (None, Some(month)) => Window::month(month, self.year)?,
            (None, None) => return Err(Error::config("either --week or --month is required")),
        };
        Ok(window)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    let source = JsonFileTrendSource::load(&cli.records)
        .await
        .with_context(|| format!("Failed to load records from {}", cli.records.display()))?;

    let mut analyzer = CategoryAnalyzer::new(Arc::new(source), config.analysis.clone());
    if cli.narrate || config.narrator.enabled {
        let narrator = OllamaNarrator::new(config.narrator.clone())?;
        if !narrator.is_available().await {
            tracing::warn!(
                endpoint = %config.narrator.endpoint,
                "Ollama is not reachable, insights will use template text"
            );
        }
        analyzer = analyzer.with_narrator(Arc::new(narrator));
    }

    let output = run(&cli.command, cli.platform, &analyzer).await;

    match output {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) if e.is_no_data() => {
            tracing::info!(error = %e, "Nothing to analyze");
            println!("{}", e.user_message());
            Ok(())
        }
        Err(e) => {
            tracing::error!(category = %e.category(), error = %e, "Analysis failed");
            Err(e.into())
        }
    }
}

fn load_config(path: Option<&Path>) -> trendscope::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    Ok(config)
}

async fn run(
    command: &Commands,
    platform: Option<Platform>,
    analyzer: &CategoryAnalyzer,
) -> trendscope::Result<Value> {
    match command {
        Commands::Categories(args) => {
            let reports = analyzer.analyze_categories(platform, args.window()?).await?;
            Ok(serde_json::to_value(reports)?)
        }
        Commands::Emerging(args) => {
            let window = args.window()?;
            let emerging = analyzer.detect_emerging_categories(platform, window).await?;
            let insight = analyzer.narrate_emerging(platform, window, &emerging).await;
            Ok(json!({
                "emerging": serde_json::to_value(&emerging)?,
                "insight": serde_json::to_value(&insight)?,
            }))
        }
        Commands::Relations(args) => {
            let relations = analyzer
                .analyze_category_relations(platform, args.window()?)
                .await?;
            Ok(serde_json::to_value(relations)?)
        }
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendscope=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("trendscope={level},warn")))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
