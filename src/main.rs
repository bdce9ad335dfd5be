//! geopulse - global collaboration metrics CLI
//!
//! Loads contribution events, computes collaboration metrics, and writes
//! a Markdown or JSON report, optionally with an LLM-written insight.
//!
//! Exit codes:
//!   0 - Success (score above --min-score, or no --min-score set)
//!   1 - Runtime error (bad input, config, write failure, etc.)
//!   2 - Global score below --min-score

use anyhow::{Context, Result};
use chrono::Utc;
use geopulse::analysis::MetricsCache;
use geopulse::cli::{Args, OutputFormat};
use geopulse::config::{Config, CONFIG_FILE_NAME};
use geopulse::insight::{render_digest, DigestOptions, InsightClient, InsightConfig, InsightOutcome};
use geopulse::models::{ExportDocument, ExportMetadata, Metrics};
use geopulse::progress;
use geopulse::report::{self, MarkdownOptions};
use geopulse::source::{EventSource, FileEventSource};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration (also decides the log level)
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("geopulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .geopulse.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize leaderboard sizes, score weights, and insights.");
    Ok(())
}

/// Initialize logging at the resolved level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the full workflow. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();
    let show_progress = !args.quiet;

    // Step 1: Load events
    let input = args
        .input
        .clone()
        .context("An --input path is required")?;
    let source = FileEventSource::new(input);

    let pb = progress::spinner(&format!("Loading events from {}", source.describe()), show_progress);
    let events = source.load()?;
    progress::finish(pb, &format!("Loaded {} events", events.len()));

    // Step 2: Compute metrics
    let params = config.compute_params();
    let filter = args.country_filter();
    let cache = MetricsCache::default();
    let metrics = cache
        .get_or_compute(&events, filter, &params)
        .context("Cannot compute metrics")?;
    debug!(
        "Metrics cache: {} hit(s), {} miss(es)",
        cache.hits(),
        cache.misses()
    );

    let subject = config
        .general
        .subject
        .clone()
        .unwrap_or_else(|| source.describe());
    let digest = render_digest(&subject, &metrics, &DigestOptions::default());

    // Handle --digest: print the LLM payload and exit
    if args.digest {
        println!("{}", digest);
        return Ok(0);
    }

    // Step 3: Optional insight
    let insight = if config.insight.enabled {
        request_insight(&config, &digest, show_progress).await
    } else {
        None
    };

    // Step 4: Build and write the report
    let document = ExportDocument {
        metadata: ExportMetadata {
            subject,
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            event_count: events.len(),
            last_seen_policy: params.last_seen,
        },
        metrics: (*metrics).clone(),
        insight,
        events: if config.report.include_events_in_export {
            events
        } else {
            Vec::new()
        },
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&document)?,
        OutputFormat::Markdown => {
            let options = MarkdownOptions {
                include_heatmap: config.report.include_heatmap,
            };
            report::generate_markdown_report(&document, &options)
        }
    };

    let report_path = output_path(&config.general.output, args.output.is_some(), args.format);
    std::fs::write(&report_path, &output)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;

    print_summary(&metrics, start_time.elapsed().as_secs_f64());
    println!("\n✅ Report saved to: {}", report_path.display());

    // Check --min-score threshold
    if let Some(min_score) = args.min_score {
        if metrics.scores.global_score < min_score {
            eprintln!(
                "\n⛔ Global score {:.3} is below --min-score {:.3}. Failing (exit code 2).",
                metrics.scores.global_score, min_score
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Ask the configured model for an insight. Failures are logged, not fatal.
async fn request_insight(config: &Config, digest: &str, show_progress: bool) -> Option<String> {
    let insight_config = InsightConfig {
        ollama_url: config.insight.ollama_url.clone(),
        model_name: config.insight.model.clone(),
        temperature: config.insight.temperature,
        timeout_seconds: config.insight.timeout_seconds,
    };

    let client = match InsightClient::new(insight_config) {
        Ok(client) => client,
        Err(e) => {
            warn!("Insight unavailable: {:#}", e);
            return None;
        }
    };

    let pb = progress::spinner(
        &format!("Requesting insight from {}", config.insight.model),
        show_progress,
    );
    let outcome = client.request_insight(digest).await;

    match outcome {
        Ok(InsightOutcome::Fresh(text)) => {
            progress::finish(pb, "Insight received");
            Some(text)
        }
        Ok(InsightOutcome::Stale) => {
            progress::finish(pb, "Insight superseded");
            None
        }
        Err(e) => {
            progress::finish(pb, "Insight failed");
            warn!("Insight request failed: {:#}", e);
            None
        }
    }
}

/// Resolve the report path, switching the default extension for JSON output.
fn output_path(configured: &str, explicit: bool, format: OutputFormat) -> PathBuf {
    let path = PathBuf::from(configured);
    if explicit {
        return path;
    }
    path.with_extension(format.extension())
}

fn print_summary(metrics: &Metrics, duration: f64) {
    println!("\n📊 Collaboration Summary:");
    println!("   Events: {}", metrics.total_events);
    println!("   Countries: {}", metrics.distinct_countries());
    println!(
        "   Timezone coverage: {:.3} | Geo diversity: {:.3} | Global score: {:.3}",
        metrics.scores.timezone_coverage,
        metrics.scores.geo_diversity,
        metrics.scores.global_score
    );
    if let Some(top) = metrics.contributor_ranking.first() {
        println!(
            "   Top contributor: {} ({} events)",
            top.display_name(),
            top.count
        );
    }
    println!("   Duration: {:.2}s", duration);
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems are reported on stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_switches_extension() {
        assert_eq!(
            output_path("geopulse_report.md", false, OutputFormat::Json),
            PathBuf::from("geopulse_report.json")
        );
        assert_eq!(
            output_path("geopulse_report.md", false, OutputFormat::Markdown),
            PathBuf::from("geopulse_report.md")
        );
        assert_eq!(
            output_path("out.txt", true, OutputFormat::Json),
            PathBuf::from("out.txt")
        );
    }
}
