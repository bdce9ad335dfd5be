//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// geopulse - global collaboration metrics for contribution events
///
/// Computes hourly and weekly activity, geographic concentration,
/// contributor rankings, and a global collaboration score from a batch
/// of timestamped, geotagged events. Markdown/JSON reports.
///
/// Examples:
///   geopulse --input events.jsonl
///   geopulse --input data/ --country DEU --format json
///   geopulse --input events.json --insight --model llama3.2:latest
///   geopulse --input events.json --digest
///   geopulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Event file or directory of event files
    ///
    /// Files may hold a JSON array or JSON lines (.json, .jsonl, .ndjson).
    #[arg(short, long, value_name = "PATH", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Restrict the contributor leaderboard to one country
    ///
    /// Matches the contributor's last-seen country code (e.g. DEU).
    /// Scores and distributions still cover all events.
    #[arg(long, value_name = "CODE")]
    pub country: Option<String>,

    /// Label for the analyzed subject (e.g. owner/repo)
    #[arg(short, long, value_name = "NAME")]
    pub subject: Option<String>,

    /// Number of countries shown before collapsing the rest into "Other"
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Number of contributors in the leaderboard
    #[arg(long, value_name = "COUNT")]
    pub top_k: Option<usize>,

    /// Output file path for the report
    ///
    /// Defaults to the configured output, with a .json extension for JSON.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .geopulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Ask an LLM for a written insight on the metrics
    #[arg(long, conflicts_with = "no_insight")]
    pub insight: bool,

    /// Never request an insight, even if enabled in config
    #[arg(long, conflicts_with = "insight")]
    pub no_insight: bool,

    /// Ollama model used for insights
    #[arg(short, long, env = "GEOPULSE_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Insight request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the plain-text metrics digest and exit
    ///
    /// Shows exactly what would be sent to the LLM. No report is written.
    #[arg(long)]
    pub digest: bool,

    /// Resolve a contributor's country from their latest event by timestamp
    ///
    /// By default the last event in input order wins.
    #[arg(long)]
    pub chronological: bool,

    /// Omit raw events from the JSON export
    #[arg(long)]
    pub no_events: bool,

    /// Fail if the global score is below this value (0.0 - 1.0)
    ///
    /// Useful for CI pipelines. Exit code 2 when the score is lower.
    #[arg(long, value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// Generate a default .geopulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate input path
        match self.input {
            Some(ref input) if !input.exists() => {
                return Err(format!("Input path does not exist: {}", input.display()));
            }
            None => return Err("An --input path is required".to_string()),
            _ => {}
        }

        if let Some(ref country) = self.country {
            if country.trim().is_empty() {
                return Err("Country filter cannot be empty".to_string());
            }
        }

        if self.top_k == Some(0) {
            return Err("Top-K must be at least 1".to_string());
        }

        // Validate Ollama URL format
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate temperature range
        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(min_score) = self.min_score {
            if !(0.0..=1.0).contains(&min_score) {
                return Err("Minimum score must be between 0.0 and 1.0".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the trimmed country filter, if any.
    pub fn country_filter(&self) -> Option<&str> {
        self.country.as_deref().map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from(".")),
            country: None,
            subject: None,
            top_n: None,
            top_k: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            verbose: false,
            quiet: false,
            insight: false,
            no_insight: false,
            model: None,
            ollama_url: None,
            temperature: None,
            timeout: None,
            digest: false,
            chronological: false,
            no_events: false,
            min_score: None,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());

        args.input = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_ranges() {
        let mut args = make_args();
        args.min_score = Some(1.5);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.temperature = Some(-0.1);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.top_k = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.country = Some("  ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_country_filter_trimmed() {
        let mut args = make_args();
        args.country = Some(" DEU ".to_string());
        assert_eq!(args.country_filter(), Some("DEU"));
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "geopulse",
            "--input",
            ".",
            "--country",
            "JPN",
            "--top-k",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.country.as_deref(), Some("JPN"));
        assert_eq!(args.top_k, Some(5));
        assert_eq!(args.format, OutputFormat::Json);
    }
}
