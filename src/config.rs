//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.geopulse.toml` files.

use crate::models::{ComputeParams, LastSeenPolicy, ScoreWeights};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".geopulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Metrics computation settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Score weighting.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// LLM insight settings.
    #[serde(default)]
    pub insight: InsightSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Label of the analyzed subject; defaults to the input path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            subject: None,
        }
    }
}

fn default_output() -> String {
    "geopulse_report.md".to_string()
}

/// Metrics computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Countries shown before collapsing into "Other".
    #[serde(default = "default_top_n")]
    pub top_n_countries: usize,

    /// Length of the contributor leaderboard.
    #[serde(default = "default_top_k")]
    pub top_k_contributors: usize,

    /// How a contributor's last-seen country is resolved.
    #[serde(default)]
    pub last_seen: LastSeenPolicy,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            top_n_countries: default_top_n(),
            top_k_contributors: default_top_k(),
            last_seen: LastSeenPolicy::default(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_top_k() -> usize {
    15
}

/// Weights of the global collaboration score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of timezone coverage.
    #[serde(default = "default_weight")]
    pub coverage_weight: f64,

    /// Weight of geographic diversity.
    #[serde(default = "default_weight")]
    pub diversity_weight: f64,

    /// Distinct countries at which diversity reaches 1.
    #[serde(default = "default_saturation")]
    pub diversity_saturation: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            coverage_weight: default_weight(),
            diversity_weight: default_weight(),
            diversity_saturation: default_saturation(),
        }
    }
}

fn default_weight() -> f64 {
    0.5
}

fn default_saturation() -> usize {
    8
}

/// LLM insight settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSettings {
    /// Request an insight on every run.
    #[serde(default)]
    pub enabled: bool,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    120
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the weekday x hour heatmap in Markdown reports.
    #[serde(default = "default_true")]
    pub include_heatmap: bool,

    /// Include the raw events in JSON exports.
    #[serde(default = "default_true")]
    pub include_events_in_export: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_heatmap: true,
            include_events_in_export: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref subject) = args.subject {
            self.general.subject = Some(subject.clone());
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(top_n) = args.top_n {
            self.metrics.top_n_countries = top_n;
        }
        if let Some(top_k) = args.top_k {
            self.metrics.top_k_contributors = top_k;
        }
        if args.chronological {
            self.metrics.last_seen = LastSeenPolicy::Chronological;
        }

        // Insight toggles - only override if explicitly provided via CLI flags
        if args.insight {
            self.insight.enabled = true;
        } else if args.no_insight {
            self.insight.enabled = false;
        }
        if let Some(ref model) = args.model {
            self.insight.model = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.insight.ollama_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.insight.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.insight.timeout_seconds = timeout;
        }

        if args.no_events {
            self.report.include_events_in_export = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level after merging. `quiet` wins over `general.verbose`.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Parameters for the metrics core.
    pub fn compute_params(&self) -> ComputeParams {
        ComputeParams {
            top_n_countries: self.metrics.top_n_countries,
            top_k_contributors: self.metrics.top_k_contributors,
            weights: ScoreWeights {
                coverage: self.scoring.coverage_weight,
                diversity: self.scoring.diversity_weight,
            },
            diversity_saturation: self.scoring.diversity_saturation,
            last_seen: self.metrics.last_seen,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
