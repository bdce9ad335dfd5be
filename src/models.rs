//! Data models for collaboration metrics.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregation core, and the report generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of UTC hours tracked by the histogram.
pub const HOURS_PER_DAY: usize = 24;

/// Number of weekdays tracked by the heatmap.
pub const DAYS_PER_WEEK: usize = 7;

/// Country bucket for events without a usable country code.
pub const UNKNOWN_COUNTRY: &str = "unknown";

/// Key of the synthetic remainder entry produced by Top-N collapsing.
pub const OTHER_BUCKET: &str = "Other";

/// Event counts per UTC hour, index = hour.
pub type HourlyHistogram = [u64; HOURS_PER_DAY];

/// Event counts per UTC weekday (0 = Sunday) and hour.
pub type WeekdayHourHeatmap = [[u64; HOURS_PER_DAY]; DAYS_PER_WEEK];

/// Short weekday labels, indexed like the heatmap rows.
pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One timestamped, geotagged, attributed unit of activity (e.g. a commit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributionEvent {
    /// Seconds since the Unix epoch, UTC.
    #[serde(alias = "timestampUtcSeconds", alias = "timestamp")]
    pub timestamp_utc_seconds: i64,
    /// ISO-3166 alpha-3 code, or empty when the collector could not resolve one.
    #[serde(default, alias = "countryCode", alias = "country")]
    pub country_code: String,
    /// Stable contributor identifier (e.g. a login).
    #[serde(alias = "contributorId")]
    pub contributor_id: String,
    /// Display name of the contributor.
    #[serde(default, alias = "contributorName")]
    pub contributor_name: String,
}

impl ContributionEvent {
    /// Creates a new event.
    pub fn new(
        timestamp_utc_seconds: i64,
        country_code: impl Into<String>,
        contributor_id: impl Into<String>,
        contributor_name: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_utc_seconds,
            country_code: country_code.into(),
            contributor_id: contributor_id.into(),
            contributor_name: contributor_name.into(),
        }
    }

    /// Returns the country bucket this event is counted under.
    pub fn country_bucket(&self) -> &str {
        let code = self.country_code.trim();
        if code.is_empty() {
            UNKNOWN_COUNTRY
        } else {
            code
        }
    }
}

/// A (key, count) entry of a count distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryCount {
    /// Country code, or `"Other"` for a collapsed remainder.
    pub code: String,
    /// Number of events.
    pub count: u64,
}

impl CountryCount {
    pub fn new(code: impl Into<String>, count: u64) -> Self {
        Self {
            code: code.into(),
            count,
        }
    }
}

/// Per-contributor aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributorAggregate {
    /// Contributor identifier.
    pub id: String,
    /// Display name from the most recently processed event.
    pub name: String,
    /// Country of the most recently processed event.
    pub last_seen_country: String,
    /// Number of events attributed to this contributor.
    pub count: u64,
}

impl ContributorAggregate {
    /// Returns the display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// How `last_seen_country` is resolved for a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastSeenPolicy {
    /// The last event in input iteration order wins.
    #[default]
    InputOrder,
    /// The event with the greatest timestamp wins; ties go to the later event.
    Chronological,
}

impl fmt::Display for LastSeenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastSeenPolicy::InputOrder => write!(f, "input order"),
            LastSeenPolicy::Chronological => write!(f, "chronological"),
        }
    }
}

/// Normalized collaboration scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scores {
    /// Fraction of the 24 UTC hours with at least one event.
    pub timezone_coverage: f64,
    /// Log-normalized count of distinct countries, capped at 1.
    pub geo_diversity: f64,
    /// Weighted mean of coverage and diversity.
    pub global_score: f64,
}

/// Relative weights of the two sub-scores in the global score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub coverage: f64,
    pub diversity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            coverage: 0.5,
            diversity: 0.5,
        }
    }
}

/// Parameters of a metrics computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeParams {
    /// Countries kept before collapsing the rest into "Other".
    pub top_n_countries: usize,
    /// Length of the contributor leaderboard.
    pub top_k_contributors: usize,
    /// Sub-score weights for the global score.
    pub weights: ScoreWeights,
    /// Number of distinct countries that saturates geographic diversity.
    pub diversity_saturation: usize,
    /// Resolution rule for a contributor's last-seen country.
    pub last_seen: LastSeenPolicy,
}

impl Default for ComputeParams {
    fn default() -> Self {
        Self {
            top_n_countries: 10,
            top_k_contributors: 15,
            weights: ScoreWeights::default(),
            diversity_saturation: 8,
            last_seen: LastSeenPolicy::InputOrder,
        }
    }
}

/// The complete result of one metrics computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Number of events in the input batch.
    pub total_events: u64,
    /// Events per UTC hour.
    pub histogram: HourlyHistogram,
    /// Events per UTC weekday and hour.
    pub heatmap: WeekdayHourHeatmap,
    /// All countries, descending by count.
    pub country_distribution: Vec<CountryCount>,
    /// Leading countries plus an optional "Other" remainder.
    pub top_countries: Vec<CountryCount>,
    /// Top contributors, restricted by `filter_country` when set.
    pub contributor_ranking: Vec<ContributorAggregate>,
    /// Country filter applied to the ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_country: Option<String>,
    /// Scores computed over the unfiltered event set.
    pub scores: Scores,
}

impl Metrics {
    /// Number of distinct countries with at least one event.
    pub fn distinct_countries(&self) -> usize {
        self.country_distribution
            .iter()
            .filter(|c| c.count > 0)
            .count()
    }

    /// Hours sorted by activity (busiest first, ties by hour), skipping empty hours.
    pub fn busiest_hours(&self, n: usize) -> Vec<(usize, u64)> {
        let mut hours: Vec<(usize, u64)> = self
            .histogram
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hours.truncate(n);
        hours
    }
}

/// Metadata about an exported metrics document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Free-form label of the analyzed subject (e.g. a repository name).
    pub subject: String,
    /// Date and time the document was generated.
    pub generated_at: DateTime<Utc>,
    /// Version of the tool that produced the document.
    pub tool_version: String,
    /// Number of events analyzed.
    pub event_count: usize,
    /// Policy used to resolve last-seen countries.
    pub last_seen_policy: LastSeenPolicy,
}

/// The downloadable JSON document: metrics plus the raw events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub metrics: Metrics,
    /// Natural-language insight, when one was requested and arrived in time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    /// The raw input events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ContributionEvent>,
}
