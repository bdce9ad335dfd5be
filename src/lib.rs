//! geopulse - global collaboration metrics.
//!
//! Converts a batch of timestamped, geotagged contribution events into
//! activity distributions, geographic concentration, a contributor
//! leaderboard, and a composite global collaboration score.
//!
//! The [`analysis`] module is the pure core; everything else is the
//! application around it (loading, configuration, reports, LLM insight).

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod insight;
pub mod models;
pub mod progress;
pub mod report;
pub mod source;

pub use analysis::{compute, compute_with, try_compute, MetricsCache};
pub use error::MetricsError;
pub use models::{ComputeParams, ContributionEvent, Metrics, Scores};
