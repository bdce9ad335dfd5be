//! Metrics aggregation core.
//!
//! Pure, synchronous computation from a batch of contribution events to a
//! [`Metrics`](crate::models::Metrics) value. Nothing here performs I/O.

pub mod aggregator;
pub mod cache;
pub mod collapse;
pub mod compute;
pub mod ranking;
pub mod scoring;

pub use aggregator::{aggregate, aggregate_with, validate_events, Aggregates};
pub use cache::MetricsCache;
pub use collapse::collapse;
pub use compute::{compute, compute_with, try_compute};
pub use ranking::rank;
pub use scoring::{score, score_with};
