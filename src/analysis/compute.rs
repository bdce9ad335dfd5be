//! Metrics orchestration.
//!
//! Runs the aggregator, scoring, collapsing, and ranking in a fixed order and
//! assembles one immutable [`Metrics`] value. Everything is recomputed from the
//! full input on each call.

use crate::analysis::aggregator::{aggregate_with, validate_events};
use crate::analysis::collapse::collapse;
use crate::analysis::ranking::rank;
use crate::analysis::scoring::{score_with, validate_scoring};
use crate::error::MetricsError;
use crate::models::{ComputeParams, ContributionEvent, Metrics};
use tracing::debug;

/// Compute metrics with default weights and last-seen policy.
pub fn compute(
    events: &[ContributionEvent],
    filter_country: Option<&str>,
    top_n_countries: usize,
    top_k_contributors: usize,
) -> Metrics {
    let params = ComputeParams {
        top_n_countries,
        top_k_contributors,
        ..ComputeParams::default()
    };
    compute_with(events, filter_country, &params)
}

/// Compute metrics with explicit parameters.
///
/// Scores, histogram, heatmap, and country distribution always cover the whole
/// event set; `filter_country` only narrows the contributor ranking. The filter
/// is trimmed like event country codes.
pub fn compute_with(
    events: &[ContributionEvent],
    filter_country: Option<&str>,
    params: &ComputeParams,
) -> Metrics {
    let filter_country = filter_country.map(str::trim);
    let aggregates = aggregate_with(events, params.last_seen);
    let country_distribution = aggregates.sorted_countries();

    let scores = score_with(
        &aggregates.histogram,
        &country_distribution,
        &params.weights,
        params.diversity_saturation,
    );
    let top_countries = collapse(&country_distribution, params.top_n_countries);

    let contributor_ranking = rank(
        &aggregates.contributor_counts,
        filter_country,
        params.top_k_contributors,
    );

    debug!(
        events = aggregates.total_events,
        countries = country_distribution.len(),
        contributors = aggregates.contributor_counts.len(),
        "computed metrics"
    );

    Metrics {
        total_events: aggregates.total_events,
        histogram: aggregates.histogram,
        heatmap: aggregates.heatmap,
        country_distribution,
        top_countries,
        contributor_ranking,
        filter_country: filter_country.map(str::to_string),
        scores,
    }
}

/// Validate events and parameters, then compute.
pub fn try_compute(
    events: &[ContributionEvent],
    filter_country: Option<&str>,
    params: &ComputeParams,
) -> Result<Metrics, MetricsError> {
    validate_events(events)?;
    validate_scoring(&params.weights, params.diversity_saturation)?;
    Ok(compute_with(events, filter_country, params))
}
