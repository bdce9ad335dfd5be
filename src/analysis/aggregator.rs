//! Single-pass event aggregation.
//!
//! Turns a batch of contribution events into the four base aggregates
//! every other metric is derived from.

use crate::error::MetricsError;
use crate::models::{
    ContributionEvent, ContributorAggregate, CountryCount, HourlyHistogram, LastSeenPolicy,
    WeekdayHourHeatmap, DAYS_PER_WEEK, HOURS_PER_DAY,
};
use chrono::{DateTime, Datelike, Timelike};
use std::collections::HashMap;

/// Base aggregates produced by one pass over the events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    /// Events per UTC hour.
    pub histogram: HourlyHistogram,
    /// Events per UTC weekday (0 = Sunday) and hour.
    pub heatmap: WeekdayHourHeatmap,
    /// Countries in first-encountered order.
    pub country_counts: Vec<CountryCount>,
    /// Aggregates keyed by contributor id.
    pub contributor_counts: HashMap<String, ContributorAggregate>,
    /// Number of events processed.
    pub total_events: u64,
}

impl Aggregates {
    /// Country counts sorted descending by count.
    ///
    /// The sort is stable, so ties keep their first-encountered order.
    pub fn sorted_countries(&self) -> Vec<CountryCount> {
        let mut sorted = self.country_counts.clone();
        sorted.sort_by_key(|c| std::cmp::Reverse(c.count));
        sorted
    }
}

/// Aggregate events, resolving last-seen countries in input order.
pub fn aggregate(events: &[ContributionEvent]) -> Aggregates {
    aggregate_with(events, LastSeenPolicy::InputOrder)
}

/// Aggregate events with an explicit last-seen policy.
///
/// Events whose timestamp cannot be represented are counted under hour 0 of
/// Thursday 1970-01-01; run [`validate_events`] first to reject them instead.
pub fn aggregate_with(events: &[ContributionEvent], policy: LastSeenPolicy) -> Aggregates {
    let mut agg = Aggregates::default();
    let mut country_index: HashMap<&str, usize> = HashMap::new();
    // Timestamp of the event that set each contributor's last-seen fields.
    let mut last_seen_at: HashMap<&str, i64> = HashMap::new();

    for event in events {
        let (weekday, hour) = utc_slot(event.timestamp_utc_seconds);
        agg.histogram[hour] += 1;
        agg.heatmap[weekday][hour] += 1;
        agg.total_events += 1;

        let country = event.country_bucket();
        match country_index.get(country) {
            Some(&i) => agg.country_counts[i].count += 1,
            None => {
                country_index.insert(country, agg.country_counts.len());
                agg.country_counts.push(CountryCount::new(country, 1));
            }
        }

        let entry = agg
            .contributor_counts
            .entry(event.contributor_id.clone())
            .or_insert_with(|| ContributorAggregate {
                id: event.contributor_id.clone(),
                name: String::new(),
                last_seen_country: String::new(),
                count: 0,
            });
        entry.count += 1;

        let supersedes = match policy {
            LastSeenPolicy::InputOrder => true,
            LastSeenPolicy::Chronological => last_seen_at
                .get(event.contributor_id.as_str())
                .map_or(true, |&seen| event.timestamp_utc_seconds >= seen),
        };
        if supersedes {
            entry.last_seen_country = country.to_string();
            if !event.contributor_name.is_empty() {
                entry.name = event.contributor_name.clone();
            }
            last_seen_at.insert(&event.contributor_id, event.timestamp_utc_seconds);
        } else if entry.name.is_empty() && !event.contributor_name.is_empty() {
            entry.name = event.contributor_name.clone();
        }
    }

    agg
}

/// Check the boundary preconditions of every event.
///
/// Fails on the first event with a negative or unrepresentable timestamp, or a
/// blank contributor id.
pub fn validate_events(events: &[ContributionEvent]) -> Result<(), MetricsError> {
    for (index, event) in events.iter().enumerate() {
        if event.timestamp_utc_seconds < 0 {
            return Err(MetricsError::invalid_event(
                index,
                format!("negative timestamp {}", event.timestamp_utc_seconds),
            ));
        }
        if DateTime::from_timestamp(event.timestamp_utc_seconds, 0).is_none() {
            return Err(MetricsError::invalid_event(
                index,
                format!("timestamp {} out of range", event.timestamp_utc_seconds),
            ));
        }
        if event.contributor_id.trim().is_empty() {
            return Err(MetricsError::invalid_event(index, "empty contributor id"));
        }
    }
    Ok(())
}

/// Map a Unix timestamp to its (weekday, hour) slot in UTC.
fn utc_slot(timestamp: i64) -> (usize, usize) {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => (
            dt.weekday().num_days_from_sunday() as usize % DAYS_PER_WEEK,
            dt.hour() as usize % HOURS_PER_DAY,
        ),
        // 1970-01-01 was a Thursday.
        None => (4, 0),
    }
}
