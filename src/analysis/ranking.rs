//! Contributor leaderboard.

use crate::models::ContributorAggregate;
use std::collections::HashMap;

/// Rank contributors by event count.
///
/// When `filter_country` is set only contributors last seen in that country
/// are considered. Ties are broken by ascending contributor id, so the order
/// is total and independent of map iteration order.
pub fn rank(
    contributor_counts: &HashMap<String, ContributorAggregate>,
    filter_country: Option<&str>,
    top_k: usize,
) -> Vec<ContributorAggregate> {
    let mut ranked: Vec<ContributorAggregate> = contributor_counts
        .values()
        .filter(|c| filter_country.map_or(true, |country| c.last_seen_country == country))
        .cloned()
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(top_k);
    ranked
}
