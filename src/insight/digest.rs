//! Plain-text metrics digest.
//!
//! The digest is the payload handed to the summarization model. It carries
//! only numbers the core computed; nothing from the model is parsed back.

use crate::models::{Metrics, OTHER_BUCKET};

/// How much of each distribution to include in the digest.
#[derive(Debug, Clone, Copy)]
pub struct DigestOptions {
    pub max_countries: usize,
    pub max_contributors: usize,
    pub max_hours: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            max_countries: 10,
            max_contributors: 10,
            max_hours: 5,
        }
    }
}

/// Render the metrics digest for a subject.
pub fn render_digest(subject: &str, metrics: &Metrics, options: &DigestOptions) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Collaboration metrics for: {}", subject));
    lines.push(format!("Total events: {}", metrics.total_events));
    lines.push(format!(
        "Distinct countries: {}",
        metrics.distinct_countries()
    ));

    lines.push(String::new());
    lines.push("Scores (0 to 1):".to_string());
    lines.push(format!(
        "- Timezone coverage: {:.3}",
        metrics.scores.timezone_coverage
    ));
    lines.push(format!(
        "- Geographic diversity: {:.3}",
        metrics.scores.geo_diversity
    ));
    lines.push(format!(
        "- Global collaboration score: {:.3}",
        metrics.scores.global_score
    ));

    let busiest = metrics.busiest_hours(options.max_hours);
    if !busiest.is_empty() {
        lines.push(String::new());
        lines.push("Busiest UTC hours:".to_string());
        for (hour, count) in busiest {
            lines.push(format!("- {:02}:00 UTC: {} events", hour, count));
        }
    }

    if !metrics.top_countries.is_empty() {
        lines.push(String::new());
        lines.push("Top countries:".to_string());
        for entry in metrics
            .top_countries
            .iter()
            .filter(|c| c.code != OTHER_BUCKET)
            .take(options.max_countries)
        {
            lines.push(format!(
                "- {}: {} events ({:.1}%)",
                entry.code,
                entry.count,
                share(entry.count, metrics.total_events)
            ));
        }
        if let Some(other) = metrics.top_countries.iter().find(|c| c.code == OTHER_BUCKET) {
            lines.push(format!(
                "- Other countries combined: {} events ({:.1}%)",
                other.count,
                share(other.count, metrics.total_events)
            ));
        }
    }

    lines.push(String::new());
    match metrics.filter_country {
        Some(ref country) => lines.push(format!("Top contributors last seen in {}:", country)),
        None => lines.push("Top contributors:".to_string()),
    }
    if metrics.contributor_ranking.is_empty() {
        lines.push("- none".to_string());
    }
    for (i, contributor) in metrics
        .contributor_ranking
        .iter()
        .take(options.max_contributors)
        .enumerate()
    {
        lines.push(format!(
            "{}. {} ({}) - {} events, last seen in {}",
            i + 1,
            contributor.display_name(),
            contributor.id,
            contributor.count,
            contributor.last_seen_country
        ));
    }

    lines.join("\n")
}

fn share(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
