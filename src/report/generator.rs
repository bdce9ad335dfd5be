//! Markdown and JSON report generation.
//!
//! Both formats are rendered from the same [`ExportDocument`]: the JSON form
//! is the downloadable export, the Markdown form is for reading.

use crate::models::{
    ContributorAggregate, CountryCount, ExportDocument, ExportMetadata, HourlyHistogram, Metrics,
    Scores, WeekdayHourHeatmap, HOURS_PER_DAY, WEEKDAY_LABELS,
};
use anyhow::Result;

/// Sections that can be toggled in the Markdown report.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    pub include_heatmap: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_heatmap: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(document: &ExportDocument, options: &MarkdownOptions) -> String {
    let metrics = &document.metrics;
    let mut output = String::new();

    output.push_str("# Collaboration Metrics Report\n\n");
    output.push_str(&generate_metadata_section(&document.metadata, metrics));
    output.push_str(&generate_scores_section(&metrics.scores));

    if let Some(ref insight) = document.insight {
        output.push_str(&generate_insight_section(insight));
    }

    output.push_str(&generate_hourly_section(&metrics.histogram));
    if options.include_heatmap {
        output.push_str(&generate_heatmap_section(&metrics.heatmap));
    }
    output.push_str(&generate_countries_section(
        &metrics.top_countries,
        metrics.total_events,
    ));
    output.push_str(&generate_contributors_section(
        &metrics.contributor_ranking,
        metrics.filter_country.as_deref(),
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ExportMetadata, metrics: &Metrics) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Subject:** {}\n", metadata.subject));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Events:** {}\n", metadata.event_count));
    section.push_str(&format!(
        "- **Distinct Countries:** {}\n",
        metrics.distinct_countries()
    ));
    if let Some(ref country) = metrics.filter_country {
        section.push_str(&format!("- **Leaderboard Filter:** {}\n", country));
    }
    section.push_str(&format!(
        "- **Last-Seen Policy:** {}\n",
        metadata.last_seen_policy
    ));
    section.push('\n');

    section
}

/// Generate the scores table.
fn generate_scores_section(scores: &Scores) -> String {
    let mut section = String::new();

    section.push_str("## Scores\n\n");
    section.push_str("| Timezone Coverage | Geographic Diversity | **Global Score** |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.3} | {:.3} | **{:.3}** |\n\n",
        scores.timezone_coverage, scores.geo_diversity, scores.global_score
    ));

    section
}

/// Generate the AI insight section.
fn generate_insight_section(insight: &str) -> String {
    if insight.trim().is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Insight\n\n");
    for line in insight.lines() {
        section.push_str("> ");
        section.push_str(line);
        section.push('\n');
    }
    section.push('\n');
    section
}

/// Generate the hourly activity table.
fn generate_hourly_section(histogram: &HourlyHistogram) -> String {
    let mut section = String::new();

    section.push_str("## Hourly Activity (UTC)\n\n");
    section.push_str("| Hour | Events |\n");
    section.push_str("|:---:|---:|\n");
    for (hour, count) in histogram.iter().enumerate() {
        section.push_str(&format!("| {:02}:00 | {} |\n", hour, count));
    }
    section.push('\n');

    section
}

/// Generate the weekday x hour heatmap table.
fn generate_heatmap_section(heatmap: &WeekdayHourHeatmap) -> String {
    let mut section = String::new();

    section.push_str("## Weekly Heatmap (UTC)\n\n");

    section.push_str("| Day |");
    for hour in 0..HOURS_PER_DAY {
        section.push_str(&format!(" {:02} |", hour));
    }
    section.push('\n');

    section.push_str("|:---|");
    section.push_str(&"---:|".repeat(HOURS_PER_DAY));
    section.push('\n');

    for (day, row) in heatmap.iter().enumerate() {
        section.push_str(&format!("| {} |", WEEKDAY_LABELS[day]));
        for count in row {
            section.push_str(&format!(" {} |", count));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the country table.
fn generate_countries_section(countries: &[CountryCount], total: u64) -> String {
    let mut section = String::new();

    section.push_str("## Countries\n\n");

    if countries.is_empty() {
        section.push_str("No events were analyzed.\n\n");
        return section;
    }

    section.push_str("| Country | Events | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for entry in countries {
        let share = if total == 0 {
            0.0
        } else {
            entry.count as f64 * 100.0 / total as f64
        };
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            entry.code, entry.count, share
        ));
    }
    section.push('\n');

    section
}

/// Generate the contributor leaderboard.
fn generate_contributors_section(ranking: &[ContributorAggregate], filter: Option<&str>) -> String {
    let mut section = String::new();

    match filter {
        Some(country) => section.push_str(&format!("## Top Contributors ({})\n\n", country)),
        None => section.push_str("## Top Contributors\n\n"),
    }

    if ranking.is_empty() {
        section.push_str("No contributors match.\n\n");
        return section;
    }

    section.push_str("| # | Contributor | ID | Events | Last Seen |\n");
    section.push_str("|---:|:---|:---|---:|:---:|\n");
    for (i, contributor) in ranking.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | `{}` | {} | {} |\n",
            i + 1,
            contributor.display_name(),
            contributor.id,
            contributor.count,
            contributor.last_seen_country
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by geopulse v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate the JSON export document.
pub fn generate_json_report(document: &ExportDocument) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute;
    use crate::models::{ContributionEvent, LastSeenPolicy};
    use chrono::Utc;

    fn create_test_document(filter: Option<&str>, insight: Option<&str>) -> ExportDocument {
        let events = vec![
            ContributionEvent::new(1_700_000_000, "USA", "ada", "Ada Lovelace"),
            ContributionEvent::new(1_700_010_000, "GBR", "ada", "Ada Lovelace"),
            ContributionEvent::new(1_700_020_000, "", "grace", "Grace Hopper"),
        ];
        let metrics = compute(&events, filter, 5, 10);

        ExportDocument {
            metadata: ExportMetadata {
                subject: "octo/repo".to_string(),
                generated_at: Utc::now(),
                tool_version: "0.0.0-test".to_string(),
                event_count: events.len(),
                last_seen_policy: LastSeenPolicy::InputOrder,
            },
            metrics,
            insight: insight.map(str::to_string),
            events,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let document = create_test_document(None, None);
        let markdown = generate_markdown_report(&document, &MarkdownOptions::default());

        assert!(markdown.contains("# Collaboration Metrics Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("- **Subject:** octo/repo"));
        assert!(markdown.contains("## Scores"));
        assert!(markdown.contains("## Hourly Activity (UTC)"));
        assert!(markdown.contains("## Weekly Heatmap (UTC)"));
        assert!(markdown.contains("| unknown | 1 | 33.3% |"));
        assert!(markdown.contains("| 1 | Ada Lovelace | `ada` | 2 | GBR |"));
        assert!(!markdown.contains("## Insight"));
    }

    #[test]
    fn test_markdown_without_heatmap() {
        let document = create_test_document(None, None);
        let options = MarkdownOptions {
            include_heatmap: false,
        };
        let markdown = generate_markdown_report(&document, &options);

        assert!(!markdown.contains("Weekly Heatmap"));
    }

    #[test]
    fn test_markdown_filter_and_insight() {
        let document = create_test_document(Some("NOR"), Some("Activity is spread.\nMostly UTC."));
        let markdown = generate_markdown_report(&document, &MarkdownOptions::default());

        assert!(markdown.contains("- **Leaderboard Filter:** NOR"));
        assert!(markdown.contains("## Top Contributors (NOR)"));
        assert!(markdown.contains("No contributors match."));
        assert!(markdown.contains("> Activity is spread.\n> Mostly UTC.\n"));
    }

    #[test]
    fn test_heatmap_section_shape() {
        let mut heatmap = [[0u64; HOURS_PER_DAY]; 7];
        heatmap[2][13] = 4;
        let section = generate_heatmap_section(&heatmap);

        // Title, blank, header, separator, 7 rows.
        assert_eq!(section.lines().filter(|l| l.starts_with('|')).count(), 9);
        assert!(section.contains("| Tue |"));
    }

    #[test]
    fn test_generate_json_report() {
        let document = create_test_document(Some("GBR"), None);
        let json = generate_json_report(&document).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"histogram\""));
        assert!(json.contains("\"filter_country\": \"GBR\""));
        assert!(json.contains("\"events\""));
        assert!(!json.contains("\"insight\""));

        let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.metrics.total_events, 3);
        assert_eq!(
            parsed.metrics.country_distribution,
            document.metrics.country_distribution
        );
        assert_eq!(parsed.events, document.events);
    }
}
