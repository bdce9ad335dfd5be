//! Event sources.
//!
//! The metrics core takes an already-collected batch of events. This module
//! provides the seam for supplying that batch and a file-backed
//! implementation reading JSON arrays or JSON lines.

use crate::models::ContributionEvent;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File extensions recognized as event files.
pub const EVENT_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson"];

/// Supplies a finite batch of contribution events.
pub trait EventSource {
    /// Short human-readable description of where events come from.
    fn describe(&self) -> String;

    /// Load all events. Order is preserved as read.
    fn load(&self) -> Result<Vec<ContributionEvent>>;
}

/// Reads events from a file or from every event file under a directory.
#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// List the event files this source would read, in sorted path order.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        if !self.path.is_dir() {
            return Err(anyhow::anyhow!(
                "Event input not found: {}",
                self.path.display()
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let hidden = entry
                .file_name()
                .to_str()
                .map_or(false, |name| name.starts_with('.'));
            if entry.file_type().is_file() && !hidden && has_event_extension(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }
}

impl EventSource for FileEventSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<ContributionEvent>> {
        let files = self.files()?;
        let mut events = Vec::new();

        for file in &files {
            let loaded = load_file(file)?;
            debug!("Loaded {} events from {}", loaded.len(), file.display());
            events.extend(loaded);
        }

        info!("Loaded {} events from {} file(s)", events.len(), files.len());
        Ok(events)
    }
}

/// In-memory source, mostly useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticEventSource {
    events: Vec<ContributionEvent>,
}

impl StaticEventSource {
    pub fn new(events: Vec<ContributionEvent>) -> Self {
        Self { events }
    }
}

impl EventSource for StaticEventSource {
    fn describe(&self) -> String {
        format!("{} in-memory events", self.events.len())
    }

    fn load(&self) -> Result<Vec<ContributionEvent>> {
        Ok(self.events.clone())
    }
}

/// Parse one event file.
///
/// Content starting with `[` is read as a JSON array; anything else as JSON
/// lines, where blank lines are skipped.
pub fn load_file(path: &Path) -> Result<Vec<ContributionEvent>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file: {}", path.display()))?;
    parse_events(&content).with_context(|| format!("Failed to parse events in {}", path.display()))
}

/// Parse events from a JSON array or JSON-lines string.
pub fn parse_events(content: &str) -> Result<Vec<ContributionEvent>> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Invalid JSON event array");
    }

    let mut events = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: ContributionEvent = serde_json::from_str(line)
            .with_context(|| format!("Invalid event on line {}", number + 1))?;
        events.push(event);
    }
    Ok(events)
}

fn has_event_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            EVENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LINES: &str = r#"
{"timestamp_utc_seconds": 1700000000, "country_code": "USA", "contributor_id": "a", "contributor_name": "A"}

{"timestampUtcSeconds": 1700003600, "countryCode": "", "contributorId": "b", "contributorName": "B"}
"#;

    #[test]
    fn test_parse_json_lines() {
        let events = parse_events(LINES).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].country_code, "USA");
        assert_eq!(events[1].contributor_id, "b");
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#"  [
            {"timestamp": 10, "country": "IND", "contributor_id": "x"},
            {"timestamp": 20, "contributor_id": "y"}
        ]"#;

        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp_utc_seconds, 10);
        assert_eq!(events[0].country_code, "IND");
        assert_eq!(events[1].country_code, "");
    }

    #[test]
    fn test_parse_error_names_line() {
        let content = "{\"timestamp\": 1, \"contributor_id\": \"a\"}\nnot json\n";
        let err = parse_events(content).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_directory_source_reads_sorted_event_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.jsonl"),
            "{\"timestamp\": 2, \"contributor_id\": \"second\"}\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested").join("c.json"),
            "[{\"timestamp\": 3, \"contributor_id\": \"third\"}]",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            "[{\"timestamp\": 1, \"contributor_id\": \"first\"}]",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join(".hidden.json"), "garbage").unwrap();

        let source = FileEventSource::new(dir.path());
        let events = source.load().unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.contributor_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_single_file_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.ndjson");
        fs::write(&path, LINES).unwrap();

        let source = FileEventSource::new(&path);
        assert_eq!(source.files().unwrap(), vec![path.clone()]);
        assert_eq!(source.load().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let source = FileEventSource::new(dir.path().join("missing.json"));
        assert!(source.load().is_err());
    }

    #[test]
    fn test_static_source() {
        let source = StaticEventSource::new(vec![ContributionEvent::new(1, "USA", "a", "A")]);
        assert_eq!(source.load().unwrap().len(), 1);
        assert_eq!(source.describe(), "1 in-memory events");
    }
}
