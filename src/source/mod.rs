//! Master event input.
//!
//! Events arrive as JSON, either one array or one event per line (JSON
//! Lines), from a file or from piped stdin. Input is read once; there is no
//! live tailing.

use crate::model::MasterEvent;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading master events.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The given events file does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path as given.
        path: PathBuf,
    },

    /// Stdin is a terminal and no file was given.
    #[error("No input: pass a file or pipe events on stdin")]
    NoInput,

    /// Reading the input failed.
    #[error("Failed to read {origin}: {source}")]
    Io {
        /// File path or `stdin`.
        origin: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// `line` is 1-based; 0 means the whole document was parsed as an array.
    #[error("Invalid event JSON in {origin} at line {line}: {source}")]
    Parse {
        /// File path or `stdin`.
        origin: String,
        /// Offending line.
        line: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Loads events from `file`, or from stdin when `file` is `None`.
///
/// # Errors
///
/// Returns `SourceError::NoInput` if no file is given and stdin is a
/// terminal, `SourceError::FileNotFound` for a missing file, and read or
/// parse errors otherwise.
pub fn load_events(file: Option<&Path>) -> Result<Vec<MasterEvent>, SourceError> {
    match file {
        Some(path) => load_file(path),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(SourceError::NoInput);
            }
            read_events(stdin.lock(), "stdin")
        }
    }
}

/// Loads events from a file.
///
/// # Errors
///
/// Returns `SourceError::FileNotFound` if the path does not exist.
pub fn load_file(path: &Path) -> Result<Vec<MasterEvent>, SourceError> {
    if !path.exists() {
        return Err(SourceError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|source| SourceError::Io {
        origin: path.display().to_string(),
        source,
    })?;
    read_events(file, &path.display().to_string())
}

/// Reads every event from `reader`. `origin` names the input in errors.
///
/// # Errors
///
/// Returns `SourceError::Io` on read failure and `SourceError::Parse` on the
/// first malformed event.
pub fn read_events<R: Read>(mut reader: R, origin: &str) -> Result<Vec<MasterEvent>, SourceError> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|source| SourceError::Io {
            origin: origin.to_string(),
            source,
        })?;
    parse_events(&contents, origin)
}

fn parse_events(contents: &str, origin: &str) -> Result<Vec<MasterEvent>, SourceError> {
    if contents.trim_start().starts_with('[') {
        let events: Vec<MasterEvent> =
            serde_json::from_str(contents).map_err(|source| SourceError::Parse {
                origin: origin.to_string(),
                line: 0,
                source,
            })?;
        tracing::debug!(origin, count = events.len(), "loaded event array");
        return Ok(events);
    }

    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|source| SourceError::Parse {
            origin: origin.to_string(),
            line: index + 1,
            source,
        })?;
        events.push(event);
    }
    tracing::debug!(origin, count = events.len(), "loaded event lines");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const STANDUP: &str = r#"{"id":"standup","interval":{"start":"2024-03-04T09:00:00Z","end":"2024-03-04T09:15:00Z"},"recurrence":"FREQ=WEEKLY;BYDAY=MO,WE,FR"}"#;
    const DENTIST: &str = r#"{"id":"dentist","interval":{"start":"2024-03-05T14:00:00Z","end":"2024-03-05T15:00:00Z"}}"#;

    #[test]
    fn reads_json_array() {
        let input = format!("[\n  {STANDUP},\n  {DENTIST}\n]\n");
        let events = read_events(input.as_bytes(), "test").unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].is_recurring());
        assert_eq!(events[1].id.as_str(), "dentist");
    }

    #[test]
    fn reads_json_lines_skipping_blanks() {
        let input = format!("{STANDUP}\n\n{DENTIST}\n");
        let events = read_events(input.as_bytes(), "test").unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["standup", "dentist"]);
    }

    #[test]
    fn empty_input_has_no_events() {
        assert!(read_events(&b""[..], "test").unwrap().is_empty());
    }

    #[test]
    fn parse_error_reports_line() {
        let input = format!("{STANDUP}\n{{\"id\":\"broken\"}}\n");
        match read_events(input.as_bytes(), "events.jsonl") {
            Err(SourceError::Parse { origin, line, .. }) => {
                assert_eq!(origin, "events.jsonl");
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn inverted_interval_is_a_parse_error() {
        let input = r#"[{"id":"x","interval":{"start":"2024-03-05T15:00:00Z","end":"2024-03-05T14:00:00Z"}}]"#;
        assert!(matches!(
            read_events(input.as_bytes(), "test"),
            Err(SourceError::Parse { line: 0, .. })
        ));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let path = Path::new("/nonexistent/calgrid/events.json");
        let err = load_events(Some(path)).unwrap_err();
        assert!(matches!(err, SourceError::FileNotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/calgrid/events.json"));
    }

    #[test]
    fn loads_events_from_file() {
        let path = std::env::temp_dir().join(format!("calgrid_source_{}.json", std::process::id()));
        fs::write(&path, format!("[{DENTIST}]")).unwrap();

        let events = load_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_str(), "dentist");
    }
}
