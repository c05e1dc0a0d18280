//! calgrid - Entry Point

use calgrid::config::{self, CliOverrides};
use calgrid::model::{AppError, MasterEvent};
use calgrid::processor::{Processor, TaskId, TaskRequest};
use calgrid::query::{LayoutScope, ProcessOptions, QueryWindow, RejectedEvent};
use calgrid::recurrence::validate;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// calgrid - expand recurring events and lay them out for a time window
#[derive(Parser, Debug)]
#[command(name = "calgrid")]
#[command(version)]
#[command(about = "Expand recurring calendar events and compute their column layout")]
pub struct Args {
    /// Path to a JSON or JSON Lines file of master events (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Start of the query window (RFC 3339)
    #[arg(long, required_unless_present = "validate")]
    pub from: Option<DateTime<Utc>>,

    /// End of the query window, exclusive (RFC 3339)
    #[arg(long, required_unless_present = "validate")]
    pub to: Option<DateTime<Utc>>,

    /// Safety cap on recurrence steps per event
    #[arg(long)]
    pub max_occurrences: Option<usize>,

    /// Skip column assignment
    #[arg(long)]
    pub no_layout: bool,

    /// Annotate overlapping occurrences
    #[arg(long)]
    pub conflicts: bool,

    /// Lay out each UTC day separately (week view)
    #[arg(long)]
    pub per_day: bool,

    /// Process on the calling thread instead of the worker pool
    #[arg(long)]
    pub inline: bool,

    /// Only validate recurrence rules and report problems
    #[arg(long)]
    pub validate: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to log file (overrides config)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            max_occurrences: self.max_occurrences,
            inline: self.inline,
            log_file_path: self.log_file.clone(),
        }
    }

    fn apply_to(&self, mut options: ProcessOptions) -> ProcessOptions {
        options.assign_columns = !self.no_layout;
        options.detect_conflicts = self.conflicts;
        if self.per_day {
            options.layout_scope = LayoutScope::PerDay;
        }
        options
    }
}

/// Rule problems for every master event that has any.
fn rejected_events(events: &[MasterEvent]) -> Vec<RejectedEvent> {
    events
        .iter()
        .filter_map(|event| {
            let problems = validate(event.recurrence.as_ref()?);
            (!problems.is_empty()).then(|| RejectedEvent {
                id: event.id.clone(),
                problems,
            })
        })
        .collect()
}

fn write_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = config::resolve(args.config.clone(), args.cli_overrides())?;

    calgrid::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let events = calgrid::source::load_events(args.file.as_deref())?;
    info!(count = events.len(), "Loaded master events");

    if args.validate {
        let rejected = rejected_events(&events);
        write_json(&rejected)?;
        if !rejected.is_empty() {
            return Err(AppError::InvalidRules {
                count: rejected.len(),
            });
        }
        return Ok(());
    }

    let (Some(from), Some(to)) = (args.from, args.to) else {
        return Err(AppError::MissingWindow);
    };
    let window = QueryWindow::new(from, to)?;
    let options = args.apply_to(config.process_options());

    let processor = Processor::select(&config.processor_config());
    info!(status = ?processor.status(), "Processor selected");

    let response = processor.run(TaskRequest::new(TaskId::new(0), events, window, options));
    let view = response.result.map_err(Box::new)?;

    if !view.rejected.is_empty() {
        tracing::warn!(count = view.rejected.len(), "Some events were skipped");
    }

    write_json(&view)
}
