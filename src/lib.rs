//! calgrid
//!
//! Rendering-agnostic calendar core: expands recurring events into concrete
//! occurrences for a time window, assigns them side-by-side columns, flags
//! overlaps, and windows long variable-height lists for virtual scrolling.
//!
//! The pure core (`model`, `recurrence`, `layout`, `view_state`, `query`) has
//! no I/O. `processor` adds the worker pool; `config`, `logging` and `source`
//! form the shell used by the `calgrid` binary.

pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod processor;
pub mod query;
pub mod recurrence;
pub mod source;
pub mod view_state;
