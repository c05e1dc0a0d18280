//! Query layer - from master events to a renderable view
//!
//! # Module Structure
//!
//! - `options`: QueryWindow, ProcessOptions, LayoutScope
//! - `pipeline`: `process` and its ProcessedView result
//! - `cache`: QueryCache - LRU of processed views keyed by QueryKey

pub mod cache;
pub mod options;
pub mod pipeline;

pub use cache::{CacheStats, QueryCache, QueryKey, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use options::{LayoutScope, ProcessOptions, QueryWindow, DEFAULT_MAX_CANDIDATES};
pub use pipeline::{process, ProcessedView, RejectedEvent};
