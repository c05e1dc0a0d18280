//! Domain model types (pure).
//!
//! All types in this module are plain data with smart constructors.

pub mod error;
pub mod event;
pub mod identifiers;
pub mod interval;

// Re-export for convenience
pub use error::AppError;
pub use event::{MasterEvent, Occurrence};
pub use identifiers::{EventId, InstanceKey, InvalidEventId};
pub use interval::{Interval, IntervalError};
