pub mod aggregate;
pub mod allocator;
pub mod engine;
pub mod output;
pub mod pool;
pub mod scheduler;

pub use crate::domain::model::{DateRange, DaySchedule, PreexistingWindow, ProjectSummary, RawEntry, TimeEntry};
pub use crate::domain::ports::{EntrySubmitter, Storage, TimesheetSource};
pub use crate::utils::error::Result;
