use crate::domain::model::{DateRange, RawEntry, TimeEntry};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Supplies logged timesheet rows for a date range.
#[async_trait]
pub trait TimesheetSource: Send + Sync {
    async fn fetch_range(&self, range: DateRange) -> Result<Vec<RawEntry>>;
}

/// Creates one entry on the remote service.
#[async_trait]
pub trait EntrySubmitter: Send + Sync {
    async fn submit(&self, entry: &TimeEntry) -> Result<()>;
}
