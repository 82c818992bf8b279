use crate::domain::model::TimeEntry;
use crate::domain::ports::EntrySubmitter;
use crate::utils::error::{Result, TimefillError};
use std::time::Duration;
use tokio::time::Instant;

/// The service accepts one request every two seconds.
pub const MIN_SUBMISSION_DELAY: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub submitted: usize,
    pub elapsed: Duration,
}

/// Submits entries strictly one at a time, pausing after each success.
///
/// The first failure stops the queue. Entries that were already accepted
/// stay on the service; nothing after the failing entry is attempted.
pub struct SubmissionScheduler<S: EntrySubmitter> {
    submitter: S,
    delay: Duration,
}

impl<S: EntrySubmitter> SubmissionScheduler<S> {
    pub fn new(submitter: S, delay: Duration) -> Self {
        Self { submitter, delay }
    }

    pub async fn run(&self, entries: &[TimeEntry]) -> Result<SubmissionReport> {
        let started = Instant::now();
        let total = entries.len();
        tracing::info!(
            "📤 Submitting {} entries ({:?} between requests)",
            total,
            self.delay
        );

        for (index, entry) in entries.iter().enumerate() {
            tracing::debug!(
                "📤 {}/{}: {} {} ({}h)",
                index + 1,
                total,
                entry.date,
                entry.project_name,
                entry.hours
            );

            if let Err(e) = self.submitter.submit(entry).await {
                tracing::error!("❌ Entry {}/{} rejected: {}", index + 1, total, e);
                return Err(TimefillError::SubmissionError {
                    index,
                    submitted: index,
                    message: e.to_string(),
                });
            }

            if index + 1 < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        tracing::info!("✅ Submitted {} entries", total);
        Ok(SubmissionReport {
            submitted: total,
            elapsed: started.elapsed(),
        })
    }
}
