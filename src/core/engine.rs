use crate::core::aggregate::{AggregateMeta, HistoricalAggregator};
use crate::core::allocator::{AllocationSettings, DailyAllocator};
use crate::core::output::{self, OutputFormat};
use crate::core::pool::WeightedPool;
use crate::core::scheduler::SubmissionScheduler;
use crate::domain::model::{DateRange, DaySchedule, PreexistingWindow, TimeEntry};
use crate::domain::ports::{EntrySubmitter, Storage, TimesheetSource};
use crate::utils::error::{Result, TimefillError};
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Everything one batch run needs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub history: DateRange,
    pub allocation: AllocationSettings,
    pub excluded_projects: HashSet<String>,
    pub formats: Vec<OutputFormat>,
    pub dry_run: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_paths: Vec<String>,
    pub days: Vec<DaySchedule>,
    pub entries_generated: usize,
    pub entries_submitted: usize,
    pub history: AggregateMeta,
}

pub struct SynthesisEngine<Src, Sub, St>
where
    Src: TimesheetSource,
    Sub: EntrySubmitter,
    St: Storage,
{
    source: Src,
    scheduler: SubmissionScheduler<Sub>,
    storage: St,
    plan: RunPlan,
}

impl<Src, Sub, St> SynthesisEngine<Src, Sub, St>
where
    Src: TimesheetSource,
    Sub: EntrySubmitter,
    St: Storage,
{
    pub fn new(source: Src, scheduler: SubmissionScheduler<Sub>, storage: St, plan: RunPlan) -> Self {
        Self {
            source,
            scheduler,
            storage,
            plan,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting timesheet synthesis");

        // Fails on a bad band before touching the network
        let allocator = DailyAllocator::new(self.plan.allocation.clone())?;

        // Extract
        tracing::info!(
            "📥 Fetching history {} → {}",
            self.plan.history.start,
            self.plan.history.end
        );
        let history = self
            .source
            .fetch_range(self.plan.history)
            .await
            .map_err(upstream("historical timesheets"))?;
        tracing::info!("📊 Fetched {} historical entries", history.len());

        // Transform
        let aggregate = HistoricalAggregator::aggregate(history)?;
        tracing::info!(
            "📊 {} projects over {} days, {:.2}h per day on average",
            aggregate.meta.project_count,
            aggregate.meta.date_count,
            aggregate.meta.average_daily_hours
        );
        let pool = WeightedPool::build(aggregate.projects(), &self.plan.excluded_projects)?;

        let window = allocator.settings().window();
        tracing::info!("📥 Fetching already logged time {} → {}", window.start, window.end);
        let preexisting = self
            .source
            .fetch_range(window)
            .await
            .map_err(upstream("pre-existing window"))?;
        let existing = PreexistingWindow::from_entries(&preexisting);
        tracing::debug!("{} entries already logged in window", existing.entry_count());

        let days = {
            let mut rng = match self.plan.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            allocator.allocate(&pool, &existing, &mut rng)?
        };
        let entries: Vec<TimeEntry> = days.iter().flat_map(|d| d.entries.clone()).collect();
        tracing::info!(
            "🔧 Generated {} entries across {} days",
            entries.len(),
            days.len()
        );

        // Load
        let output_paths = self.persist(&days).await?;

        let entries_submitted = if self.plan.dry_run {
            tracing::info!("🔍 DRY RUN - skipping submission of {} entries", entries.len());
            0
        } else {
            self.scheduler.run(&entries).await?.submitted
        };

        Ok(RunSummary {
            output_paths,
            entries_generated: entries.len(),
            entries_submitted,
            days,
            history: aggregate.meta,
        })
    }

    async fn persist(&self, days: &[DaySchedule]) -> Result<Vec<String>> {
        let stem = output::result_stem(Local::now());
        let mut paths = Vec::with_capacity(self.plan.formats.len());

        for format in &self.plan.formats {
            let data = output::render(*format, days)?;
            let file_name = format!("{}.{}", stem, format.extension());
            tracing::debug!("Writing {} ({} bytes)", file_name, data.len());
            let path = self.storage.write_file(&file_name, &data).await?;
            tracing::info!("💾 Saved results to {}", path);
            paths.push(path);
        }

        Ok(paths)
    }
}

fn upstream(stage: &'static str) -> impl FnOnce(TimefillError) -> TimefillError {
    move |e| TimefillError::UpstreamFetchError {
        stage: stage.to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::allocator::DEFAULT_MAX_ATTEMPTS_PER_DAY;
    use crate::domain::model::RawEntry;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(path.to_string())
        }
    }

    struct MockSource {
        history: Vec<RawEntry>,
        existing: Vec<RawEntry>,
        fail_history: bool,
        requested: Arc<Mutex<Vec<DateRange>>>,
    }

    #[async_trait]
    impl TimesheetSource for MockSource {
        async fn fetch_range(&self, range: DateRange) -> Result<Vec<RawEntry>> {
            let mut requested = self.requested.lock().await;
            requested.push(range);
            if requested.len() == 1 {
                if self.fail_history {
                    return Err(TimefillError::ApiStatusError {
                        status: 503,
                        body: "unavailable".to_string(),
                    });
                }
                return Ok(self.history.clone());
            }
            Ok(self.existing.clone())
        }
    }

    #[derive(Clone, Default)]
    struct MockSubmitter {
        submitted: Arc<Mutex<Vec<TimeEntry>>>,
    }

    #[async_trait]
    impl EntrySubmitter for MockSubmitter {
        async fn submit(&self, entry: &TimeEntry) -> Result<()> {
            self.submitted.lock().await.push(entry.clone());
            Ok(())
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn raw(project_sid: i64, name: &str, day: u32, hours: f64) -> RawEntry {
        RawEntry {
            project_sid,
            project_name: name.to_string(),
            client_name: Some("Client".to_string()),
            client_id: Some(1),
            date: date(day),
            hours,
        }
    }

    fn plan(dry_run: bool) -> RunPlan {
        RunPlan {
            history: DateRange::new(date(1), date(10)),
            allocation: AllocationSettings {
                window_days: 3,
                end_date: date(20),
                min_daily_hours: 6.0,
                max_daily_hours: 8.0,
                time_increment_minutes: 15,
                max_attempts_per_day: DEFAULT_MAX_ATTEMPTS_PER_DAY,
            },
            excluded_projects: ["Vacation".to_string()].into_iter().collect(),
            formats: vec![OutputFormat::Json, OutputFormat::Csv],
            dry_run,
            seed: Some(1234),
        }
    }

    fn source(fail_history: bool) -> (MockSource, Arc<Mutex<Vec<DateRange>>>) {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let history = (1..=10)
            .flat_map(|d| vec![raw(1, "Alpha", d, 2.0), raw(2, "Vacation", d, 8.0)])
            .collect();
        (
            MockSource {
                history,
                existing: vec![raw(1, "Alpha", 20, 3.0)],
                fail_history,
                requested: requested.clone(),
            },
            requested,
        )
    }

    #[tokio::test]
    async fn test_run_generates_persists_and_submits() {
        let (source, requested) = source(false);
        let submitter = MockSubmitter::default();
        let storage = MockStorage::new();
        let scheduler = SubmissionScheduler::new(submitter.clone(), Duration::ZERO);
        let engine = SynthesisEngine::new(source, scheduler, storage.clone(), plan(false));

        let summary = engine.run().await.unwrap();

        let requested = requested.lock().await;
        assert_eq!(requested[0], DateRange::new(date(1), date(10)));
        assert_eq!(requested[1], DateRange::new(date(18), date(20)));

        assert_eq!(summary.days.len(), 3);
        assert_eq!(summary.days[0].existing_hours, 3.0);
        assert_eq!(summary.entries_submitted, summary.entries_generated);
        assert_eq!(summary.output_paths.len(), 2);
        assert_eq!(storage.files.lock().await.len(), 2);

        let submitted = submitter.submitted.lock().await;
        assert!(submitted.iter().all(|e| e.project_name == "Alpha"));
        let expected: Vec<TimeEntry> = summary
            .days
            .iter()
            .flat_map(|d| d.entries.clone())
            .collect();
        assert_eq!(*submitted, expected);
    }

    #[tokio::test]
    async fn test_dry_run_skips_submission() {
        let (source, _) = source(false);
        let submitter = MockSubmitter::default();
        let scheduler = SubmissionScheduler::new(submitter.clone(), Duration::ZERO);
        let engine = SynthesisEngine::new(source, scheduler, MockStorage::new(), plan(true));

        let summary = engine.run().await.unwrap();

        assert!(summary.entries_generated > 0);
        assert_eq!(summary.entries_submitted, 0);
        assert!(submitter.submitted.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_aborts_before_generation() {
        let (source, requested) = source(true);
        let submitter = MockSubmitter::default();
        let storage = MockStorage::new();
        let scheduler = SubmissionScheduler::new(submitter.clone(), Duration::ZERO);
        let engine = SynthesisEngine::new(source, scheduler, storage.clone(), plan(false));

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, TimefillError::UpstreamFetchError { .. }));
        assert_eq!(requested.lock().await.len(), 1);
        assert!(storage.files.lock().await.is_empty());
        assert!(submitter.submitted.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_band_fails_before_fetching() {
        let (source, requested) = source(false);
        let mut bad = plan(false);
        bad.allocation.max_daily_hours = bad.allocation.min_daily_hours;
        let scheduler = SubmissionScheduler::new(MockSubmitter::default(), Duration::ZERO);
        let engine = SynthesisEngine::new(source, scheduler, MockStorage::new(), bad);

        let err = engine.run().await.unwrap_err();

        assert!(err.is_configuration_error());
        assert!(requested.lock().await.is_empty());
    }
}
