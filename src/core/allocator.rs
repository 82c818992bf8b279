use crate::core::pool::WeightedPool;
use crate::domain::model::{
    minutes_to_hours, DateRange, DaySchedule, PreexistingWindow, ProjectSummary, TimeEntry,
};
use crate::utils::error::{Result, TimefillError};
use chrono::{Duration, NaiveDate};
use rand::Rng;

pub const DEFAULT_MAX_ATTEMPTS_PER_DAY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct AllocationSettings {
    /// Number of days to fill, counting back from `end_date`.
    pub window_days: usize,
    pub end_date: NaiveDate,
    pub min_daily_hours: f64,
    /// Exclusive upper bound for a day's total.
    pub max_daily_hours: f64,
    pub time_increment_minutes: u32,
    pub max_attempts_per_day: usize,
}

impl AllocationSettings {
    pub fn window(&self) -> DateRange {
        DateRange::ending_on(self.end_date, self.window_days)
    }

    /// Dates in the order they are filled, most recent first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.window_days).map(move |offset| self.end_date - Duration::days(offset as i64))
    }
}

/// Builds one schedule per day by repeated weighted draws until the day's
/// total reaches the minimum without ever reaching the maximum.
#[derive(Debug, Clone)]
pub struct DailyAllocator {
    settings: AllocationSettings,
}

impl DailyAllocator {
    pub fn new(settings: AllocationSettings) -> Result<Self> {
        let band_is_open = settings.min_daily_hours.partial_cmp(&settings.max_daily_hours)
            == Some(std::cmp::Ordering::Less);
        if !band_is_open {
            return Err(TimefillError::ConfigValidationError {
                field: "generation.min_daily_hours".to_string(),
                message: format!(
                    "band [{}, {}) is empty, no day can ever be filled",
                    settings.min_daily_hours, settings.max_daily_hours
                ),
            });
        }
        if settings.time_increment_minutes == 0 || 60 % settings.time_increment_minutes != 0 {
            return Err(TimefillError::InvalidConfigValueError {
                field: "generation.time_increment_minutes".to_string(),
                value: settings.time_increment_minutes.to_string(),
                reason: "Increment must divide 60 evenly".to_string(),
            });
        }
        if settings.max_attempts_per_day == 0 {
            return Err(TimefillError::InvalidConfigValueError {
                field: "generation.max_attempts_per_day".to_string(),
                value: "0".to_string(),
                reason: "At least one attempt per day is required".to_string(),
            });
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    pub fn allocate<R: Rng>(
        &self,
        pool: &WeightedPool<'_>,
        existing: &PreexistingWindow,
        rng: &mut R,
    ) -> Result<Vec<DaySchedule>> {
        self.settings
            .dates()
            .map(|date| self.fill_day(date, existing.hours_on(date), pool, rng))
            .collect()
    }

    pub fn fill_day<R: Rng>(
        &self,
        date: NaiveDate,
        existing_hours: f64,
        pool: &WeightedPool<'_>,
        rng: &mut R,
    ) -> Result<DaySchedule> {
        let min = self.settings.min_daily_hours;
        let max = self.settings.max_daily_hours;
        let mut day = DaySchedule::new(date, existing_hours);
        let mut minutes = 0u32;
        let mut attempts = 0;

        while day.total_with(minutes) < min {
            if attempts >= self.settings.max_attempts_per_day {
                tracing::warn!(
                    "⚠️ Gave up on {} at {:.2}h after {} attempts",
                    date,
                    day.total_with(minutes),
                    attempts
                );
                return Err(TimefillError::UnsatisfiableConstraintError {
                    date,
                    attempts,
                    min_hours: min,
                    max_hours: max,
                });
            }
            attempts += 1;

            let project = pool.draw(rng);
            let candidate = propose_minutes(project, self.settings.time_increment_minutes, rng);

            // 零小時的項目服務端會拒絕，也不會讓當天前進
            if candidate == 0 || day.total_with(minutes + candidate) >= max {
                continue;
            }

            day.push(TimeEntry::from_template(project, date, minutes_to_hours(candidate)));
            minutes += candidate;
        }

        tracing::debug!(
            "📅 {}: {} entries, {:.2}h existing + {:.2}h synthesized ({} attempts)",
            date,
            day.entries.len(),
            existing_hours,
            day.synthesized_hours(),
            attempts
        );

        Ok(day)
    }
}

/// Candidate duration in minutes: the project's average entry size rounded
/// up or down with equal odds, plus a random whole number of increments
/// below one hour.
pub fn propose_minutes<R: Rng>(project: &ProjectSummary, increment_minutes: u32, rng: &mut R) -> u32 {
    let whole_hours = if rng.random_bool(0.5) {
        project.average_entry_hours.ceil()
    } else {
        project.average_entry_hours.floor()
    };
    let increments = rng.random_range(0..60 / increment_minutes);

    whole_hours.max(0.0) as u32 * 60 + increments * increment_minutes
}
