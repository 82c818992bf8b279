use crate::config::toml_config::{
    AppConfig, GenerationConfig, HistoryConfig, OutputConfig, ServiceConfig, SubmissionConfig,
};
use crate::utils::error::{Result, TimefillError};
use std::str::FromStr;

impl AppConfig {
    /// Builds the configuration from `BIGTIME_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TimefillError::MissingConfigError {
                    field: key.to_string(),
                })
        };

        Ok(Self {
            service: ServiceConfig {
                base_url: lookup("BIGTIME_BASE_URL"),
                username: required("BIGTIME_USERNAME")?,
                password: required("BIGTIME_PASSWORD")?,
                budget_category_id: optional_parsed(&lookup, "BIGTIME_BUDGET_CATEGORY_ID")?,
                timeout_seconds: optional_parsed(&lookup, "BIGTIME_TIMEOUT_SECONDS")?,
            },
            history: HistoryConfig {
                lookback_value: parsed(
                    "BIGTIME_SAMPLE_DATA_START_VALUE",
                    &required("BIGTIME_SAMPLE_DATA_START_VALUE")?,
                )?,
                lookback_unit: required("BIGTIME_SAMPLE_DATA_START_KEY")?.parse()?,
            },
            generation: GenerationConfig {
                window_days: parsed(
                    "BIGTIME_SAMPLE_NUM_ENTRIES",
                    &required("BIGTIME_SAMPLE_NUM_ENTRIES")?,
                )?,
                min_daily_hours: parsed(
                    "BIGTIME_SAMPLE_MIN_DAILY_HOURS",
                    &required("BIGTIME_SAMPLE_MIN_DAILY_HOURS")?,
                )?,
                max_daily_hours: parsed(
                    "BIGTIME_SAMPLE_MAX_DAILY_HOURS",
                    &required("BIGTIME_SAMPLE_MAX_DAILY_HOURS")?,
                )?,
                time_increment_minutes: parsed(
                    "BIGTIME_SAMPLE_TIME_INCREMENT_MINUTES",
                    &required("BIGTIME_SAMPLE_TIME_INCREMENT_MINUTES")?,
                )?,
                max_attempts_per_day: optional_parsed(&lookup, "BIGTIME_SAMPLE_MAX_ATTEMPTS")?,
                seed: optional_parsed(&lookup, "BIGTIME_SAMPLE_SEED")?,
                end_date: optional_parsed(&lookup, "BIGTIME_SAMPLE_END_DATE")?,
                excluded_projects: lookup("BIGTIME_EXCLUDED_PROJECTS")
                    .map(|list| split_list(&list))
                    .unwrap_or_default(),
            },
            submission: SubmissionConfig {
                delay_ms: optional_parsed(&lookup, "BIGTIME_SUBMIT_DELAY_MS")?,
                dry_run: optional_parsed(&lookup, "BIGTIME_DRY_RUN")?,
            },
            output: OutputConfig {
                path: lookup("BIGTIME_RESULTS_PATH").unwrap_or_else(|| "./results".to_string()),
                formats: lookup("BIGTIME_RESULTS_FORMATS").map(|list| split_list(&list)),
            },
        })
    }
}

fn parsed<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| TimefillError::InvalidConfigValueError {
            field: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn optional_parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => parsed(key, &value).map(Some),
        _ => Ok(None),
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
