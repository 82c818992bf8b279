use crate::adapters::bigtime::{BigTimeSettings, DEFAULT_BASE_URL, DEFAULT_BUDGET_CATEGORY_ID};
use crate::core::allocator::{AllocationSettings, DEFAULT_MAX_ATTEMPTS_PER_DAY};
use crate::core::engine::RunPlan;
use crate::core::output::OutputFormat;
use crate::core::scheduler::MIN_SUBMISSION_DELAY;
use crate::domain::model::DateRange;
use crate::utils::error::{Result, TimefillError};
use crate::utils::validation::{self, Validate};
use chrono::{Duration as DayDuration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub history: HistoryConfig,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub username: String,
    pub password: String,
    pub budget_category_id: Option<i64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub lookback_value: u32,
    pub lookback_unit: LookbackUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookbackUnit {
    Days,
    Weeks,
    Months,
    Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub window_days: usize,
    pub min_daily_hours: f64,
    pub max_daily_hours: f64,
    pub time_increment_minutes: u32,
    pub max_attempts_per_day: Option<usize>,
    pub seed: Option<u64>,
    /// Last day of the window; defaults to the run date.
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub excluded_projects: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionConfig {
    pub delay_ms: Option<u64>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Option<Vec<String>>,
}

impl LookbackUnit {
    /// `date` moved back by `value` units.
    pub fn subtract_from(&self, date: NaiveDate, value: u32) -> Option<NaiveDate> {
        match self {
            LookbackUnit::Days => date.checked_sub_signed(DayDuration::days(i64::from(value))),
            LookbackUnit::Weeks => date.checked_sub_signed(DayDuration::weeks(i64::from(value))),
            LookbackUnit::Months => date.checked_sub_months(Months::new(value)),
            LookbackUnit::Years => date.checked_sub_months(Months::new(value.checked_mul(12)?)),
        }
    }
}

impl FromStr for LookbackUnit {
    type Err = TimefillError;

    // 接受 d/w/M/y 縮寫、單數與複數單位名稱
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "d" | "day" | "days" => Ok(LookbackUnit::Days),
            "w" | "week" | "weeks" => Ok(LookbackUnit::Weeks),
            "M" | "month" | "months" => Ok(LookbackUnit::Months),
            "y" | "year" | "years" => Ok(LookbackUnit::Years),
            other => Err(TimefillError::InvalidConfigValueError {
                field: "history.lookback_unit".to_string(),
                value: other.to_string(),
                reason: "Expected days, weeks, months or years".to_string(),
            }),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TimefillError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TimefillError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BIGTIME_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TimefillError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("service.base_url", self.base_url())?;
        validation::validate_non_empty_string("service.username", &self.service.username)?;
        validation::validate_non_empty_string("service.password", &self.service.password)?;
        if self.service.username.starts_with("${") || self.service.password.starts_with("${") {
            return Err(TimefillError::MissingConfigError {
                field: "service.username/service.password (environment variable not set)"
                    .to_string(),
            });
        }

        validation::validate_positive_number(
            "history.lookback_value",
            self.history.lookback_value as usize,
            1,
        )?;
        validation::validate_range("generation.window_days", self.generation.window_days, 1, 366)?;
        validation::validate_hours_band(
            "generation.min_daily_hours",
            self.generation.min_daily_hours,
            "generation.max_daily_hours",
            self.generation.max_daily_hours,
        )?;
        validation::validate_time_increment(
            "generation.time_increment_minutes",
            self.generation.time_increment_minutes,
        )?;
        validation::validate_positive_number(
            "generation.max_attempts_per_day",
            self.max_attempts_per_day(),
            1,
        )?;

        if self.submission_delay() < MIN_SUBMISSION_DELAY {
            return Err(TimefillError::InvalidConfigValueError {
                field: "submission.delay_ms".to_string(),
                value: self.submission_delay().as_millis().to_string(),
                reason: format!(
                    "The service allows one request every {} ms",
                    MIN_SUBMISSION_DELAY.as_millis()
                ),
            });
        }

        validation::validate_path("output.path", &self.output.path)?;
        self.formats()?;

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.service.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn max_attempts_per_day(&self) -> usize {
        self.generation
            .max_attempts_per_day
            .unwrap_or(DEFAULT_MAX_ATTEMPTS_PER_DAY)
    }

    pub fn submission_delay(&self) -> Duration {
        self.submission
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(MIN_SUBMISSION_DELAY)
    }

    pub fn is_dry_run(&self) -> bool {
        self.submission.dry_run.unwrap_or(false)
    }

    pub fn formats(&self) -> Result<Vec<OutputFormat>> {
        match &self.output.formats {
            Some(formats) => formats.iter().map(|f| f.parse()).collect(),
            None => Ok(vec![OutputFormat::Json]),
        }
    }

    pub fn excluded_projects(&self) -> HashSet<String> {
        self.generation.excluded_projects.iter().cloned().collect()
    }

    pub fn bigtime_settings(&self) -> BigTimeSettings {
        BigTimeSettings {
            base_url: self.base_url().to_string(),
            username: self.service.username.clone(),
            password: self.service.password.clone(),
            budget_category_id: self
                .service
                .budget_category_id
                .unwrap_or(DEFAULT_BUDGET_CATEGORY_ID),
            timeout: Duration::from_secs(self.service.timeout_seconds.unwrap_or(30)),
        }
    }

    /// History runs from the lookback start up to the run date.
    pub fn history_range(&self, today: NaiveDate) -> Result<DateRange> {
        let start = self
            .history
            .lookback_unit
            .subtract_from(today, self.history.lookback_value)
            .ok_or_else(|| TimefillError::InvalidConfigValueError {
                field: "history.lookback_value".to_string(),
                value: self.history.lookback_value.to_string(),
                reason: "Lookback reaches outside the supported calendar".to_string(),
            })?;
        Ok(DateRange::new(start, today))
    }

    pub fn allocation_settings(&self, today: NaiveDate) -> AllocationSettings {
        AllocationSettings {
            window_days: self.generation.window_days,
            end_date: self.generation.end_date.unwrap_or(today),
            min_daily_hours: self.generation.min_daily_hours,
            max_daily_hours: self.generation.max_daily_hours,
            time_increment_minutes: self.generation.time_increment_minutes,
            max_attempts_per_day: self.max_attempts_per_day(),
        }
    }

    pub fn run_plan(&self, today: NaiveDate) -> Result<RunPlan> {
        Ok(RunPlan {
            history: self.history_range(today)?,
            allocation: self.allocation_settings(today),
            excluded_projects: self.excluded_projects(),
            formats: self.formats()?,
            dry_run: self.is_dry_run(),
            seed: self.generation.seed,
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
