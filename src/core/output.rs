use crate::domain::model::{DaySchedule, TimeEntry};
use crate::utils::error::{Result, TimefillError};
use chrono::{DateTime, Local};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TimefillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(TimefillError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, csv".to_string(),
            }),
        }
    }
}

/// `YYYY-MM-DD-<unix millis>`, unique per run.
pub fn result_stem(now: DateTime<Local>) -> String {
    format!("{}-{}", now.format("%Y-%m-%d"), now.timestamp_millis())
}

/// One inner array per day, in fill order.
pub fn render_json(days: &[DaySchedule]) -> Result<Vec<u8>> {
    let nested: Vec<&[TimeEntry]> = days.iter().map(|d| d.entries.as_slice()).collect();
    Ok(serde_json::to_vec_pretty(&nested)?)
}

pub fn render_csv(days: &[DaySchedule]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "date",
        "projectId",
        "projectName",
        "clientName",
        "clientId",
        "hours",
    ])?;

    for entry in days.iter().flat_map(|d| d.entries.iter()) {
        writer.write_record([
            entry.date.to_string(),
            entry.project_id.to_string(),
            entry.project_name.clone(),
            entry.client_name.clone().unwrap_or_default(),
            entry.client_id.map(|id| id.to_string()).unwrap_or_default(),
            entry.hours.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| TimefillError::IoError(e.into_error()))
}

pub fn render(format: OutputFormat, days: &[DaySchedule]) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => render_json(days),
        OutputFormat::Csv => render_csv(days),
    }
}
