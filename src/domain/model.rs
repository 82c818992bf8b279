use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One timesheet row as the time-tracking service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(rename = "ProjectSID")]
    pub project_sid: i64,
    #[serde(rename = "ProjectNm")]
    pub project_name: String,
    #[serde(rename = "ClientNm", default)]
    pub client_name: Option<String>,
    #[serde(rename = "ClientID", default)]
    pub client_id: Option<i64>,
    #[serde(rename = "Dt", deserialize_with = "deserialize_service_date")]
    pub date: NaiveDate,
    #[serde(rename = "Hours_IN")]
    pub hours: f64,
}

// 服務端有時回傳 "2024-03-04T00:00:00"，只取日期部分
fn deserialize_service_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// A logged or synthesized unit of time against one project on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub project_id: i64,
    pub project_name: String,
    pub client_name: Option<String>,
    pub client_id: Option<i64>,
    pub hours: f64,
}

impl TimeEntry {
    /// Copies the project template onto a new date with a new duration.
    pub fn from_template(project: &ProjectSummary, date: NaiveDate, hours: f64) -> Self {
        Self {
            date,
            project_id: project.project_id,
            project_name: project.project_name.clone(),
            client_name: project.client_name.clone(),
            client_id: project.client_id,
            hours,
        }
    }

    /// Duration in whole minutes. Synthesized entries always sit on a minute grid.
    pub fn minutes(&self) -> u32 {
        (self.hours * 60.0).round().max(0.0) as u32
    }
}

pub fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: i64,
    pub project_name: String,
    pub client_name: Option<String>,
    pub client_id: Option<i64>,
    pub total_hours: f64,
    pub total_entries: usize,
    pub average_entry_hours: f64,
}

/// Synthesized entries for a single calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub existing_hours: f64,
    pub entries: Vec<TimeEntry>,
}

impl DaySchedule {
    pub fn new(date: NaiveDate, existing_hours: f64) -> Self {
        Self {
            date,
            existing_hours,
            entries: Vec::new(),
        }
    }

    pub fn synthesized_minutes(&self) -> u32 {
        self.entries.iter().map(TimeEntry::minutes).sum()
    }

    pub fn synthesized_hours(&self) -> f64 {
        minutes_to_hours(self.synthesized_minutes())
    }

    pub fn total_hours(&self) -> f64 {
        self.total_with(self.synthesized_minutes())
    }

    /// The day's total if `synthesized_minutes` of new time were on it.
    /// Band checks and reported totals both go through here so they agree.
    pub fn total_with(&self, synthesized_minutes: u32) -> f64 {
        self.existing_hours + minutes_to_hours(synthesized_minutes)
    }

    /// Day total after each entry, in order.
    pub fn running_totals(&self) -> Vec<f64> {
        self.entries
            .iter()
            .scan(0u32, |minutes, entry| {
                *minutes += entry.minutes();
                Some(self.total_with(*minutes))
            })
            .collect()
    }

    pub(crate) fn push(&mut self, entry: TimeEntry) {
        self.entries.push(entry);
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` calendar days ending on `end`.
    pub fn ending_on(end: NaiveDate, days: usize) -> Self {
        let span = days.saturating_sub(1) as i64;
        Self {
            start: end - Duration::days(span),
            end,
        }
    }
}

/// Hours already logged in the synthesis window, keyed by date.
#[derive(Debug, Clone, Default)]
pub struct PreexistingWindow {
    hours_by_date: HashMap<NaiveDate, f64>,
    entry_count: usize,
}

impl PreexistingWindow {
    pub fn from_entries(entries: &[RawEntry]) -> Self {
        let mut hours_by_date = HashMap::new();
        for entry in entries {
            *hours_by_date.entry(entry.date).or_insert(0.0) += entry.hours;
        }
        Self {
            hours_by_date,
            entry_count: entries.len(),
        }
    }

    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        self.hours_by_date.get(&date).copied().unwrap_or(0.0)
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_raw_entry_parses_service_payload() {
        let payload = serde_json::json!([
            {"ProjectSID": 12, "ProjectNm": "Acme:Portal", "ClientNm": "Acme", "ClientID": 3, "Dt": "2024-03-04", "Hours_IN": 2.5},
            {"ProjectSID": 13, "ProjectNm": "Internal", "ClientNm": null, "Dt": "2024-03-05T00:00:00", "Hours_IN": 1}
        ]);

        let entries: Vec<RawEntry> = serde_json::from_value(payload).unwrap();

        assert_eq!(entries[0].date, date(2024, 3, 4));
        assert_eq!(entries[0].client_id, Some(3));
        assert_eq!(entries[1].date, date(2024, 3, 5));
        assert_eq!(entries[1].client_name, None);
        assert_eq!(entries[1].hours, 1.0);
    }

    #[test]
    fn test_raw_entry_rejects_bad_date() {
        let payload = serde_json::json!({"ProjectSID": 1, "ProjectNm": "X", "Dt": "03/04/2024", "Hours_IN": 1.0});
        assert!(serde_json::from_value::<RawEntry>(payload).is_err());
    }

    #[test]
    fn test_time_entry_serializes_camel_case() {
        let entry = TimeEntry {
            date: date(2024, 3, 4),
            project_id: 7,
            project_name: "Acme:Portal".to_string(),
            client_name: Some("Acme".to_string()),
            client_id: Some(3),
            hours: 2.25,
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["date"], "2024-03-04");
        assert_eq!(value["projectId"], 7);
        assert_eq!(value["clientName"], "Acme");
    }

    #[test]
    fn test_date_range_ending_on() {
        let range = DateRange::ending_on(date(2024, 3, 4), 5);
        assert_eq!(range.start, date(2024, 2, 29));
        assert_eq!(range.end, date(2024, 3, 4));
        assert_eq!(DateRange::ending_on(date(2024, 3, 4), 1).start, date(2024, 3, 4));
    }

    #[test]
    fn test_day_totals_come_from_whole_minutes() {
        let template = TimeEntry {
            date: date(2024, 3, 4),
            project_id: 1,
            project_name: "P".to_string(),
            client_name: None,
            client_id: None,
            hours: 0.0,
        };
        let mut day = DaySchedule::new(date(2024, 3, 4), 0.3);
        for minutes in [100u32, 20, 360] {
            day.push(TimeEntry {
                hours: minutes_to_hours(minutes),
                ..template.clone()
            });
        }

        assert_eq!(day.synthesized_minutes(), 480);
        assert_eq!(day.total_hours(), day.total_with(480));
        let totals = day.running_totals();
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0], day.total_with(100));
        assert_eq!(*totals.last().unwrap(), day.total_hours());
    }

    #[test]
    fn test_preexisting_window_sums_per_date() {
        let raw = |d: NaiveDate, hours: f64| RawEntry {
            project_sid: 1,
            project_name: "A".to_string(),
            client_name: None,
            client_id: None,
            date: d,
            hours,
        };
        let window = PreexistingWindow::from_entries(&[
            raw(date(2024, 3, 4), 2.0),
            raw(date(2024, 3, 4), 1.5),
            raw(date(2024, 3, 5), 4.0),
        ]);

        assert_eq!(window.hours_on(date(2024, 3, 4)), 3.5);
        assert_eq!(window.hours_on(date(2024, 3, 5)), 4.0);
        assert_eq!(window.hours_on(date(2024, 3, 6)), 0.0);
        assert_eq!(window.entry_count(), 3);
    }
}
