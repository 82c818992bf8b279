use crate::domain::model::{ProjectSummary, RawEntry};
use crate::utils::error::{Result, TimefillError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMeta {
    pub average_daily_hours: f64,
    pub project_count: usize,
    pub entry_count: usize,
    pub date_count: usize,
    pub total_hours: f64,
    pub projects: Vec<ProjectSummary>,
}

/// Historical entries grouped by project and by date, plus per-project statistics.
#[derive(Debug, Clone)]
pub struct HistoricalAggregate {
    pub by_project: BTreeMap<i64, Vec<RawEntry>>,
    pub by_date: BTreeMap<NaiveDate, Vec<RawEntry>>,
    pub meta: AggregateMeta,
}

impl HistoricalAggregate {
    pub fn projects(&self) -> &[ProjectSummary] {
        &self.meta.projects
    }
}

pub struct HistoricalAggregator;

impl HistoricalAggregator {
    pub fn aggregate(entries: Vec<RawEntry>) -> Result<HistoricalAggregate> {
        if entries.is_empty() {
            return Err(TimefillError::EmptyHistoryError);
        }

        let entry_count = entries.len();
        let mut by_project: BTreeMap<i64, Vec<RawEntry>> = BTreeMap::new();
        let mut by_date: BTreeMap<NaiveDate, Vec<RawEntry>> = BTreeMap::new();

        for entry in entries {
            by_date.entry(entry.date).or_default().push(entry.clone());
            by_project.entry(entry.project_sid).or_default().push(entry);
        }

        let total_hours: f64 = by_date.values().flatten().map(|e| e.hours).sum();

        let projects: Vec<ProjectSummary> = by_project
            .iter()
            .filter_map(|(project_id, group)| summarize_project(*project_id, group))
            .collect();

        let meta = AggregateMeta {
            average_daily_hours: total_hours / by_date.len() as f64,
            project_count: by_project.len(),
            entry_count,
            date_count: by_date.len(),
            total_hours,
            projects,
        };

        tracing::debug!(
            "Aggregated {} entries into {} projects over {} dates",
            meta.entry_count,
            meta.project_count,
            meta.date_count
        );

        Ok(HistoricalAggregate {
            by_project,
            by_date,
            meta,
        })
    }
}

// Later rows win for name and client: projects get renamed upstream.
fn summarize_project(project_id: i64, group: &[RawEntry]) -> Option<ProjectSummary> {
    let latest = group.last()?;
    let total_hours: f64 = group.iter().map(|e| e.hours).sum();
    let total_entries = group.len();

    Some(ProjectSummary {
        project_id,
        project_name: latest.project_name.clone(),
        client_name: latest.client_name.clone(),
        client_id: latest.client_id,
        total_hours,
        total_entries,
        average_entry_hours: total_hours / total_entries as f64,
    })
}
