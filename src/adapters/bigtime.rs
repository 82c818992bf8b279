use crate::domain::model::{DateRange, RawEntry, TimeEntry};
use crate::domain::ports::{EntrySubmitter, TimesheetSource};
use crate::utils::error::{Result, TimefillError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://iq.bigtime.net/BigtimeData/api/v2";
pub const DEFAULT_BUDGET_CATEGORY_ID: i64 = 129171;

#[derive(Debug, Clone)]
pub struct BigTimeSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Category every created entry is filed under.
    pub budget_category_id: i64,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub token: String,
    pub firm: String,
    #[serde(rename = "staffsid")]
    pub staff_sid: i64,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    #[serde(rename = "UserId")]
    user_id: &'a str,
    #[serde(rename = "Pwd")]
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTimeEntry {
    #[serde(rename = "Dt")]
    date: String,
    #[serde(rename = "ProjectSID")]
    project_sid: i64,
    #[serde(rename = "BudgCatID")]
    budget_category_id: i64,
    #[serde(rename = "Hours_IN")]
    hours: f64,
}

/// Authenticated client for the BigTime REST API.
#[derive(Debug, Clone)]
pub struct BigTimeClient {
    client: Client,
    base_url: String,
    session: Session,
    budget_category_id: i64,
}

impl BigTimeClient {
    /// Opens a session; every later call reuses its token.
    pub async fn connect(settings: &BigTimeSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let base_url = settings.base_url.trim_end_matches('/').to_string();

        tracing::debug!("Opening session at {}/session", base_url);
        let response = client
            .post(format!("{}/session", base_url))
            .json(&SessionRequest {
                user_id: &settings.username,
                password: &settings.password,
            })
            .send()
            .await
            .map_err(|e| TimefillError::SessionError {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TimefillError::SessionError {
                message: format!("{} {}", status, response.text().await.unwrap_or_default()),
            });
        }

        let session: Session = response.json().await?;
        tracing::info!("🔑 Session established for staff {}", session.staff_sid);

        Ok(Self {
            client,
            base_url,
            session,
            budget_category_id: settings.budget_category_id,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Auth-Token", &self.session.token)
            .header("X-Auth-Realm", &self.session.firm)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(TimefillError::ApiStatusError { status, body })
}

#[async_trait]
impl TimesheetSource for BigTimeClient {
    async fn fetch_range(&self, range: DateRange) -> Result<Vec<RawEntry>> {
        let url = format!("{}/time/Sheet/{}", self.base_url, self.session.staff_sid);
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();
        tracing::debug!("GET {} ({} → {})", url, start, end);

        let response = self
            .authed(self.client.get(&url))
            .query(&[("StartDt", start.as_str()), ("EndDt", end.as_str())])
            .send()
            .await?;
        let response = ensure_success(response).await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EntrySubmitter for BigTimeClient {
    async fn submit(&self, entry: &TimeEntry) -> Result<()> {
        let body = CreateTimeEntry {
            date: entry.date.format("%Y-%m-%d").to_string(),
            project_sid: entry.project_id,
            budget_category_id: self.budget_category_id,
            hours: entry.hours,
        };

        let response = self
            .authed(self.client.post(format!("{}/time", self.base_url)))
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
