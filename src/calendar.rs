use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{RecapError, Result};
use crate::github::Window;

const CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A calendar event reduced to what the report renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    /// Event summary line
    pub summary: String,
    /// Start bound, an RFC 3339 datetime or an all-day date string
    pub start: String,
    /// End bound, same format as `start`
    pub end: String,
}

/// Either a timed or an all-day event bound
#[derive(Debug, Clone, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

impl EventTime {
    /// Prefer the timed bound, fall back to the all-day date
    fn resolve(self) -> String {
        self.date_time.or(self.date).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(default)]
    summary: String,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Event>,
}

/// Google Calendar v3 client
pub struct CalendarClient {
    client: Client,
    token: String,
    calendar_id: String,
    base_url: String,
}

impl CalendarClient {
    /// Create a new calendar client authenticated with an OAuth access token
    pub fn new(token: String, calendar_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token,
            calendar_id,
            base_url: CALENDAR_API_URL.to_string(),
        })
    }

    /// List events overlapping the window's days, ordered by start time.
    ///
    /// The query spans whole days: midnight at the start of the window's
    /// first day through the last second of its final day.
    pub async fn get_events(&self, window: &Window) -> Result<Vec<Meeting>> {
        let time_min = window
            .start
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc().to_rfc3339())
            .ok_or_else(|| RecapError::calendar("invalid window start date"))?;
        let time_max = window
            .end
            .date_naive()
            .and_hms_opt(23, 59, 59)
            .map(|t| t.and_utc().to_rfc3339())
            .ok_or_else(|| RecapError::calendar("invalid window end date"))?;

        debug!(calendar = %self.calendar_id, %time_min, %time_max, "fetching calendar events");

        let response = self
            .client
            .get(format!(
                "{}/calendars/{}/events",
                self.base_url, self.calendar_id
            ))
            .bearer_auth(&self.token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RecapError::calendar(format!(
                "events request failed with status {}: {}",
                status, body
            )));
        }

        let events: EventList = response.json().await?;
        Ok(events
            .items
            .into_iter()
            .map(|event| Meeting {
                summary: event.summary,
                start: event.start.resolve(),
                end: event.end.resolve(),
            })
            .collect())
    }
}
