//! Google Sheets adapter.
//!
//! Appends report rows to the reports range and reads the voting topics
//! range through the Sheets v4 values API.

use super::truncate_body;
use crate::domain::{AuthError, ReportRow, SheetsConfig, SinkWriteError, TopicFetchError};
use crate::ports::outbound::{AccessTokenProvider, RecordSink, TopicSource};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Serialize)]
struct AppendBody {
    values: Vec<Vec<Value>>,
}

/// `ValueRange` as returned by `values.get`; `values` is omitted for empty ranges.
#[derive(Debug, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Cells rendered as strings, the way the sheet displays them.
    pub fn into_string_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Sheets client serving as both the record sink and the topic source.
pub struct SheetsClient {
    client: Client,
    config: SheetsConfig,
    tokens: Option<Arc<dyn AccessTokenProvider>>,
}

impl SheetsClient {
    pub fn new(
        client: Client,
        config: SheetsConfig,
        tokens: Option<Arc<dyn AccessTokenProvider>>,
    ) -> Self {
        Self {
            client,
            config,
            tokens,
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be a base URL", self.config.api_base_url))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                format!("{range}{suffix}").as_str(),
            ]);
        Ok(url)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        match &self.tokens {
            Some(tokens) => {
                let token = tokens.access_token().await?;
                Ok(request.bearer_auth(token))
            }
            None => Ok(request),
        }
    }
}

#[async_trait]
impl RecordSink for SheetsClient {
    async fn append(&self, row: &ReportRow) -> Result<(), SinkWriteError> {
        let mut url = self
            .values_url(&self.config.reports_range, ":append")
            .map_err(SinkWriteError::Network)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = AppendBody {
            values: vec![row.to_cells()],
        };
        let request = self
            .authorize(self.client.post(url).json(&body))
            .await?;

        let response = request
            .send()
            .await
            .map_err(|e| SinkWriteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_append_failure(status, &body));
        }

        debug!(proposal_id = %row.proposal_id, range = %self.config.reports_range, "row appended");
        Ok(())
    }
}

#[async_trait]
impl TopicSource for SheetsClient {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, TopicFetchError> {
        let url = self
            .values_url(&self.config.topics_range, "")
            .map_err(TopicFetchError::Unavailable)?;
        let request = self
            .authorize(self.client.get(url))
            .await
            .map_err(|e| TopicFetchError::Unavailable(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| TopicFetchError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicFetchError::Unavailable(format!("HTTP {status}")));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| TopicFetchError::Unavailable(e.to_string()))?;
        Ok(range.into_string_rows())
    }
}

fn classify_append_failure(status: StatusCode, body: &str) -> SinkWriteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SinkWriteError::Auth(format!("HTTP {status}"))
        }
        _ => SinkWriteError::Rejected {
            status: status.as_u16(),
            body: truncate_body(body),
        },
    }
}
