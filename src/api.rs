use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::leaderboard::{LeaderboardRecord, Pagination, RecordStats, RecordsPage};
use crate::mode::PracticeMode;
use crate::record::PracticeRecord;
use crate::texts::{PracticeTextProvider, ProviderError};

const TIMEOUT_SECS: u64 = 10;

/// Page sizes the backend serves
pub const PAGE_LIMITS: std::ops::RangeInclusive<u32> = 1..=50;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid api url: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Acknowledgement for a stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub id: Option<i64>,
    pub message: Option<String>,
}

/// Sends finished sessions to the leaderboard
pub trait RecordSubmitter {
    fn submit_record(&self, record: &PracticeRecord) -> Result<SubmitReceipt, ApiError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct PracticeTextResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TopRecordsResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    records: Vec<LeaderboardRecord>,
}

#[derive(Debug, Deserialize)]
struct RecordsPageResponse {
    #[serde(default)]
    success: bool,
    mode: PracticeMode,
    #[serde(default)]
    records: Vec<LeaderboardRecord>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    success: bool,
    #[serde(flatten)]
    stats: RecordStats,
}

/// Blocking client for the trainer backend
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: Url,
    client: Client,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        tracing::info!("api client initialized for {}", base_url);

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn practice_text_url(&self, mode: PracticeMode) -> Result<Url, ApiError> {
        self.endpoint(&["api", "practice-text", &mode.to_string()])
    }

    pub fn records_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["api", "records"])
    }

    pub fn top_records_url(&self, mode: PracticeMode) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["api", "records", "top"])?;
        url.query_pairs_mut().append_pair("mode", &mode.to_string());
        Ok(url)
    }

    pub fn records_page_url(
        &self,
        mode: PracticeMode,
        limit: u32,
        offset: u32,
    ) -> Result<Url, ApiError> {
        let limit = limit.clamp(*PAGE_LIMITS.start(), *PAGE_LIMITS.end());
        let mut url = self.endpoint(&["api", "records"])?;
        url.query_pairs_mut()
            .append_pair("mode", &mode.to_string())
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    pub fn stats_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["api", "records", "stats"])
    }

    pub fn practice_text(&self, mode: PracticeMode) -> Result<String, ApiError> {
        let response = self.client.get(self.practice_text_url(mode)?).send()?;
        let status = response.status();
        let body: PracticeTextResponse = decode(status, &response.text()?)?;

        if !body.success || body.text.is_empty() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: format!("no practice text for {mode}"),
            });
        }
        Ok(body.text)
    }

    /// Top ten records for `mode`, best first
    pub fn top_records(&self, mode: PracticeMode) -> Result<Vec<LeaderboardRecord>, ApiError> {
        let response = self.client.get(self.top_records_url(mode)?).send()?;
        let status = response.status();
        let body: TopRecordsResponse = decode(status, &response.text()?)?;

        if !body.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: "leaderboard request was not successful".to_string(),
            });
        }
        Ok(body.records)
    }

    /// Ranked records for `mode`, `limit` at a time starting at `offset`
    pub fn records_page(
        &self,
        mode: PracticeMode,
        limit: u32,
        offset: u32,
    ) -> Result<RecordsPage, ApiError> {
        let response = self
            .client
            .get(self.records_page_url(mode, limit, offset)?)
            .send()?;
        let status = response.status();
        let body: RecordsPageResponse = decode(status, &response.text()?)?;

        if !body.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: "records request was not successful".to_string(),
            });
        }
        Ok(RecordsPage {
            mode: body.mode,
            records: body.records,
            pagination: body.pagination,
        })
    }

    pub fn stats(&self) -> Result<RecordStats, ApiError> {
        let response = self.client.get(self.stats_url()?).send()?;
        let status = response.status();
        let body: StatsResponse = decode(status, &response.text()?)?;

        if !body.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: "stats request was not successful".to_string(),
            });
        }
        Ok(body.stats)
    }
}

impl RecordSubmitter for HttpApiClient {
    fn submit_record(&self, record: &PracticeRecord) -> Result<SubmitReceipt, ApiError> {
        tracing::info!(
            student = %record.student_id,
            mode = %record.mode,
            score = record.score,
            "submitting record"
        );

        let response = self.client.post(self.records_url()?).json(record).send()?;
        let status = response.status();
        let body: SubmitResponse = decode(status, &response.text()?)?;

        if !body.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: body.message.unwrap_or_else(|| "record was not saved".to_string()),
            });
        }

        Ok(SubmitReceipt {
            id: body.id,
            message: body.message,
        })
    }
}

impl PracticeTextProvider for HttpApiClient {
    fn fetch_practice_text(&self, mode: PracticeMode) -> Result<String, ProviderError> {
        self.practice_text(mode).map_err(|err| {
            tracing::warn!("failed to fetch practice text: {err}");
            ProviderError::Request(err.to_string())
        })
    }
}

/// Turns a backend response into `T`, or the backend's `{"error": ...}` message.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(body)?)
}
