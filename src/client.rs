use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::recommender::RecommendationRecord;
use crate::server::routes::{
    ChatRequest, HealthResponse, RecommendationRequest, SongsListResponse,
};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL {0}")]
    InvalidUrl(String),

    #[error("cannot connect to API server at {0}; is `vibecheck serve` running?")]
    Connect(String),

    #[error("request to {0} timed out; the server might be overloaded")]
    Timeout(String),

    #[error("API returned error: {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: Option<String>,
}

/// Thin client for the recommendation API.
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        // `join` replaces the last segment unless the path ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        info!(base_url = %base_url, "API client initialised");
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub async fn check_health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint("health")?;
        let response = self
            .client
            .get(url.clone())
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;
        decode(&url, ok_status(response)?).await
    }

    /// `Ok(None)` when the song is not in the catalogue.
    pub async fn get_recommendations(
        &self,
        song_name: &str,
        top_n: usize,
    ) -> Result<Option<Vec<RecommendationRecord>>, ApiError> {
        info!(song = song_name, "requesting recommendations");
        let url = self.endpoint("recommend")?;
        let response = self
            .client
            .post(url.clone())
            .timeout(REQUEST_TIMEOUT)
            .json(&RecommendationRequest {
                song_name: song_name.to_owned(),
                top_n,
            })
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let records: Vec<RecommendationRecord> = decode(&url, ok_status(response)?).await?;
        info!(count = records.len(), "received recommendations");
        Ok(Some(records))
    }

    pub async fn chat(&self, message: &str) -> Result<String, ApiError> {
        debug!(message = message, "sending chat message");
        let url = self.endpoint("chat")?;
        let response = self
            .client
            .post(url.clone())
            .timeout(REQUEST_TIMEOUT)
            .json(&ChatRequest {
                message: message.to_owned(),
            })
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let reply: ChatReply = decode(&url, ok_status(response)?).await?;
        Ok(reply
            .response
            .unwrap_or_else(|| "No response received".to_owned()))
    }

    pub async fn get_all_songs(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("songs")?;
        let response = self
            .client
            .get(url.clone())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let list: SongsListResponse = decode(&url, ok_status(response)?).await?;
        info!(count = list.count, "received songs");
        Ok(list.songs)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }
}

fn classify(url: &Url, e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(url.to_string())
    } else if e.is_connect() {
        ApiError::Connect(url.to_string())
    } else {
        ApiError::Unexpected(e.to_string())
    }
}

fn ok_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

async fn decode<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::Unexpected(format!("{}: {}", url, e)))
}
