use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ProviderError, TrailerStatsProvider};

const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin client for the YouTube Data API v3 `videos` endpoint, used only to
/// read per-video statistics.
#[derive(Debug, Clone)]
pub struct YouTubeStatsClient {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeStatsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        // Requests stay bounded either way: the overlay wraps every call
        // in its own tokio timeout.
        let http = match reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "HTTP client builder failed, using default client without a client-level timeout"
                );
                reqwest::Client::new()
            }
        };
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    pub fn with_client(
        http: reqwest::Client,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
struct VideoStatistics {
    /// The API returns the count as a decimal string.
    #[serde(rename = "viewCount")]
    view_count: String,
}

#[async_trait]
impl TrailerStatsProvider for YouTubeStatsClient {
    async fn view_count(&self, video_id: &str) -> Result<u64, ProviderError> {
        let response = self
            .http
            .get(VIDEOS_ENDPOINT)
            .query(&[
                ("part", "statistics"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "videos endpoint returned {}",
                status
            )));
        }

        let body: VideoListResponse = response.json().await?;
        let item = body.items.into_iter().next().ok_or(ProviderError::NotFound)?;

        item.statistics.view_count.parse::<u64>().map_err(|e| {
            ProviderError::Parse(format!("viewCount was not numeric: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_payload_decodes() {
        let payload = r#"{
            "items": [
                { "statistics": { "viewCount": "123456", "likeCount": "9" } }
            ]
        }"#;

        let decoded: VideoListResponse =
            serde_json::from_str(payload).expect("payload decodes");
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].statistics.view_count, "123456");
    }

    #[test]
    fn test_empty_items_decodes_to_no_videos() {
        let decoded: VideoListResponse =
            serde_json::from_str(r#"{ "items": [] }"#).expect("decodes");
        assert!(decoded.items.is_empty());
    }
}
