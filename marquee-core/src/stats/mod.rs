//! Trailer view-count enrichment.
//!
//! Reconstruction stays pure; enrichment is a separate post-processing
//! pass over an already-built aggregate list. For each title we try to
//! extract a video id from the trailer URL; when one is found, the
//! provider is asked for the current view count and the result overlaid
//! onto the title. Provider failures of any kind are logged and leave the
//! value decoded from storage untouched; enrichment never fails a
//! request.

pub mod youtube;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use marquee_model::Title;
use once_cell::sync::Lazy;
use regex::Regex;

pub use youtube::YouTubeStatsClient;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Video not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timed out")]
    Timeout,
}

/// External source of per-video view counts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrailerStatsProvider: Send + Sync {
    async fn view_count(&self, video_id: &str) -> Result<u64, ProviderError>;
}

/// Bounds on the enrichment fan-out. One request may enrich N titles with
/// up to N independent provider calls; each call carries its own timeout
/// so a single slow call degrades only that title.
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            concurrency: 8,
        }
    }
}

static VIDEO_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:[^/\n\s]+/[^/\n\s]+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video id pattern is valid")
});

/// Extract the 11-character video id from a trailer URL, if it has one.
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Overlay provider view counts onto the titles, in place.
///
/// Calls run concurrently up to `options.concurrency` and are merged back
/// by arena index, so completion order never affects which title a count
/// lands on. Titles without an extractable video id are skipped.
pub async fn overlay_trailer_views(
    titles: &mut [Title],
    provider: &dyn TrailerStatsProvider,
    options: &OverlayOptions,
) {
    let lookups: Vec<(usize, String)> = titles
        .iter()
        .enumerate()
        .filter_map(|(idx, title)| {
            extract_video_id(&title.trailer_url)
                .map(|id| (idx, id.to_owned()))
        })
        .collect();

    if lookups.is_empty() {
        return;
    }

    let results: Vec<(usize, Result<u64, ProviderError>)> =
        futures::stream::iter(lookups.into_iter().map(|(idx, video_id)| {
            async move {
                let outcome = match tokio::time::timeout(
                    options.timeout,
                    provider.view_count(&video_id),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout),
                };
                (idx, outcome)
            }
        }))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    for (idx, outcome) in results {
        match outcome {
            Ok(views) => {
                titles[idx].trailer_views = Some(views as i64);
            }
            Err(err) => {
                tracing::warn!(
                    title_id = titles[idx].id,
                    trailer = %titles[idx].trailer_url,
                    error = %err,
                    "trailer stats lookup failed, keeping stored value"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(id: i32, trailer_url: &str, stored: Option<i64>) -> Title {
        Title {
            id,
            title: format!("Title {}", id),
            description: String::new(),
            release_year: 2020,
            director: String::new(),
            producer: None,
            rating: 5,
            is_favourite: false,
            trailer_url: trailer_url.to_string(),
            poster_url: String::new(),
            trailer_views: stored,
            duration: None,
            video_url: None,
            view_count: None,
            screen_url: None,
            genres: Vec::new(),
            categories: Vec::new(),
            age_ratings: Vec::new(),
            episodes: Vec::new(),
            seasons: Vec::new(),
        }
    }

    #[test]
    fn test_extract_video_id_variants() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_video_id("https://example.com/trailer.mp4"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[tokio::test]
    async fn test_overlay_writes_provider_counts_by_identity() {
        let mut provider = MockTrailerStatsProvider::new();
        provider
            .expect_view_count()
            .returning(|id| match id {
                "aaaaaaaaaaa" => Ok(101),
                "bbbbbbbbbbb" => Ok(202),
                _ => Err(ProviderError::NotFound),
            });

        let mut titles = vec![
            title(1, "https://youtu.be/aaaaaaaaaaa", None),
            title(2, "https://youtu.be/bbbbbbbbbbb", Some(7)),
        ];

        overlay_trailer_views(
            &mut titles,
            &provider,
            &OverlayOptions::default(),
        )
        .await;

        assert_eq!(titles[0].trailer_views, Some(101));
        assert_eq!(titles[1].trailer_views, Some(202));
    }

    #[tokio::test]
    async fn test_no_extractable_token_keeps_stored_value() {
        let mut provider = MockTrailerStatsProvider::new();
        provider.expect_view_count().never();

        let mut titles =
            vec![title(1, "https://example.com/not-a-video", Some(42))];

        overlay_trailer_views(
            &mut titles,
            &provider,
            &OverlayOptions::default(),
        )
        .await;

        assert_eq!(titles[0].trailer_views, Some(42));
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_stored_value() {
        let mut provider = MockTrailerStatsProvider::new();
        provider
            .expect_view_count()
            .returning(|_| Err(ProviderError::Api("quota exceeded".into())));

        let mut titles = vec![
            title(1, "https://youtu.be/aaaaaaaaaaa", Some(42)),
            title(2, "https://youtu.be/bbbbbbbbbbb", None),
        ];

        overlay_trailer_views(
            &mut titles,
            &provider,
            &OverlayOptions::default(),
        )
        .await;

        assert_eq!(titles[0].trailer_views, Some(42));
        assert_eq!(titles[1].trailer_views, None);
    }
}
