use chrono::{DateTime, Duration, SecondsFormat, Utc};
use eyre::{Result, bail};
use log::{debug, error, warn};
use serde::Deserialize;

use crate::duration::parse_duration;
use crate::{Candidate, SearchFilter};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// The search endpoint refuses `maxResults` above this
const MAX_SEARCH_BATCH: u32 = 50;

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

/// One record from the `videos` detail endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: Snippet,
    #[serde(rename = "contentDetails")]
    pub content_details: ContentDetails,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentDetails {
    pub duration: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Statistics {
    /// The API encodes counts as decimal strings
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
}

/// The two calls the search client makes against the video platform
#[allow(async_fn_in_trait)]
pub trait VideoApi {
    /// Ids of videos matching `query` published after `published_after`, in relevance order
    async fn search_ids(
        &self,
        query: &str,
        max_results: u32,
        published_after: DateTime<Utc>,
        relevance_language: &str,
    ) -> Result<Vec<String>>;

    /// Detail records for `ids`, one batched request
    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoItem>>;
}

/// YouTube Data API v3 client
pub struct YouTubeApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!("GET {url} {:?}", params.iter().map(|(k, _)| *k).collect::<Vec<_>>());

        let resp = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("YouTube API returned {status}: {body}");
        }

        Ok(resp.json().await.map_err(reqwest::Error::without_url)?)
    }
}

impl VideoApi for YouTubeApi {
    async fn search_ids(
        &self,
        query: &str,
        max_results: u32,
        published_after: DateTime<Utc>,
        relevance_language: &str,
    ) -> Result<Vec<String>> {
        let params = [
            ("part", "id".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.to_string()),
            ("publishedAfter", published_after.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("relevanceLanguage", relevance_language.to_string()),
        ];
        let resp: SearchListResponse = self.get("search", &params).await?;
        Ok(resp.items.into_iter().filter_map(|item| item.id.video_id).collect())
    }

    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        let params = [
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("id", ids.join(",")),
        ];
        let resp: VideoListResponse = self.get("videos", &params).await?;
        Ok(resp.items)
    }
}

/// Search for videos matching `filter`.
///
/// Never fails: transport and API errors are logged and produce an empty
/// list, same as a search that matched nothing.
pub async fn search<A: VideoApi>(api: &A, filter: &SearchFilter) -> Vec<Candidate> {
    search_at(api, filter, Utc::now()).await
}

/// [`search`] with an explicit notion of "now"
pub async fn search_at<A: VideoApi>(api: &A, filter: &SearchFilter, now: DateTime<Utc>) -> Vec<Candidate> {
    match try_search(api, filter, now).await {
        Ok(candidates) => candidates,
        Err(e) => {
            error!("Video search failed for {:?}: {e:#}", filter.query);
            Vec::new()
        }
    }
}

async fn try_search<A: VideoApi>(api: &A, filter: &SearchFilter, now: DateTime<Utc>) -> Result<Vec<Candidate>> {
    if filter.max_results == 0 {
        return Ok(Vec::new());
    }

    let cutoff = now - Duration::days(i64::from(filter.max_age_days));
    let batch = filter
        .max_results
        .saturating_mul(filter.over_fetch_factor.max(1))
        .min(MAX_SEARCH_BATCH);

    let ids = api
        .search_ids(&filter.query, batch, cutoff, &filter.relevance_language)
        .await?;
    debug!("Search returned {} ids (requested {batch})", ids.len());
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let details = api.video_details(&ids).await?;
    Ok(select_candidates(details, filter, cutoff))
}

/// Keep records within the duration window and published at or after
/// `cutoff`, in the order given, stopping at `filter.max_results`.
pub fn select_candidates(
    items: impl IntoIterator<Item = VideoItem>,
    filter: &SearchFilter,
    cutoff: DateTime<Utc>,
) -> Vec<Candidate> {
    let limit = filter.max_results as usize;
    let mut kept = Vec::new();

    for item in items {
        if kept.len() >= limit {
            break;
        }

        let secs = match parse_duration(&item.content_details.duration) {
            Ok(secs) => secs,
            Err(e) => {
                warn!("Skipping video {}: {e}", item.id);
                continue;
            }
        };
        if !filter.accepts_duration(secs) || item.snippet.published_at < cutoff {
            continue;
        }

        kept.push(to_candidate(item, secs));
    }

    kept
}

fn to_candidate(item: VideoItem, secs: u64) -> Candidate {
    let view_count = item
        .statistics
        .view_count
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    Candidate {
        id: item.id,
        title: item.snippet.title,
        channel: item.snippet.channel_title,
        published_at: item.snippet.published_at,
        duration_minutes: (secs as f64 / 60.0 * 10.0).round() / 10.0,
        view_count,
        thumbnail_url: item.snippet.thumbnails.high.map(|t| t.url).unwrap_or_default(),
    }
}
