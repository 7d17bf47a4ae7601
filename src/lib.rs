pub mod config;
pub mod duration;
pub mod input;
pub mod output;
pub mod rank;
pub mod voice;
pub mod youtube;

#[cfg(test)]
mod test_server;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One video's metadata, as returned by the search client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub published_at: DateTime<Utc>,
    pub duration_minutes: f64,
    pub view_count: u64,
    pub thumbnail_url: String,
}

impl Candidate {
    pub fn watch_url(&self) -> String {
        watch_url(&self.id)
    }
}

/// The candidate picked by the ranker, plus why it was picked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub candidate: Candidate,
    pub rationale: String,
}

/// Search parameters supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: String,
    pub max_results: u32,
    pub min_duration_secs: u64,
    pub max_duration_secs: u64,
    pub max_age_days: u32,
    /// How many identifiers to request per wanted result
    pub over_fetch_factor: u32,
    pub relevance_language: String,
}

impl SearchFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 20,
            min_duration_secs: 4 * 60,
            max_duration_secs: 20 * 60,
            max_age_days: 14,
            over_fetch_factor: 2,
            relevance_language: "en".to_string(),
        }
    }

    pub fn accepts_duration(&self, secs: u64) -> bool {
        self.min_duration_secs <= secs && secs <= self.max_duration_secs
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
