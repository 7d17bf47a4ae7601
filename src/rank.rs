use std::sync::LazyLock;

use eyre::{Result, bail};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::{Candidate, RankedResult};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Rationale used when the reply names no usable candidate
pub const UNPARSEABLE_RATIONALE: &str = "Unable to determine best video from analysis. Showing first result.";

/// Rationale used when the model could not be reached at all
pub const ERROR_RATIONALE: &str = "Error analyzing titles. Returning first result.";

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// A hosted model that turns one prompt into one text reply
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Google Gemini `generateContent` client
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Gemini {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl TextGenerator for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Ranking via Gemini API with model {}", self.model);

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "best_video": { "type": "INTEGER" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["best_video", "reason"]
                }
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Gemini API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_gemini_text(&json)
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    let text = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        bail!("unexpected Gemini API response format");
    }
    Ok(text)
}

/// Build the ranking prompt, numbering candidates from 1
pub fn build_prompt(candidates: &[Candidate], query: &str) -> String {
    let options = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. Title: '{}' | Channel: {} | Duration: {} min",
                i + 1,
                c.title,
                c.channel,
                c.duration_minutes
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Original Search Query: \"{query}\"\n\n\
         Analyze the following YouTube video titles and determine which ONE is most likely to be the \
         highest quality, most informative, and most relevant to the search query. Consider clarity, \
         specificity, information density, and relevance.\n\n\
         VIDEO OPTIONS:\n{options}\n\n\
         Pick exactly one option and justify the choice in 2-3 sentences at most.\n\
         Respond with a JSON object {{\"best_video\": <number>, \"reason\": \"<explanation>\"}}.\n\
         If you cannot produce JSON, answer with exactly two lines:\n\
         BEST_VIDEO: <number>\n\
         REASON: <explanation>"
    )
}

/// A 1-based choice recovered from a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct StructuredReply {
    best_video: serde_json::Value,
    #[serde(default)]
    reason: String,
}

/// Recover the chosen candidate from `reply`, accepting either the JSON
/// schema or the `BEST_VIDEO:` / `REASON:` line format.
///
/// Returns `None` unless the index lies in `1..=count`.
pub fn parse_reply(reply: &str, count: usize) -> Option<Selection> {
    let selection = parse_structured(reply).or_else(|| parse_lines(reply))?;
    (1..=count).contains(&selection.index).then_some(selection)
}

fn parse_structured(reply: &str) -> Option<Selection> {
    let body = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let parsed: StructuredReply = serde_json::from_str(body).ok()?;

    let index = match &parsed.best_video {
        serde_json::Value::Number(n) => usize::try_from(n.as_u64()?).ok()?,
        serde_json::Value::String(s) => first_number(s)?,
        _ => return None,
    };
    Some(Selection {
        index,
        reason: parsed.reason.trim().to_string(),
    })
}

fn parse_lines(reply: &str) -> Option<Selection> {
    let mut index = None;
    let mut reason = String::new();

    for line in reply.lines().map(str::trim_start) {
        if let Some(rest) = line.strip_prefix("BEST_VIDEO:") {
            if index.is_none() {
                index = first_number(rest);
            }
        } else if let Some(rest) = line.strip_prefix("REASON:") {
            reason = rest.trim().to_string();
        }
    }

    Some(Selection { index: index?, reason })
}

fn first_number(text: &str) -> Option<usize> {
    FIRST_NUMBER.find(text)?.as_str().parse().ok()
}

/// Pick the candidate named by `reply`, or the first one with a fixed
/// rationale when the reply names none.
pub fn choose(candidates: &[Candidate], reply: &str) -> Option<RankedResult> {
    let first = candidates.first()?;
    let result = match parse_reply(reply, candidates.len()) {
        Some(selection) => RankedResult {
            candidate: candidates[selection.index - 1].clone(),
            rationale: selection.reason,
        },
        None => {
            warn!("Could not recover a valid choice from ranking reply: {reply:?}");
            RankedResult {
                candidate: first.clone(),
                rationale: UNPARSEABLE_RATIONALE.to_string(),
            }
        }
    };
    Some(result)
}

/// Ask `generator` which candidate best matches `query`.
///
/// Never fails: any generator error falls back to the first candidate.
/// Returns `None` only when `candidates` is empty.
pub async fn rank<G: TextGenerator>(generator: &G, candidates: &[Candidate], query: &str) -> Option<RankedResult> {
    let first = candidates.first()?;
    let prompt = build_prompt(candidates, query);

    match generator.generate(&prompt).await {
        Ok(reply) => {
            debug!("Ranking reply: {reply}");
            choose(candidates, &reply)
        }
        Err(e) => {
            warn!("Error analyzing titles: {e:#}");
            Some(RankedResult {
                candidate: first.clone(),
                rationale: ERROR_RATIONALE.to_string(),
            })
        }
    }
}
