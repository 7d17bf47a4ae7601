use std::path::Path;
use std::process::{Command, Stdio};

use eyre::{Result, bail};
use log::debug;
use reqwest::multipart;

const TRANSCRIBE_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const TRANSCRIBE_MODEL: &str = "whisper-1";

/// Recorder binary shipped with SoX
const RECORDER: &str = "rec";

/// Longest utterance we record, in seconds
const MAX_RECORD_SECS: u32 = 15;

/// Why voice input cannot be offered on this machine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("`rec` not found (install SoX to enable voice input)")]
    NoRecorder,
    #[error("OPENAI_API_KEY environment variable not set")]
    NoApiKey,
}

/// Microphone capture plus cloud transcription.
///
/// Only constructed through [`VoiceInput::detect`], so holding one means
/// both the recorder and the API key were present.
#[derive(Debug, Clone)]
pub struct VoiceInput {
    api_key: String,
}

impl VoiceInput {
    pub fn detect() -> Result<Self, Unavailable> {
        if !recorder_available() {
            return Err(Unavailable::NoRecorder);
        }
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Unavailable::NoApiKey)?;
        Ok(Self { api_key })
    }

    /// Record one utterance and return its transcription
    pub async fn listen(&self, client: &reqwest::Client) -> Result<String> {
        let audio_path = std::env::temp_dir().join(format!("vidpick-{}.wav", std::process::id()));
        let recorded = record(&audio_path).await;
        let text = match recorded {
            Ok(()) => transcribe_file(client, TRANSCRIBE_URL, &self.api_key, &audio_path).await,
            Err(e) => Err(e),
        };
        let _ = std::fs::remove_file(&audio_path);
        text
    }
}

fn recorder_available() -> bool {
    Command::new(RECORDER)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

async fn record(path: &Path) -> Result<()> {
    debug!("Recording to {}", path.display());
    let path_arg = path.to_string_lossy().into_owned();
    let max_secs = MAX_RECORD_SECS.to_string();
    let status = tokio::task::spawn_blocking(move || {
        Command::new(RECORDER)
            .args([
                "-q",
                "-c",
                "1",
                "-r",
                "16000",
                path_arg.as_str(),
                // start on sound, stop after 2s of silence
                "silence",
                "1",
                "0.1",
                "1%",
                "1",
                "2.0",
                "1%",
                "trim",
                "0",
                max_secs.as_str(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
    })
    .await?;

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => bail!("{RECORDER} exited with status {s}"),
        Err(e) => bail!("failed to run {RECORDER}: {e}"),
    }
}

async fn transcribe_file(client: &reqwest::Client, url: &str, api_key: &str, audio_path: &Path) -> Result<String> {
    if !audio_path.exists() {
        bail!("no audio captured at {}", audio_path.display());
    }
    debug!("Uploading {} for transcription", audio_path.display());

    let file_bytes = std::fs::read(audio_path)?;
    let file_name = audio_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let file_part = multipart::Part::bytes(file_bytes)
        .file_name(file_name)
        .mime_str("audio/wav")?;

    // No language field: queries may be English or Hindi
    let form = multipart::Form::new()
        .part("file", file_part)
        .text("model", TRANSCRIBE_MODEL)
        .text("response_format", "json");

    let resp = client
        .post(url)
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await
        .map_err(reqwest::Error::without_url)?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("transcription API returned {status}: {body}");
    }

    let json: serde_json::Value = resp.json().await?;
    parse_transcription(&json)
}

fn parse_transcription(json: &serde_json::Value) -> Result<String> {
    match json.get("text").and_then(|t| t.as_str()) {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(_) => bail!("could not understand audio"),
        None => bail!("unexpected transcription API response format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;

    #[test]
    fn test_parse_transcription() {
        let json = serde_json::json!({"text": "  latest tech news  "});
        assert_eq!(parse_transcription(&json).unwrap(), "latest tech news");
    }

    #[test]
    fn test_parse_transcription_silence() {
        let json = serde_json::json!({"text": "   "});
        let err = parse_transcription(&json).unwrap_err();
        assert!(err.to_string().contains("could not understand"));
    }

    #[test]
    fn test_parse_transcription_bad_shape() {
        let json = serde_json::json!({"error": {"message": "bad"}});
        assert!(parse_transcription(&json).is_err());
    }

    #[test]
    fn test_unavailable_messages() {
        assert!(Unavailable::NoRecorder.to_string().contains("SoX"));
        assert!(Unavailable::NoApiKey.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_transcribe_file_uploads_whisper_request() {
        let (base_url, server) = test_server::serve(vec![(200, r#"{"text": " python tutorial "}"#.to_string())]).await;
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("query.wav");
        std::fs::write(&audio, b"RIFF0000WAVE").unwrap();

        let url = format!("{base_url}/v1/audio/transcriptions");
        let text = transcribe_file(&test_server::client(), &url, "sk-voice", &audio).await.unwrap();
        assert_eq!(text, "python tutorial");

        let requests = server.await.unwrap();
        let req = &requests[0];
        assert_eq!(req.request_line(), "POST /v1/audio/transcriptions HTTP/1.1");
        assert_eq!(req.header("authorization"), Some("Bearer sk-voice"));
        assert!(req.header("content-type").unwrap().starts_with("multipart/form-data"));
        let body = req.body_text();
        assert!(body.contains("name=\"model\"\r\n\r\nwhisper-1\r\n"));
        assert!(body.contains("filename=\"query.wav\""));
        assert!(body.contains("RIFF0000WAVE"));
    }

    #[tokio::test]
    async fn test_transcribe_file_rejected_upload() {
        let (base_url, server) = test_server::serve(vec![(401, r#"{"error": {"message": "bad key"}}"#.to_string())]).await;
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("query.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        let err = transcribe_file(&test_server::client(), &base_url, "sk-voice", &audio)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_transcribe_file_missing_audio() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcribe_file(&test_server::client(), "http://127.0.0.1:9", "k", &dir.path().join("none.wav"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no audio captured"));
    }
}
