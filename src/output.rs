use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::{Candidate, RankedResult};

/// How many candidates the preview lists before summarizing the rest
const PREVIEW_LEN: usize = 5;

/// Format minutes as `1h 2m 3s` or `2m 3s`
pub fn format_duration(minutes: f64) -> String {
    let total = (minutes.max(0.0) * 60.0).round() as u64;
    let (hours, mins, seconds) = (total / 3600, total / 60 % 60, total % 60);

    if hours > 0 {
        format!("{hours}h {mins}m {seconds}s")
    } else {
        format!("{mins}m {seconds}s")
    }
}

/// Format a timestamp as `Oct 17, 2026`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Format a count with comma thousands separators
pub fn format_views(views: u64) -> String {
    let digits = views.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Plain-text preview of the candidate list
pub fn render_preview(videos: &[Candidate], query: &str) -> String {
    let mut lines = vec![format!("  • Found {} videos matching: '{query}'", videos.len())];
    if !videos.is_empty() {
        lines.push(String::new());
        lines.push("Top results preview:".to_string());
        for (i, video) in videos.iter().take(PREVIEW_LEN).enumerate() {
            lines.push(format!("  {}. {}", i + 1, video.title));
            lines.push(format!(
                "     ↪ Channel: {} | Duration: {}",
                video.channel,
                format_duration(video.duration_minutes)
            ));
        }
        if videos.len() > PREVIEW_LEN {
            lines.push(format!("  ... and {} more", videos.len() - PREVIEW_LEN));
        }
    }
    lines.join("\n")
}

/// Plain-text body of the recommendation card
pub fn render_best(result: &RankedResult) -> String {
    let video = &result.candidate;
    [
        format!("Title: {}", video.title),
        format!("Channel: {}", video.channel),
        format!("Duration: {}", format_duration(video.duration_minutes)),
        format!("Published: {}", format_date(&video.published_at)),
        format!("Views: {}", format_views(video.view_count)),
        format!("URL: {}", video.watch_url()),
    ]
    .join("\n")
}

/// Render the recommendation as pretty-printed JSON
pub fn render_json(result: &RankedResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

pub fn header() {
    println!();
    println!("{}", "┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓".cyan().bold());
    println!("{}", "┃     🎬 YouTube Video Finder with AI Analysis 🔍       ┃".cyan().bold());
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".cyan().bold());
}

pub fn menu() {
    println!("\n{}", "📋 Choose your input method:".yellow().bold());
    println!("  1️⃣  Text input (type your query)");
    println!("  2️⃣  Voice input (speak your query) 🎤");
    println!();
}

pub fn text_prompt() {
    println!("\n{}", "🔍 Enter your search query (Hindi or English):".green().bold());
    println!("{}", "Examples: 'latest tech news', 'python tutorial', 'cooking recipes'".dimmed());
}

pub fn listening() {
    println!("\n{}", "🎤 Listening... Speak your search query (Hindi or English)".magenta().bold());
    println!("{}", "   Recording stops after a short pause.".dimmed());
}

pub fn heard(text: &str) {
    println!("\n{}", format!("✅ You said: '{text}'").green().bold());
}

pub fn notice(message: &str) {
    println!("\n{}", message.yellow());
}

pub fn error_line(message: &str) {
    eprintln!("\n{}", format!("❌ {message}").red().bold());
}

/// Spinner shown while a remote call is in flight
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn videos_found(videos: &[Candidate], query: &str) {
    println!("\n{}", "🎬 Videos found matching your criteria:".cyan().bold());
    println!("{}", render_preview(videos, query));
}

pub fn best_video(result: &RankedResult) {
    println!();
    println!("{}", "┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓".green());
    println!("{}", "┃                 🏆 BEST RECOMMENDATION 🏆             ┃".green().bold());
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".green());
    println!();

    let card = render_best(result);
    let mut lines = card.lines();
    if let Some(title) = lines.next() {
        println!("{}", title.yellow().bold());
    }
    for line in lines {
        if line.starts_with("URL:") {
            println!("{}", line.blue().underline());
        } else {
            println!("{}", line.cyan());
        }
    }

    println!("\n{}", "💡 Why this video was chosen:".magenta().bold());
    println!("   {}", result.rationale);
    println!("\n{}\n", "✨ Enjoy your video! ✨".green().bold());
}
