use clap::Parser;
use std::path::PathBuf;

use vidpick::config::{Config, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(
    name = "vidpick",
    about = "Find recent YouTube videos for a query and let Gemini pick the best one",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Config file holding the API keys (created on first run)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Search query (skips the interactive menu)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of candidates handed to the ranker
    #[arg(short = 'n', long)]
    pub max_results: Option<u32>,

    /// Shortest acceptable video, in minutes
    #[arg(long)]
    pub min_minutes: Option<u32>,

    /// Longest acceptable video, in minutes
    #[arg(long)]
    pub max_minutes: Option<u32>,

    /// Only consider videos published in the last N days
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Identifiers requested per wanted result, before duration filtering
    #[arg(long)]
    pub over_fetch: Option<u32>,

    /// Gemini model used for ranking
    #[arg(short, long)]
    pub model: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the recommendation as JSON instead of the formatted card
    #[arg(long)]
    pub json: bool,

    /// Show settings and the log file location
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Overlay flags given on the command line onto `config`
    pub fn apply(&self, config: &mut Config) {
        if self.max_results.is_some() {
            config.max_results = self.max_results;
        }
        if self.min_minutes.is_some() {
            config.min_duration_minutes = self.min_minutes;
        }
        if self.max_minutes.is_some() {
            config.max_duration_minutes = self.max_minutes;
        }
        if self.days.is_some() {
            config.max_age_days = self.days;
        }
        if self.over_fetch.is_some() {
            config.over_fetch_factor = self.over_fetch;
        }
        if self.model.is_some() {
            config.gemini_model = self.model.clone();
        }
        if self.timeout.is_some() {
            config.request_timeout_secs = self.timeout;
        }
    }
}
