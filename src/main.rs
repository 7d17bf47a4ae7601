use std::path::PathBuf;
use std::process::{Command, ExitCode};

use clap::{CommandFactory, FromArgMatches};
use eyre::Result;
use log::{error, info};

use vidpick::config::{Config, ConfigError};
use vidpick::input::{acquire_query, normalize_query};
use vidpick::output;
use vidpick::rank::{self, Gemini};
use vidpick::youtube::{self, YouTubeApi};

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("vidpick.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidpick")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help() -> String {
    let rec_line = match tool_version("rec") {
        Some(v) => format!("  \x1b[32m✅\x1b[0m rec (SoX)  {v}"),
        None => "  \x1b[31m❌\x1b[0m rec (SoX)  (not found, needed for voice input)".to_string(),
    };
    let openai_line = if std::env::var("OPENAI_API_KEY").is_ok() {
        "  \x1b[32m✅\x1b[0m OPENAI_API_KEY".to_string()
    } else {
        "  \x1b[31m❌\x1b[0m OPENAI_API_KEY (not set, needed for voice input)".to_string()
    };

    format!(
        "\nOPTIONAL TOOLS:\n{rec_line}\n{openai_line}\n\nLogs are written to: {}",
        log_dir().join("vidpick.log").display()
    )
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration failed: {e}");
            if matches!(e, ConfigError::Created(_)) {
                output::notice(&e.to_string());
            } else {
                output::error_line(&e.to_string());
            }
            output::error_line("Failed to load configuration. Exiting.");
            return Ok(ExitCode::FAILURE);
        }
    };
    cli.apply(&mut config);

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    let query = match cli.query.as_deref() {
        Some(q) => normalize_query(q),
        None => acquire_query(&client).await?,
    };
    let Some(query) = query else {
        output::error_line("No input provided. Exiting.");
        return Ok(ExitCode::FAILURE);
    };

    let filter = config.search_filter(&query);
    info!("Searching for {query:?} with {filter:?}");
    if cli.verbose {
        eprintln!(
            "Config: {}\nModel: {}\nResults: {} | Duration: {}-{}s | Last {} days | Over-fetch x{}\nLog: {}",
            cli.config.display(),
            config.gemini_model(),
            filter.max_results,
            filter.min_duration_secs,
            filter.max_duration_secs,
            filter.max_age_days,
            filter.over_fetch_factor,
            log_dir().join("vidpick.log").display(),
        );
    }

    let spinner = output::spinner(format!("Searching YouTube for '{query}'..."));
    let api = YouTubeApi::new(client.clone(), &config.youtube_api_key);
    let videos = youtube::search(&api, &filter).await;
    spinner.finish_and_clear();

    if videos.is_empty() {
        output::error_line("No videos found matching your criteria.");
        return Ok(ExitCode::SUCCESS);
    }
    if !cli.json {
        output::videos_found(&videos, &query);
    }

    let spinner = output::spinner("Analyzing video titles with AI...");
    let gemini = Gemini::new(client, &config.gemini_api_key, config.gemini_model());
    let best = rank::rank(&gemini, &videos, &query).await;
    spinner.finish_and_clear();

    if let Some(best) = best {
        info!("Recommended {} ({})", best.candidate.id, best.rationale);
        if cli.json {
            println!("{}", output::render_json(&best)?);
        } else {
            output::best_video(&best);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = setup_logging() {
        eprintln!("warning: could not set up logging: {e}");
    }

    let cmd = Cli::command().after_help(build_after_help());
    let cli = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    tokio::select! {
        result = run(cli) => match result {
            Ok(code) => code,
            Err(e) => {
                error!("Unexpected error: {e:#}");
                output::error_line(&format!("An unexpected error occurred: {e}"));
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            output::notice("🛑 Search cancelled by user. Goodbye!");
            // a stdin read may still be parked on a blocking thread
            std::process::exit(0);
        }
    }
}
