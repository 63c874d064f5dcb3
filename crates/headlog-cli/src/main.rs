//! headlog - a command-line headache journal.
//!
//! Every launch verifies the stored session first. When there is no usable
//! session the user is asked to sign in before the command runs.

mod commands;
mod display;
mod prompt;

use std::io;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use headlog_core::api::{user_message, ApiError};
use headlog_core::models::{RemedyResult, Side};

#[derive(Debug, Parser)]
#[command(name = "headlog", version, about = "Keep a journal of your headaches")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session token
    SignIn,
    /// Forget the stored session token
    SignOut,
    /// Show aggregate statistics (the default)
    Stats,
    /// List logged headaches
    Logs,
    /// Show one headache in detail
    Show { id: String },
    /// Show the headache still in progress, if any
    Unended,
    /// Log a new headache
    New(NewArgs),
    /// Mark a headache as over
    End { id: String },
    /// Record a remedy taken for a headache
    Remedy {
        id: String,
        remedy_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Rate how well a remedy worked (+ or ++)
    Rate {
        id: String,
        headache_remedy_id: String,
        #[arg(value_parser = parse_rating)]
        result: RemedyResult,
    },
    /// Toggle foods and drinks consumed around a headache
    Consumed {
        id: String,
        #[arg(long = "food")]
        foods: Vec<String>,
        #[arg(long = "drink")]
        drinks: Vec<String>,
    },
    /// List foods, or add one
    Foods {
        #[arg(long)]
        add: Option<String>,
    },
    /// List drinks, or add one
    Drinks {
        #[arg(long)]
        add: Option<String>,
    },
    /// List remedies, or add one
    Remedies {
        #[arg(long)]
        add: Option<String>,
    },
}

#[derive(Debug, clap::Args)]
struct NewArgs {
    /// left, right or both
    #[arg(long)]
    side: Side,
    /// 1 weak, 2 moderate, 3 strong
    #[arg(long, default_value_t = 1)]
    intensity: u8,
    /// Start time (RFC 3339), defaults to now
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// End time (RFC 3339) for a headache that is already over
    #[arg(long)]
    end: Option<DateTime<Utc>>,
    /// Sleep quality the night before, 0-100
    #[arg(long, default_value_t = 0)]
    sleep_rank: u8,
    #[arg(long)]
    pressure: bool,
    #[arg(long)]
    throbbing: bool,
    #[arg(long)]
    stabbing: bool,
    #[arg(long)]
    nausea: bool,
    #[arg(long)]
    light_sensitivity: bool,
    #[arg(long)]
    noise_sensitivity: bool,
    /// Override the configured location
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,
}

/// Ratings the journal accepts; "no relief" is recorded by leaving a remedy unrated
fn parse_rating(value: &str) -> Result<RemedyResult, String> {
    match value.parse()? {
        RemedyResult::NoRelief => Err("rating must be + or ++".to_string()),
        rating => Ok(rating),
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Message for the user: the server's own wording for API failures,
/// the full context chain for local and connection ones
fn describe(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<ApiError>()) {
        Some(ApiError::NetworkError(_)) | None => format!("{:#}", err),
        Some(_) => user_message(err),
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();
    info!(command = ?cli.command, "headlog starting");

    if let Err(e) = commands::run(cli.command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", describe(&e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_new_entry() {
        let cli = Cli::try_parse_from([
            "headlog", "new", "--side", "left", "--intensity", "2", "--nausea", "--latitude",
            "-33.9", "--longitude", "18.4",
        ])
        .unwrap();

        match cli.command {
            Some(Command::New(args)) => {
                assert_eq!(args.side, Side::Left);
                assert_eq!(args.intensity, 2);
                assert!(args.nausea);
                assert!(!args.stabbing);
                assert_eq!(args.latitude, Some(-33.9));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_latitude_requires_longitude() {
        let result = Cli::try_parse_from(["headlog", "new", "--side", "both", "--latitude", "1.0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_rating() {
        let cli = Cli::try_parse_from(["headlog", "rate", "h1", "hr1", "++"]).unwrap();
        match cli.command {
            Some(Command::Rate { result, .. }) => assert_eq!(result, RemedyResult::FullRelief),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_no_relief_rating() {
        assert!(Cli::try_parse_from(["headlog", "rate", "h1", "hr1", "+"]).is_ok());
        assert!(Cli::try_parse_from(["headlog", "rate", "h1", "hr1", "-"]).is_err());
        assert_eq!(parse_rating("-"), Err("rating must be + or ++".to_string()));
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["headlog"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_describe_prefers_server_message() {
        let err: anyhow::Error = ApiError::InvalidRequest("name must not be empty".into()).into();
        assert_eq!(describe(&err), "name must not be empty");

        let err: anyhow::Error = ApiError::RateLimited.into();
        assert_eq!(describe(&err), headlog_core::api::GENERIC_ERROR_MESSAGE);

        let err = anyhow::anyhow!("disk full").context("Failed to save config");
        assert_eq!(describe(&err), "Failed to save config: disk full");
    }
}
