use std::process::ExitCode;

use clap::Parser;
use petfriends_core::PetFriends;
use petfriends_runner::{run_suite, suite, ScenarioContext, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Runs the PetFriends scenario suite against `PETFRIENDS_BASE_URL`.
#[derive(Parser, Debug)]
#[command(name = "petfriends-runner")]
struct Cli {
    /// Run only scenarios whose name contains one of these; all when omitted.
    #[arg(value_name = "FILTER")]
    filters: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "cannot load settings");
            return ExitCode::FAILURE;
        }
    };

    let scenarios = suite::select(&cli.filters);
    if scenarios.is_empty() {
        error!(filters = ?cli.filters, "no scenario matches");
        return ExitCode::FAILURE;
    }

    info!(base_url = %settings.base_url, count = scenarios.len(), "running scenarios");
    let api = PetFriends::new(&settings.base_url);
    let ctx = ScenarioContext::new(&api, &settings);
    match run_suite(&scenarios, &ctx) {
        Ok(report) => {
            println!("{report}");
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}
