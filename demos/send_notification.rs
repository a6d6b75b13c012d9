use clap::Parser;
use sentry_twilio::notifications::{Event, Group, Level};
use sentry_twilio::plugins::PluginRegistry;
use sentry_twilio::twilio::rest::RestClient;
use sentry_twilio::{Error, OptionsFileParser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

const LOG_TARGET: &str = "sentry_twilio_demo";

#[derive(Parser, Debug)]
#[clap(name = "send-notification", author, version, about = "Send one Sentry event through the Twilio plugins", long_about = None)]
struct CliArgs {
    /// Path to a TOML file holding the plugin options of each project
    #[clap(short, long, value_parser)]
    options: PathBuf,
    /// Slug of the project the event belongs to
    #[clap(short, long, value_parser)]
    project: String,
    /// Event level [default: error]
    #[clap(short, long, value_parser)]
    level: Option<Level>,
    /// Event message; only its first line is sent
    #[clap(short, long, value_parser)]
    message: String,
    /// Send requests to another Twilio API host
    #[clap(long, value_parser)]
    base_url: Option<String>,
    /// Set the logging level [default: INFO]
    #[clap(long, value_parser)]
    log_level: Option<tracing::Level>,
}

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level.unwrap_or(tracing::Level::INFO)).init();

    if let Err(error) = run(cli).await {
        error!(target: LOG_TARGET, "{}", error)
    }
}

async fn run(args: CliArgs) -> Result<(), Error> {
    let client = match args.base_url {
        Some(url) => RestClient::with_base_url(url)?,
        None => RestClient::new()?,
    };
    let registry = PluginRegistry::with_api(Arc::new(client));

    info!(target: LOG_TARGET, "Reading options from: {}", args.options.display());
    let loaded = OptionsFileParser::from_file(&args.options, &registry)?;

    let project = match loaded.project(&args.project) {
        Some(project) => project.clone(),
        None => {
            warn!(target: LOG_TARGET, "Project {} not found in {}", args.project, args.options.display());
            return Ok(());
        }
    };

    let event = Event::new(args.level.unwrap_or_default(), args.message);
    for outcome in registry.notify(&Group::new(project), &event, loaded.store()).await {
        match outcome.result() {
            Ok(resources) => {
                for resource in resources {
                    info!(target: LOG_TARGET, "{} created {} ({})", outcome.slug(), resource.sid(), resource.status().unwrap_or("unknown"))
                }
            }
            Err(error) => warn!(target: LOG_TARGET, "{} failed: {}", outcome.slug(), error),
        }
    }

    Ok(())
}
