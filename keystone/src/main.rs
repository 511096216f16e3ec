use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod channel;
mod config;
mod errors;
mod serve;
mod telemetry;

use config::Config;
use errors::KeystoneError;

#[derive(Parser)]
#[command(version, about = "Anonymous visitor identity and gRPC channel policies")]
struct Cli {
    #[arg(long, default_value = "keystone.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve HTTP with the anonymous user middleware in front of a demo handler
    Serve,
    /// Print the gRPC service config resolved from a configuration section
    ChannelConfig {
        #[arg(long, default_value = channel::DEFAULT_SECTION)]
        section: String,
        /// Only apply the section's own policies, to every method
        #[arg(long)]
        default_only: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "keystone failed");
            eprintln!("keystone: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), KeystoneError> {
    let config = Config::from_file(&cli.config)?;
    config.validate()?;

    let _sentry = telemetry::init_logging(&config.logging())?;
    telemetry::init_metrics(config.common.metrics.as_ref())?;

    match cli.command {
        CliCommand::Serve => {
            let anonymous_user = config
                .anonymous_user
                .as_ref()
                .ok_or_else(|| KeystoneError::MissingSection("anonymous_user".to_string()))?;

            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            rt.block_on(serve::serve(anonymous_user))
        }
        CliCommand::ChannelConfig {
            section,
            default_only,
        } => {
            let options = channel::resolve_channel_options(&config.raw, &section, default_only)?;
            println!("{}", channel::render(&options)?);
            Ok(())
        }
    }
}
