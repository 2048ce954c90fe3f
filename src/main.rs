mod cli;
mod config;
mod domain;
mod infra;
mod matching;
mod media;
mod messages;
mod workflows;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Settings;
use infra::betaseries::BetaseriesClient;
use messages::MessageKey;
use workflows::prompt::ConsolePrompt;
use workflows::App;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let messages = messages::english;

    let settings_path = config::settings_path(cli.config.as_deref());
    let mut settings = Settings::load(&settings_path)?;
    cli.apply_overrides(&mut settings);

    let Some(mode) = cli.mode(&settings) else {
        bail!("{}", messages(MessageKey::CriticalMode));
    };

    let options = settings.validate(
        mode.needs_directory(),
        config::history_path(&settings_path),
        messages,
    )?;
    let client = BetaseriesClient::new(settings.api_key()?)?;

    let mut app = App::new(client, ConsolePrompt::new()?, options, messages);
    app.run(&mode)
}
