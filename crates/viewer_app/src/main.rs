mod cli;
mod config;
mod platform;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use viewer_core::ViewKind;
use viewer_engine::EngineHandle;

use cli::{Cli, Commands};
use platform::app::{run_app, RunOptions};
use platform::effects::StdoutClipboard;
use platform::logging::{self, LogDestination};

const CONFIG_EXIT_CODE: u8 = 2;
const WAIT_SLACK: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, level);

    let env = |key: &str| std::env::var(key).ok();
    let sources = config::Sources {
        config_file: cli.config.as_deref(),
        secret_dir: Path::new(config::DEFAULT_SECRET_DIR),
        env: &env,
    };
    let engine_config = match config::load(&sources) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("gis-viewer: {err}");
            return Ok(ExitCode::from(CONFIG_EXIT_CODE));
        }
    };

    let wait = engine_config.connect_timeout + engine_config.request_timeout + WAIT_SLACK;
    let engine = EngineHandle::new(&engine_config).context("starting engine")?;

    let (kind, identifier, actions) = match cli.command {
        Commands::Opportunity { id, actions } => (ViewKind::Opportunity, id, actions),
        Commands::Post { topic, actions } => (ViewKind::Post, topic, actions),
    };
    let options = RunOptions {
        kind,
        identifier,
        copy: actions.copy,
        export: actions.export.map(Into::into),
        wait,
    };

    let outcome = run_app(&engine, options, StdoutClipboard, std::io::stdout());
    Ok(ExitCode::from(outcome.exit_code()))
}
