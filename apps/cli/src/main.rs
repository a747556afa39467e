mod args;
mod config;
mod data_dir;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use app_api::{
    AppContext, CommandResponse, GetSessionsRequest, GetSettingRequest, ParseFileRequest,
    SaveSettingRequest, respond,
};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use tracker_app::{AppPaths, AppState, ensure_app_data_dir};

use crate::args::{Cli, Commands, SettingCommand};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("agent-usage error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_tracing();
    let command = cli.command.clone().unwrap_or(Commands::Usage);

    // Parsing a single file never opens the store.
    if matches!(command, Commands::Parse { .. }) {
        return dispatch_parse(command, cli.compact);
    }

    let data_dir = data_dir::resolve_data_dir(cli.data_dir.as_deref())?;
    let config_file = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(config::CONFIG_FILE_NAME));
    let config = config::load_or_create(&config_file)?;
    if config.created {
        info!(path = %config.file.display(), "created default config");
    }

    let paths = AppPaths::new(data_dir.clone());
    ensure_app_data_dir(&paths)
        .with_context(|| format!("create data dir {}", paths.app_data_dir.display()))?;
    let app_state = AppState::open(config.config.to_app_config(paths.db_path.clone()))
        .with_context(|| format!("open store {}", paths.db_path.display()))?;
    let ctx = AppContext {
        app_state,
        app_data_dir: data_dir,
    };

    let code = dispatch(&ctx, command, cli.compact)?;
    ctx.app_state.close().context("close store")?;
    Ok(code)
}

fn dispatch(ctx: &AppContext, command: Commands, compact: bool) -> Result<ExitCode> {
    match command {
        Commands::Usage => emit(&respond(app_api::get_all_usage(ctx)), compact),
        Commands::Sessions { provider } => emit(
            &respond(app_api::get_sessions(ctx, GetSessionsRequest { provider })),
            compact,
        ),
        Commands::Refresh => emit(&respond(app_api::refresh_data(ctx)), compact),
        Commands::Rebuild => emit(&respond(app_api::force_rebuild(ctx)), compact),
        Commands::Stats => emit(&respond(app_api::get_db_stats(ctx)), compact),
        Commands::Setting {
            command: SettingCommand::Get { key, default },
        } => emit(
            &respond(app_api::get_setting(ctx, GetSettingRequest { key, default })),
            compact,
        ),
        Commands::Setting {
            command: SettingCommand::Set { key, value },
        } => emit(
            &respond(app_api::save_setting(ctx, SaveSettingRequest { key, value })),
            compact,
        ),
        Commands::Parse { .. } => dispatch_parse(command, compact),
    }
}

fn dispatch_parse(command: Commands, compact: bool) -> Result<ExitCode> {
    let Commands::Parse { provider, path } = command else {
        return Err(anyhow!("not a parse command"));
    };
    emit(
        &respond(app_api::parse_file(ParseFileRequest { provider, path })),
        compact,
    )
}

/// Prints the envelope as JSON on stdout. A failed command exits with 1.
fn emit<T: Serialize>(response: &CommandResponse<T>, compact: bool) -> Result<ExitCode> {
    let json = if compact {
        serde_json::to_string(response)
    } else {
        serde_json::to_string_pretty(response)
    }
    .context("serialize response")?;
    println!("{json}");
    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
