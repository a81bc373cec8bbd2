mod commands;
mod local;
mod request;
mod serve;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{eyre, Result};
use commands::{Cli, Commands};
use mini_core::config::load_user_config;
use mini_core::MiniContext;
use request::{build_request, render_result, Dispatch};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    // Services log to their own file instead.
    if !matches!(command, Commands::Serve { .. }) {
        mini_core::logging::init(cli.verbose);
    }

    let dispatch = match build_request(&command) {
        Ok(dispatch) => dispatch,
        Err(usage) => {
            eprintln!("{usage}");
            return Ok(ExitCode::from(2));
        }
    };

    match run(command, dispatch, cli.json).await {
        Ok(code) => Ok(code),
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(command: Commands, dispatch: Option<Dispatch>, json: bool) -> Result<ExitCode> {
    let mut config = load_user_config()?;

    if let Some(dispatch) = dispatch {
        return send(config, dispatch, json).await;
    }

    let text = match command {
        Commands::Init { path } => local::init(&mut config, path)?,
        Commands::Config => local::show_config(&config, json)?,
        Commands::Logs { agent } => local::logs(&config.logs_path, agent.as_deref())?,
        Commands::Serve { agent } => {
            let Some(agent) = agent.filter(|agent| !agent.trim().is_empty()) else {
                eprintln!("❌ Usage: mini serve <agent>");
                return Ok(ExitCode::from(2));
            };
            serve::serve(&config, agent.trim()).await?;
            return Ok(ExitCode::SUCCESS);
        }
        other => return Err(eyre!("command {other:?} needs an agent")),
    };
    println!("{text}");
    Ok(ExitCode::SUCCESS)
}

async fn send(
    config: mini_protocol::MiniConfig,
    dispatch: Dispatch,
    json: bool,
) -> Result<ExitCode> {
    let context = MiniContext::new(config).map_err(|err| eyre!("{err:#}"))?;
    let manager = context.manager();

    if let Err(err) = manager.start_all().await {
        manager.stop_all().await;
        return Err(eyre!("{err}"));
    }
    let result = manager.dispatch(dispatch.agent, dispatch.request).await;
    manager.stop_all().await;

    let rendered = render_result(&result, json);
    if let Some(stdout) = &rendered.stdout {
        println!("{stdout}");
    }
    if let Some(stderr) = &rendered.stderr {
        eprintln!("{stderr}");
    }
    Ok(if rendered.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
