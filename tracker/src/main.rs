//! Fleet Tracker - Entry Point
//!
//! Serves the simulated deployment tracker API, or acts as a client of one:
//! watching it, or issuing a single client call (deploy, rollback, command,
//! server or deployment lookup, status).

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::Context;
use fleet_tracker::app::options::AppOptions;
use fleet_tracker::app::run::{run, watch};
use fleet_tracker::filesys::file::File;
use fleet_tracker::http::client::ApiClient;
use fleet_tracker::logs::{init_logging, LogOptions};
use fleet_tracker::storage::settings::Settings;
use fleet_tracker::sync::syncer::Synchronizer;
use fleet_tracker::utils::version_info;

use tracing::{error, info, warn};

const DEFAULT_SETTINGS_FILE: &str = "tracker.json";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", version.version),
        }
        return;
    }

    // Retrieve the settings file
    let (settings_path, required) = match cli_args.get("config") {
        Some(path) => (path.clone(), true),
        None => (DEFAULT_SETTINGS_FILE.to_string(), false),
    };
    let mut settings = match Settings::load(&File::new(settings_path), required).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = settings.apply_env(|key| env::var(key).ok()) {
        eprintln!("Invalid environment: {e}");
        std::process::exit(1);
    }
    if let Err(e) = settings.validate() {
        eprintln!("Invalid settings: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.log_json,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    let options = AppOptions::from(&settings);

    // One-shot client commands
    if is_client_command(&cli_args) {
        if let Err(e) = client_command(&cli_args, &options).await {
            error!("{e:#}");
            std::process::exit(1);
        }
        return;
    }

    let result = if cli_args.contains_key("watch") {
        info!("Watching fleet with options: {:?}", options);
        watch(options, await_shutdown_signal()).await
    } else {
        info!("Running fleet tracker with options: {:?}", options);
        run(version.version, options, await_shutdown_signal()).await
    };
    if let Err(e) = result {
        error!("Fleet tracker stopped with an error: {e}");
        std::process::exit(1);
    }
}

fn is_client_command(cli_args: &HashMap<String, String>) -> bool {
    ["deploy", "rollback", "command", "server", "deployment", "status"]
        .iter()
        .any(|key| cli_args.contains_key(*key))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn client_command(
    cli_args: &HashMap<String, String>,
    options: &AppOptions,
) -> anyhow::Result<()> {
    let client = Arc::new(
        ApiClient::new(&options.client.base_url, options.client.request_timeout)
            .context("failed to create API client")?,
    );
    let syncer = Synchronizer::new(client.clone());

    if let Some(version) = cli_args.get("deploy") {
        let servers = cli_args.get("servers").map(|s| split_list(s));
        let record = syncer
            .deploy(version, servers)
            .await
            .with_context(|| format!("deployment of {version} failed"))?;
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else if let Some(id) = cli_args.get("rollback") {
        let record = syncer
            .rollback(id)
            .await
            .with_context(|| format!("rollback of deployment {id} failed"))?;
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else if let Some(command) = cli_args.get("command") {
        let command_args = cli_args
            .get("args")
            .map(|s| split_list(s))
            .unwrap_or_default();
        let output = syncer
            .execute_command(command, command_args)
            .await
            .with_context(|| format!("command {command} failed"))?;
        print!("{output}");
    } else if let Some(id) = cli_args.get("server") {
        let node = client
            .get_server(id)
            .await
            .with_context(|| format!("lookup of server {id} failed"))?;
        println!("{}", serde_json::to_string_pretty(&node)?);
    } else if let Some(id) = cli_args.get("deployment") {
        let record = client
            .get_deployment(id)
            .await
            .with_context(|| format!("lookup of deployment {id} failed"))?;
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        match client.health().await {
            Ok(health) => info!("Tracker {} is {}", health.version, health.status),
            Err(e) => warn!("Health check failed: {e}"),
        }
        if let Err(e) = syncer.refresh().await {
            warn!("Tracker unreachable, showing offline snapshot: {e}");
        }
        let summary = syncer.summary().await;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    warn!("Unable to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}
