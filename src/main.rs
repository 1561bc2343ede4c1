//! di2mqtt - Main Entry Point

use clap::{Parser, Subcommand};
use di2mqtt::clock::MonotonicClock;
use di2mqtt::config::MonitorConfig;
use di2mqtt::error::AgentResult;
use di2mqtt::input::GpioInputSource;
use di2mqtt::monitor::MonitorLoop;
use di2mqtt::observability::init_default_logging;
use di2mqtt::transport::mqtt::MqttLink;
use std::path::PathBuf;
use std::process;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Digital input monitoring agent publishing to MQTT
#[derive(Parser)]
#[command(name = "di2mqtt")]
#[command(about = "Mirrors digital inputs onto retained MQTT topics")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring agent
    Run,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("Starting di2mqtt v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run => run_agent(config).await.map_err(Into::into),
        Commands::Config { show } => handle_config_command(config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    info!("Application shutdown complete");
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(MonitorConfig::load_from_file(path)?)
        }
        None => {
            // Try default locations
            let default_paths = vec![
                "di2mqtt.toml",
                "config/di2mqtt.toml",
                "/etc/di2mqtt/di2mqtt.toml",
            ];

            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(MonitorConfig::load_from_file(&path)?);
                }
            }

            error!(
                "No configuration file found. Please provide one with -c/--config or create di2mqtt.toml"
            );
            process::exit(1);
        }
    }
}

async fn run_agent(config: MonitorConfig) -> AgentResult<()> {
    info!(
        device = %config.device.name,
        channels = config.inputs.len(),
        "agent starting"
    );

    let source = GpioInputSource::new(&config.bcm_pins())?;
    let link = MqttLink::new(&config.device.name);

    // Signal handling: SIGINT/SIGTERM flip the shutdown flag; the loop
    // finishes its iteration, says goodbye on the alive topic, and exits.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
        let _ = shutdown_tx.send(true);
    });

    let mut monitor = MonitorLoop::new(config, link, source, MonotonicClock::new());
    monitor.run(shutdown_rx).await;

    Ok(())
}

fn handle_config_command(
    config: MonitorConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
