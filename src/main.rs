use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use innkeep::commands::{self, Command};
use innkeep::config::HotelConfig;
use innkeep::engine::Engine;
use innkeep::notify::{NotifyHub, Topic};
use innkeep::ticker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = HotelConfig::from_env();
    innkeep::observability::init(config.metrics_port);

    info!("innkeep starting");
    info!("  rooms: {}", config.rooms);
    info!("  parking_slots: {}", config.parking_slots);
    info!("  tick: {:?}", config.tick_interval);
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let notify = Arc::new(NotifyHub::new());
    let tick = config.tick_interval;
    let engine = Arc::new(Engine::standard(config, notify.clone()));

    // Activity log: every committed mutation.
    let mut events = notify.subscribe(Topic::All);
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(target: "innkeep::activity", "{event:?}"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("activity log skipped {n} events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tokio::spawn(ticker::run_status_ticker(engine.clone(), tick));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"innkeep ready; type `help` for commands\n").await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match commands::parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => commands::run(&engine, cmd).await,
            Err(e) => Err(e),
        };
        let text = match reply {
            Ok(text) => text,
            Err(e) => format!("error: {e}"),
        };
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    info!("innkeep stopped");
    Ok(())
}
