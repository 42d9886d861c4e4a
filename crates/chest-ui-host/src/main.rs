mod config;
mod session;

use std::path::Path;
use std::time::Duration;

use config::HostConfig;
use session::Session;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

const CONFIG_PATH: &str = "chest_ui.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.into());
    let config = match HostConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let base_dir = Path::new(&config_path)
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let textures = match config.texture_table(base_dir) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to load textures: {e}");
            std::process::exit(1);
        }
    };

    info!("Chest UI host v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Loaded {} texture indices", textures.len());
    info!(
        "Inventory projection: {}, reopen delay: {} ticks",
        config.ui.inventory_enabled, config.ui.reopen_delay_ticks
    );

    let mut session = Session::new(config, textures);
    session.offsets().log_state();
    info!("Type 'help' for commands");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    // 20 TPS, like the game loop the service normally lives in
    let mut tick_interval = tokio::time::interval(Duration::from_millis(50));
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                for view in session.game_tick() {
                    info!("{view}");
                }
            }
            line = console_rx.recv() => {
                match line {
                    Some(line) if line == "stop" => break,
                    Some(line) => match session.handle_command(&line) {
                        Ok(out) => info!("{out}"),
                        Err(e) => warn!("{e}"),
                    },
                    None => break, // stdin closed
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("Host stopped after {} ticks", session.current_tick());
}
