//! BtcPunchup - Main Entry Point
//!
//! Connects to the Binance and Coinbase trade streams and runs the
//! volume-driven boxing match, logging fighter state for any attached
//! presentation layer.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use btc_punchup::config::load_config;
use btc_punchup::engine::Arena;
use btc_punchup::feed::FeedHub;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting BtcPunchup");
    info!("Configuration file: {}", args.config);

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config))?;

    // Feed first, then the match on top of its snapshot stream
    let feed = FeedHub::new(&config).start().await?;
    let arena = Arena::spawn(config.fight.clone(), feed.snapshots());

    // Stand-in presentation consumer: log every fighter state change
    let mut hero = arena.hero_snapshots();
    let mut villain = arena.villain_snapshots();
    let display = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = hero.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *hero.borrow_and_update();
                    info!(
                        fighter = %snapshot.fighter,
                        state = ?snapshot.state,
                        animation = ?snapshot.animation,
                        damage = snapshot.damage_points,
                        "fighter update"
                    );
                }
                changed = villain.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *villain.borrow_and_update();
                    info!(
                        fighter = %snapshot.fighter,
                        state = ?snapshot.state,
                        animation = ?snapshot.animation,
                        damage = snapshot.damage_points,
                        "fighter update"
                    );
                }
            }
        }
    });

    info!("Match running");

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, cleaning up...");

    arena.shutdown().await;
    feed.shutdown().await;
    display.abort();

    Ok(())
}
