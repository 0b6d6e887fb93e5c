//! JukeboxBot
//!
//! A Discord bot that plays music from web sources into voice channels,
//! with a per-guild queue and repeat modes.

mod audio;
mod bot;
mod commands;
mod config;
mod error;
mod media;
mod player;

use config::Config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,jukebox_bot=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("JukeboxBot starting...");

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Please ensure DISCORD_TOKEN is set in .env file");
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");
    if let Some(guild_id) = config.guild_id {
        info!("Development mode: Commands will be registered to guild {}", guild_id);
    }

    // Run the bot
    if let Err(e) = bot::run(config).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}
