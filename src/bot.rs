//! Discord Bot event handler and channel announcer

use crate::audio::{PlaybackFinished, SongbirdSink};
use crate::commands;
use crate::config::Config;
use crate::media::YtDlpResolver;
use crate::player::{Announcer, Notice, PlaybackCoordinator};
use serenity::all::{
    ChannelId, Client, Context, CreateMessage, EventHandler, GatewayIntents, GuildId, Http,
    Interaction, Ready, VoiceState,
};
use serenity::async_trait;
use serenity::prelude::TypeMapKey;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

/// Player wired to yt-dlp and songbird
pub type Player = PlaybackCoordinator<YtDlpResolver, SongbirdSink>;

/// Bot state shared across handlers
pub struct BotState {
    pub config: Arc<Config>,
    pub player: Arc<Player>,
}

/// Type key for storing BotState in client data
pub struct BotStateKey;

impl TypeMapKey for BotStateKey {
    type Value = Arc<BotState>;
}

/// Shared state, stored in client data before the client starts
async fn bot_state(ctx: &Context) -> Option<Arc<BotState>> {
    let data = ctx.data.read().await;
    let state = data.get::<BotStateKey>().cloned();
    if state.is_none() {
        error!("Bot state missing from client data");
    }
    state
}

/// Main event handler for the bot
pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);

        let Some(state) = bot_state(&ctx).await else {
            return;
        };
        let commands = commands::register();

        // If guild ID is set, register to specific guild (faster for dev)
        if let Some(guild_id) = state.config.guild_id {
            let guild = GuildId::new(guild_id);
            match guild.set_commands(&ctx.http, commands).await {
                Ok(cmds) => info!("Registered {} guild commands", cmds.len()),
                Err(e) => error!("Failed to register guild commands: {}", e),
            }
        } else {
            // Register globally
            match serenity::all::Command::set_global_commands(&ctx.http, commands).await {
                Ok(cmds) => info!("Registered {} global commands", cmds.len()),
                Err(e) => error!("Failed to register global commands: {}", e),
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            let Some(state) = bot_state(&ctx).await else {
                return;
            };
            let player = state.player.clone();

            let result = match command.data.name.as_str() {
                "join" => commands::voice::handle_join(&ctx, &command, player).await,
                "stop" => commands::voice::handle_stop(&ctx, &command, player).await,
                "play" => commands::playback::handle_play(&ctx, &command, player).await,
                "skip" => commands::playback::handle_skip(&ctx, &command, player).await,
                "pause" => commands::playback::handle_pause(&ctx, &command, player).await,
                "resume" => commands::playback::handle_resume(&ctx, &command, player).await,
                "volume" => commands::playback::handle_volume(&ctx, &command, player).await,
                "repeat" => commands::queue::handle_repeat(&ctx, &command, player).await,
                "queue" => {
                    let limit = state.config.queue_display_limit;
                    commands::queue::handle_queue(&ctx, &command, player, limit).await
                }
                "help" => commands::queue::handle_help(&ctx, &command).await,
                other => {
                    warn!("Unknown command: {}", other);
                    Ok(())
                }
            };

            if let Err(e) = result {
                error!("Command error: {}", e);
            }
        }
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        if new.channel_id.is_some() {
            return;
        }

        let bot_id = ctx.cache.current_user().id;
        if new.user_id != bot_id {
            return;
        }

        if let Some(guild_id) = new.guild_id {
            debug!("Bot left voice in guild {}", guild_id);
            if let Some(state) = bot_state(&ctx).await {
                state.player.forget(guild_id).await;
            }
        }
    }
}

/// Posts player notices as plain messages
pub struct ChannelAnnouncer {
    http: Arc<Http>,
}

impl ChannelAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Announcer for ChannelAnnouncer {
    async fn announce(&self, channel_id: ChannelId, notice: Notice) {
        let msg = CreateMessage::new().content(notice.to_string());
        if let Err(e) = channel_id.send_message(&self.http, msg).await {
            warn!("Failed to post notice in {}: {}", channel_id, e);
        }
    }
}

/// Wire the player to yt-dlp, songbird and the client's HTTP handle
fn build_player(
    config: &Config,
    songbird: Arc<Songbird>,
    events: UnboundedSender<PlaybackFinished>,
    http: Arc<Http>,
) -> Arc<Player> {
    let sink = Arc::new(SongbirdSink::new(songbird, events));
    let resolver = Arc::new(YtDlpResolver::new(reqwest::Client::new()));
    let announcer = Arc::new(ChannelAnnouncer::new(http));

    Arc::new(PlaybackCoordinator::new(
        resolver,
        sink,
        announcer,
        config.default_volume,
    ))
}

/// Create and run the Discord bot
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(config);
    let songbird = Songbird::serenity();

    // Create client with voice support
    let intents = GatewayIntents::non_privileged() | GatewayIntents::GUILD_VOICE_STATES;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .register_songbird_with(songbird.clone())
        .await?;

    // Track end events flow from the voice driver to the player through this channel
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let player = build_player(&config, songbird, events_tx, client.http.clone());
    tokio::spawn(player.clone().run(events_rx));

    // Store state in client data
    {
        let mut data = client.data.write().await;
        data.insert::<BotStateKey>(Arc::new(BotState {
            config: config.clone(),
            player,
        }));
    }

    // Start the client
    info!("Starting bot...");
    client.start().await?;

    Ok(())
}
