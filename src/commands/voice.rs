//! Voice commands: /join, /stop

use serenity::all::{CommandInteraction, Context, CreateCommand};
use std::sync::Arc;
use tracing::info;

use super::{require_guild, respond, user_voice_channel};
use crate::bot::Player;

/// Register voice commands
pub fn register() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("join")
            .description("Join your current voice channel")
            .dm_permission(false),
        CreateCommand::new("stop")
            .description("Stop playback, clear the queue and leave voice")
            .dm_permission(false),
    ]
}

/// Handle /join command
pub async fn handle_join(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    let voice_channel = user_voice_channel(ctx, guild_id, command.user.id);

    match player.join(guild_id, voice_channel, command.channel_id).await {
        Ok(()) => {
            let channel_name = voice_channel
                .and_then(|id| ctx.cache.channel(id).map(|c| c.name.clone()))
                .unwrap_or_else(|| "voice".to_string());

            info!("Joined {} in guild {}", channel_name, guild_id);
            respond(ctx, command, &format!("Joined `{}`.", channel_name), false).await
        }
        Err(e) => respond(ctx, command, &e.to_string(), true).await,
    }
}

/// Handle /stop command
pub async fn handle_stop(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    match player.stop(guild_id).await {
        Ok(()) => {
            respond(
                ctx,
                command,
                "⏹️ Stopped playback and reset the queue and repeat mode.",
                false,
            )
            .await
        }
        Err(e) => respond(ctx, command, &e.to_string(), true).await,
    }
}
