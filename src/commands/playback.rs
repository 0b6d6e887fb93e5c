//! Playback commands: /play, /skip, /pause, /resume, /volume

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    EditInteractionResponse,
};
use std::sync::Arc;
use tracing::info;

use super::{integer_option, require_guild, respond, string_option, user_voice_channel};
use crate::bot::Player;
use crate::player::PlayOutcome;

/// Register playback commands
pub fn register() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("play")
            .description("Play a song or add it to the queue")
            .dm_permission(false)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "query",
                    "URL or search terms",
                )
                .required(true),
            ),
        CreateCommand::new("skip")
            .description("Skip the current song")
            .dm_permission(false),
        CreateCommand::new("pause")
            .description("Pause the current song")
            .dm_permission(false),
        CreateCommand::new("resume")
            .description("Resume the paused song")
            .dm_permission(false),
        CreateCommand::new("volume")
            .description("Set the playback volume (0-100)")
            .dm_permission(false)
            .add_option(
                CreateCommandOption::new(CommandOptionType::Integer, "percent", "Volume in percent")
                    .required(true),
            ),
    ]
}

/// Handle /play command
pub async fn handle_play(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    let options = command.data.options();
    let Some(query) = string_option(&options, "query") else {
        return respond(ctx, command, "Tell me what to play.", true).await;
    };

    let voice_channel = user_voice_channel(ctx, guild_id, command.user.id);

    // Looking the song up can take a while
    command.defer_ephemeral(&ctx.http).await?;

    info!("Play requested in guild {}: {}", guild_id, query);

    let content = match player
        .play(guild_id, voice_channel, command.channel_id, query)
        .await
    {
        Ok(PlayOutcome::Started) => "▶️ Starting playback!".to_string(),
        Ok(PlayOutcome::Queued { info, position }) => {
            format!("✅ **Added to queue:** {} (position {})", info, position)
        }
        Err(e) => e.to_string(),
    };

    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await?;

    Ok(())
}

/// Handle /skip command
pub async fn handle_skip(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    match player.skip(guild_id).await {
        Ok(Some(info)) => respond(ctx, command, &format!("⏭️ Skipped {}.", info), false).await,
        Ok(None) => respond(ctx, command, "⏭️ Skipped the current song.", false).await,
        Err(e) => respond(ctx, command, &e.to_string(), true).await,
    }
}

/// Handle /pause command
pub async fn handle_pause(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    match player.pause(guild_id).await {
        Ok(()) => respond(ctx, command, "⏸️ Paused.", false).await,
        Err(e) => respond(ctx, command, &e.to_string(), true).await,
    }
}

/// Handle /resume command
pub async fn handle_resume(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    match player.resume(guild_id).await {
        Ok(()) => respond(ctx, command, "▶️ Resumed.", false).await,
        Err(e) => respond(ctx, command, &e.to_string(), true).await,
    }
}

/// Handle /volume command
pub async fn handle_volume(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    let Some(percent) = integer_option(&command.data.options(), "percent") else {
        return respond(ctx, command, "Give a volume between 0 and 100.", true).await;
    };

    match player.set_volume(guild_id, percent).await {
        Ok(_) => {
            info!("Guild {} set volume to {}%", guild_id, percent);
            respond(ctx, command, &format!("🔊 Volume set to {}%.", percent), false).await
        }
        Err(e) => respond(ctx, command, &e.to_string(), true).await,
    }
}
