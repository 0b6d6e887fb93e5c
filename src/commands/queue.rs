//! Queue commands: /repeat, /queue, /help

use serenity::all::{
    Colour, CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use std::sync::Arc;

use super::{require_guild, respond, string_option};
use crate::bot::Player;
use crate::player::{QueueStatus, RepeatMode};

const HELP: &str = r#"**Commands:**
    **/join** - Joins your voice channel.
    **/play [URL|search]** - Plays a song, or adds it to the queue if one is already playing.
    **/repeat [off|one|all]** - Repeats nothing, the current song, or the whole queue.
    **/skip** - Skips the current song (it is not repeated).
    **/pause** - Pauses the current song.
    **/resume** - Resumes the paused song.
    **/volume [0-100]** - Sets the volume for this and later songs.
    **/queue** - Shows the current song and what comes next.
    **/stop** - Stops playback, clears the queue and leaves voice."#;

/// Register queue commands
pub fn register() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("repeat")
            .description("Set the repeat mode")
            .dm_permission(false)
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "mode", "Repeat mode")
                    .required(true)
                    .add_string_choice("Off", "off")
                    .add_string_choice("One track", "one")
                    .add_string_choice("All tracks", "all"),
            ),
        CreateCommand::new("queue")
            .description("Show the song queue")
            .dm_permission(false),
        CreateCommand::new("help").description("List the music commands"),
    ]
}

/// Handle /repeat command
pub async fn handle_repeat(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    let options = command.data.options();
    match string_option(&options, "mode").and_then(RepeatMode::from_str) {
        Some(mode) => {
            player.set_repeat(guild_id, mode).await;
            respond(
                ctx,
                command,
                &format!("🔁 Repeat mode set to **{}**.", mode.label()),
                false,
            )
            .await
        }
        None => respond(ctx, command, "❌ Mode must be 'off', 'one' or 'all'.", true).await,
    }
}

/// Handle /queue command
pub async fn handle_queue(
    ctx: &Context,
    command: &CommandInteraction,
    player: Arc<Player>,
    limit: usize,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = require_guild(ctx, command).await? else {
        return Ok(());
    };

    let status = player.queue_status(guild_id, limit).await;
    if status.is_empty() {
        return respond(ctx, command, "The queue is empty.", false).await;
    }

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(queue_embed(&status)),
            ),
        )
        .await
}

fn queue_embed(status: &QueueStatus) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title("🎶 Queue").colour(Colour::BLUE);

    if let Some(info) = &status.now_playing {
        embed = embed.field("Now playing", info.to_string(), false);
    }

    if !status.upcoming.is_empty() {
        embed = embed.field("Up next", status.upcoming_lines(), false);
    }

    if status.remaining > 0 {
        embed = embed.footer(CreateEmbedFooter::new(format!(
            "... and {} more",
            status.remaining
        )));
    }

    embed.author(CreateEmbedAuthor::new(format!(
        "Repeat: {}",
        status.repeat.label()
    )))
}

/// Handle /help command
pub async fn handle_help(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    respond(ctx, command, HELP, true).await
}
