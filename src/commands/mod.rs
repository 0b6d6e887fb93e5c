//! Slash commands
//!
//! Each submodule registers its commands and handles their interactions.
//! Player errors are answered to the invoking user and never escape a
//! handler; only failures talking to Discord are returned.

pub mod playback;
pub mod queue;
pub mod voice;

use serenity::all::{
    ChannelId, CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, GuildId, ResolvedOption, ResolvedValue, UserId,
};

/// All commands the bot registers
pub fn register() -> Vec<CreateCommand> {
    vec![voice::register(), playback::register(), queue::register()]
        .into_iter()
        .flatten()
        .collect()
}

/// Voice channel the user is currently in, from the guild cache
pub(crate) fn user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|vs| vs.channel_id)
}

pub(crate) fn string_option<'a>(options: &[ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find(|o| o.name == name).and_then(|o| match o.value {
        ResolvedValue::String(value) => Some(value),
        _ => None,
    })
}

pub(crate) fn integer_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find(|o| o.name == name).and_then(|o| match o.value {
        ResolvedValue::Integer(value) => Some(value),
        _ => None,
    })
}

/// Helper to send a response
pub(crate) async fn respond(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
    ephemeral: bool,
) -> Result<(), serenity::Error> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(ephemeral),
            ),
        )
        .await
}

/// Guild the command was used in, answering the user when there is none
pub(crate) async fn require_guild(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<Option<GuildId>, serenity::Error> {
    match command.guild_id {
        Some(guild_id) => Ok(Some(guild_id)),
        None => {
            respond(ctx, command, "This command only works in a server.", true).await?;
            Ok(None)
        }
    }
}
