//! Audio output
//!
//! Plays resolved sources into a guild's voice connection and reports each
//! finished playback back to the player

pub mod driver;

pub use driver::SongbirdSink;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use thiserror::Error;

/// Identifies one started playback within a guild
pub type PlaybackId = u64;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Not connected to a voice channel")]
    NotConnected,
    #[error("Nothing is playing")]
    NothingPlaying,
    #[error("Failed to join voice channel: {0}")]
    Join(String),
    #[error("Track control failed: {0}")]
    Control(String),
}

/// Sent once per playback when it ends, naturally or because it was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFinished {
    pub guild_id: GuildId,
    pub playback: PlaybackId,
}

/// State of the source currently loaded in a guild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
}

/// Voice output for all guilds
///
/// Implementations must emit exactly one [`PlaybackFinished`] for every
/// successful `play`, from whatever context the driver runs on.
#[async_trait]
pub trait AudioSink: Send + Sync {
    type Source: Send + 'static;

    /// Whether the guild has a live voice connection, not just a call record
    async fn is_connected(&self, guild_id: GuildId) -> bool;

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), SinkError>;

    /// Drop the current track without a completion and leave the call
    async fn disconnect(&self, guild_id: GuildId) -> Result<(), SinkError>;

    async fn play(
        &self,
        guild_id: GuildId,
        source: Self::Source,
        volume: f32,
        playback: PlaybackId,
    ) -> Result<(), SinkError>;

    async fn stop(&self, guild_id: GuildId) -> Result<(), SinkError>;

    async fn pause(&self, guild_id: GuildId) -> Result<(), SinkError>;

    async fn resume(&self, guild_id: GuildId) -> Result<(), SinkError>;

    async fn set_volume(&self, guild_id: GuildId, volume: f32) -> Result<(), SinkError>;

    /// `None` when no source is loaded
    async fn status(&self, guild_id: GuildId) -> Option<PlaybackStatus>;
}
