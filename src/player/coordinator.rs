//! Playback coordination for all guilds
//!
//! Owns every guild's [`GuildState`] and decides what plays next whenever a
//! track finishes. Finished playbacks arrive as [`PlaybackFinished`] messages
//! from the audio sink. State changes happen under the guild's lock, but the
//! lock is released while tracks resolve and notices post, so commands for
//! the guild stay responsive during a slow lookup.

use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::notice::{Announcer, Notice};
use super::state::{GuildState, QueueStatus, RepeatMode};
use crate::audio::{AudioSink, PlaybackFinished, PlaybackStatus, SinkError};
use crate::error::MusicError;
use crate::media::{MediaResolver, TrackInfo};

/// Result of moving a guild to its next track
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Started(TrackInfo),
    QueueFinished,
    NotConnected,
    /// The guild was reset while the next track was resolving
    Cancelled,
}

/// Result of a play request
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// Nothing was playing, playback was kicked off
    Started,
    /// Appended behind the current track; position is 1-based
    Queued { info: TrackInfo, position: usize },
}

/// Player for all guilds
pub struct PlaybackCoordinator<R, S> {
    guilds: DashMap<GuildId, Arc<Mutex<GuildState>>>,
    resolver: Arc<R>,
    sink: Arc<S>,
    announcer: Arc<dyn Announcer>,
    default_volume: f32,
}

impl<R, S> PlaybackCoordinator<R, S>
where
    R: MediaResolver + 'static,
    S: AudioSink<Source = R::Source> + 'static,
{
    pub fn new(
        resolver: Arc<R>,
        sink: Arc<S>,
        announcer: Arc<dyn Announcer>,
        default_volume: f32,
    ) -> Self {
        Self {
            guilds: DashMap::new(),
            resolver,
            sink,
            announcer,
            default_volume,
        }
    }

    /// Get or create the state of a guild
    fn guild(&self, guild_id: GuildId) -> Arc<Mutex<GuildState>> {
        self.guilds
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(GuildState::new(self.default_volume))))
            .value()
            .clone()
    }

    /// Apply finished playbacks until the sink side of the channel is dropped
    pub async fn run(self: Arc<Self>, mut events: UnboundedReceiver<PlaybackFinished>) {
        while let Some(finished) = events.recv().await {
            let player = self.clone();
            tokio::spawn(async move {
                player.on_finished(finished).await;
            });
        }

        info!("Playback event channel closed");
    }

    /// Continue a guild after one of its playbacks ended
    pub async fn on_finished(&self, finished: PlaybackFinished) {
        let guild_id = finished.guild_id;
        let guild = self.guild(guild_id);

        let epoch = {
            let mut state = guild.lock().await;
            if state.active_playback != Some(finished.playback) {
                debug!(
                    "[{}] Ignoring end of playback {} (active: {:?})",
                    guild_id, finished.playback, state.active_playback
                );
                return;
            }

            state.active_playback = None;
            state.begin_advance()
        };

        self.advance(guild_id, &guild, epoch).await;
    }

    /// Requeue for repeat if needed, then start the first queued track that resolves
    ///
    /// The caller marks the guild with [`GuildState::begin_advance`]. Every
    /// exit clears the mark unless a reset already did.
    async fn advance(&self, guild_id: GuildId, guild: &Mutex<GuildState>, epoch: u64) -> Advance {
        if !self.sink.is_connected(guild_id).await {
            warn!("[{}] Cannot advance, no voice connection", guild_id);
            let channel = {
                let mut state = guild.lock().await;
                if state.epoch != epoch {
                    return Advance::Cancelled;
                }
                state.advancing = false;
                state.text_channel
            };
            self.notify(channel, Notice::NotConnected).await;
            return Advance::NotConnected;
        }

        let repeat_of = {
            let mut state = guild.lock().await;
            if state.epoch != epoch {
                return Advance::Cancelled;
            }
            if state.take_skip() {
                debug!("[{}] Skipped, not repeating", guild_id);
                None
            } else if state.repeat != RepeatMode::Off {
                state.now_playing.clone()
            } else {
                None
            }
        };

        if let Some(last) = repeat_of {
            let resolved = self.resolver.resolve(&last.url).await;

            let mut state = guild.lock().await;
            if state.epoch != epoch {
                return Advance::Cancelled;
            }
            match resolved {
                Ok(track) => {
                    debug!(
                        "[{}] Requeueing {} (repeat {})",
                        guild_id,
                        track.info.title,
                        state.repeat.as_str()
                    );
                    state.requeue(track.info);
                }
                Err(e) => {
                    warn!("[{}] Repeat of {} failed: {}", guild_id, last.title, e);
                    let channel = state.text_channel;
                    drop(state);
                    let notice = Notice::RepeatFailed {
                        title: last.title,
                        reason: e.to_string(),
                    };
                    self.notify(channel, notice).await;
                }
            }
        }

        loop {
            let next = {
                let mut state = guild.lock().await;
                if state.epoch != epoch {
                    return Advance::Cancelled;
                }
                match state.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        info!("[{}] Queue finished", guild_id);
                        state.now_playing = None;
                        state.advancing = false;
                        let channel = state.text_channel;
                        drop(state);
                        self.notify(channel, Notice::QueueFinished).await;
                        return Advance::QueueFinished;
                    }
                }
            };

            // Sources are single-use and may expire while queued, so resolve right before playing
            let resolved = self.resolver.resolve(&next.url).await;

            let mut state = guild.lock().await;
            if state.epoch != epoch {
                debug!("[{}] Dropping {}, player was reset", guild_id, next.title);
                return Advance::Cancelled;
            }
            let channel = state.text_channel;

            let track = match resolved {
                Ok(track) => track,
                Err(e) => {
                    drop(state);
                    warn!("[{}] Dropping {}: {}", guild_id, next.title, e);
                    let notice = Notice::PlaybackFailed {
                        title: next.title,
                        reason: e.to_string(),
                    };
                    self.notify(channel, notice).await;
                    continue;
                }
            };

            // Started under the lock so a concurrent stop cannot miss the new playback
            let playback = state.next_playback_id();
            let volume = state.volume;
            match self.sink.play(guild_id, track.source, volume, playback).await {
                Ok(()) => {
                    info!("[{}] Now playing {} ({})", guild_id, track.info.title, track.info.url);
                    state.now_playing = Some(track.info.clone());
                    state.active_playback = Some(playback);
                    state.advancing = false;
                    drop(state);
                    self.notify(channel, Notice::NowPlaying(track.info.clone()))
                        .await;
                    return Advance::Started(track.info);
                }
                Err(SinkError::NotConnected) => {
                    warn!("[{}] Voice connection lost before {} started", guild_id, next.title);
                    state.queue.push_front(next);
                    state.advancing = false;
                    drop(state);
                    self.notify(channel, Notice::NotConnected).await;
                    return Advance::NotConnected;
                }
                Err(e) => {
                    drop(state);
                    warn!("[{}] Could not start {}: {}", guild_id, next.title, e);
                    let notice = Notice::PlaybackFailed {
                        title: next.title,
                        reason: e.to_string(),
                    };
                    self.notify(channel, notice).await;
                }
            }
        }
    }

    async fn notify(&self, channel_id: Option<ChannelId>, notice: Notice) {
        match channel_id {
            Some(channel_id) => self.announcer.announce(channel_id, notice).await,
            None => debug!("No channel for notice: {}", notice),
        }
    }

    /// Connect to the user's voice channel
    pub async fn join(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
    ) -> Result<(), MusicError> {
        let voice_channel = voice_channel.ok_or(MusicError::NotInVoiceChannel)?;

        if self.sink.is_connected(guild_id).await {
            return Err(MusicError::AlreadyConnected);
        }

        self.sink.connect(guild_id, voice_channel).await?;
        self.guild(guild_id).lock().await.text_channel = Some(text_channel);

        Ok(())
    }

    /// Resolve a query and queue it, starting playback if the guild is idle
    pub async fn play(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
        query: &str,
    ) -> Result<PlayOutcome, MusicError> {
        let voice_channel = voice_channel.ok_or(MusicError::NotInVoiceChannel)?;

        if !self.sink.is_connected(guild_id).await {
            self.sink.connect(guild_id, voice_channel).await?;
        }

        let track = self.resolver.resolve(query).await?;

        let guild = self.guild(guild_id);
        let epoch = {
            let mut state = guild.lock().await;
            state.text_channel = Some(text_channel);
            state.queue.push_back(track.info.clone());

            if !state.is_idle() {
                debug!("[{}] Queued {} at {}", guild_id, track.info.title, state.queue.len());
                return Ok(PlayOutcome::Queued {
                    info: track.info,
                    position: state.queue.len(),
                });
            }

            state.begin_advance()
        };

        match self.advance(guild_id, &guild, epoch).await {
            Advance::Started(_) => Ok(PlayOutcome::Started),
            Advance::NotConnected => Err(MusicError::NotConnected),
            // Every queued track failed to start, the requested one included
            Advance::QueueFinished | Advance::Cancelled => {
                Err(MusicError::StartFailed(track.info.title))
            }
        }
    }

    pub async fn set_repeat(&self, guild_id: GuildId, mode: RepeatMode) {
        self.guild(guild_id).lock().await.repeat = mode;
        info!("[{}] Repeat set to {}", guild_id, mode.as_str());
    }

    /// Stop the current track without repeating it; returns what was skipped
    pub async fn skip(&self, guild_id: GuildId) -> Result<Option<TrackInfo>, MusicError> {
        let guild = self.guild(guild_id);
        let mut state = guild.lock().await;

        if !state.is_playing() {
            return Err(MusicError::NothingPlaying);
        }

        state.skip_requested = true;
        if let Err(e) = self.sink.stop(guild_id).await {
            state.skip_requested = false;
            return Err(e.into());
        }

        Ok(state.now_playing.clone())
    }

    /// Clear everything and leave voice
    pub async fn stop(&self, guild_id: GuildId) -> Result<(), MusicError> {
        if !self.sink.is_connected(guild_id).await {
            return Err(MusicError::NotConnected);
        }

        let guild = self.guild(guild_id);
        let mut state = guild.lock().await;

        // Clearing the active playback makes the completion caused by stopping a no-op
        state.reset();

        match self.sink.stop(guild_id).await {
            Ok(()) | Err(SinkError::NothingPlaying) => {}
            Err(e) => warn!("[{}] Stopping track failed: {}", guild_id, e),
        }

        self.sink.disconnect(guild_id).await?;
        info!("[{}] Stopped and disconnected", guild_id);

        Ok(())
    }

    pub async fn pause(&self, guild_id: GuildId) -> Result<(), MusicError> {
        match self.sink.status(guild_id).await {
            Some(PlaybackStatus::Playing) => Ok(self.sink.pause(guild_id).await?),
            _ => Err(MusicError::NothingPlaying),
        }
    }

    pub async fn resume(&self, guild_id: GuildId) -> Result<(), MusicError> {
        match self.sink.status(guild_id).await {
            Some(PlaybackStatus::Paused) => Ok(self.sink.resume(guild_id).await?),
            _ => Err(MusicError::NotPaused),
        }
    }

    /// Set the gain of the current and all later tracks; returns the gain
    pub async fn set_volume(&self, guild_id: GuildId, percent: i64) -> Result<f32, MusicError> {
        if self.sink.status(guild_id).await.is_none() {
            return Err(MusicError::NothingPlaying);
        }

        if !(0..=100).contains(&percent) {
            return Err(MusicError::InvalidInput(
                "Volume must be between 0 and 100.".to_string(),
            ));
        }

        let volume = percent as f32 / 100.0;
        self.sink.set_volume(guild_id, volume).await?;
        self.guild(guild_id).lock().await.volume = volume;

        Ok(volume)
    }

    pub async fn queue_status(&self, guild_id: GuildId, limit: usize) -> QueueStatus {
        self.guild(guild_id).lock().await.status(limit)
    }

    /// Drop queue, repeat state and the voice call after the bot left voice
    pub async fn forget(&self, guild_id: GuildId) {
        if let Some(guild) = self.guilds.get(&guild_id).map(|r| r.value().clone()) {
            guild.lock().await.reset();
        }

        // Without this the stale call would still count as joined
        match self.sink.disconnect(guild_id).await {
            Ok(()) | Err(SinkError::NotConnected) => {}
            Err(e) => warn!("[{}] Tearing down voice failed: {}", guild_id, e),
        }

        info!("[{}] Cleared state after leaving voice", guild_id);
    }
}
