//! Songbird-backed audio sink
//!
//! Keeps the handle of the track playing in each guild and forwards track
//! end events to the player over a channel, so no guild state is touched
//! from the driver's own context.

use async_trait::async_trait;
use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use songbird::events::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::Input;
use songbird::tracks::{PlayMode, Track, TrackHandle};
use songbird::Songbird;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::{AudioSink, PlaybackFinished, PlaybackId, PlaybackStatus, SinkError};

struct ActiveTrack {
    playback: PlaybackId,
    handle: TrackHandle,
}

/// Audio sink driving songbird voice calls
pub struct SongbirdSink {
    manager: Arc<Songbird>,
    tracks: Arc<DashMap<GuildId, ActiveTrack>>,
    events: UnboundedSender<PlaybackFinished>,
}

impl SongbirdSink {
    pub fn new(manager: Arc<Songbird>, events: UnboundedSender<PlaybackFinished>) -> Self {
        Self {
            manager,
            tracks: Arc::new(DashMap::new()),
            events,
        }
    }

    fn handle(&self, guild_id: GuildId) -> Result<TrackHandle, SinkError> {
        self.tracks
            .get(&guild_id)
            .map(|active| active.handle.clone())
            .ok_or(SinkError::NothingPlaying)
    }
}

#[async_trait]
impl AudioSink for SongbirdSink {
    type Source = Input;

    async fn is_connected(&self, guild_id: GuildId) -> bool {
        // The call outlives a kick or dropped connection until it is removed
        match self.manager.get(guild_id) {
            Some(call) => call.lock().await.current_connection().is_some(),
            None => false,
        }
    }

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), SinkError> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| SinkError::Join(e.to_string()))?;

        let mut call = call.lock().await;
        if call.is_deaf() {
            debug!("Already deafened in guild {}", guild_id);
        } else if let Err(e) = call.deafen(true).await {
            warn!("Deafen failed in guild {}: {}", guild_id, e);
        }

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), SinkError> {
        // Unregistered first so the end event of the stopped track is not forwarded
        if let Some((_, active)) = self.tracks.remove(&guild_id) {
            if let Err(e) = active.handle.stop() {
                debug!("Track {} already gone in guild {}: {}", active.playback, guild_id, e);
            }
        }

        if self.manager.get(guild_id).is_none() {
            return Err(SinkError::NotConnected);
        }

        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| SinkError::Join(e.to_string()))?;

        info!("Left voice in guild {}", guild_id);
        Ok(())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        source: Input,
        volume: f32,
        playback: PlaybackId,
    ) -> Result<(), SinkError> {
        let call = self.manager.get(guild_id).ok_or(SinkError::NotConnected)?;

        let handle = {
            let mut call = call.lock().await;
            call.play(Track::new(source).volume(volume))
        };

        self.tracks.insert(
            guild_id,
            ActiveTrack {
                playback,
                handle: handle.clone(),
            },
        );

        // A source that fails to open raises Error instead of End, so listen for both
        for event in [TrackEvent::End, TrackEvent::Error] {
            let registered = handle.add_event(
                Event::Track(event),
                PlaybackEndNotifier {
                    guild_id,
                    playback,
                    tracks: self.tracks.clone(),
                    events: self.events.clone(),
                },
            );

            if let Err(e) = registered {
                self.tracks
                    .remove_if(&guild_id, |_, active| active.playback == playback);
                let _ = handle.stop();
                return Err(SinkError::Control(e.to_string()));
            }
        }

        debug!("Started playback {} in guild {}", playback, guild_id);
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> Result<(), SinkError> {
        // The handle stays registered until its end event fires
        self.handle(guild_id)?
            .stop()
            .map_err(|e| SinkError::Control(e.to_string()))
    }

    async fn pause(&self, guild_id: GuildId) -> Result<(), SinkError> {
        self.handle(guild_id)?
            .pause()
            .map_err(|e| SinkError::Control(e.to_string()))
    }

    async fn resume(&self, guild_id: GuildId) -> Result<(), SinkError> {
        self.handle(guild_id)?
            .play()
            .map_err(|e| SinkError::Control(e.to_string()))
    }

    async fn set_volume(&self, guild_id: GuildId, volume: f32) -> Result<(), SinkError> {
        self.handle(guild_id)?
            .set_volume(volume)
            .map_err(|e| SinkError::Control(e.to_string()))
    }

    async fn status(&self, guild_id: GuildId) -> Option<PlaybackStatus> {
        let handle = self.handle(guild_id).ok()?;
        let info = handle.get_info().await.ok()?;

        match info.playing {
            PlayMode::Play => Some(PlaybackStatus::Playing),
            PlayMode::Pause => Some(PlaybackStatus::Paused),
            _ => None,
        }
    }
}

/// Track event handler handing finished playbacks to the player
struct PlaybackEndNotifier {
    guild_id: GuildId,
    playback: PlaybackId,
    tracks: Arc<DashMap<GuildId, ActiveTrack>>,
    events: UnboundedSender<PlaybackFinished>,
}

#[async_trait]
impl VoiceEventHandler for PlaybackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        // End and Error may both fire; only the first one unregisters the track
        let removed = self
            .tracks
            .remove_if(&self.guild_id, |_, active| active.playback == self.playback)
            .is_some();

        if removed {
            debug!("Playback {} ended in guild {}", self.playback, self.guild_id);

            let finished = PlaybackFinished {
                guild_id: self.guild_id,
                playback: self.playback,
            };
            if self.events.send(finished).is_err() {
                warn!("Player is gone, dropping end of playback {}", self.playback);
            }
        }

        None
    }
}
