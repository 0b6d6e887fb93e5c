//! Per-guild playback state

use serenity::model::id::ChannelId;
use std::collections::VecDeque;

use crate::audio::PlaybackId;
use crate::media::TrackInfo;

/// Repeat mode for a guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" => Some(RepeatMode::Off),
            "one" => Some(RepeatMode::One),
            "all" => Some(RepeatMode::All),
            _ => None,
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            RepeatMode::Off => "Off",
            RepeatMode::One => "One track",
            RepeatMode::All => "All tracks",
        }
    }
}

/// Everything the player knows about one guild
#[derive(Debug)]
pub struct GuildState {
    /// Upcoming tracks, front plays next
    pub queue: VecDeque<TrackInfo>,
    pub now_playing: Option<TrackInfo>,
    pub repeat: RepeatMode,
    /// Set by skip; suppresses the next repeat requeue only
    pub skip_requested: bool,
    /// Gain applied to every track started in this guild
    pub volume: f32,
    /// Where player notices are posted
    pub text_channel: Option<ChannelId>,
    /// Playback whose completion is still awaited
    pub(crate) active_playback: Option<PlaybackId>,
    /// A next track is being resolved with the lock released
    pub(crate) advancing: bool,
    /// Bumped by every reset; an advance started under an older epoch is abandoned
    pub(crate) epoch: u64,
    last_playback: PlaybackId,
}

impl GuildState {
    pub fn new(volume: f32) -> Self {
        Self {
            queue: VecDeque::new(),
            now_playing: None,
            repeat: RepeatMode::Off,
            skip_requested: false,
            volume,
            text_channel: None,
            active_playback: None,
            advancing: false,
            epoch: 0,
            last_playback: 0,
        }
    }

    /// Whether a playback has started and not yet completed
    pub fn is_playing(&self) -> bool {
        self.active_playback.is_some()
    }

    /// Neither playing nor about to start a track
    pub fn is_idle(&self) -> bool {
        !self.is_playing() && !self.advancing
    }

    /// Mark the guild as advancing and return the epoch the advance belongs to
    pub(crate) fn begin_advance(&mut self) -> u64 {
        self.advancing = true;
        self.epoch
    }

    /// Read and clear the skip flag
    pub fn take_skip(&mut self) -> bool {
        std::mem::take(&mut self.skip_requested)
    }

    /// Put a finished track back according to the repeat mode
    pub fn requeue(&mut self, info: TrackInfo) {
        match self.repeat {
            RepeatMode::Off => {}
            RepeatMode::One => self.queue.push_front(info),
            RepeatMode::All => self.queue.push_back(info),
        }
    }

    pub(crate) fn next_playback_id(&mut self) -> PlaybackId {
        self.last_playback += 1;
        self.last_playback
    }

    /// Drop queue, repeat and skip state; volume and channel survive
    pub fn reset(&mut self) {
        self.queue.clear();
        self.now_playing = None;
        self.repeat = RepeatMode::Off;
        self.skip_requested = false;
        self.active_playback = None;
        self.advancing = false;
        self.epoch += 1;
    }

    /// Snapshot for display, listing at most `limit` upcoming tracks
    pub fn status(&self, limit: usize) -> QueueStatus {
        QueueStatus {
            now_playing: self.now_playing.clone(),
            upcoming: self.queue.iter().take(limit).cloned().collect(),
            remaining: self.queue.len().saturating_sub(limit),
            repeat: self.repeat,
        }
    }
}

/// Snapshot of a guild's queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueueStatus {
    pub now_playing: Option<TrackInfo>,
    pub upcoming: Vec<TrackInfo>,
    /// Tracks queued beyond `upcoming`
    pub remaining: usize,
    pub repeat: RepeatMode,
}

impl QueueStatus {
    pub fn is_empty(&self) -> bool {
        self.now_playing.is_none() && self.upcoming.is_empty()
    }

    /// Numbered listing of upcoming tracks, one per line
    pub fn upcoming_lines(&self) -> String {
        self.upcoming
            .iter()
            .enumerate()
            .map(|(index, info)| format!("{}. {}", index + 1, info))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(title: &str) -> TrackInfo {
        TrackInfo {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            duration: None,
        }
    }

    #[test]
    fn test_repeat_mode_parse() {
        assert_eq!(RepeatMode::from_str("off"), Some(RepeatMode::Off));
        assert_eq!(RepeatMode::from_str("ONE"), Some(RepeatMode::One));
        assert_eq!(RepeatMode::from_str("all"), Some(RepeatMode::All));
        assert_eq!(RepeatMode::from_str("shuffle"), None);
        assert_eq!(RepeatMode::default(), RepeatMode::Off);
    }

    #[test]
    fn test_requeue_follows_mode() {
        let mut state = GuildState::new(0.5);
        state.queue.extend([info("a"), info("b")]);

        state.requeue(info("x"));
        assert_eq!(state.queue.len(), 2);

        state.repeat = RepeatMode::One;
        state.requeue(info("one"));
        assert_eq!(state.queue.front().map(|t| t.title.as_str()), Some("one"));

        state.repeat = RepeatMode::All;
        state.requeue(info("all"));
        assert_eq!(state.queue.back().map(|t| t.title.as_str()), Some("all"));
    }

    #[test]
    fn test_advancing_guild_is_not_idle() {
        let mut state = GuildState::new(0.5);
        assert!(state.is_idle());

        state.begin_advance();
        assert!(!state.is_idle());
        assert!(!state.is_playing());

        state.advancing = false;
        state.active_playback = Some(state.next_playback_id());
        assert!(!state.is_idle());
    }

    #[test]
    fn test_take_skip_clears_flag() {
        let mut state = GuildState::new(0.5);
        state.skip_requested = true;
        assert!(state.take_skip());
        assert!(!state.take_skip());
    }

    #[test]
    fn test_status_truncates() {
        let mut state = GuildState::new(0.5);
        state.now_playing = Some(info("current"));
        state.repeat = RepeatMode::All;
        state.queue.extend((0..13).map(|i| info(&format!("t{i}"))));

        let status = state.status(10);
        assert_eq!(status.upcoming.len(), 10);
        assert_eq!(status.remaining, 3);
        assert_eq!(status.repeat, RepeatMode::All);
        assert_eq!(status.now_playing.map(|t| t.title), Some("current".to_string()));

        let lines = state.status(2).upcoming_lines();
        assert_eq!(lines, "1. **t0**\n2. **t1**");
    }

    #[test]
    fn test_reset_keeps_volume() {
        let mut state = GuildState::new(0.3);
        state.queue.push_back(info("a"));
        state.now_playing = Some(info("b"));
        state.repeat = RepeatMode::One;
        state.skip_requested = true;
        state.active_playback = Some(state.next_playback_id());
        let epoch = state.begin_advance();

        state.reset();
        assert_ne!(state.epoch, epoch);
        assert!(state.is_idle());
        assert!(state.queue.is_empty());
        assert!(state.now_playing.is_none());
        assert_eq!(state.repeat, RepeatMode::Off);
        assert!(!state.skip_requested);
        assert!(!state.is_playing());
        assert_eq!(state.volume, 0.3);
        assert!(state.status(10).is_empty());
    }
}
