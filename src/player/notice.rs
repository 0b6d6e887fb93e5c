//! Messages the player posts on its own, outside any command response

use async_trait::async_trait;
use serenity::model::id::ChannelId;
use std::fmt;

use crate::media::TrackInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NowPlaying(TrackInfo),
    QueueFinished,
    NotConnected,
    /// Re-resolving a finished track for repeat failed
    RepeatFailed { title: String, reason: String },
    /// A queued track could not be started and was dropped
    PlaybackFailed { title: String, reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NowPlaying(info) => write!(f, "🎵 **Now playing:** {}", info),
            Notice::QueueFinished => write!(f, "✅ Finished playing the queue."),
            Notice::NotConnected => write!(f, "❌ I'm not in a voice channel. Use /join first."),
            Notice::RepeatFailed { title, reason } => {
                write!(f, "⚠️ Could not repeat **{}**: {}", title, reason)
            }
            Notice::PlaybackFailed { title, reason } => {
                write!(f, "⚠️ Could not play **{}**, skipping: {}", title, reason)
            }
        }
    }
}

/// Delivers notices to a text channel
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, channel_id: ChannelId, notice: Notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_notice_text() {
        let info = TrackInfo {
            title: "Song A".to_string(),
            url: "https://example.com/a".to_string(),
            duration: Some(Duration::from_secs(200)),
        };
        assert_eq!(
            Notice::NowPlaying(info).to_string(),
            "🎵 **Now playing:** **Song A** (`3:20`)"
        );

        let notice = Notice::PlaybackFailed {
            title: "Song B".to_string(),
            reason: "gone".to_string(),
        };
        assert_eq!(notice.to_string(), "⚠️ Could not play **Song B**, skipping: gone");
    }
}
