//! Errors surfaced to users at the command boundary
//!
//! The `Display` text of each variant is what the user sees.

use thiserror::Error;

use crate::audio::SinkError;
use crate::media::ResolveError;

#[derive(Error, Debug)]
pub enum MusicError {
    #[error("❌ I'm not in a voice channel. Use /join first.")]
    NotConnected,
    #[error("I'm already in a voice channel!")]
    AlreadyConnected,
    #[error("Join a voice channel first!")]
    NotInVoiceChannel,
    #[error("❌ Could not find that song: `{0}`")]
    Resolution(#[from] ResolveError),
    #[error("❌ Could not start **{0}**.")]
    StartFailed(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Nothing is playing right now.")]
    NothingPlaying,
    #[error("Nothing is paused right now.")]
    NotPaused,
    #[error("⚠️ Voice error: {0}")]
    Voice(SinkError),
}

impl From<SinkError> for MusicError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::NotConnected => MusicError::NotConnected,
            SinkError::NothingPlaying => MusicError::NothingPlaying,
            other => MusicError::Voice(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_mapping() {
        assert!(matches!(MusicError::from(SinkError::NotConnected), MusicError::NotConnected));
        assert!(matches!(MusicError::from(SinkError::NothingPlaying), MusicError::NothingPlaying));
        assert!(matches!(
            MusicError::from(SinkError::Control("boom".to_string())),
            MusicError::Voice(_)
        ));
    }

    #[test]
    fn test_resolution_message() {
        let err = MusicError::from(ResolveError::Extraction("HTTP Error 403".to_string()));
        assert_eq!(err.to_string(), "❌ Could not find that song: `Extraction failed: HTTP Error 403`");
    }

    #[test]
    fn test_start_failed_message() {
        let err = MusicError::StartFailed("Song A".to_string());
        assert_eq!(err.to_string(), "❌ Could not start **Song A**.");
    }
}
