//! Media resolution
//!
//! Turns a URL or free-text search into a playable source plus metadata.
//! Sources are single-use: once handed to the audio sink they cannot be
//! replayed, so replaying a track always means resolving its canonical URL
//! again.

pub mod ytdl;

pub use ytdl::YtDlpResolver;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Nothing to look up for `{0}`")]
    NotFound(String),
    #[error("No page URL returned for `{0}`")]
    MissingUrl(String),
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

/// Metadata of a resolved track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    /// Page URL the track can be resolved from again
    pub url: String,
    pub duration: Option<Duration>,
}

impl fmt::Display for TrackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration {
            Some(duration) => write!(f, "**{}** (`{}`)", self.title, format_duration(duration)),
            None => write!(f, "**{}**", self.title),
        }
    }
}

/// A freshly resolved track: metadata plus a single-use source
pub struct Track<S> {
    pub info: TrackInfo,
    pub source: S,
}

/// Resolves queries into playable tracks
#[async_trait]
pub trait MediaResolver: Send + Sync {
    type Source: Send + 'static;

    /// Resolve a URL or search term. Each call yields a new, unconsumed source.
    async fn resolve(&self, query: &str) -> Result<Track<Self::Source>, ResolveError>;
}

/// Whether the query should be treated as a direct link rather than a search
pub fn is_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

/// Format a duration as `m:ss`, or `h:mm:ss` past one hour
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    let (hours, minutes, seconds) = (seconds / 3600, (seconds / 60) % 60, seconds % 60);

    if hours > 0 {
        format!("{hours}:{minutes:0>2}:{seconds:0>2}")
    } else {
        format!("{minutes}:{seconds:0>2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_secs(205)), "3:25");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1:02:05");
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_url("http://example.com/a.mp3"));
        assert!(!is_url("never gonna give you up"));
        assert!(!is_url("httpfoo"));
    }

    #[test]
    fn test_track_info_display() {
        let info = TrackInfo {
            title: "Song A".to_string(),
            url: "https://example.com/a".to_string(),
            duration: Some(Duration::from_secs(61)),
        };
        assert_eq!(info.to_string(), "**Song A** (`1:01`)");

        let info = TrackInfo { duration: None, ..info };
        assert_eq!(info.to_string(), "**Song A**");
    }
}
