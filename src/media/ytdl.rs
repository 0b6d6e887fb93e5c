//! yt-dlp backed resolver
//!
//! Uses songbird's lazy `YoutubeDl` input: metadata is fetched eagerly so the
//! title and page URL are known, while the audio stream itself is only opened
//! by the driver once the track starts.

use async_trait::async_trait;
use reqwest::Client;
use songbird::input::{Compose, Input, YoutubeDl};
use tracing::{debug, warn};

use super::{is_url, MediaResolver, ResolveError, Track, TrackInfo};

const UNKNOWN_TRACK_TITLE: &str = "Unknown track";

/// Resolver invoking the `yt-dlp` executable through songbird
#[derive(Clone)]
pub struct YtDlpResolver {
    http: Client,
}

impl YtDlpResolver {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    type Source = Input;

    async fn resolve(&self, query: &str) -> Result<Track<Input>, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::NotFound(query.to_string()));
        }

        let mut ytdl = if is_url(query) {
            YoutubeDl::new(self.http.clone(), query.to_string())
        } else {
            YoutubeDl::new_search(self.http.clone(), query.to_string())
        };

        let metadata = ytdl.aux_metadata().await.map_err(|e| {
            warn!("yt-dlp failed for {}: {}", query, e);
            ResolveError::Extraction(e.to_string())
        })?;

        let url = metadata
            .source_url
            .ok_or_else(|| ResolveError::MissingUrl(query.to_string()))?;

        let info = TrackInfo {
            title: metadata
                .title
                .unwrap_or_else(|| UNKNOWN_TRACK_TITLE.to_string()),
            url,
            duration: metadata.duration,
        };

        debug!("Resolved {} to {} ({})", query, info.title, info.url);

        // Searches are pinned to the hit we just described so the stream matches the metadata
        let source = if is_url(query) {
            ytdl
        } else {
            YoutubeDl::new(self.http.clone(), info.url.clone())
        };

        Ok(Track {
            info,
            source: source.into(),
        })
    }
}
