use std::time::Duration;

use color_eyre::Result;
use serde::Deserialize;

use crate::spotify::types::{SpotifyPlaylistDetails, SpotifyTrack};

const PAGE_SIZE: u32 = 100;

/// Spotify API client
pub struct SpotifyClient {
    access_token: String,
    client: reqwest::Client,
}

impl SpotifyClient {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// Get a playlist's metadata (used for its display name)
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<SpotifyPlaylistDetails> {
        let response = self
            .client
            .get(format!(
                "https://api.spotify.com/v1/playlists/{}",
                playlist_id
            ))
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?;

        let playlist: SpotifyPlaylistDetails = response.json().await?;
        Ok(playlist)
    }

    /// Get all tracks in a playlist, following pagination to exhaustion
    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<SpotifyTrack>> {
        let mut all_tracks = Vec::new();
        let mut offset = 0;

        loop {
            let response = self
                .client
                .get(format!(
                    "https://api.spotify.com/v1/playlists/{}/tracks?limit={}&offset={}",
                    playlist_id, PAGE_SIZE, offset
                ))
                .bearer_auth(&self.access_token)
                .timeout(Duration::from_secs(10))
                .send()
                .await?
                .error_for_status()?;

            #[derive(Deserialize)]
            struct PlaylistTrackObject {
                // Null for removed/unavailable entries
                track: Option<SpotifyTrack>,
            }

            #[derive(Deserialize)]
            struct TracksResponse {
                items: Vec<PlaylistTrackObject>,
                next: Option<String>,
                offset: u32,
                limit: u32,
            }

            let page: TracksResponse = response.json().await?;
            let next = page.next.is_some();
            offset = page.offset + page.limit;

            for item in page.items {
                if let Some(track) = item.track {
                    all_tracks.push(track);
                }
            }

            if !next {
                break;
            }
        }

        Ok(all_tracks)
    }

    /// Get the ordered list of track keys for a playlist. Tracks without an
    /// artist entry have no key and are skipped.
    pub async fn playlist_track_keys(&self, playlist_id: &str) -> Result<Vec<String>> {
        let tracks = self.get_playlist_tracks(playlist_id).await?;

        let mut keys = Vec::with_capacity(tracks.len());
        for track in tracks {
            match track.key() {
                Some(key) => keys.push(key),
                None => log::debug!("Skipping track without artists: {}", track.name),
            }
        }

        Ok(keys)
    }
}
