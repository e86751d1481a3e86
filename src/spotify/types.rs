use serde::Deserialize;

/// Spotify token response for the client-credentials grant
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Playlist metadata; only the display name is used, to key the on-disk
/// state folder.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistDetails {
    pub id: String,
    pub name: String,
}

/// Spotify track from the playlist listing
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

impl SpotifyTrack {
    /// Dedup identity for this track: "title + primary artist name".
    ///
    /// Deliberately fuzzy: two distinct tracks with the same title and
    /// primary artist collapse to one key, and platform-side title
    /// variants diverge. Returns `None` for tracks with no artist entry.
    pub fn key(&self) -> Option<String> {
        self.artists
            .first()
            .map(|artist| format!("{} {}", self.name, artist.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, artists: &[&str]) -> SpotifyTrack {
        SpotifyTrack {
            name: name.into(),
            artists: artists
                .iter()
                .map(|a| SpotifyArtist { name: (*a).into() })
                .collect(),
        }
    }

    #[test]
    fn key_uses_primary_artist_only() {
        let t = track("Song", &["First", "Second"]);
        assert_eq!(t.key().unwrap(), "Song First");
    }

    #[test]
    fn key_is_none_without_artists() {
        assert!(track("Song", &[]).key().is_none());
    }
}
