use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use regex::Regex;
use serde::{Deserialize, Serialize};

fn default_state_dir() -> String {
    "playlists".to_string()
}

fn default_delay_ms() -> u64 {
    500
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding per-playlist transfer state
    #[serde(default = "default_state_dir")]
    state_dir: String,

    /// Pause between track transfers, in milliseconds
    #[serde(default = "default_delay_ms")]
    delay_ms: u64,

    pub spotify: SpotifyConfig,
    pub youtube: YoutubeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Playlist URL or bare playlist ID
    pub playlist_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// Playlist URL or bare playlist ID
    pub playlist_url: String,

    /// Request headers sent verbatim on every YouTube call. Must include
    /// `X-Youtube-Client-Version` and a logged-in `Cookie`.
    pub headers: HashMap<String, String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-porter").join("config.toml"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("No default config path found")?;
        Self::from_file(&config_path)
    }

    /// Write a commented template config to the default location, if it
    /// doesn't exist yet. Returns the path written to.
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or_eyre("No default config path found")?;
        if config_path.exists() {
            return Ok(config_path);
        }
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if path.starts_with("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(&path[2..]);
            }
        }
        PathBuf::from(path)
    }

    /// Get expanded state directory path
    pub fn state_dir_path(&self) -> PathBuf {
        self.expand_path(&self.state_dir)
    }

    /// Pause between track transfers
    pub fn transfer_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Source playlist ID, extracted from the configured URL
    pub fn spotify_playlist_id(&self) -> String {
        extract_spotify_playlist_id(&self.spotify.playlist_url)
    }

    /// Destination playlist ID, extracted from the configured URL
    pub fn youtube_playlist_id(&self) -> String {
        extract_youtube_playlist_id(&self.youtube.playlist_url)
    }
}

impl YoutubeConfig {
    /// The innertube client version, read from the configured headers
    pub fn client_version(&self) -> Option<&str> {
        self.headers
            .get("X-Youtube-Client-Version")
            .map(String::as_str)
    }
}

/// Extract the playlist ID from a Spotify playlist URL: the path segment
/// between `playlist/` and the next `?`. Inputs that don't look like a URL
/// are returned unchanged and treated as a bare ID.
pub fn extract_spotify_playlist_id(input: &str) -> String {
    let re = Regex::new(r"playlist/([^?]+)").unwrap();
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

/// Extract the playlist ID from a YouTube playlist URL: the value of the
/// `list=` query parameter, else the raw input.
pub fn extract_youtube_playlist_id(input: &str) -> String {
    let re = Regex::new(r"[?&]list=([^&]+)").unwrap();
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

const DEFAULT_CONFIG: &str = r#"# playlist-porter configuration

# state_dir = "playlists"
# delay_ms = 500

[spotify]
client_id = ""
client_secret = ""
playlist_url = ""

[youtube]
playlist_url = ""

[youtube.headers]
"Content-Type" = "application/json"
"X-Youtube-Client-Name" = "1"
"X-Youtube-Client-Version" = ""
"Cookie" = ""
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_spotify_id_from_url() {
        assert_eq!(
            extract_spotify_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DX?si=abc"),
            "37i9dQZF1DX"
        );
    }

    #[test]
    fn extracts_spotify_id_without_query() {
        assert_eq!(
            extract_spotify_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DX"),
            "37i9dQZF1DX"
        );
    }

    #[test]
    fn passes_through_bare_spotify_id() {
        assert_eq!(extract_spotify_playlist_id("37i9dQZF1DX"), "37i9dQZF1DX");
    }

    #[test]
    fn extracts_youtube_id_from_url() {
        assert_eq!(
            extract_youtube_playlist_id("https://www.youtube.com/playlist?list=PLx1&feature=share"),
            "PLx1"
        );
    }

    #[test]
    fn passes_through_bare_youtube_id() {
        assert_eq!(extract_youtube_playlist_id("PLx1"), "PLx1");
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            state_dir = "~/state"
            delay_ms = 250

            [spotify]
            client_id = "id"
            client_secret = "secret"
            playlist_url = "https://open.spotify.com/playlist/abc?si=x"

            [youtube]
            playlist_url = "https://www.youtube.com/playlist?list=PLdef"

            [youtube.headers]
            "X-Youtube-Client-Version" = "2.20240101.00.00"
            "Cookie" = "SID=..."
            "#,
        )
        .unwrap();

        assert_eq!(config.spotify_playlist_id(), "abc");
        assert_eq!(config.youtube_playlist_id(), "PLdef");
        assert_eq!(config.transfer_delay(), Duration::from_millis(250));
        assert_eq!(config.youtube.client_version(), Some("2.20240101.00.00"));
    }

    #[test]
    fn state_dir_and_delay_default() {
        let config: Config = toml::from_str(
            r#"
            [spotify]
            client_id = "id"
            client_secret = "secret"
            playlist_url = "abc"

            [youtube]
            playlist_url = "PLdef"
            headers = {}
            "#,
        )
        .unwrap();

        assert_eq!(config.state_dir, "playlists");
        assert_eq!(config.transfer_delay(), Duration::from_millis(500));
        assert_eq!(config.youtube.client_version(), None);
    }

    #[test]
    fn default_template_parses() {
        let parsed: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(parsed.is_ok());
    }
}
