use color_eyre::eyre::Result;

/// Classified result of one "add video to playlist" request.
///
/// `AuthFailure` and `RateLimited` are fatal: every subsequent call would
/// fail the same way, so the sync must stop rather than burn through the
/// remaining tracks. The other non-success outcomes are per-track failures
/// eligible for the retry pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The destination acknowledged the add as succeeded
    Added,
    /// Acknowledged but not succeeded (duplicate, invalid item, ...)
    Rejected(String),
    /// The response indicates invalid or expired credentials
    AuthFailure,
    /// HTTP 429 from the destination
    RateLimited,
    /// Network-level failure, nothing acknowledged
    TransportError(String),
}

impl AddOutcome {
    /// Whether this outcome must terminate the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, AddOutcome::AuthFailure | AddOutcome::RateLimited)
    }
}

/// Port trait wrapping the YouTube capabilities used by the sync engine.
///
/// Implementations live in `youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YoutubeApi: Send + Sync {
    /// Search for `query` and return the top-ranked video ID, or `None`
    /// when the result set is empty. First result wins; there is no
    /// scoring or disambiguation.
    async fn search_first(&self, query: &str) -> Result<Option<String>>;

    /// Add one video to the playlist and classify the response. Never
    /// retries internally; retry policy belongs to the caller.
    async fn add_to_playlist(&self, playlist_id: &str, video_id: &str) -> AddOutcome;
}
