use std::time::Duration;

use crate::ports::youtube::{AddOutcome, YoutubeApi};
use crate::report::{FailReason, Reporter, SyncEvent};
use crate::store::{PlaylistStore, TrackSet};

/// Conditions that end the whole run. These are returned up to `main`,
/// the only place that actually terminates the process.
#[derive(Debug, thiserror::Error)]
pub enum SyncFatal {
    #[error("Youtube credentials are invalid or expired")]
    AuthFailure,
    #[error("Youtube rate limit exceeded (HTTP 429)")]
    RateLimited,
    #[error("too many failures in one pass ({failed})")]
    TooManyFailures { failed: usize },
    #[error("{remaining} tracks could not be transferred after retrying")]
    Unresolved { remaining: usize },
    #[error("failed to persist transfer state: {0}")]
    Store(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Cooperative pause before each track, to stay under the
    /// destination's throttling radar
    pub delay: Duration,
    /// Circuit breaker: abort once a single pass accumulates more than
    /// this many failures
    pub max_failures: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_failures: 30,
        }
    }
}

/// What a completed run did. Only produced when the run finishes without
/// a fatal condition.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Tracks transferred in the main pass
    pub added: usize,
    /// Work items skipped because they were already in the added set
    pub skipped: usize,
    /// Tracks that failed the main pass
    pub first_pass_failures: usize,
    /// Failed tracks the retry pass recovered
    pub recovered: usize,
}

enum Attempt {
    Added { video_id: String },
    Failed(FailReason),
}

/// The incremental synchronization loop: computes which tracks still need
/// transfer, attempts each one through search + add, persists outcomes,
/// and runs one bounded retry pass over whatever failed.
pub struct SyncEngine<'a, Y: YoutubeApi, R: Reporter> {
    youtube: &'a Y,
    store: &'a mut PlaylistStore,
    reporter: &'a mut R,
    options: SyncOptions,
}

impl<'a, Y: YoutubeApi, R: Reporter> SyncEngine<'a, Y, R> {
    pub fn new(
        youtube: &'a Y,
        store: &'a mut PlaylistStore,
        reporter: &'a mut R,
        options: SyncOptions,
    ) -> Self {
        Self {
            youtube,
            store,
            reporter,
            options,
        }
    }

    /// Run the main pass over the work set, then the retry pass if
    /// anything failed.
    pub async fn run(
        &mut self,
        source_tracks: &[String],
        playlist_id: &str,
    ) -> Result<SyncSummary, SyncFatal> {
        let work_set = build_work_set(source_tracks, self.store.added(), self.store.prior_failures());
        let total = work_set.len();

        log::info!(
            "Work set: {} tracks ({} from source, {} prior failures on file)",
            total,
            source_tracks.len(),
            self.store.prior_failures().len()
        );

        let mut summary = SyncSummary::default();
        let mut failed = TrackSet::new();

        self.reporter.event(SyncEvent::PassStarted {
            total,
            retry: false,
        });

        for (index, track) in work_set.iter().enumerate() {
            tokio::time::sleep(self.options.delay).await;

            // The work set already excludes added tracks, but a key can
            // sit in both persisted files at once
            if self.store.is_added(track) {
                summary.skipped += 1;
                self.reporter.event(SyncEvent::TrackSkipped {
                    track: track.to_string(),
                });
                self.reporter.event(SyncEvent::Progress {
                    current: index + 1,
                    total,
                });
                continue;
            }

            match self.attempt(track, playlist_id).await? {
                Attempt::Added { video_id } => {
                    summary.added += 1;
                    self.reporter.event(SyncEvent::TrackAdded {
                        track: track.to_string(),
                        video_id,
                    });
                }
                Attempt::Failed(reason) => {
                    log::warn!("Failed to transfer '{}': {}", track, reason);
                    failed.insert(track);
                    self.reporter.event(SyncEvent::TrackFailed {
                        track: track.to_string(),
                        reason,
                    });

                    // Failure at this scale is systemic, not per-track
                    if failed.len() > self.options.max_failures {
                        return Err(SyncFatal::TooManyFailures {
                            failed: failed.len(),
                        });
                    }
                }
            }

            self.reporter.event(SyncEvent::Progress {
                current: index + 1,
                total,
            });
        }

        summary.first_pass_failures = failed.len();
        self.store.write_failed(&failed)?;
        self.reporter.event(SyncEvent::PassCompleted {
            failed: failed.len(),
            retry: false,
        });

        if !failed.is_empty() {
            self.retry(&failed, playlist_id, &mut summary).await?;
        }

        Ok(summary)
    }

    /// One transfer attempt: search, then add. Per-track failures come
    /// back as `Attempt::Failed`; fatal classifications abort the run.
    async fn attempt(&mut self, track: &str, playlist_id: &str) -> Result<Attempt, SyncFatal> {
        let video_id = match self.youtube.search_first(track).await {
            Ok(Some(video_id)) => video_id,
            Ok(None) => return Ok(Attempt::Failed(FailReason::NoMatch)),
            Err(error) => return Ok(Attempt::Failed(FailReason::Search(error.to_string()))),
        };

        match self.youtube.add_to_playlist(playlist_id, &video_id).await {
            AddOutcome::Added => {
                self.store.record_added(track)?;
                Ok(Attempt::Added { video_id })
            }
            AddOutcome::Rejected(body) => Ok(Attempt::Failed(FailReason::Rejected(body))),
            AddOutcome::TransportError(error) => {
                Ok(Attempt::Failed(FailReason::Transport(error)))
            }
            AddOutcome::AuthFailure => Err(SyncFatal::AuthFailure),
            AddOutcome::RateLimited => Err(SyncFatal::RateLimited),
        }
    }

    /// Second, bounded pass over the main pass's failures. Same pipeline,
    /// no circuit breaker, no further retry.
    async fn retry(
        &mut self,
        failed: &TrackSet,
        playlist_id: &str,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncFatal> {
        let total = failed.len();
        let mut still_failed = TrackSet::new();

        self.reporter.event(SyncEvent::PassStarted { total, retry: true });

        for (index, track) in failed.iter().enumerate() {
            tokio::time::sleep(self.options.delay).await;

            match self.attempt(track, playlist_id).await? {
                Attempt::Added { video_id } => {
                    summary.recovered += 1;
                    self.reporter.event(SyncEvent::TrackAdded {
                        track: track.to_string(),
                        video_id,
                    });
                }
                Attempt::Failed(reason) => {
                    log::warn!("Retry failed for '{}': {}", track, reason);
                    still_failed.insert(track);
                    self.reporter.event(SyncEvent::TrackFailed {
                        track: track.to_string(),
                        reason,
                    });
                }
            }

            self.reporter.event(SyncEvent::Progress {
                current: index + 1,
                total,
            });
        }

        self.reporter.event(SyncEvent::PassCompleted {
            failed: still_failed.len(),
            retry: true,
        });

        if !still_failed.is_empty() {
            self.store.write_unresolved(&still_failed)?;
            return Err(SyncFatal::Unresolved {
                remaining: still_failed.len(),
            });
        }

        Ok(())
    }
}

/// Compute the pass's work set: source tracks (order preserved) that are
/// not in the added set, followed by the prior run's failures that aren't
/// already included. Prior failures are not filtered against the added
/// set here; the loop's skip check covers that overlap.
pub fn build_work_set(
    source_tracks: &[String],
    added: &TrackSet,
    prior_failures: &TrackSet,
) -> TrackSet {
    let mut work_set = TrackSet::new();

    for track in source_tracks {
        if !added.contains(track) {
            work_set.insert(track.clone());
        }
    }
    for track in prior_failures.iter() {
        work_set.insert(track.to_string());
    }

    work_set
}
