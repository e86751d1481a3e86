use std::io::Write;

use colored::Colorize;

/// Why a track failed this pass. Per-track failures are retryable; fatal
/// outcomes never surface here, they abort the pass instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// The destination search returned no results
    NoMatch,
    /// The destination acknowledged the add but refused it
    Rejected(String),
    /// Network-level failure talking to the destination
    Transport(String),
    /// The search call itself errored
    Search(String),
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailReason::NoMatch => write!(f, "no search results"),
            FailReason::Rejected(body) => write!(f, "rejected: {}", truncate(body, 120)),
            FailReason::Transport(error) => write!(f, "transport error: {}", error),
            FailReason::Search(error) => write!(f, "search error: {}", error),
        }
    }
}

/// Structured progress events emitted by the sync engine. The engine never
/// writes to the terminal itself; a reporter renders these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    PassStarted { total: usize, retry: bool },
    TrackSkipped { track: String },
    TrackAdded { track: String, video_id: String },
    TrackFailed { track: String, reason: FailReason },
    Progress { current: usize, total: usize },
    PassCompleted { failed: usize, retry: bool },
}

pub trait Reporter {
    fn event(&mut self, event: SyncEvent);
}

/// Renders sync events as colored status lines plus a carriage-return
/// progress bar on stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::PassStarted { total, retry } => {
                if retry {
                    println!("{}", format!("Retrying {} failed tracks...", total).yellow());
                } else {
                    println!("{}", format!("Tracks to process: {}", total).yellow());
                }
            }
            SyncEvent::TrackSkipped { track } => {
                println!("{} {}", "Skipped:".blue(), track);
            }
            SyncEvent::TrackAdded { track, video_id } => {
                println!(
                    "{} {} (video {})",
                    "Added:".green().bold(),
                    track,
                    video_id
                );
            }
            SyncEvent::TrackFailed { track, reason } => {
                println!("{} {} ({})", "Failed:".red().bold(), track, reason);
            }
            SyncEvent::Progress { current, total } => {
                print!("\r{}", render_bar(current, total).blue());
                let _ = std::io::stdout().flush();
                if current == total {
                    println!();
                }
            }
            SyncEvent::PassCompleted { failed, retry } => {
                if failed == 0 {
                    if retry {
                        println!(
                            "{}",
                            "All failed tracks have been successfully processed.".green()
                        );
                    } else {
                        println!("{}", "All tracks processed successfully.".green());
                    }
                } else {
                    println!("{}", format!("{} tracks failed this pass.", failed).red());
                }
            }
        }
    }
}

/// `[========------------] 4/10 (40%)`
pub fn render_bar(current: usize, total: usize) -> String {
    const BAR_LENGTH: usize = 20;

    let percent = if total == 0 {
        100
    } else {
        current * 100 / total
    };
    let filled = percent * BAR_LENGTH / 100;
    let bar = "=".repeat(filled) + &"-".repeat(BAR_LENGTH - filled);

    format!("[{}] {}/{} ({}%)", bar, current, total, percent)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
