//! Current score and persisted high score
//!
//! A new best is handed to a saver thread that owns the store, so a slow
//! disk never stalls the frame that scored.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::consts::HIGH_SCORE_KEY;
use crate::persistence::PersistenceStore;
use crate::sim::ScoreKeeper;

/// Label drawn under the high score
pub const HIGH_SCORE_LABEL: &str = "High Score";

enum SaveRequest {
    Save(i64),
    /// Acknowledged once every earlier save has been attempted
    Flush(Sender<()>),
}

struct Saver {
    tx: Sender<SaveRequest>,
    handle: JoinHandle<()>,
}

impl Saver {
    fn spawn(mut store: Box<dyn PersistenceStore>) -> Option<Self> {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("high-score-saver".into())
            .spawn(move || {
                for request in rx {
                    match request {
                        SaveRequest::Save(value) => {
                            if let Err(e) = store.put_int(HIGH_SCORE_KEY, value) {
                                log::warn!("Failed to save high score {}: {}", value, e);
                            }
                        }
                        SaveRequest::Flush(ack) => {
                            // The waiter may have given up; nothing to report
                            let _ = ack.send(());
                        }
                    }
                }
                log::debug!("High score saver stopped");
            });
        match spawned {
            Ok(handle) => Some(Self { tx, handle }),
            Err(e) => {
                log::error!("Cannot start high score saver, scores will not be saved: {}", e);
                None
            }
        }
    }
}

/// Score of the running game plus the best score ever reached
pub struct ScoreTracker {
    score: u32,
    high_score: u32,
    saver: Option<Saver>,
}

impl std::fmt::Debug for ScoreTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreTracker")
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .finish_non_exhaustive()
    }
}

impl ScoreTracker {
    /// Load the high score from `store` (0 if absent), then hand the store
    /// to the saver thread
    pub fn new(store: Box<dyn PersistenceStore>) -> Self {
        let stored = store.get_int(HIGH_SCORE_KEY, 0);
        let high_score = u32::try_from(stored).unwrap_or_else(|_| {
            log::warn!("Stored high score {} out of range, using 0", stored);
            0
        });
        log::info!("High score: {}", high_score);
        Self {
            score: 0,
            high_score,
            saver: Saver::spawn(store),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Bump the score. A new best is queued for saving without waiting on the
    /// store; a failed save is logged and the next new best tries again.
    pub fn increase_score(&mut self) {
        self.score = self.score.saturating_add(1);
        if self.score > self.high_score {
            self.high_score = self.score;
            self.queue_save();
        }
    }

    pub fn reset_score(&mut self) {
        if self.score > 0 {
            log::info!("Game over at {} (best {})", self.score, self.high_score);
        }
        self.score = 0;
    }

    /// Block until every queued save has been attempted
    pub fn flush(&self) {
        let Some(saver) = &self.saver else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if saver.tx.send(SaveRequest::Flush(ack_tx)).is_err() || ack_rx.recv().is_err() {
            log::warn!("High score saver exited before flushing");
        }
    }

    fn queue_save(&self) {
        let sent = self
            .saver
            .as_ref()
            .is_some_and(|saver| saver.tx.send(SaveRequest::Save(i64::from(self.high_score))).is_ok());
        if !sent {
            log::warn!("High score {} not saved: saver unavailable", self.high_score);
        }
    }
}

impl Drop for ScoreTracker {
    fn drop(&mut self) {
        if let Some(Saver { tx, handle }) = self.saver.take() {
            // Closing the channel lets the saver finish what is queued and exit
            drop(tx);
            if handle.join().is_err() {
                log::error!("High score saver panicked");
            }
        }
    }
}

impl ScoreKeeper for ScoreTracker {
    fn increase_score(&mut self) {
        ScoreTracker::increase_score(self);
    }

    fn reset_score(&mut self) {
        ScoreTracker::reset_score(self);
    }
}
