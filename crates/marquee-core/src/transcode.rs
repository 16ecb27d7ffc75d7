//! Transcode lifecycle tracking.
//!
//! An uploaded title starts `pending`, moves to `processing` once the
//! transcoding job picks it up and ends `complete` (playable renditions on the
//! CDN) or `failed`. Failed titles can be resubmitted, which puts them back to
//! `pending`.
//!
//! On native targets [`TranscodeWatcher`] polls a [`TranscodeProbe`] for every
//! title that has not completed and applies the reported changes to the
//! catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a title is in the transcoding pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeStatus {
    /// Uploaded, waiting for a job.
    #[default]
    Pending,
    /// Job running.
    Processing,
    /// Renditions available.
    Complete,
    /// Job failed.
    Failed,
}

impl TranscodeStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Staying in the same state is not a transition and returns false.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Failed)
                | (Self::Processing, Self::Complete | Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Legal steps leading from `self` to `target`, empty when already there.
    ///
    /// A job that finished between two polls is reported as `complete` while
    /// the catalog still says `pending`; the path then runs through
    /// `processing`.
    #[must_use]
    pub fn path_to(self, target: Self) -> Option<Vec<Self>> {
        if self == target {
            Some(Vec::new())
        } else if self.can_transition_to(target) {
            Some(vec![target])
        } else if self == Self::Pending && target == Self::Complete {
            Some(vec![Self::Processing, Self::Complete])
        } else {
            None
        }
    }
}

impl fmt::Display for TranscodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use watcher::*;

#[cfg(not(target_arch = "wasm32"))]
mod watcher {
    use std::sync::Arc;
    use std::time::Duration;

    use serde::{Deserialize, Serialize};
    use tokio::sync::mpsc;
    use tokio::time::interval;
    use tracing::{debug, info, warn};

    use super::TranscodeStatus;
    use crate::catalog::{CatalogStore, TitleRecord};
    use crate::error::Result;

    /// Default polling interval for transcode watching (10 seconds).
    pub const DEFAULT_TRANSCODE_POLL_INTERVAL: Duration = Duration::from_secs(10);

    /// Reports the transcoding state of a title.
    #[cfg_attr(test, mockall::automock)]
    pub trait TranscodeProbe: Send + Sync {
        /// Current status of the job for `title`, `None` if unknown.
        ///
        /// # Errors
        ///
        /// Returns an error if the transcoding service cannot be queried.
        fn probe(&self, title: &TitleRecord) -> Result<Option<TranscodeStatus>>;
    }

    /// Events emitted by the transcode watcher.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(tag = "type", content = "data")]
    pub enum TranscodeEvent {
        /// A title moved to a new status.
        StatusChanged {
            /// Title id.
            id: String,
            /// Previous status.
            from: TranscodeStatus,
            /// New status.
            to: TranscodeStatus,
        },
    }

    /// Probe every unfinished title once and apply the changes.
    ///
    /// Probe failures and impossible reports are logged and skipped.
    pub fn poll_once(store: &dyn CatalogStore, probe: &dyn TranscodeProbe) -> Vec<TranscodeEvent> {
        let titles = match store.list_titles() {
            Ok(titles) => titles,
            Err(e) => {
                warn!("Failed to list titles for transcode polling: {}", e);
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        for title in titles.iter().filter(|t| !t.transcode_status.is_terminal()) {
            let reported = match probe.probe(title) {
                Ok(Some(status)) => status,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Transcode probe failed for {}: {}", title.id, e);
                    continue;
                }
            };

            let Some(steps) = title.transcode_status.path_to(reported) else {
                warn!(
                    "Ignoring transcode report {} -> {} for {}",
                    title.transcode_status, reported, title.id
                );
                continue;
            };

            let mut from = title.transcode_status;
            for to in steps {
                if let Err(e) = store.set_transcode_status(&title.id, to) {
                    warn!("Failed to record transcode status for {}: {}", title.id, e);
                    break;
                }
                events.push(TranscodeEvent::StatusChanged {
                    id: title.id.clone(),
                    from,
                    to,
                });
                from = to;
            }
        }

        events
    }

    /// Handle for controlling a running transcode watcher.
    #[derive(Debug, Clone)]
    pub struct TranscodeWatcherHandle {
        shutdown_tx: mpsc::Sender<()>,
    }

    impl TranscodeWatcherHandle {
        /// Stop the transcode watcher.
        pub async fn stop(&self) {
            let _ = self.shutdown_tx.send(()).await;
        }
    }

    /// Background task that keeps catalog transcode statuses current.
    pub struct TranscodeWatcher {
        store: Arc<dyn CatalogStore>,
        probe: Arc<dyn TranscodeProbe>,
        poll_interval: Duration,
    }

    impl TranscodeWatcher {
        /// Create a watcher with the default polling interval.
        #[must_use]
        pub fn new(store: Arc<dyn CatalogStore>, probe: Arc<dyn TranscodeProbe>) -> Self {
            Self::with_interval(store, probe, DEFAULT_TRANSCODE_POLL_INTERVAL)
        }

        /// Create a watcher with a custom polling interval.
        #[must_use]
        pub fn with_interval(
            store: Arc<dyn CatalogStore>,
            probe: Arc<dyn TranscodeProbe>,
            poll_interval: Duration,
        ) -> Self {
            Self {
                store,
                probe,
                poll_interval,
            }
        }

        /// Polling interval.
        #[must_use]
        pub const fn poll_interval(&self) -> Duration {
            self.poll_interval
        }

        /// Start polling on the current tokio runtime.
        ///
        /// The first poll happens immediately. Returns the event receiver and
        /// a handle to stop the watcher.
        #[must_use]
        pub fn start(self) -> (mpsc::Receiver<TranscodeEvent>, TranscodeWatcherHandle) {
            let (event_tx, event_rx) = mpsc::channel::<TranscodeEvent>(32);
            let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

            let store = self.store;
            let probe = self.probe;
            let poll_interval = self.poll_interval;

            tokio::spawn(async move {
                let mut interval_timer = interval(poll_interval);
                info!("Transcode watcher started ({:?} interval)", poll_interval);

                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            debug!("Transcode watcher shutting down");
                            break;
                        }
                        _ = interval_timer.tick() => {
                            for event in poll_once(store.as_ref(), probe.as_ref()) {
                                if event_tx.send(event).await.is_err() {
                                    debug!("Transcode event receiver dropped");
                                    return;
                                }
                            }
                        }
                    }
                }
            });

            (event_rx, TranscodeWatcherHandle { shutdown_tx })
        }
    }
}
