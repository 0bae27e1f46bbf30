// Keepalive sweep over the state file.
//
// Every recorded file whose last visit is at least `interval` old gets one
// GET against the host's info endpoint. Failures are recorded per entry and
// never stop the sweep; successful visits are written back in a single save
// at the end.

use crate::api::HostClient;
use crate::error::StoreError;
use crate::store::{LastVisit, StateStore};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Visited successfully; timestamp moved to the sweep time.
    Visited,
    /// Not due yet.
    Skipped { last_visit: DateTime<Utc> },
    /// Due (or unreadable), but not visited successfully. Value left as it was.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub id: String,
    pub url: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepReport {
    /// No state file yet; nothing has been uploaded.
    NoState,
    /// State file could not be parsed. Left untouched.
    Corrupted { reason: String },
    /// State file exists but could not be read (permissions, not a file).
    Unavailable { reason: String },
    Swept {
        entries: Vec<EntryReport>,
        /// Whether the state file was rewritten.
        saved: bool,
    },
}

pub struct Sweeper<'a> {
    client: &'a HostClient,
    store: &'a StateStore,
    interval: Duration,
}

impl<'a> Sweeper<'a> {
    pub fn new(client: &'a HostClient, store: &'a StateStore, interval_days: u32) -> Self {
        Sweeper {
            client,
            store,
            interval: Duration::days(i64::from(interval_days)),
        }
    }

    pub fn sweep(&self) -> Result<SweepReport, StoreError> {
        self.sweep_at(Utc::now())
    }

    /// Run one sweep treating `now` as the current time. Only the final save
    /// can fail; missing, unreadable or corrupted state is reported, not
    /// returned as an error.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, StoreError> {
        let mut entries = match self.store.load() {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                warn!(path = %self.store.path().display(), "no state file, upload a file first");
                return Ok(SweepReport::NoState);
            }
            Err(StoreError::Corrupt { path, reason }) => {
                warn!(path = %path.display(), %reason, "state file is empty or corrupted");
                return Ok(SweepReport::Corrupted { reason });
            }
            Err(e) => {
                warn!(error = %e, "state file could not be read");
                return Ok(SweepReport::Unavailable {
                    reason: e.to_string(),
                });
            }
        };

        let mut reports = Vec::with_capacity(entries.len());
        let mut updated = false;

        for (id, last_visit) in entries.iter_mut() {
            let url = self.client.info_url(id);
            let outcome = match last_visit.instant() {
                None => {
                    warn!(%id, value = ?last_visit, "unreadable timestamp, not visiting");
                    Outcome::Failed {
                        reason: "unreadable timestamp in state file".into(),
                    }
                }
                Some(at) if now.signed_duration_since(at) < self.interval => {
                    info!(%id, last_visit = %at, "skipped");
                    Outcome::Skipped { last_visit: at }
                }
                Some(_) => match self.client.visit(id) {
                    Ok(()) => {
                        info!(%url, "visited");
                        *last_visit = LastVisit::At(now);
                        updated = true;
                        Outcome::Visited
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "keepalive failed");
                        Outcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                },
            };
            reports.push(EntryReport {
                id: id.clone(),
                url,
                outcome,
            });
        }

        if updated {
            self.store.save(&entries)?;
        }

        Ok(SweepReport::Swept {
            entries: reports,
            saved: updated,
        })
    }
}
