use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::AppError;
use crate::page::{LATITUDE_ID, LONGITUDE_ID, Page, TIMEZONE_ID};
use crate::timezone::{Coordinates, TimezoneSource};

/// Which of several overlapping lookups gets to write the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Every response is written; the one resolving last wins.
    #[default]
    LastResolvedWins,
    /// A response is dropped once a newer lookup has been started.
    LatestRequestWins,
}

/// What happens to the display when a lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The display keeps whatever it showed before.
    #[default]
    Keep,
    /// The display is emptied.
    Clear,
}

/// A lookup whose coordinates were read at trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub token: u64,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A coordinate field was empty, nothing was requested.
    Skipped,
    /// The display now shows this text.
    Displayed(String),
    /// The response arrived after a newer lookup was started and was not shown.
    Discarded { token: u64, latest: u64 },
}

/// Reads the coordinate fields of a page, resolves them to a timezone and writes
/// the result into the page's display element.
pub struct TimezoneUpdater<S, P> {
    source: S,
    page: Arc<P>,
    stale_policy: StalePolicy,
    failure_policy: FailurePolicy,
    issued: AtomicU64,
    // held across the staleness check and the display write
    display: Mutex<()>,
}

impl<S: TimezoneSource, P: Page> TimezoneUpdater<S, P> {
    pub fn new(source: S, page: Arc<P>) -> Self {
        Self {
            source,
            page,
            stale_policy: StalePolicy::default(),
            failure_policy: FailurePolicy::default(),
            issued: AtomicU64::new(0),
            display: Mutex::new(()),
        }
    }

    pub fn with_stale_policy(mut self, stale_policy: StalePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Read both fields and, if neither is empty, start a lookup.
    ///
    /// Returns `None` without any side effect when a field is empty. Values are
    /// not trimmed or validated.
    pub fn begin(&self) -> Option<PendingLookup> {
        let latitude = self.page.value(LATITUDE_ID);
        let longitude = self.page.value(LONGITUDE_ID);
        if latitude.is_empty() || longitude.is_empty() {
            debug!("Coordinates incomplete, skipping timezone lookup");
            return None;
        }

        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Some(PendingLookup {
            token,
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        })
    }

    /// Resolve a started lookup and write its result to the display.
    ///
    /// A failure is returned to the caller after the failure policy has been
    /// applied to the display.
    pub async fn complete(&self, pending: PendingLookup) -> Result<UpdateOutcome, AppError> {
        let response = match self.source.lookup(&pending.coordinates).await {
            Ok(response) => response,
            Err(e) => {
                debug!(
                    "Timezone lookup #{} for {} failed: {}",
                    pending.token, pending.coordinates, e
                );
                if self.failure_policy == FailurePolicy::Clear {
                    let _guard = self.display.lock().unwrap_or_else(PoisonError::into_inner);
                    if !self.is_stale(pending.token) {
                        self.page.set_text(TIMEZONE_ID, "");
                    }
                }
                return Err(e);
            }
        };

        let _guard = self.display.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_stale(pending.token) {
            let latest = self.issued.load(Ordering::SeqCst);
            debug!(
                "Discarding timezone lookup #{}, lookup #{} is newer",
                pending.token, latest
            );
            return Ok(UpdateOutcome::Discarded {
                token: pending.token,
                latest,
            });
        }

        let text = response.display_text();
        self.page.set_text(TIMEZONE_ID, text);
        Ok(UpdateOutcome::Displayed(text.to_string()))
    }

    /// One full read-request-write cycle.
    pub async fn update(&self) -> Result<UpdateOutcome, AppError> {
        match self.begin() {
            Some(pending) => self.complete(pending).await,
            None => Ok(UpdateOutcome::Skipped),
        }
    }

    fn is_stale(&self, token: u64) -> bool {
        self.stale_policy == StalePolicy::LatestRequestWins
            && token != self.issued.load(Ordering::SeqCst)
    }
}
