use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use listkit_model::{FetchError, FetchPhase, Page};

use crate::fingerprint::Fingerprint;

/// Owner of the Idle/Loading/Success/Failure lifecycle for one outstanding
/// collection request.
///
/// Every dispatched request captures a fingerprint; a finished request is
/// applied only while its fingerprint is still the current one, so slow
/// responses that were superseded by a parameter change are discarded
/// instead of overwriting newer data.
///
/// The last settled page is retained across retries under the same
/// fingerprint, letting a view keep showing last-known-good results under
/// an error banner. A loading transition under a different fingerprint
/// drops it.
pub struct FetchMachine<T> {
    inner: Arc<RwLock<MachineInner<T>>>,
}

struct MachineInner<T> {
    phase: FetchPhase<T>,
    current: Option<Fingerprint>,
    last_good: Option<Page<T>>,
    last_good_fingerprint: Option<Fingerprint>,
}

impl<T> Clone for FetchMachine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> FetchMachine<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MachineInner {
                phase: FetchPhase::Idle,
                current: None,
                last_good: None,
                last_good_fingerprint: None,
            })),
        }
    }

    /// Enters Loading for `fingerprint`, superseding any in-flight request.
    pub fn begin(&self, fingerprint: &Fingerprint) {
        let mut inner = self.inner.write().unwrap();

        if inner.last_good_fingerprint.as_ref() != Some(fingerprint) {
            inner.last_good = None;
            inner.last_good_fingerprint = None;
        }
        inner.current = Some(fingerprint.clone());
        inner.phase = FetchPhase::Loading;
    }

    /// Applies a finished request's outcome if its fingerprint is still
    /// current. Returns whether the outcome was applied; stale outcomes
    /// are discarded.
    pub fn settle(
        &self,
        fingerprint: &Fingerprint,
        outcome: Result<Page<T>, FetchError>,
    ) -> bool {
        let mut inner = self.inner.write().unwrap();

        if inner.current.as_ref() != Some(fingerprint) {
            debug!(fingerprint = %fingerprint, "discarding superseded response");
            return false;
        }

        match outcome {
            Ok(page) => {
                inner.last_good = Some(page.clone());
                inner.last_good_fingerprint = Some(fingerprint.clone());
                inner.phase = FetchPhase::Success(page);
            }
            Err(err) => {
                warn!(
                    fingerprint = %fingerprint,
                    error = %err,
                    retryable = err.retryable(),
                    "collection fetch failed"
                );
                inner.phase = FetchPhase::Failure(err);
            }
        }
        true
    }

    /// Back to Idle, dropping the current fingerprint and retained data.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.phase = FetchPhase::Idle;
        inner.current = None;
        inner.last_good = None;
        inner.last_good_fingerprint = None;
    }

    pub fn phase(&self) -> FetchPhase<T> {
        self.inner.read().unwrap().phase.clone()
    }

    /// Most recent settled page, retained across same-fingerprint retries.
    pub fn last_good(&self) -> Option<Page<T>> {
        self.inner.read().unwrap().last_good.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().unwrap().phase.is_loading()
    }

    pub fn is_success(&self) -> bool {
        self.inner.read().unwrap().phase.is_success()
    }

    pub fn current_fingerprint(&self) -> Option<Fingerprint> {
        self.inner.read().unwrap().current.clone()
    }
}

impl<T: Clone> Default for FetchMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}
