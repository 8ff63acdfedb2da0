use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use shamba_client::FetchError;

/// Selection-scoped polling engine.
///
/// One instance per polling site. `start` binds the poller to a
/// selection and runs an immediate fetch followed by fixed-interval
/// refreshes; starting again (same or different selection) always
/// disarms the previous cycle first, so at most one timer is armed per
/// poller at any time. `stop` (and `Drop`) releases the timer on every
/// exit path.
///
/// Fetches are issued as detached tasks, so a slow fetch never blocks
/// or skips the next tick. Results apply last-write-wins by *issue*
/// order: every fetch captures the live selection and a sequence number
/// when it is issued, and a completion is dropped unless the selection
/// still matches and no newer completion has been applied.
pub struct Poller<K, T> {
    slot: Slot<K, T>,
    active: Option<ActiveCycle>,
}

struct ActiveCycle {
    cancel: CancellationToken,
}

impl<K, T> Poller<K, T>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: Slot::new(),
            active: None,
        }
    }

    /// Bind the poller to `selection` and begin the refresh cycle.
    ///
    /// The first tick of the interval completes immediately, which is
    /// what provides the initial fetch; consumers are never left blank
    /// for a full interval after a selection change.
    pub fn start<F, Fut>(&mut self, selection: K, every: Duration, fetch: F)
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        self.stop();
        self.slot.set_live(selection.clone());

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let slot = self.slot.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    // Checked first: a disarmed cycle must not issue
                    // another fetch even when a tick is already due.
                    biased;
                    _ = loop_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let seq = slot.issue();
                        let captured = selection.clone();
                        let future = fetch(selection.clone());
                        let slot = slot.clone();
                        // Detached: a hung fetch must not hold up the
                        // next tick, and teardown must not wait on it.
                        tokio::spawn(async move {
                            match future.await {
                                Ok(value) => slot.apply(captured, seq, value),
                                Err(err) => {
                                    warn!(error = %err, "Poll fetch failed, keeping last data");
                                }
                            }
                        });
                    }
                }
            }
        });

        self.active = Some(ActiveCycle { cancel });
    }

    /// Disarm the timer and drop the live selection. Calling this with
    /// no active cycle is a no-op. In-flight fetches are left to
    /// finish; their completions no longer match a live selection and
    /// are discarded.
    pub fn stop(&mut self) {
        if let Some(cycle) = self.active.take() {
            cycle.cancel.cancel();
        }
        self.slot.clear_live();
    }

    /// Latest applied payload for the live selection, if any has
    /// arrived yet.
    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.slot.latest()
    }

    /// The selection this poller is currently bound to.
    pub fn selection(&self) -> Option<K> {
        self.slot.live()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl<K, T> Default for Poller<K, T>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> Drop for Poller<K, T> {
    fn drop(&mut self) {
        if let Some(cycle) = self.active.take() {
            cycle.cancel.cancel();
        }
    }
}

/// State shared between the poller handle, its loop task and the
/// detached fetches.
struct Slot<K, T> {
    inner: Arc<Mutex<SlotInner<K, T>>>,
}

struct SlotInner<K, T> {
    /// Selection results are currently allowed to apply to.
    live: Option<K>,
    /// Issue counter; monotonic across restarts so a completion from a
    /// previous cycle can never outrank a newer one.
    next_seq: u64,
    /// Sequence of the newest applied completion.
    applied_seq: u64,
    value: Option<T>,
}

impl<K, T> Slot<K, T> {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner {
                live: None,
                next_seq: 0,
                applied_seq: 0,
                value: None,
            })),
        }
    }

    // A poisoned slot lock only means a panic elsewhere while holding
    // it; the data is plain state, so keep going with the inner value.
    fn lock(&self) -> MutexGuard<'_, SlotInner<K, T>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<K, T> Slot<K, T>
where
    K: Clone + PartialEq,
{
    fn set_live(&self, selection: K) {
        let mut slot = self.lock();
        // Whatever was displayed belonged to the previous cycle and
        // must not bleed into the new one.
        slot.value = None;
        slot.live = Some(selection);
    }

    fn clear_live(&self) {
        self.lock().live = None;
    }

    fn live(&self) -> Option<K> {
        self.lock().live.clone()
    }

    fn issue(&self) -> u64 {
        let mut slot = self.lock();
        slot.next_seq += 1;
        slot.next_seq
    }

    fn apply(&self, captured: K, seq: u64, value: T) {
        let mut slot = self.lock();
        if slot.live.as_ref() != Some(&captured) {
            debug!("Discarding poll result for a stale selection");
            return;
        }
        if seq <= slot.applied_seq {
            debug!("Discarding poll result outrun by a newer fetch");
            return;
        }
        slot.applied_seq = seq;
        slot.value = Some(value);
    }

    fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().value.clone()
    }
}

impl<K, T> Clone for Slot<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
