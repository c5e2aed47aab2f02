//! FIFO admission queue shared by the limiter implementations.
//!
//! A [`Gate`] owns an admission algorithm and the queue of callers waiting on
//! it. All read-modify-write sequences happen under one mutex, and a grant
//! mutates the algorithm state before the waiter is signalled, so nothing can
//! interleave between the grant decision and the waiter resuming.
//!
//! Waiters are woken three ways: directly by a grant, through their own
//! [`Notify`] when they become the head of the queue or when
//! [`Gate::release`] or [`Gate::set_limit`] changes capacity, or by a timer.
//! Only the head arms a timer, for the exact instant the algorithm reports
//! capacity will next open up, so each event wakes at most one task.

use crate::RateLimiterState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Notify, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Shortest timer a waiter arms, to keep float rounding from spinning.
pub(crate) const MIN_WAIT: Duration = Duration::from_millis(1);

/// Admission algorithm driven by a [`Gate`].
pub(crate) trait Admission: Send {
    /// Advance time-dependent state (refill tokens, prune timestamps).
    fn refresh(&mut self, now: Instant);

    /// Whether one more request fits right now.
    fn can_admit(&self) -> bool;

    /// Record an admitted request.
    fn admit(&mut self, now: Instant);

    /// Undo the most recent [`Admission::admit`] for a waiter that left.
    fn revoke(&mut self);

    /// Return a concurrency slot.
    fn release(&mut self);

    /// Time until capacity opens without a release, `None` if only a release can help.
    fn next_opening(&self, now: Instant) -> Option<Duration>;

    /// Change the request rate.
    fn set_limit(&mut self, requests_per_minute: u32);

    /// Observable state.
    fn snapshot(&self, now: Instant, waiting: usize) -> RateLimiterState;
}

/// A queued caller: where to send its grant and how to wake it.
struct Waiter {
    grant: oneshot::Sender<()>,
    wake: Arc<Notify>,
}

struct GateState<A> {
    admission: A,
    queue: VecDeque<Waiter>,
}

impl<A: Admission> GateState<A> {
    /// Grant queued waiters head-first for as long as capacity allows.
    ///
    /// Wakes the new head if the head changed, so it can arm its own timer.
    fn drain(&mut self, now: Instant) {
        let mut head_changed = false;
        while let Some(head) = self.queue.front() {
            if head.grant.is_closed() {
                debug!("Dropping abandoned waiter");
                self.queue.pop_front();
                head_changed = true;
                continue;
            }
            if !self.admission.can_admit() {
                break;
            }
            self.admission.admit(now);
            head_changed = true;
            if let Some(waiter) = self.queue.pop_front()
                && waiter.grant.send(()).is_err()
            {
                warn!("Waiter left before its grant, revoking");
                self.admission.revoke();
            }
        }
        if head_changed {
            self.wake_head();
        }
    }

    fn wake_head(&self) {
        if let Some(head) = self.queue.front() {
            head.wake.notify_one();
        }
    }

    fn is_head(&self, wake: &Arc<Notify>) -> bool {
        self.queue
            .front()
            .is_some_and(|head| Arc::ptr_eq(&head.wake, wake))
    }

    fn waiting(&self) -> usize {
        self.queue
            .iter()
            .filter(|waiter| !waiter.grant.is_closed())
            .count()
    }
}

/// Mutex-guarded admission state plus its waiter queue.
pub(crate) struct Gate<A> {
    state: Mutex<GateState<A>>,
}

impl<A: Admission> Gate<A> {
    pub(crate) fn new(admission: A) -> Self {
        Self {
            state: Mutex::new(GateState {
                admission,
                queue: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit immediately when nobody is queued and capacity allows, otherwise enqueue.
    fn admit_or_enqueue(&self) -> Option<(oneshot::Receiver<()>, Arc<Notify>)> {
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.refresh(now);
        state.drain(now);
        if state.queue.is_empty() && state.admission.can_admit() {
            state.admission.admit(now);
            debug!("Admitted without waiting");
            return None;
        }
        let (grant, granted) = oneshot::channel();
        let wake = Arc::new(Notify::new());
        state.queue.push_back(Waiter {
            grant,
            wake: wake.clone(),
        });
        debug!(waiting = state.queue.len(), "Queued for admission");
        Some((granted, wake))
    }

    /// Grant whatever the current state allows. Returns when the caller
    /// should look again, which only the queue head needs to know.
    fn pump(&self, wake: &Arc<Notify>) -> Option<Duration> {
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.refresh(now);
        state.drain(now);
        if state.is_head(wake) {
            state.admission.next_opening(now).map(|delay| delay.max(MIN_WAIT))
        } else {
            None
        }
    }

    /// Drop closed waiters and hand the head role on.
    fn forget_abandoned(&self) {
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.refresh(now);
        state.drain(now);
    }

    pub(crate) async fn acquire(&self) {
        loop {
            let Some((receiver, wake)) = self.admit_or_enqueue() else {
                return;
            };
            let mut pending = PendingGrant {
                gate: self,
                receiver: Some(receiver),
                wake,
            };
            if pending.wait().await {
                return;
            }
        }
    }

    pub(crate) fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.refresh(now);
        state.drain(now);
        if state.queue.is_empty() && state.admission.can_admit() {
            state.admission.admit(now);
            true
        } else {
            false
        }
    }

    pub(crate) fn release(&self) {
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.release();
        state.admission.refresh(now);
        state.drain(now);
        state.wake_head();
    }

    pub(crate) fn set_limit(&self, requests_per_minute: u32) {
        if requests_per_minute == 0 {
            debug!("Ignoring non-positive rate limit");
            return;
        }
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.refresh(now);
        state.admission.set_limit(requests_per_minute);
        state.drain(now);
        state.wake_head();
        debug!(requests_per_minute, "Rate limit updated");
    }

    pub(crate) fn state(&self) -> RateLimiterState {
        let now = Instant::now();
        let mut state = self.lock();
        state.admission.refresh(now);
        let waiting = state.waiting();
        state.admission.snapshot(now, waiting)
    }
}

/// A queued admission that hands its slot back if the caller stops waiting
/// after the grant was already made.
struct PendingGrant<'a, A: Admission> {
    gate: &'a Gate<A>,
    receiver: Option<oneshot::Receiver<()>>,
    wake: Arc<Notify>,
}

impl<A: Admission> PendingGrant<'_, A> {
    /// Wait for the grant. Returns `false` if the waiter must queue again.
    ///
    /// Only the head of the queue arms a timer; everyone else sleeps until
    /// granted or promoted to head.
    async fn wait(&mut self) -> bool {
        let Some(granted) = self.receiver.as_mut() else {
            return false;
        };
        loop {
            let outcome = match self.gate.pump(&self.wake) {
                Some(delay) => tokio::select! {
                    biased;
                    result = &mut *granted => Some(result),
                    _ = self.wake.notified() => None,
                    _ = tokio::time::sleep(delay) => None,
                },
                None => tokio::select! {
                    biased;
                    result = &mut *granted => Some(result),
                    _ = self.wake.notified() => None,
                },
            };

            match outcome {
                Some(Ok(())) => {
                    self.receiver = None;
                    return true;
                }
                Some(Err(_)) => {
                    self.receiver = None;
                    return false;
                }
                None => continue,
            }
        }
    }
}

impl<A: Admission> Drop for PendingGrant<'_, A> {
    fn drop(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            receiver.close();
            if receiver.try_recv().is_ok() {
                warn!("Caller abandoned a granted slot, releasing");
                self.gate.release();
            } else {
                self.gate.forget_abandoned();
            }
        }
    }
}
