//! Action queue: single-writer serialization of engine calls.
//!
//! The queue processes one action at a time in FIFO arrival order per
//! store instance. The external engine is a serial state machine;
//! pipelining independent actions against it would let a
//! later-dispatched but faster-completing action's batch apply before
//! an earlier one's, producing a visible ordering inversion relative to
//! user intent. While an action is in flight, subsequently enqueued
//! actions wait.
//!
//! Each in-flight action moves through
//! `queued → dispatched → batch-applied → settled` or
//! `queued → dispatched → failed`. The completion ticket resolves when
//! the batch has been applied and subscribers notified.

use crate::cache::SnapshotCache;
use crate::engine::Engine;
use crate::error::{StoreError, StoreResult};
use crate::stats::StatsInner;
use crate::subscriptions::SubscriptionRegistry;
use parking_lot::{Condvar, Mutex};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use viewstore_protocol::{ActionRequest, EngineError};

/// Lifecycle phase of one dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    /// Enqueued, waiting for earlier actions to finish.
    Queued,
    /// Handed to the engine; the call is in flight.
    Dispatched,
    /// The engine's batch is installed in the cache.
    BatchApplied,
    /// Subscribers are notified; terminal success.
    Settled,
    /// The engine call failed; terminal.
    Failed,
}

impl ActionPhase {
    /// Returns true for the terminal phases.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionPhase::Settled | ActionPhase::Failed)
    }
}

struct TicketState {
    phase: ActionPhase,
    error: Option<EngineError>,
}

struct TicketInner {
    state: Mutex<TicketState>,
    cond: Condvar,
}

/// Completion token for one emitted action.
///
/// Cheap to clone; every clone observes the same action.
#[derive(Clone)]
pub struct ActionTicket {
    inner: Arc<TicketInner>,
    action: String,
}

impl ActionTicket {
    fn new(action: &str) -> Self {
        Self {
            inner: Arc::new(TicketInner {
                state: Mutex::new(TicketState {
                    phase: ActionPhase::Queued,
                    error: None,
                }),
                cond: Condvar::new(),
            }),
            action: action.to_string(),
        }
    }

    /// Name of the action this ticket tracks.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Current phase.
    pub fn phase(&self) -> ActionPhase {
        self.inner.state.lock().phase
    }

    /// The terminal error, if the action failed.
    pub fn error(&self) -> Option<EngineError> {
        self.inner.state.lock().error.clone()
    }

    /// Blocks until the action reaches a terminal phase.
    ///
    /// Returns the engine error if the action failed. Not for the UI
    /// context; renders should `subscribe` instead.
    pub fn wait(&self) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock();
        while !state.phase.is_terminal() {
            self.inner.cond.wait(&mut state);
        }
        match state.error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Like [`wait`](Self::wait) with an upper bound; `None` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<(), EngineError>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        while !state.phase.is_terminal() {
            if self.inner.cond.wait_until(&mut state, deadline).timed_out() {
                return None;
            }
        }
        match state.error.clone() {
            Some(error) => Some(Err(error)),
            None => Some(Ok(())),
        }
    }

    fn advance(&self, phase: ActionPhase) {
        let mut state = self.inner.state.lock();
        state.phase = phase;
        if phase.is_terminal() {
            self.inner.cond.notify_all();
        }
    }

    fn fail(&self, error: EngineError) {
        let mut state = self.inner.state.lock();
        state.phase = ActionPhase::Failed;
        state.error = Some(error);
        self.inner.cond.notify_all();
    }
}

impl std::fmt::Debug for ActionTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTicket")
            .field("action", &self.action)
            .field("phase", &self.phase())
            .finish()
    }
}

/// Counts enqueued-but-not-terminal actions; `get_sync` waits on it.
#[derive(Default)]
struct DrainGauge {
    pending: Mutex<u64>,
    cond: Condvar,
}

impl DrainGauge {
    fn add(&self) {
        *self.pending.lock() += 1;
    }

    fn done(&self) {
        let mut pending = self.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.cond.notify_all();
        }
    }

    fn wait_idle(&self, timeout: Option<Duration>) -> bool {
        let mut pending = self.pending.lock();
        match timeout {
            None => {
                while *pending > 0 {
                    self.cond.wait(&mut pending);
                }
                true
            }
            Some(limit) => {
                let deadline = Instant::now() + limit;
                while *pending > 0 {
                    if self.cond.wait_until(&mut pending, deadline).timed_out() {
                        return *pending == 0;
                    }
                }
                true
            }
        }
    }

    fn pending(&self) -> u64 {
        *self.pending.lock()
    }
}

struct QueueItem {
    request: ActionRequest,
    ticket: ActionTicket,
}

/// FIFO action queue with a dedicated worker thread.
pub struct ActionQueue {
    sender: Mutex<Option<Sender<QueueItem>>>,
    gauge: Arc<DrainGauge>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ActionQueue {
    /// Starts the queue and its worker thread.
    pub(crate) fn start(
        engine: Arc<dyn Engine>,
        cache: Arc<SnapshotCache>,
        subscriptions: Arc<SubscriptionRegistry>,
        stats: Arc<StatsInner>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel::<QueueItem>();
        let gauge = Arc::new(DrainGauge::default());

        let worker_gauge = Arc::clone(&gauge);
        let worker = std::thread::spawn(move || {
            for item in receiver {
                process(&*engine, &cache, &subscriptions, &stats, item);
                worker_gauge.done();
            }
        });

        Self {
            sender: Mutex::new(Some(sender)),
            gauge,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueues an action and returns its completion ticket.
    ///
    /// Never blocks on the engine; the call happens later on the worker.
    pub fn enqueue(&self, request: ActionRequest) -> StoreResult<ActionTicket> {
        let ticket = ActionTicket::new(&request.name);
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(StoreError::Closed);
        };
        self.gauge.add();
        if sender
            .send(QueueItem {
                request,
                ticket: ticket.clone(),
            })
            .is_err()
        {
            self.gauge.done();
            return Err(StoreError::Closed);
        }
        Ok(ticket)
    }

    /// Blocks until every previously enqueued action is terminal.
    pub fn wait_idle(&self, timeout: Option<Duration>) -> StoreResult<()> {
        if self.gauge.wait_idle(timeout) {
            Ok(())
        } else {
            Err(StoreError::Timeout)
        }
    }

    /// Number of enqueued-but-not-terminal actions.
    pub fn pending(&self) -> u64 {
        self.gauge.pending()
    }

    /// Closes the queue: remaining actions drain, then the worker exits.
    pub fn close(&self) {
        let sender = self.sender.lock().take();
        drop(sender);
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }

    /// Returns true once the queue is closed.
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }
}

impl Drop for ActionQueue {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drives one action through its lifecycle on the worker thread.
fn process(
    engine: &dyn Engine,
    cache: &SnapshotCache,
    subscriptions: &SubscriptionRegistry,
    stats: &StatsInner,
    item: QueueItem,
) {
    use std::sync::atomic::Ordering;

    let QueueItem { request, ticket } = item;
    ticket.advance(ActionPhase::Dispatched);
    debug!(action = %request.name, "dispatching action");

    match engine.call(&request) {
        Ok(batch) => {
            let outcome = cache.apply(&batch);
            stats
                .updates_applied
                .fetch_add((batch.len() - outcome.discarded) as u64, Ordering::Relaxed);
            stats
                .stale_writes_discarded
                .fetch_add(outcome.discarded as u64, Ordering::Relaxed);
            ticket.advance(ActionPhase::BatchApplied);

            let delivered = subscriptions.notify(&outcome.changed);
            stats
                .notifications_delivered
                .fetch_add(delivered as u64, Ordering::Relaxed);

            ticket.advance(ActionPhase::Settled);
            stats.actions_settled.fetch_add(1, Ordering::Relaxed);
            debug!(
                action = %request.name,
                updates = batch.len(),
                changed = outcome.changed.len(),
                "action settled"
            );
        }
        Err(error) => {
            warn!(action = %request.name, %error, "action failed");
            stats.actions_failed.fetch_add(1, Ordering::Relaxed);
            ticket.fail(error);
        }
    }
}
