//! Request counters driving the "requests started" / "requests ended" events.
//!
//! The start event fires on every `begin` that asks for a loader. The end
//! event is edge-triggered: it fires only when an `end` makes the completed
//! count catch up with the started count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::status::GateSnapshot;

/// Callback invoked with no arguments when a gate event fires.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`BusyGate::on_start`] / [`BusyGate::on_end`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct GateState {
    total_requests: u64,
    completed_requests: u64,
    start_listeners: Vec<(SubscriptionId, Listener)>,
    end_listeners: Vec<(SubscriptionId, Listener)>,
}

struct GateInner {
    state: Mutex<GateState>,
    next_id: AtomicU64,
}

/// Process-lifetime busy counter shared by every request issued through one client.
///
/// Clones share the same counters and subscribers. Owned by the composition
/// root and handed to each `ApiClient` that should drive the indicator.
#[derive(Clone)]
pub struct BusyGate {
    inner: Arc<GateInner>,
}

impl Default for BusyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BusyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyGate")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl BusyGate {
    /// Create a gate with both counters at zero and no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                state: Mutex::new(GateState::default()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // Listeners run outside the lock, so a poisoned guard still holds consistent counters.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a start subscriber. Subscribers are notified in registration order.
    pub fn on_start<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock().start_listeners.push((id, Arc::new(callback)));
        id
    }

    /// Register an end subscriber. Subscribers are notified in registration order.
    pub fn on_end<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock().end_listeners.push((id, Arc::new(callback)));
        id
    }

    /// Remove a start or end subscriber. Returns `false` if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.start_listeners.len() + state.end_listeners.len();
        state.start_listeners.retain(|(sid, _)| *sid != id);
        state.end_listeners.retain(|(sid, _)| *sid != id);
        before != state.start_listeners.len() + state.end_listeners.len()
    }

    /// Record a started request.
    ///
    /// Start subscribers fire on every call with `show_loader`, not only on
    /// the transition out of idle. The returned ticket ends the request when
    /// finished or dropped.
    pub fn begin(&self, show_loader: bool) -> BusyTicket {
        let listeners = {
            let mut state = self.lock();
            state.total_requests += 1;
            if show_loader {
                snapshot_listeners(&state.start_listeners)
            } else {
                Vec::new()
            }
        };
        for listener in listeners {
            listener();
        }
        BusyTicket {
            gate: self.clone(),
            done: false,
        }
    }

    /// Record a completed request, firing end subscribers if nothing is left in flight.
    pub fn end(&self) {
        let listeners = {
            let mut state = self.lock();
            state.completed_requests += 1;
            if state.completed_requests == state.total_requests {
                snapshot_listeners(&state.end_listeners)
            } else {
                Vec::new()
            }
        };
        if !listeners.is_empty() {
            log::debug!("All in-flight requests completed");
        }
        for listener in listeners {
            listener();
        }
    }

    /// Current counter values.
    pub fn snapshot(&self) -> GateSnapshot {
        let state = self.lock();
        GateSnapshot {
            total: state.total_requests,
            completed: state.completed_requests,
        }
    }
}

fn snapshot_listeners(list: &[(SubscriptionId, Listener)]) -> Vec<Listener> {
    list.iter().map(|(_, l)| Arc::clone(l)).collect()
}

/// One started request. Ends the request exactly once, on `finish` or on drop.
#[must_use = "dropping the ticket immediately ends the request"]
pub struct BusyTicket {
    gate: BusyGate,
    done: bool,
}

impl BusyTicket {
    /// Mark the request as completed.
    pub fn finish(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if !self.done {
            self.done = true;
            self.gate.end();
        }
    }
}

impl Drop for BusyTicket {
    fn drop(&mut self) {
        self.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    fn count_into(c: &Arc<AtomicU32>) -> impl Fn() + Send + Sync + 'static {
        let c = Arc::clone(c);
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_start_fires_on_every_begin_with_loader() {
        let gate = BusyGate::new();
        let starts = counter();
        gate.on_start(count_into(&starts));

        let a = gate.begin(true);
        let b = gate.begin(true);
        let c = gate.begin(false);
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(gate.snapshot(), GateSnapshot { total: 3, completed: 0 });

        a.finish();
        b.finish();
        c.finish();
    }

    #[test]
    fn test_end_fires_once_per_busy_period() {
        let gate = BusyGate::new();
        let ends = counter();
        gate.on_end(count_into(&ends));

        let a = gate.begin(true);
        let b = gate.begin(false);
        let c = gate.begin(true);
        a.finish();
        assert_eq!(ends.load(Ordering::SeqCst), 0);
        c.finish();
        assert_eq!(ends.load(Ordering::SeqCst), 0);
        // The quiet request empties the in-flight set and still fires end.
        b.finish();
        assert_eq!(ends.load(Ordering::SeqCst), 1);
        assert!(gate.snapshot().is_idle());

        // Second busy period.
        let d = gate.begin(true);
        d.finish();
        assert_eq!(ends.load(Ordering::SeqCst), 2);
        assert_eq!(gate.snapshot(), GateSnapshot { total: 4, completed: 4 });
    }

    #[test]
    fn test_dropped_ticket_ends_once() {
        let gate = BusyGate::new();
        let ends = counter();
        gate.on_end(count_into(&ends));

        {
            let _ticket = gate.begin(true);
        }
        assert_eq!(ends.load(Ordering::SeqCst), 1);
        assert_eq!(gate.snapshot().completed, 1);

        let ticket = gate.begin(true);
        ticket.finish();
        assert_eq!(gate.snapshot().completed, 2);
        assert_eq!(ends.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_multiple_subscribers_in_order() {
        let gate = BusyGate::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second"] {
            let order = Arc::clone(&order);
            gate.on_end(move || order.lock().unwrap().push(name));
        }

        gate.begin(false).finish();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let gate = BusyGate::new();
        let starts = counter();
        let id = gate.on_start(count_into(&starts));

        gate.begin(true).finish();
        assert!(gate.unsubscribe(id));
        assert!(!gate.unsubscribe(id));
        gate.begin(true).finish();
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_read_gate() {
        let gate = BusyGate::new();
        let seen = Arc::new(Mutex::new(None));
        {
            let gate2 = gate.clone();
            let seen = Arc::clone(&seen);
            gate.on_end(move || *seen.lock().unwrap() = Some(gate2.snapshot()));
        }

        gate.begin(true).finish();
        assert_eq!(
            *seen.lock().unwrap(),
            Some(GateSnapshot { total: 1, completed: 1 })
        );
    }

    #[test]
    fn test_concurrent_requests_fire_end_after_all_complete() {
        let gate = BusyGate::new();
        let ends = counter();
        gate.on_end(count_into(&ends));

        let tickets: Vec<_> = (0..16).map(|i| gate.begin(i % 2 == 0)).collect();
        let handles: Vec<_> = tickets
            .into_iter()
            .map(|t| std::thread::spawn(move || t.finish()))
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ends.load(Ordering::SeqCst), 1);
        assert_eq!(gate.snapshot(), GateSnapshot { total: 16, completed: 16 });
    }
}
