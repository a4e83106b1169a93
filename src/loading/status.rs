//! Point-in-time view of the busy counters.

/// Counter values observed under the gate lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateSnapshot {
    /// Requests started since the gate was created.
    pub total: u64,
    /// Requests that reached the response hook (success or failure).
    pub completed: u64,
}

impl GateSnapshot {
    /// Number of requests still waiting on a response.
    pub fn in_flight(&self) -> u64 {
        self.total.saturating_sub(self.completed)
    }

    /// Returns `true` when every started request has completed.
    pub fn is_idle(&self) -> bool {
        self.total == self.completed
    }

    /// Human-readable status text for a loading indicator.
    pub fn label(&self) -> String {
        match self.in_flight() {
            0 => "Idle".to_string(),
            1 => "1 request in flight".to_string(),
            n => format!("{} requests in flight", n),
        }
    }
}
