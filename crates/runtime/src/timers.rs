use tracing::debug;

/// Identifier of a scheduled timer. Never reused within one [`Timers`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Deterministic one-shot timers driven by an externally supplied clock.
///
/// Nothing runs on its own: the owner advances time with
/// [`Timers::advance_to`] from its event loop and receives the payloads of
/// every timer that came due.
///
/// Ordering contract: due timers fire by `(due_ms, insertion_order)`.
#[derive(Debug)]
pub struct Timers<T> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<(u64, TimerId, T)>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(_, tid, _)| *tid == id)
    }

    /// Schedules `payload` to fire `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.pending.push((due, id, payload));
        id
    }

    /// Cancels a pending timer. Returns the payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let pos = self.pending.iter().position(|(_, tid, _)| *tid == id)?;
        debug!(timer = id.0, "timer cancelled");
        Some(self.pending.remove(pos).2)
    }

    /// Moves the clock forward and returns the payloads of all due timers.
    ///
    /// The clock never goes backwards; an earlier `now_ms` is ignored.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.max(now_ms);

        // Ids are assigned in insertion order, so (due, id) is the contract order.
        self.pending.sort_by(|(da, ia, _), (db, ib, _)| da.cmp(db).then_with(|| ia.cmp(ib)));

        let split = self
            .pending
            .iter()
            .position(|(due, _, _)| *due > self.now_ms)
            .unwrap_or(self.pending.len());
        self.pending
            .drain(..split)
            .map(|(_, _, payload)| payload)
            .collect()
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> Vec<T> {
        self.advance_to(self.now_ms.saturating_add(delta_ms))
    }
}
