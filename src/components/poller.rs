//! Poll Scheduling
//!
//! A `PollTask` fires a callback immediately and then once per period until it is
//! stopped or dropped. Each fire receives a `RequestTicket`. A response may only be
//! applied if no newer request has been applied before it, so a slow response can
//! never overwrite fresher data, while a backend slower than the poll period still
//! gets its responses through.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use log::trace;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

#[derive(Debug, Default)]
struct SequenceState {
    issued: AtomicU64,
    applied: AtomicU64,
}

/// Issues monotonically increasing request sequence numbers.
#[derive(Clone, Debug, Default)]
pub struct RequestSequence {
    state: Arc<SequenceState>,
}

impl RequestSequence {
    pub fn issue(&self) -> RequestTicket {
        let seq = self.state.issued.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            seq,
            state: self.state.clone(),
        }
    }

    /// Rejects every ticket issued so far.
    pub fn invalidate(&self) {
        let issued = self.state.issued.load(Ordering::SeqCst);
        self.state.applied.fetch_max(issued, Ordering::SeqCst);
    }
}

/// Sequence number of a single request.
#[derive(Clone, Debug)]
pub struct RequestTicket {
    seq: u64,
    state: Arc<SequenceState>,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Claims the right to apply this ticket's response.
    ///
    /// Fails if a newer ticket has already been applied or the sequence was
    /// invalidated after this ticket was issued. Succeeds at most once.
    pub fn try_apply(&self) -> bool {
        self.state.applied.fetch_max(self.seq, Ordering::SeqCst) < self.seq
    }
}

/// A periodic background task, aborted on drop.
#[derive(Debug)]
pub struct PollTask {
    name: &'static str,
    sequence: RequestSequence,
    handle: JoinHandle<()>,
}

impl PollTask {
    /// Spawns the poll loop on the current tokio runtime.
    ///
    /// Every tick spawns `on_tick` as an independent task, a slow response does
    /// not delay the next tick.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        sequence: RequestSequence,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut(RequestTicket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let loop_sequence = sequence.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let ticket = loop_sequence.issue();
                trace!("{} poll #{}", name, ticket.seq());
                tokio::spawn(on_tick(ticket));
            }
        });
        trace!("{} polling started", name);
        Self {
            name,
            sequence,
            handle,
        }
    }

    pub fn stop(&self) {
        self.handle.abort();
        self.sequence.invalidate();
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.stop();
        trace!("{} polling stopped", self.name);
    }
}
