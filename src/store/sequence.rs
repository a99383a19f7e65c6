//! Request sequencing for store actions
//!
//! Actions run concurrently, so responses can resolve out of order. Each
//! action takes a [`Ticket`] before it suspends; on resume its mutations are
//! committed only if no newer ticket for the same slice has been committed in
//! the meantime. Issue order decides the winner, not resolution order. An
//! action that commits several times (a polled ping) reuses its ticket.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Part of the state an action replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    /// ASN mapping and the totals derived from it
    Asns,
    Info,
    Prefixes,
    Search,
    /// The current ping or trace request
    LookingGlass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slice: Slice,
    pub seq: u64,
}

/// Issues monotonically increasing tickets
#[derive(Debug, Default)]
pub struct Sequencer {
    last: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, slice: Slice) -> Ticket {
        let seq = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { slice, seq }
    }
}

/// Last committed ticket per slice
///
/// Lives next to the state, behind the same lock, so the staleness check and
/// the commit are one step.
#[derive(Debug, Default)]
pub struct CommitLog {
    last: HashMap<Slice, u64>,
}

impl CommitLog {
    /// Record `ticket` unless a newer one has committed for its slice
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        let last = self.last.entry(ticket.slice).or_insert(0);
        if ticket.seq >= *last {
            *last = ticket.seq;
            true
        } else {
            false
        }
    }

    pub fn last_committed(&self, slice: Slice) -> Option<u64> {
        self.last.get(&slice).copied()
    }
}
