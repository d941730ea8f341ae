//! Outstanding-request bookkeeping for page actions
//!
//! Every action runs as begin → await → finish. `begin` hands out a
//! [`Ticket`]; `finish` accepts the response only while that ticket is still
//! current. Resetting a page invalidates every outstanding ticket, so a late
//! response for abandoned work is dropped instead of overwriting newer state.

use crate::error::{ClientError, Result};

/// Proof that an action was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// One independent action slot (listing load, bulk delete, generate, ...)
#[derive(Debug, Default)]
pub struct InFlight {
    generation: u64,
    outstanding: bool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an action that must not overlap with itself
    pub fn begin(&mut self) -> Result<Ticket> {
        if self.outstanding {
            return Err(ClientError::Busy);
        }
        Ok(self.begin_replacing())
    }

    /// Start an action that supersedes any outstanding one
    pub fn begin_replacing(&mut self) -> Ticket {
        self.generation += 1;
        self.outstanding = true;
        Ticket {
            generation: self.generation,
        }
    }

    /// True when the response for `ticket` should be applied
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation || !self.outstanding {
            return false;
        }
        self.outstanding = false;
        true
    }

    /// Drop every outstanding ticket
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.outstanding = false;
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_busy() {
        let mut slot = InFlight::new();
        let ticket = slot.begin().unwrap();
        assert!(slot.is_busy());
        assert!(matches!(slot.begin(), Err(ClientError::Busy)));
        assert!(slot.finish(ticket));
        assert!(!slot.is_busy());
    }

    #[test]
    fn test_replaced_ticket_is_stale() {
        let mut slot = InFlight::new();
        let first = slot.begin_replacing();
        let second = slot.begin_replacing();
        assert!(!slot.finish(first));
        assert!(slot.finish(second));
    }

    #[test]
    fn test_invalidate_discards_outstanding() {
        let mut slot = InFlight::new();
        let ticket = slot.begin().unwrap();
        slot.invalidate();
        assert!(!slot.is_busy());
        assert!(!slot.finish(ticket));
    }

    #[test]
    fn test_ticket_applies_once() {
        let mut slot = InFlight::new();
        let ticket = slot.begin().unwrap();
        assert!(slot.finish(ticket));
        assert!(!slot.finish(ticket));
    }
}
