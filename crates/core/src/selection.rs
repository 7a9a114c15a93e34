//! Selection cursor over a filtered itinerary list
//!
//! Two index-advance policies exist because the two interaction modes of the
//! system differ: the batch terminal loop filters once and browses
//! cyclically ([`CyclePolicy::Wraparound`]), while a continuously-reactive
//! loop re-filters on every interaction and re-clamps the index against the
//! possibly-changed list length ([`CyclePolicy::Reclamp`]). Callers pick one
//! explicitly per slot.

/// Index-advance policy for a selection cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePolicy {
    /// `index = (index + 1) % len` on every move; list length is fixed for
    /// the lifetime of the browse loop.
    Wraparound,
    /// Moves shift the index freely; [`SelectionCursor::reindex`] clamps it
    /// with modulo against the re-filtered length before any read.
    Reclamp,
}

/// Cursor into one tag's filtered itinerary list.
///
/// When the list is empty the index is undefined: [`current`]
/// returns `None` and callers must short-circuit to a "no valid options"
/// outcome instead of indexing.
///
/// [`current`]: SelectionCursor::current
#[derive(Debug, Clone, Copy)]
pub struct SelectionCursor {
    index: usize,
    len: usize,
    policy: CyclePolicy,
}

impl SelectionCursor {
    pub fn new(len: usize, policy: CyclePolicy) -> Self {
        Self { index: 0, len, policy }
    }

    /// Current index, or `None` when the list is empty.
    pub fn current(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.index % self.len)
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move to the next option. No-op on an empty list.
    pub fn advance(&mut self) {
        if self.len == 0 {
            return;
        }
        match self.policy {
            CyclePolicy::Wraparound => self.index = (self.index + 1) % self.len,
            // Free increment; `current` and `reindex` clamp with modulo
            CyclePolicy::Reclamp => self.index = self.index.wrapping_add(1),
        }
    }

    /// Move to the previous option, wrapping to the end. No-op on an empty
    /// list.
    pub fn retreat(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = match self.index.checked_sub(1) {
            Some(i) => i,
            None => self.len - 1,
        };
    }

    /// Re-clamp against a re-filtered list length.
    ///
    /// The constraint set may have changed between interactions (the
    /// calendar is shared and externally mutable), so the cursor is clamped
    /// with modulo against the new length, preserving position where
    /// possible.
    pub fn reindex(&mut self, new_len: usize) {
        self.len = new_len;
        if new_len == 0 {
            self.index = 0;
        } else {
            self.index %= new_len;
        }
    }
}
