#![forbid(unsafe_code)]

//! Latest-wins coalescing for container size changes.
//!
//! Layout hosts can report a burst of size changes between two frames
//! (responsive breakpoints, content reflow, a window drag). Consumers only
//! care about the size at the next frame, so [`ResizeCoalescer`] keeps at
//! most one pending entry per key and overwrites it on every push.
//!
//! # Design
//!
//! - A pending entry is either a concrete size reported by the host or a
//!   request to measure at flush time ([`PendingSize::Measure`]).
//! - Pushing for a key that is already pending replaces the value but keeps
//!   the key's original position, so flush order is first-seen order.
//! - The caller owns flushing; the coalescer never schedules anything.
//!
//! # Usage
//!
//! ```
//! use stardust_core::{Dimension, PendingSize, ResizeCoalescer};
//!
//! let mut coalescer = ResizeCoalescer::new();
//! coalescer.push(1_u64, PendingSize::Measure);
//! coalescer.push(1_u64, PendingSize::Size(Dimension::new(300.0, 200.0)));
//! coalescer.push(1_u64, PendingSize::Size(Dimension::new(600.0, 200.0)));
//!
//! let pending = coalescer.flush();
//! assert_eq!(pending, vec![(1, PendingSize::Size(Dimension::new(600.0, 200.0)))]);
//! assert_eq!(coalescer.coalesced_total(), 2);
//! ```

use crate::dimension::Dimension;

/// What to deliver for a key at the next flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingSize {
    /// Ask the layout host for the current size when flushing.
    Measure,
    /// Deliver this size.
    Size(Dimension),
}

/// Coalesces size changes per key.
///
/// # Thread Safety
///
/// Not thread-safe; owned by a single frame loop.
///
/// # Performance
///
/// Push is O(P) in the number of pending keys, which is the number of
/// containers that changed since the last frame (usually one or two).
#[derive(Debug, Clone)]
pub struct ResizeCoalescer<K> {
    pending: Vec<(K, PendingSize)>,
    coalesced_total: u64,
}

impl<K> Default for ResizeCoalescer<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            coalesced_total: 0,
        }
    }
}

impl<K: Copy + PartialEq> ResizeCoalescer<K> {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change for `key`.
    ///
    /// Returns `true` if the key was not pending before (the caller may need
    /// to schedule a flush), `false` if an existing entry was overwritten.
    pub fn push(&mut self, key: K, size: PendingSize) -> bool {
        if let Some(entry) = self.pending.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = size;
            self.coalesced_total = self.coalesced_total.saturating_add(1);
            false
        } else {
            self.pending.push((key, size));
            true
        }
    }

    /// Drop any pending entry for `key`. Returns whether one existed.
    pub fn remove(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _)| *k != key);
        self.pending.len() != before
    }

    /// Take every pending entry in first-seen order.
    #[must_use]
    pub fn flush(&mut self) -> Vec<(K, PendingSize)> {
        std::mem::take(&mut self.pending)
    }

    /// True when `key` has a pending entry.
    #[must_use]
    pub fn is_pending(&self, key: K) -> bool {
        self.pending.iter().any(|(k, _)| *k == key)
    }

    /// Number of keys waiting for the next flush.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total number of pushes absorbed by an existing entry.
    #[inline]
    #[must_use]
    pub fn coalesced_total(&self) -> u64 {
        self.coalesced_total
    }
}
