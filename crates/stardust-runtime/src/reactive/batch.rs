#![forbid(unsafe_code)]

//! Batch coalescing for [`Observable`](super::Observable) notifications.
//!
//! While a [`BatchScope`] is alive, observable notifications are queued
//! instead of fired. When the outermost scope drops, each queued callback
//! runs once with the latest value.
//!
//! # Usage
//!
//! ```
//! use stardust_runtime::reactive::{BatchScope, Observable};
//!
//! let size = Observable::new(0);
//! let _sub = size.subscribe(|v| assert_eq!(*v, 3));
//! {
//!     let _batch = BatchScope::new();
//!     size.set(1);
//!     size.set(2);
//!     size.set(3);
//! } // subscriber runs once, with 3
//! ```
//!
//! # Invariants
//!
//! 1. Nested batches are supported: only the outermost scope flushes.
//! 2. Inside a batch, `Observable::get()` returns the latest value; only
//!    notifications are deferred.
//! 3. Flush runs callbacks in first-enqueue order.
//! 4. Notifications raised by a flushed callback are delivered before the
//!    outermost scope finishes dropping, in a later pass of the same flush.
//!
//! # Failure Modes
//!
//! - **Callback panics during flush**: the remaining callbacks still run and
//!   the first panic is re-raised afterwards.

use std::cell::RefCell;

use tracing::{trace, trace_span};
use web_time::Instant;

type DeferredNotify = Box<dyn FnOnce()>;

struct DeferredEntry {
    key: Option<usize>,
    notify: DeferredNotify,
}

struct BatchContext {
    depth: u32,
    deferred: Vec<DeferredEntry>,
}

thread_local! {
    static BATCH_CTX: RefCell<Option<BatchContext>> = const { RefCell::new(None) };
}

/// True while a batch is active on this thread.
pub fn is_batching() -> bool {
    BATCH_CTX.with(|ctx| ctx.borrow().is_some())
}

/// Queue `f` until the current batch exits, or run it now if none is active.
///
/// Returns `true` if deferred.
pub fn defer_or_run(f: impl FnOnce() + 'static) -> bool {
    enqueue(None, Box::new(f))
}

/// Like [`defer_or_run`], but a later call with the same `key` replaces the
/// queued callback while keeping its queue position.
pub fn defer_or_run_keyed(key: usize, f: impl FnOnce() + 'static) -> bool {
    enqueue(Some(key), Box::new(f))
}

fn enqueue(key: Option<usize>, notify: DeferredNotify) -> bool {
    let immediate = BATCH_CTX.with(|ctx| {
        let mut guard = ctx.borrow_mut();
        let Some(batch) = guard.as_mut() else {
            return Some(notify);
        };
        let existing = key.and_then(|k| batch.deferred.iter().position(|e| e.key == Some(k)));
        match existing {
            Some(i) => batch.deferred[i].notify = notify,
            None => batch.deferred.push(DeferredEntry { key, notify }),
        }
        None
    });
    match immediate {
        Some(notify) => {
            notify();
            false
        }
        None => true,
    }
}

fn take_deferred() -> Vec<DeferredNotify> {
    BATCH_CTX.with(|ctx| {
        ctx.borrow_mut()
            .as_mut()
            .map(|batch| {
                std::mem::take(&mut batch.deferred)
                    .into_iter()
                    .map(|entry| entry.notify)
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Run queued callbacks until the queue stays empty.
///
/// The context stays active while callbacks run, so notifications they
/// trigger are coalesced into a further pass instead of firing inline.
fn flush() {
    let mut deferred = take_deferred();
    if deferred.is_empty() {
        return;
    }

    let started = Instant::now();
    let span = trace_span!("stardust.batch.flush", callbacks = tracing::field::Empty).entered();

    let mut callbacks = 0_usize;
    let mut passes = 0_u32;
    let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;
    while !deferred.is_empty() {
        passes += 1;
        callbacks += deferred.len();
        for notify in deferred {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(notify));
            if let Err(payload) = result
                && first_panic.is_none()
            {
                first_panic = Some(payload);
            }
        }
        deferred = take_deferred();
    }
    span.record("callbacks", callbacks);

    trace!(
        duration_us = started.elapsed().as_micros() as u64,
        callbacks, passes, "batch flushed"
    );

    if let Some(payload) = first_panic {
        std::panic::resume_unwind(payload);
    }
}

/// RAII guard that begins a batch scope.
pub struct BatchScope {
    is_root: bool,
}

impl BatchScope {
    /// Begin a batch, or nest inside the active one.
    #[must_use]
    pub fn new() -> Self {
        let is_root = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(batch) => {
                    batch.depth += 1;
                    false
                }
                None => {
                    *guard = Some(BatchContext {
                        depth: 1,
                        deferred: Vec::new(),
                    });
                    true
                }
            }
        });
        Self { is_root }
    }

    /// Callbacks queued in the active batch.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        BATCH_CTX.with(|ctx| ctx.borrow().as_ref().map_or(0, |b| b.deferred.len()))
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let should_flush = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(batch) => {
                    batch.depth -= 1;
                    batch.depth == 0
                }
                None => false,
            }
        });

        if should_flush {
            // Clear the context even if a callback panics.
            struct Reset;
            impl Drop for Reset {
                fn drop(&mut self) {
                    BATCH_CTX.with(|ctx| *ctx.borrow_mut() = None);
                }
            }
            let _reset = Reset;
            flush();
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("is_root", &self.is_root)
            .field("pending", &self.pending_count())
            .finish()
    }
}
