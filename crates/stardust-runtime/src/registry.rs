#![forbid(unsafe_code)]

//! Reference-counted shared resources.
//!
//! Several cards can share one expensive, immutable resource (a sprite
//! atlas for a palette). [`SharedRegistry::acquire`] builds it on the first
//! lease and hands the same instance to later callers; dropping the last
//! [`Lease`] removes it.
//!
//! The registry is thread-local, matching the single-threaded runtime.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use tracing::trace;

type EntryKey = (TypeId, String);

struct Entry {
    value: Rc<dyn Any>,
    leases: usize,
}

thread_local! {
    static REGISTRY: RefCell<HashMap<EntryKey, Entry>> = RefCell::new(HashMap::new());
}

/// Namespace for the thread-local shared resource registry.
pub struct SharedRegistry;

impl SharedRegistry {
    /// Lease the `T` registered under `key`, building it with `init` if no
    /// lease currently exists.
    ///
    /// `init` runs outside the registry borrow, so it may acquire other
    /// resources.
    pub fn acquire<T: 'static>(key: &str, init: impl FnOnce() -> T) -> Lease<T> {
        let entry_key = (TypeId::of::<T>(), key.to_owned());
        let existing = REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            registry.get_mut(&entry_key).and_then(|entry| {
                let value = Rc::clone(&entry.value).downcast::<T>().ok()?;
                entry.leases += 1;
                Some(value)
            })
        });

        let value = match existing {
            Some(value) => value,
            None => {
                let value = Rc::new(init());
                let erased: Rc<dyn Any> = value.clone();
                REGISTRY.with(|registry| {
                    let mut registry = registry.borrow_mut();
                    // `init` may have registered the same key re-entrantly.
                    let entry = registry.entry(entry_key.clone()).or_insert(Entry {
                        value: erased,
                        leases: 0,
                    });
                    entry.leases += 1;
                    Rc::clone(&entry.value).downcast::<T>().unwrap_or(value)
                })
            }
        };
        trace!(key, leases = Self::lease_count::<T>(key), "shared resource leased");
        Lease { key: entry_key, value }
    }

    /// Live leases for the `T` registered under `key`.
    pub fn lease_count<T: 'static>(key: &str) -> usize {
        let entry_key = (TypeId::of::<T>(), key.to_owned());
        REGISTRY.with(|registry| registry.borrow().get(&entry_key).map_or(0, |e| e.leases))
    }

    fn release(key: &EntryKey) {
        // The registry may already be gone during thread teardown.
        let _ = REGISTRY.try_with(|registry| {
            let removed = {
                let mut registry = registry.borrow_mut();
                let Some(entry) = registry.get_mut(key) else {
                    return;
                };
                entry.leases = entry.leases.saturating_sub(1);
                if entry.leases == 0 {
                    registry.remove(key)
                } else {
                    None
                }
            };
            if removed.is_some() {
                trace!(key = %key.1, "shared resource released");
            }
            // `removed` drops here, outside the borrow.
        });
    }
}

/// A counted handle to a shared resource.
pub struct Lease<T: 'static> {
    key: EntryKey,
    value: Rc<T>,
}

impl<T: 'static> Lease<T> {
    /// A plain `Rc` to the resource. It does not count as a lease.
    pub fn shared(&self) -> Rc<T> {
        Rc::clone(&self.value)
    }

    /// Registry key this lease was acquired under.
    pub fn key(&self) -> &str {
        &self.key.1
    }
}

impl<T: 'static> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: 'static> Drop for Lease<T> {
    fn drop(&mut self) {
        SharedRegistry::release(&self.key);
    }
}

impl<T: 'static> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").field("key", &self.key.1).finish_non_exhaustive()
    }
}
