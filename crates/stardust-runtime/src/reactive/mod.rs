#![forbid(unsafe_code)]

//! Reactive values with change notification and batched delivery.
//!
//! - [`Observable`]: shared, version-tracked value with weak subscribers.
//! - [`BatchScope`]: defers notifications until the outermost scope exits.

pub mod batch;
pub mod observable;

pub use batch::BatchScope;
pub use observable::{Observable, Subscription};
