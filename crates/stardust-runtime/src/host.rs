#![forbid(unsafe_code)]

//! Capabilities a host environment provides to the runtime.
//!
//! - [`LayoutHost`]: knows which containers are mounted, can measure them,
//!   and notifies on resize.
//! - [`FrameScheduler`]: runs callbacks at the next frame, in phase order.
//!
//! Both are object-safe and used through `Rc<dyn ..>`.

use std::fmt;
use std::time::Duration;

use stardust_core::{ContainerId, Dimension};

use crate::reactive::Subscription;

/// Callback invoked with each new size reported for a container.
pub type ResizeCallback = Box<dyn Fn(Dimension)>;

/// RAII guard for a resize watch. Dropping it stops notifications.
pub struct ResizeWatch {
    _guard: Subscription,
}

impl ResizeWatch {
    /// Wrap the subscription that keeps the watch alive.
    pub fn new(guard: Subscription) -> Self {
        Self { _guard: guard }
    }
}

impl fmt::Debug for ResizeWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeWatch").finish_non_exhaustive()
    }
}

/// Layout engine as seen by the size observer.
pub trait LayoutHost {
    /// True while `container` is a live, mounted element.
    fn is_mounted(&self, container: ContainerId) -> bool;

    /// Current rendered size, or `None` if the container is not mounted.
    fn measure(&self, container: ContainerId) -> Option<Dimension>;

    /// Call `on_resize` whenever the container's size changes.
    ///
    /// Returns `None` if the container is not mounted.
    fn watch_resize(&self, container: ContainerId, on_resize: ResizeCallback)
    -> Option<ResizeWatch>;
}

/// Phase within a frame. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FramePhase {
    /// Size deliveries.
    Layout,
    /// Drawing.
    Paint,
}

/// Timing passed to frame callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Frame counter, starting at 1 for the first frame.
    pub index: u64,
    /// Time since the scheduler started.
    pub elapsed: Duration,
    /// Time since the previous frame.
    pub delta: Duration,
}

/// One-shot callback for a single frame.
pub type FrameCallback = Box<dyn FnOnce(FrameTime)>;

/// Handle used to cancel a frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(u64);

impl FrameRequestId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Frame loop as seen by the observer and the animator.
///
/// Callbacks are one-shot; a continuous loop re-requests from inside its
/// callback. A request made while a frame is running is served by the next
/// frame, except that a `Paint` request made during `Layout` still runs in
/// the current frame.
pub trait FrameScheduler {
    /// Run `callback` during `phase` of an upcoming frame.
    fn request_frame(&self, phase: FramePhase, callback: FrameCallback) -> FrameRequestId;

    /// Drop a pending request. Unknown or already-run ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}
