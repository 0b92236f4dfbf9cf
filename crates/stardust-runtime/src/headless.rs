#![forbid(unsafe_code)]

//! In-memory host implementations for tests, benches, and the demo.
//!
//! - [`HeadlessLayout`]: containers whose sizes are set by hand.
//! - [`HeadlessFrameClock`]: a frame loop advanced explicitly with
//!   [`step`](HeadlessFrameClock::step).

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use stardust_core::{ContainerId, Dimension};
use tracing::trace;

use crate::host::{
    FrameCallback, FramePhase, FrameRequestId, FrameScheduler, FrameTime, LayoutHost,
    ResizeCallback, ResizeWatch,
};
use crate::reactive::Observable;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LayoutInner {
    next_id: u64,
    containers: BTreeMap<ContainerId, Observable<Dimension>>,
}

/// A layout host whose containers are mounted and resized by hand.
///
/// Every size change is reported synchronously to the container's watchers.
#[derive(Default)]
pub struct HeadlessLayout {
    inner: RefCell<LayoutInner>,
}

impl HeadlessLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a new container with an initial size.
    pub fn mount(&self, size: Dimension) -> ContainerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = ContainerId::new(inner.next_id);
        inner.containers.insert(id, Observable::new(size));
        trace!(container = %id, %size, "headless container mounted");
        id
    }

    fn size_of(&self, container: ContainerId) -> Option<Observable<Dimension>> {
        self.inner.borrow().containers.get(&container).cloned()
    }

    /// Change a container's size. Returns `false` if it is not mounted.
    pub fn resize(&self, container: ContainerId, size: Dimension) -> bool {
        // Clone the observable out so no borrow is held while watchers run.
        match self.size_of(container) {
            Some(obs) => {
                obs.set(size);
                true
            }
            None => false,
        }
    }

    /// Collapse a container to zero size without unmounting it.
    pub fn hide(&self, container: ContainerId) -> bool {
        self.resize(container, Dimension::ZERO)
    }

    /// Collapse a container to zero size, then remove it.
    pub fn unmount(&self, container: ContainerId) -> bool {
        if !self.hide(container) {
            return false;
        }
        self.inner.borrow_mut().containers.remove(&container);
        trace!(container = %container, "headless container unmounted");
        true
    }

    /// Number of mounted containers.
    pub fn mounted_count(&self) -> usize {
        self.inner.borrow().containers.len()
    }
}

impl LayoutHost for HeadlessLayout {
    fn is_mounted(&self, container: ContainerId) -> bool {
        self.inner.borrow().containers.contains_key(&container)
    }

    fn measure(&self, container: ContainerId) -> Option<Dimension> {
        self.size_of(container).map(|obs| obs.get())
    }

    fn watch_resize(
        &self,
        container: ContainerId,
        on_resize: ResizeCallback,
    ) -> Option<ResizeWatch> {
        let obs = self.size_of(container)?;
        Some(ResizeWatch::new(obs.subscribe(move |size| on_resize(*size))))
    }
}

impl std::fmt::Debug for HeadlessLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessLayout")
            .field("mounted", &self.mounted_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Frame clock
// ---------------------------------------------------------------------------

type Queued = (FrameRequestId, FrameCallback);

#[derive(Default)]
struct ClockInner {
    next_id: u64,
    frame_index: u64,
    elapsed: Duration,
    layout: Vec<Queued>,
    paint: Vec<Queued>,
    /// Remainder of the phase currently executing.
    running: VecDeque<Queued>,
}

/// A frame scheduler driven by explicit [`step`](Self::step) calls.
#[derive(Default)]
pub struct HeadlessFrameClock {
    inner: RefCell<ClockInner>,
}

impl HeadlessFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame: the layout queue, then the paint queue.
    ///
    /// Returns the timing passed to the callbacks.
    pub fn step(&self, delta: Duration) -> FrameTime {
        let time = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_index += 1;
            inner.elapsed += delta;
            let layout = std::mem::take(&mut inner.layout);
            inner.running = layout.into();
            FrameTime {
                index: inner.frame_index,
                elapsed: inner.elapsed,
                delta,
            }
        };
        self.drain_running(time);

        {
            let mut inner = self.inner.borrow_mut();
            let paint = std::mem::take(&mut inner.paint);
            inner.running = paint.into();
        }
        self.drain_running(time);
        time
    }

    /// Run `frames` frames of `delta` each.
    pub fn run_frames(&self, frames: u32, delta: Duration) {
        for _ in 0..frames {
            self.step(delta);
        }
    }

    fn drain_running(&self, time: FrameTime) {
        loop {
            let next = self.inner.borrow_mut().running.pop_front();
            match next {
                Some((_, callback)) => callback(time),
                None => break,
            }
        }
    }

    /// Requests waiting for a future frame.
    pub fn pending_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.layout.len() + inner.paint.len() + inner.running.len()
    }

    /// Index of the last frame run (0 before the first step).
    pub fn frame_index(&self) -> u64 {
        self.inner.borrow().frame_index
    }
}

impl FrameScheduler for HeadlessFrameClock {
    fn request_frame(&self, phase: FramePhase, callback: FrameCallback) -> FrameRequestId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = FrameRequestId::new(inner.next_id);
        match phase {
            FramePhase::Layout => inner.layout.push((id, callback)),
            FramePhase::Paint => inner.paint.push((id, callback)),
        }
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let mut inner = self.inner.borrow_mut();
        inner.layout.retain(|(queued, _)| *queued != id);
        inner.paint.retain(|(queued, _)| *queued != id);
        inner.running.retain(|(queued, _)| *queued != id);
    }
}

impl std::fmt::Debug for HeadlessFrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessFrameClock")
            .field("frame_index", &self.frame_index())
            .field("pending", &self.pending_count())
            .finish()
    }
}
