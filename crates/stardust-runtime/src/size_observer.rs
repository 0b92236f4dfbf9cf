#![forbid(unsafe_code)]

//! Container size observation with per-frame coalescing.
//!
//! A [`SizeObserver`] turns a [`LayoutHost`]'s resize notifications into at
//! most one delivery per container per frame.
//!
//! # Pipeline
//!
//! ```text
//! host resize ──► ResizeCoalescer (latest wins) ──► Layout-phase flush
//!                                                        │
//!                      BatchScope ◄── handle.delivered.set(dim)
//!                          │
//!                          └──► on_change callbacks (once, final value)
//! ```
//!
//! # Invariants
//!
//! 1. At most one flush request is pending per observer.
//! 2. A handle delivers a value only if it differs from the last delivered
//!    value.
//! 3. After [`ObservationHandle::detach`] no callback registered through the
//!    handle runs, and its probes report [`Dimension::ZERO`].
//! 4. Nothing held by the host or the scheduler keeps the observer alive;
//!    watch closures and flush callbacks hold weak references.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use stardust_core::{ContainerId, Dimension, DimensionSource, PendingSize, ResizeCoalescer};
use tracing::{debug, info_span};

use crate::host::{FramePhase, FrameRequestId, FrameScheduler, LayoutHost, ResizeWatch};
use crate::reactive::{BatchScope, Observable, Subscription};

/// Why [`SizeObserver::attach`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    /// The container is not a live element of the layout host.
    #[error("{0} is not mounted")]
    NotMounted(ContainerId),
}

struct ObservationState {
    container: ContainerId,
    delivered: Observable<Dimension>,
    attached: Cell<bool>,
    deliveries: Cell<u64>,
    watch: RefCell<Option<ResizeWatch>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

struct ObserverState {
    coalescer: ResizeCoalescer<ContainerId>,
    observations: Vec<Rc<ObservationState>>,
    flush_request: Option<FrameRequestId>,
}

struct ObserverInner {
    layout: Rc<dyn LayoutHost>,
    scheduler: Rc<dyn FrameScheduler>,
    state: RefCell<ObserverState>,
}

impl ObserverInner {
    /// Record a pending size and make sure a layout pass is scheduled.
    fn enqueue(this: &Rc<Self>, container: ContainerId, size: PendingSize) {
        let needs_request = {
            let mut state = this.state.borrow_mut();
            state.coalescer.push(container, size);
            state.flush_request.is_none()
        };
        if !needs_request {
            return;
        }
        let weak = Rc::downgrade(this);
        let id = this.scheduler.request_frame(
            FramePhase::Layout,
            Box::new(move |_| {
                if let Some(inner) = weak.upgrade() {
                    ObserverInner::flush(&inner);
                }
            }),
        );
        this.state.borrow_mut().flush_request = Some(id);
    }

    fn flush(this: &Rc<Self>) {
        let (pending, observations) = {
            let mut state = this.state.borrow_mut();
            state.flush_request = None;
            (state.coalescer.flush(), state.observations.clone())
        };
        if pending.is_empty() {
            return;
        }

        let resolved: Vec<(ContainerId, Dimension)> = pending
            .into_iter()
            .map(|(container, size)| {
                let dim = match size {
                    PendingSize::Measure => this.layout.measure(container).unwrap_or_default(),
                    PendingSize::Size(dim) => dim,
                };
                (container, dim)
            })
            .collect();

        let span = info_span!(
            "stardust.resize.flush",
            containers = resolved.len(),
            notified = tracing::field::Empty
        )
        .entered();

        let mut notified = 0_u64;
        {
            let _batch = BatchScope::new();
            for (container, dim) in &resolved {
                for observation in observations
                    .iter()
                    .filter(|o| o.container == *container && o.attached.get())
                {
                    if observation.delivered.set(*dim) {
                        observation.deliveries.set(observation.deliveries.get() + 1);
                        notified += 1;
                    }
                }
            }
        }
        span.record("notified", notified);
    }
}

/// Observes container sizes reported by a [`LayoutHost`].
///
/// Cloning shares the same observer.
#[derive(Clone)]
pub struct SizeObserver {
    inner: Rc<ObserverInner>,
}

impl SizeObserver {
    /// Observer delivering in the `Layout` phase of `scheduler`'s frames.
    pub fn new(layout: Rc<dyn LayoutHost>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                layout,
                scheduler,
                state: RefCell::new(ObserverState {
                    coalescer: ResizeCoalescer::new(),
                    observations: Vec::new(),
                    flush_request: None,
                }),
            }),
        }
    }

    /// Start observing `container`.
    ///
    /// The first measurement is taken at the next layout pass; until then
    /// the handle reports [`Dimension::ZERO`].
    pub fn attach(&self, container: ContainerId) -> Result<ObservationHandle, AttachmentError> {
        if !self.inner.layout.is_mounted(container) {
            return Err(AttachmentError::NotMounted(container));
        }

        let weak = Rc::downgrade(&self.inner);
        let watch = self
            .inner
            .layout
            .watch_resize(
                container,
                Box::new(move |size| {
                    if let Some(inner) = weak.upgrade() {
                        ObserverInner::enqueue(&inner, container, PendingSize::Size(size));
                    }
                }),
            )
            .ok_or(AttachmentError::NotMounted(container))?;

        let state = Rc::new(ObservationState {
            container,
            delivered: Observable::new(Dimension::ZERO),
            attached: Cell::new(true),
            deliveries: Cell::new(0),
            watch: RefCell::new(Some(watch)),
            subscriptions: RefCell::new(Vec::new()),
        });
        self.inner
            .state
            .borrow_mut()
            .observations
            .push(Rc::clone(&state));
        ObserverInner::enqueue(&self.inner, container, PendingSize::Measure);

        debug!(container = %container, "size observation attached");
        Ok(ObservationHandle {
            observer: Rc::clone(&self.inner),
            state,
        })
    }

    /// Handles currently attached.
    pub fn observation_count(&self) -> usize {
        self.inner.state.borrow().observations.len()
    }

    /// Containers waiting for the next layout pass.
    pub fn pending_count(&self) -> usize {
        self.inner.state.borrow().coalescer.pending_count()
    }

    /// Total resize notifications absorbed by coalescing.
    pub fn coalesced_total(&self) -> u64 {
        self.inner.state.borrow().coalescer.coalesced_total()
    }
}

impl fmt::Debug for SizeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeObserver")
            .field("observations", &self.observation_count())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Exclusive owner of one container observation.
///
/// Dropping the handle detaches it.
pub struct ObservationHandle {
    observer: Rc<ObserverInner>,
    state: Rc<ObservationState>,
}

impl ObservationHandle {
    /// The observed container.
    pub fn container(&self) -> ContainerId {
        self.state.container
    }

    /// Latest delivered size; [`Dimension::ZERO`] before the first
    /// measurement and after detach.
    pub fn current_dimension(&self) -> Dimension {
        if self.state.attached.get() {
            self.state.delivered.get()
        } else {
            Dimension::ZERO
        }
    }

    /// Call `callback` with each new size, at most once per frame.
    ///
    /// Ignored after detach.
    pub fn on_change(&self, callback: impl Fn(Dimension) + 'static) {
        if !self.state.attached.get() {
            return;
        }
        let weak = Rc::downgrade(&self.state);
        let subscription = self.state.delivered.subscribe(move |dim| {
            if weak.upgrade().is_some_and(|state| state.attached.get()) {
                callback(*dim);
            }
        });
        self.state.subscriptions.borrow_mut().push(subscription);
    }

    /// A cheap read-only accessor for pull-based consumers.
    pub fn dimension_source(&self) -> DimensionProbe {
        DimensionProbe {
            state: Rc::downgrade(&self.state),
        }
    }

    /// True until [`detach`](Self::detach) runs.
    pub fn is_attached(&self) -> bool {
        self.state.attached.get()
    }

    /// Number of changed values delivered so far.
    pub fn deliveries(&self) -> u64 {
        self.state.deliveries.get()
    }

    /// Stop observing. Calling it again has no effect.
    pub fn detach(&self) {
        if !self.state.attached.replace(false) {
            return;
        }
        let container = self.state.container;
        self.state.subscriptions.borrow_mut().clear();
        let watch = self.state.watch.borrow_mut().take();
        drop(watch);

        let cancel = {
            let mut state = self.observer.state.borrow_mut();
            state
                .observations
                .retain(|o| !Rc::ptr_eq(o, &self.state));
            if !state.observations.iter().any(|o| o.container == container) {
                state.coalescer.remove(container);
            }
            if state.coalescer.is_empty() {
                state.flush_request.take()
            } else {
                None
            }
        };
        if let Some(id) = cancel {
            self.observer.scheduler.cancel_frame(id);
        }
        debug!(
            container = %container,
            deliveries = self.state.deliveries.get(),
            "size observation detached"
        );
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for ObservationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("container", &self.state.container)
            .field("attached", &self.state.attached.get())
            .field("current", &self.current_dimension())
            .finish()
    }
}

/// Read-only view of an observation's latest size.
#[derive(Clone)]
pub struct DimensionProbe {
    state: Weak<ObservationState>,
}

impl DimensionSource for DimensionProbe {
    fn dimension(&self) -> Dimension {
        match self.state.upgrade() {
            Some(state) if state.attached.get() => state.delivered.get(),
            _ => Dimension::ZERO,
        }
    }
}

impl fmt::Debug for DimensionProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DimensionProbe")
            .field(&self.dimension())
            .finish()
    }
}
