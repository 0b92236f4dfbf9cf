#![forbid(unsafe_code)]

//! Runtime: reactive values, frame scheduling, and size observation.
//!
//! # Role in stardust
//! `stardust-runtime` sits between a layout host and the animation. It turns
//! host resize notifications into coalesced, per-frame [`Dimension`]
//! deliveries ([`SizeObserver`]) and defines the frame-loop capability the
//! animator runs on ([`FrameScheduler`]).
//!
//! # Primary responsibilities
//! - **Reactive**: [`Observable`] values and batched notification.
//! - **Host capabilities**: [`LayoutHost`] and [`FrameScheduler`] traits.
//! - **Headless hosts**: [`HeadlessLayout`] and [`HeadlessFrameClock`] for
//!   tests and demos.
//! - **SizeObserver**: attach/detach, coalesced change callbacks, and a
//!   pull-based [`DimensionSource`] probe.
//! - **SharedRegistry**: reference-counted shared resources with leases.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); nothing is `Send`.
//!
//! [`Dimension`]: stardust_core::Dimension
//! [`DimensionSource`]: stardust_core::DimensionSource

pub mod headless;
pub mod host;
pub mod reactive;
pub mod registry;
pub mod size_observer;

pub use headless::{HeadlessFrameClock, HeadlessLayout};
pub use host::{
    FrameCallback, FramePhase, FrameRequestId, FrameScheduler, FrameTime, LayoutHost,
    ResizeCallback, ResizeWatch,
};
pub use reactive::{BatchScope, Observable, Subscription};
pub use registry::{Lease, SharedRegistry};
pub use size_observer::{AttachmentError, DimensionProbe, ObservationHandle, SizeObserver};
