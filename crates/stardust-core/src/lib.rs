#![forbid(unsafe_code)]

//! Core: geometry, measured dimensions, and resize coalescing.
//!
//! # Role in stardust
//! `stardust-core` holds the value types every other crate agrees on. It has
//! no I/O and no scheduling: the runtime (`stardust-runtime`) produces
//! [`Dimension`] values from a layout host, the particle crate
//! (`stardust-fx`) consumes them, and the render kernel (`stardust-render`)
//! paints into cells addressed by [`geometry::Rect`].
//!
//! # Primary responsibilities
//! - **Dimension**: sanitized, non-negative logical-pixel sizes.
//! - **DimensionSource**: the pull-based accessor the animator polls.
//! - **Rect / Sides**: cell-space rectangles and padding.
//! - **ResizeCoalescer**: latest-wins coalescing of size changes per key.

pub mod container;
pub mod dimension;
pub mod geometry;
pub mod resize_coalescer;

pub use container::ContainerId;
pub use dimension::{Dimension, DimensionSource, FnDimensionSource};
pub use geometry::{Rect, Sides};
pub use resize_coalescer::{PendingSize, ResizeCoalescer};
