#![forbid(unsafe_code)]

//! Stardust particles: simulation, palettes, and the frame-loop animator.
//!
//! # Role in stardust
//! `stardust-fx` consumes a [`DimensionSource`](stardust_core::DimensionSource)
//! and produces one [`StardustFrame`] display list per frame. It never
//! touches a cell buffer; the card widget rasterizes frames.
//!
//! # Primary responsibilities
//! - **ParticleState**: deterministic particle sets per dimension, wrapped
//!   motion, regeneration on material resize.
//! - **StardustPalette / SpriteAtlas**: color ramps resolved through a
//!   lookup table shared between cards.
//! - **ParticleAnimator**: the self-rescheduling paint loop and its
//!   [`AnimationHandle`].
//!
//! Events are emitted under the `stardust.fx` tracing target.

pub mod animator;
pub mod palette;
pub mod particles;

pub use animator::{AnimationHandle, ParticleAnimator, Sprite, StardustFrame, StartError};
pub use palette::{SpriteAtlas, StardustPalette};
pub use particles::{AnimatorParams, Particle, ParticleState};

/// Tracing target for animation events.
pub const TRACE_TARGET: &str = "stardust.fx";
