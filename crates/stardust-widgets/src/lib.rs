#![forbid(unsafe_code)]

//! Widgets for the stardust fund card.
//!
//! - [`Panel`]: bordered box with padding that clips its content.
//! - [`FundCard`]: the composition root. Mounting binds a size observation
//!   to a particle animation; rendering draws the panel, the particle
//!   layer, and the fund text.

pub mod fund;
pub mod fund_card;
pub mod panel;
pub mod particle_layer;
pub mod text;

use stardust_core::geometry::Rect;
use stardust_render::Buffer;

pub use fund::{FundDescriptor, FundKind};
pub use fund_card::{AnimationStatus, CardRuntime, CardStyle, DisabledReason, FundCard};
pub use panel::Panel;
pub use particle_layer::ParticleLayer;

/// A renderable component.
///
/// Widgets render themselves into a `Buffer` within a given `Rect`.
pub trait Widget {
    /// Render the widget into the buffer at the given area.
    fn render(&self, area: Rect, buf: &mut Buffer);
}
