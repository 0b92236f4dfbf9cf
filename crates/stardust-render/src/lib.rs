#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, borders, and clipped text.
//!
//! # Role in stardust
//! Widgets paint into a [`buffer::Buffer`], a fixed grid of [`cell::Cell`]s.
//! The particle layer and the card text share one buffer; a scissor stack
//! keeps each layer inside the panel border.
//!
//! # Primary responsibilities
//! - **PackedRgba**: compact RGBA color with alpha-over blending.
//! - **Cell**: one grapheme plus foreground, background, and attributes.
//! - **Buffer**: the grid, scissor stack, and clipped text printing.
//! - **Draw**: border and fill helpers on top of `Buffer`.

pub mod buffer;
pub mod cell;
pub mod drawing;

pub use buffer::Buffer;
pub use cell::{Cell, CellAttrs, CellContent, PackedRgba};
pub use drawing::{BorderChars, Draw};
