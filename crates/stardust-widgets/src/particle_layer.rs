#![forbid(unsafe_code)]

//! Rasterizes a [`StardustFrame`] into cells.

use stardust_core::geometry::Rect;
use stardust_fx::StardustFrame;
use stardust_render::{Buffer, Cell, PackedRgba};

use crate::Widget;

/// Alpha of the faintest sprite when blended over the background.
const MIN_SPRITE_ALPHA: f64 = 96.0;

/// A stardust frame placed over a cell grid.
///
/// Sprite coordinates are logical pixels relative to `origin`; one cell
/// covers `cell_width x cell_height` pixels. The layer paints `background`
/// over its whole area, then one glyph per sprite, brightest last. Sprite
/// colors are composited over the background with an alpha that grows with
/// intensity, so faint stars sink into the backdrop.
#[derive(Debug, Clone, Copy)]
pub struct ParticleLayer<'a> {
    frame: &'a StardustFrame,
    origin: (u16, u16),
    cell_width: f64,
    cell_height: f64,
    background: PackedRgba,
}

impl<'a> ParticleLayer<'a> {
    pub fn new(frame: &'a StardustFrame, cell_width: f64, cell_height: f64) -> Self {
        Self {
            frame,
            origin: (0, 0),
            cell_width,
            cell_height,
            background: PackedRgba::BLACK,
        }
    }

    /// Cell that pixel `(0, 0)` of the frame maps to.
    #[must_use]
    pub const fn origin(mut self, x: u16, y: u16) -> Self {
        self.origin = (x, y);
        self
    }

    #[must_use]
    pub const fn background(mut self, color: PackedRgba) -> Self {
        self.background = color;
        self
    }

    fn cell_of(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if !(self.cell_width > 0.0 && self.cell_height > 0.0) || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = f64::from(self.origin.0) + (x / self.cell_width).floor();
        let row = f64::from(self.origin.1) + (y / self.cell_height).floor();
        let max = f64::from(u16::MAX);
        (col < max && row < max).then(|| (col as u16, row as u16))
    }

    fn sprite_color(&self, color: PackedRgba, intensity: f64) -> PackedRgba {
        let t = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.0 };
        let alpha = MIN_SPRITE_ALPHA + (255.0 - MIN_SPRITE_ALPHA) * t;
        color.with_alpha(alpha.round() as u8).over(self.background)
    }
}

impl Widget for ParticleLayer<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        buf.fill(area, Cell::from_char(' ').with_bg(self.background));
        for sprite in &self.frame.sprites {
            let Some((x, y)) = self.cell_of(sprite.x, sprite.y) else {
                continue;
            };
            if area.contains(x, y) {
                buf.set(
                    x,
                    y,
                    Cell::from_char(sprite.glyph)
                        .with_fg(self.sprite_color(sprite.color, sprite.intensity))
                        .with_bg(self.background),
                );
            }
        }
    }
}
