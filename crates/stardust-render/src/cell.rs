#![forbid(unsafe_code)]

//! Cell and color primitives.

use bitflags::bitflags;

/// RGBA color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// Source-over composite of `self` onto an opaque `dst`.
    ///
    /// The result is always opaque.
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        let a = u32::from(self.a());
        if a == 255 {
            return self.with_alpha(255);
        }
        if a == 0 {
            return dst.with_alpha(255);
        }
        let inv = 255 - a;
        let mix = |s: u8, d: u8| -> u8 { ((u32::from(s) * a + u32::from(d) * inv + 127) / 255) as u8 };
        Self::rgb(
            mix(self.r(), dst.r()),
            mix(self.g(), dst.g()),
            mix(self.b(), dst.b()),
        )
    }
}

bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellAttrs: u8 {
        const BOLD = 0b0000_0001;
        const DIM = 0b0000_0010;
        const ITALIC = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
    }
}

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellContent {
    /// Nothing drawn yet.
    #[default]
    Empty,
    /// A single character.
    Char(char),
    /// Trailing half of a wide character drawn in the cell to the left.
    Continuation,
}

impl CellContent {
    /// The displayed character, if this cell starts one.
    #[inline]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            Self::Empty | Self::Continuation => None,
        }
    }

    #[inline]
    pub const fn is_continuation(&self) -> bool {
        matches!(self, Self::Continuation)
    }
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub content: CellContent,
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub attrs: CellAttrs,
}

impl Cell {
    /// Cell showing `c` with default colors.
    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self {
            content: CellContent::Char(c),
            fg: PackedRgba::WHITE,
            bg: PackedRgba::TRANSPARENT,
            attrs: CellAttrs::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_char(mut self, c: char) -> Self {
        self.content = CellContent::Char(c);
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_attrs(mut self, attrs: CellAttrs) -> Self {
        self.attrs = attrs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip_through_packing() {
        let c = PackedRgba::rgba(1, 2, 3, 4);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 4));
        assert_eq!(c.0, 0x0102_0304);
    }

    #[test]
    fn over_respects_alpha_extremes() {
        let dst = PackedRgba::rgb(10, 20, 30);
        assert_eq!(PackedRgba::TRANSPARENT.over(dst), dst);
        assert_eq!(PackedRgba::rgb(200, 0, 0).over(dst), PackedRgba::rgb(200, 0, 0));
    }

    #[test]
    fn over_blends_half_alpha() {
        let src = PackedRgba::rgba(255, 255, 255, 128);
        let out = src.over(PackedRgba::BLACK);
        assert_eq!(out.a(), 255);
        assert_eq!(out.r(), 128);
    }

    #[test]
    fn builder_sets_fields() {
        let cell = Cell::from_char('x')
            .with_fg(PackedRgba::BLACK)
            .with_attrs(CellAttrs::BOLD);
        assert_eq!(cell.content.as_char(), Some('x'));
        assert_eq!(cell.fg, PackedRgba::BLACK);
        assert!(cell.attrs.contains(CellAttrs::BOLD));
        assert_eq!(Cell::default().content.as_char(), None);
    }
}
