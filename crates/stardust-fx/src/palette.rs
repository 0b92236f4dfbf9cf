#![forbid(unsafe_code)]

//! Stardust palettes and the shared sprite atlas.
//!
//! A palette is four gradient stops over a dark background. Particles pick a
//! hue in `[0, 1]` along the gradient and fade toward the background as their
//! intensity drops. [`SpriteAtlas`] precomputes that mapping on a fixed grid
//! so the per-frame cost is a table lookup.

use std::fmt;
use std::str::FromStr;

use stardust_render::PackedRgba;

/// Color scheme for the particle layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StardustPalette {
    /// Violet into cyan.
    #[default]
    Nebula,
    /// Deep red into gold.
    Ember,
    /// Steel blue into white.
    Frost,
    /// Grey ramp.
    Mono,
}

impl StardustPalette {
    pub const ALL: [Self; 4] = [Self::Nebula, Self::Ember, Self::Frost, Self::Mono];

    /// Lower-case name used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nebula => "nebula",
            Self::Ember => "ember",
            Self::Frost => "frost",
            Self::Mono => "mono",
        }
    }

    /// Parse a configuration name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Color the particle layer fades into.
    pub const fn background(self) -> PackedRgba {
        match self {
            Self::Nebula => PackedRgba::rgb(10, 8, 24),
            Self::Ember => PackedRgba::rgb(20, 8, 6),
            Self::Frost => PackedRgba::rgb(8, 14, 22),
            Self::Mono => PackedRgba::rgb(12, 12, 12),
        }
    }

    const fn stops(self) -> [PackedRgba; 4] {
        match self {
            Self::Nebula => [
                PackedRgba::rgb(120, 60, 200),
                PackedRgba::rgb(200, 90, 220),
                PackedRgba::rgb(90, 160, 255),
                PackedRgba::rgb(150, 255, 250),
            ],
            Self::Ember => [
                PackedRgba::rgb(160, 30, 20),
                PackedRgba::rgb(230, 90, 30),
                PackedRgba::rgb(255, 170, 50),
                PackedRgba::rgb(255, 235, 150),
            ],
            Self::Frost => [
                PackedRgba::rgb(70, 110, 170),
                PackedRgba::rgb(120, 170, 220),
                PackedRgba::rgb(190, 225, 250),
                PackedRgba::rgb(250, 252, 255),
            ],
            Self::Mono => [
                PackedRgba::rgb(90, 90, 90),
                PackedRgba::rgb(150, 150, 150),
                PackedRgba::rgb(205, 205, 205),
                PackedRgba::rgb(250, 250, 250),
            ],
        }
    }

    /// Exact color for `hue` at `intensity`; both are clamped to `[0, 1]`.
    pub fn color_at(self, hue: f64, intensity: f64) -> PackedRgba {
        let base = gradient_color(&self.stops(), hue);
        lerp_color(self.background(), base, intensity)
    }
}

impl fmt::Display for StardustPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unknown palette name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown palette `{0}` (expected nebula, ember, frost or mono)")]
pub struct UnknownPalette(pub String);

impl FromStr for StardustPalette {
    type Err = UnknownPalette;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownPalette(s.to_owned()))
    }
}

const HUE_STEPS: usize = 16;
const INTENSITY_STEPS: usize = 16;
const GLYPHS: [char; 4] = ['·', '∙', '•', '✦'];

/// Precomputed palette colors and glyph ramp.
///
/// Immutable once built; cards share one atlas per palette through
/// [`SharedRegistry`](stardust_runtime::SharedRegistry).
#[derive(Clone, PartialEq)]
pub struct SpriteAtlas {
    palette: StardustPalette,
    lut: Vec<PackedRgba>,
}

impl SpriteAtlas {
    /// Build the lookup table for `palette`.
    pub fn new(palette: StardustPalette) -> Self {
        let mut lut = Vec::with_capacity(HUE_STEPS * INTENSITY_STEPS);
        for h in 0..HUE_STEPS {
            let hue = h as f64 / (HUE_STEPS - 1) as f64;
            for i in 0..INTENSITY_STEPS {
                let intensity = i as f64 / (INTENSITY_STEPS - 1) as f64;
                lut.push(palette.color_at(hue, intensity));
            }
        }
        Self { palette, lut }
    }

    /// Registry key for the shared atlas of `palette`.
    pub fn registry_key(palette: StardustPalette) -> String {
        format!("stardust.atlas.{}", palette.name())
    }

    pub const fn palette(&self) -> StardustPalette {
        self.palette
    }

    pub const fn background(&self) -> PackedRgba {
        self.palette.background()
    }

    /// Nearest precomputed color for `hue` and `intensity`.
    #[inline]
    pub fn color(&self, hue: f64, intensity: f64) -> PackedRgba {
        let h = quantize(hue, HUE_STEPS);
        let i = quantize(intensity, INTENSITY_STEPS);
        self.lut[h * INTENSITY_STEPS + i]
    }

    /// Glyph for a sprite of the given intensity; brighter is bigger.
    #[inline]
    pub fn glyph(&self, intensity: f64) -> char {
        GLYPHS[quantize(intensity, GLYPHS.len())]
    }
}

impl fmt::Debug for SpriteAtlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteAtlas")
            .field("palette", &self.palette)
            .field("entries", &self.lut.len())
            .finish()
    }
}

/// Map `t` in `[0, 1]` to a bucket in `0..steps`. NaN maps to 0.
#[inline]
fn quantize(t: f64, steps: usize) -> usize {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    ((t * (steps - 1) as f64).round() as usize).min(steps - 1)
}

/// Fixed-point color lerp; `t` is clamped to `[0, 1]`.
#[inline]
fn lerp_color(a: PackedRgba, b: PackedRgba, t: f64) -> PackedRgba {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let t256 = (t * 256.0) as u32;
    let inv = 256 - t256;
    let mix = |x: u8, y: u8| ((u32::from(x) * inv + u32::from(y) * t256) >> 8) as u8;
    PackedRgba::rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

#[inline]
fn gradient_color(stops: &[PackedRgba; 4], t: f64) -> PackedRgba {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * 3.0;
    let idx = (scaled.floor() as usize).min(2);
    lerp_color(stops[idx], stops[idx + 1], scaled - idx as f64)
}
