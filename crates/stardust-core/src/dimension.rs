#![forbid(unsafe_code)]

//! Measured container size in logical (device-independent) pixels.
//!
//! # Invariants
//!
//! 1. Both axes are finite and `>= 0`.
//! 2. A value that would violate (1) in either axis collapses to
//!    [`Dimension::ZERO`]; nothing is reported, since a degenerate size only
//!    ever means "nothing to draw".
//! 3. An unmeasured container reports [`Dimension::ZERO`].

use std::cell::Cell;
use std::fmt;

/// Width/height of a container at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimension {
    width: f64,
    height: f64,
}

impl Dimension {
    /// No visible area.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a sanitized dimension.
    ///
    /// Negative or non-finite input in either axis yields [`Dimension::ZERO`].
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        if !Self::axis_is_valid(width) || !Self::axis_is_valid(height) {
            return Self::ZERO;
        }
        // Normalize -0.0 so equality and display stay boring.
        Self {
            width: width + 0.0,
            height: height + 0.0,
        }
    }

    /// Size of a `cols x rows` cell grid with the given cell size in pixels.
    #[must_use]
    pub fn from_cells(cols: u16, rows: u16, cell_width: f64, cell_height: f64) -> Self {
        Self::new(f64::from(cols) * cell_width, f64::from(rows) * cell_height)
    }

    #[inline]
    fn axis_is_valid(v: f64) -> bool {
        v.is_finite() && v >= 0.0
    }

    /// Width in logical pixels.
    #[inline]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Height in logical pixels.
    #[inline]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Area in square logical pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when either axis is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// True when `other` differs by more than `tolerance` pixels in either
    /// axis, or when exactly one of the two has zero area.
    #[must_use]
    pub fn differs_materially(&self, other: &Self, tolerance: f64) -> bool {
        if self.is_empty() != other.is_empty() {
            return true;
        }
        let tolerance = if tolerance.is_finite() {
            tolerance.max(0.0)
        } else {
            0.0
        };
        (self.width - other.width).abs() > tolerance
            || (self.height - other.height).abs() > tolerance
    }

    /// Number of whole cells this size covers, rounding partial cells up.
    ///
    /// Degenerate cell sizes map to an empty grid.
    #[must_use]
    pub fn to_cells(&self, cell_width: f64, cell_height: f64) -> (u16, u16) {
        let axis = |len: f64, cell: f64| -> u16 {
            if !(cell.is_finite() && cell > 0.0) {
                return 0;
            }
            let cells = (len / cell).ceil();
            if cells >= f64::from(u16::MAX) {
                u16::MAX
            } else {
                cells as u16
            }
        };
        (
            axis(self.width, cell_width),
            axis(self.height, cell_height),
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pull-based accessor for the latest [`Dimension`].
///
/// The animator polls this once per frame; implementations must be cheap and
/// must never block.
pub trait DimensionSource {
    /// The most recent dimension.
    fn dimension(&self) -> Dimension;
}

impl DimensionSource for Dimension {
    fn dimension(&self) -> Dimension {
        *self
    }
}

impl DimensionSource for Cell<Dimension> {
    fn dimension(&self) -> Dimension {
        self.get()
    }
}

/// A [`DimensionSource`] backed by a closure.
pub struct FnDimensionSource<F> {
    f: F,
}

impl<F: Fn() -> Dimension> FnDimensionSource<F> {
    /// Wrap a closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: Fn() -> Dimension> DimensionSource for FnDimensionSource<F> {
    fn dimension(&self) -> Dimension {
        (self.f)()
    }
}

impl<F> fmt::Debug for FnDimensionSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDimensionSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unmeasured_is_zero() {
        assert_eq!(Dimension::default(), Dimension::ZERO);
        assert!(Dimension::ZERO.is_empty());
        assert_eq!(Dimension::ZERO.area(), 0.0);
    }

    #[test]
    fn negative_axis_collapses_to_zero() {
        assert_eq!(Dimension::new(-1.0, 200.0), Dimension::ZERO);
        assert_eq!(Dimension::new(300.0, -0.5), Dimension::ZERO);
    }

    #[test]
    fn non_finite_axis_collapses_to_zero() {
        assert_eq!(Dimension::new(f64::NAN, 10.0), Dimension::ZERO);
        assert_eq!(Dimension::new(10.0, f64::INFINITY), Dimension::ZERO);
    }

    #[test]
    fn negative_zero_is_normalized() {
        let d = Dimension::new(-0.0, 5.0);
        assert!(d.width().is_sign_positive());
        assert_eq!(d, Dimension::new(0.0, 5.0));
    }

    #[test]
    fn hidden_axis_is_empty_but_keeps_other_axis() {
        let d = Dimension::new(0.0, 120.0);
        assert!(d.is_empty());
        assert_eq!(d.height(), 120.0);
    }

    #[test]
    fn material_difference_respects_tolerance() {
        let a = Dimension::new(300.0, 200.0);
        assert!(!a.differs_materially(&Dimension::new(300.9, 200.0), 1.0));
        assert!(!a.differs_materially(&Dimension::new(301.0, 199.0), 1.0));
        assert!(a.differs_materially(&Dimension::new(301.5, 200.0), 1.0));
        assert!(a.differs_materially(&Dimension::new(300.0, 198.0), 1.0));
    }

    #[test]
    fn zero_area_transition_is_always_material() {
        let tiny = Dimension::new(0.5, 0.5);
        assert!(Dimension::ZERO.differs_materially(&tiny, 1.0));
        assert!(tiny.differs_materially(&Dimension::ZERO, 1.0));
        assert!(!Dimension::ZERO.differs_materially(&Dimension::new(0.0, 50.0), 100.0));
    }

    #[test]
    fn cell_conversion_rounds_up() {
        let d = Dimension::new(300.0, 200.0);
        assert_eq!(d.to_cells(8.0, 16.0), (38, 13));
        assert_eq!(Dimension::from_cells(38, 13, 8.0, 16.0).to_cells(8.0, 16.0), (38, 13));
        assert_eq!(d.to_cells(0.0, 16.0), (0, 13));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Dimension::new(600.0, 200.0).to_string(), "600x200");
    }

    #[test]
    fn sources_report_latest() {
        let cell = Cell::new(Dimension::ZERO);
        assert_eq!(cell.dimension(), Dimension::ZERO);
        cell.set(Dimension::new(10.0, 20.0));
        assert_eq!(cell.dimension(), Dimension::new(10.0, 20.0));

        let fixed = Dimension::new(4.0, 4.0);
        assert_eq!(fixed.dimension(), fixed);

        let from_fn = FnDimensionSource::new(|| Dimension::new(1.0, 2.0));
        assert_eq!(from_fn.dimension(), Dimension::new(1.0, 2.0));
    }

    proptest! {
        #[test]
        fn constructed_dimensions_are_always_valid(w in any::<f64>(), h in any::<f64>()) {
            let d = Dimension::new(w, h);
            prop_assert!(d.width().is_finite() && d.width() >= 0.0);
            prop_assert!(d.height().is_finite() && d.height() >= 0.0);
            if d != Dimension::ZERO {
                prop_assert_eq!(d.width(), w);
                prop_assert_eq!(d.height(), h);
            }
        }
    }
}
