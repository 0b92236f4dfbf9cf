#![forbid(unsafe_code)]

//! Border drawing on top of [`Buffer`].

use stardust_core::geometry::Rect;

use crate::buffer::Buffer;
use crate::cell::Cell;

/// Characters used to draw a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    pub const SQUARE: Self = Self::new('┌', '┐', '└', '┘', '─', '│');
    pub const ROUNDED: Self = Self::new('╭', '╮', '╰', '╯', '─', '│');
    pub const DOUBLE: Self = Self::new('╔', '╗', '╚', '╝', '═', '║');
    pub const HEAVY: Self = Self::new('┏', '┓', '┗', '┛', '━', '┃');
    pub const ASCII: Self = Self::new('+', '+', '+', '+', '-', '|');

    const fn new(
        top_left: char,
        top_right: char,
        bottom_left: char,
        bottom_right: char,
        horizontal: char,
        vertical: char,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            horizontal,
            vertical,
        }
    }
}

/// Drawing helpers for anything that can hold cells.
pub trait Draw {
    /// Draw a one-cell border along the edge of `area`, styled like `cell`.
    ///
    /// Areas smaller than 2x2 are left untouched.
    fn draw_border(&mut self, area: Rect, chars: BorderChars, cell: Cell);
}

impl Draw for Buffer {
    fn draw_border(&mut self, area: Rect, chars: BorderChars, cell: Cell) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;

        for x in area.x + 1..right {
            self.set(x, area.y, cell.with_char(chars.horizontal));
            self.set(x, bottom, cell.with_char(chars.horizontal));
        }
        for y in area.y + 1..bottom {
            self.set(area.x, y, cell.with_char(chars.vertical));
            self.set(right, y, cell.with_char(chars.vertical));
        }
        self.set(area.x, area.y, cell.with_char(chars.top_left));
        self.set(right, area.y, cell.with_char(chars.top_right));
        self.set(area.x, bottom, cell.with_char(chars.bottom_left));
        self.set(right, bottom, cell.with_char(chars.bottom_right));
    }
}
