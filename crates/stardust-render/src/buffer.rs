#![forbid(unsafe_code)]

//! Fixed-size cell grid with a scissor stack.
//!
//! # Invariants
//!
//! 1. Writes outside the buffer or outside the current scissor are dropped.
//! 2. The scissor stack always has at least one entry: the full buffer.
//! 3. Pushing a scissor intersects it with the current one, so nested
//!    scissors can only shrink the writable area.

use stardust_core::geometry::Rect;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellContent};

/// A grid of cells addressed by `(x, y)`.
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    scissors: Vec<Rect>,
}

impl Buffer {
    /// Create a buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
            scissors: vec![Rect::from_size(width, height)],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Full buffer area.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Cell at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// The area writes are currently clipped to.
    #[inline]
    pub fn current_scissor(&self) -> Rect {
        self.scissors.last().copied().unwrap_or_default()
    }

    /// Restrict writes to `rect` (intersected with the current scissor).
    pub fn push_scissor(&mut self, rect: Rect) {
        let clipped = self.current_scissor().intersection(&rect);
        self.scissors.push(clipped);
    }

    /// Undo the last [`push_scissor`](Self::push_scissor). The base entry is
    /// never removed.
    pub fn pop_scissor(&mut self) {
        if self.scissors.len() > 1 {
            self.scissors.pop();
        }
    }

    /// Write `cell` at `(x, y)` if it lies inside the current scissor.
    ///
    /// Returns whether the write happened.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.current_scissor().contains(x, y) {
            return false;
        }
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Fill `rect` (clipped) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let rect = self.current_scissor().intersection(&rect);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Print `text` starting at `(x, y)` using `style` for colors and
    /// attributes, stopping before column `max_x`.
    ///
    /// Wide characters occupy two cells; a wide character that would cross
    /// `max_x` is not printed. Zero-width characters are skipped. Returns
    /// the column after the last printed cell.
    pub fn print_text_clipped(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        style: Cell,
        max_x: u16,
    ) -> u16 {
        let mut cursor = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if cursor.saturating_add(w) > max_x {
                break;
            }
            self.set(cursor, y, style.with_char(ch));
            for dx in 1..w {
                let mut tail = style;
                tail.content = CellContent::Continuation;
                self.set(cursor + dx, y, tail);
            }
            cursor += w;
        }
        cursor
    }

    /// Render the characters of each row as a string.
    ///
    /// Empty cells become spaces; continuation cells are skipped so wide
    /// characters appear once.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                let mut row = String::with_capacity(usize::from(self.width));
                for x in 0..self.width {
                    let Some(cell) = self.get(x, y) else { continue };
                    match cell.content {
                        CellContent::Char(c) => row.push(c),
                        CellContent::Empty => row.push(' '),
                        CellContent::Continuation => {}
                    }
                }
                row
            })
            .collect()
    }
}
