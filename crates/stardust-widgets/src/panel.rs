#![forbid(unsafe_code)]

//! Panel widget: a bordered box with padding.
//!
//! The inner widget renders inside the border (and padding) with a scissor
//! pushed, so nothing it draws can overwrite the border.

use stardust_core::geometry::{Rect, Sides};
use stardust_render::{BorderChars, Buffer, Cell, Draw, PackedRgba};

use crate::Widget;

/// A widget that draws a border around another widget.
#[derive(Debug, Clone)]
pub struct Panel<W> {
    inner: W,
    border_chars: BorderChars,
    padding: Sides,
    border_fg: Option<PackedRgba>,
    border_bg: Option<PackedRgba>,
}

impl<W> Panel<W> {
    /// Square-bordered panel with no padding.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            border_chars: BorderChars::SQUARE,
            padding: Sides::all(0),
            border_fg: None,
            border_bg: None,
        }
    }

    #[must_use]
    pub const fn border_chars(mut self, chars: BorderChars) -> Self {
        self.border_chars = chars;
        self
    }

    /// Padding between border and content.
    #[must_use]
    pub const fn padding(mut self, padding: Sides) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub const fn border_fg(mut self, color: PackedRgba) -> Self {
        self.border_fg = Some(color);
        self
    }

    #[must_use]
    pub const fn border_bg(mut self, color: PackedRgba) -> Self {
        self.border_bg = Some(color);
        self
    }

    /// Content area after border and padding.
    #[must_use]
    pub fn inner_area(&self, area: Rect) -> Rect {
        if area.width < 2 || area.height < 2 {
            return Rect::default();
        }
        let after_border = Rect::new(
            area.x.saturating_add(1),
            area.y.saturating_add(1),
            area.width - 2,
            area.height - 2,
        );
        after_border.inner(self.padding)
    }

    fn render_border(&self, area: Rect, buf: &mut Buffer) {
        let mut border_cell = Cell::from_char(' ');
        if let Some(fg) = self.border_fg {
            border_cell = border_cell.with_fg(fg);
        }
        if let Some(bg) = self.border_bg {
            border_cell = border_cell.with_bg(bg);
        }
        buf.draw_border(area, self.border_chars, border_cell);
    }
}

impl<W: Widget> Widget for Panel<W> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() || area.width < 2 || area.height < 2 {
            return;
        }

        self.render_border(area, buf);

        let inner_area = self.inner_area(area);
        if !inner_area.is_empty() {
            buf.push_scissor(inner_area);
            self.inner.render(inner_area, buf);
            buf.pop_scissor();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Fill(char);

    impl Widget for Fill {
        fn render(&self, area: Rect, buf: &mut Buffer) {
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    buf.set(x, y, Cell::from_char(self.0));
                }
            }
        }
    }

    /// Ignores its area and floods the whole buffer.
    struct Flood;

    impl Widget for Flood {
        fn render(&self, _area: Rect, buf: &mut Buffer) {
            buf.fill(buf.area(), Cell::from_char('!'));
        }
    }

    #[test]
    fn panel_draws_square_border() {
        let mut buf = Buffer::new(5, 4);
        Panel::new(Fill('X')).render(Rect::from_size(5, 4), &mut buf);
        assert_eq!(buf.to_lines(), vec!["┌───┐", "│XXX│", "│XXX│", "└───┘"]);
    }

    #[test]
    fn panel_draws_rounded_border() {
        let mut buf = Buffer::new(5, 3);
        Panel::new(Fill('X'))
            .border_chars(BorderChars::ROUNDED)
            .render(Rect::from_size(5, 3), &mut buf);
        assert_eq!(buf.to_lines(), vec!["╭───╮", "│XXX│", "╰───╯"]);
    }

    #[test]
    fn padding_shrinks_content() {
        let mut buf = Buffer::new(6, 4);
        Panel::new(Fill('.'))
            .border_chars(BorderChars::ASCII)
            .padding(Sides::symmetric(0, 1))
            .render(Rect::from_size(6, 4), &mut buf);
        assert_eq!(buf.to_lines(), vec!["+----+", "| .. |", "| .. |", "+----+"]);
    }

    #[test]
    fn content_cannot_overwrite_border() {
        let mut buf = Buffer::new(4, 3);
        Panel::new(Flood).render(Rect::from_size(4, 3), &mut buf);
        assert_eq!(buf.to_lines(), vec!["┌──┐", "│!!│", "└──┘"]);
        assert_eq!(buf.current_scissor(), buf.area());
    }

    #[test]
    fn tiny_area_draws_nothing() {
        let mut buf = Buffer::new(3, 3);
        Panel::new(Fill('X')).render(Rect::new(0, 0, 1, 3), &mut buf);
        assert_eq!(buf.to_lines(), vec!["   ", "   ", "   "]);
        assert!(Panel::new(Fill('X')).inner_area(Rect::new(0, 0, 1, 3)).is_empty());
    }

    #[test]
    fn border_colors_apply() {
        let mut buf = Buffer::new(3, 3);
        Panel::new(Fill(' '))
            .border_fg(PackedRgba::rgb(1, 2, 3))
            .border_bg(PackedRgba::BLACK)
            .render(Rect::from_size(3, 3), &mut buf);
        let corner = buf.get(0, 0).copied().unwrap_or_default();
        assert_eq!(corner.fg, PackedRgba::rgb(1, 2, 3));
        assert_eq!(corner.bg, PackedRgba::BLACK);
    }
}
