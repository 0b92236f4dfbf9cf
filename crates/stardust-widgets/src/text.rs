#![forbid(unsafe_code)]

//! Greedy word wrapping by display width.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap `text` into lines no wider than `width` columns.
///
/// Existing newlines are kept. Words wider than `width` are split between
/// characters. Whitespace is normalized: leading and trailing whitespace is
/// dropped and every run of spaces or tabs inside a line becomes one space,
/// so `"a  b"` wraps as `"a b"`.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let gap = usize::from(line_width > 0);
            if line_width + gap + word_width <= width {
                if gap == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += gap + word_width;
                continue;
            }
            if line_width > 0 {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if word_width <= width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }
            for ch in word.chars() {
                let w = ch.width().unwrap_or(0);
                if line_width + w > width && line_width > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += w;
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::wrap;
    use proptest::prelude::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(
            wrap("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn keeps_paragraph_breaks() {
        assert_eq!(wrap("a\n\nb", 5), vec!["a", "", "b"]);
    }

    #[test]
    fn splits_long_words() {
        assert_eq!(wrap("abcdefgh xy", 3), vec!["abc", "def", "gh", "xy"]);
    }

    #[test]
    fn wide_glyphs_count_double() {
        assert_eq!(wrap("🚀🚀🚀", 4), vec!["🚀🚀", "🚀"]);
    }

    #[test]
    fn inner_whitespace_collapses() {
        assert_eq!(wrap("  a  \tb  ", 10), vec!["a b"]);
    }

    #[test]
    fn zero_width_yields_nothing() {
        assert!(wrap("anything", 0).is_empty());
    }

    proptest! {
        #[test]
        fn lines_fit_and_words_survive(text in "[a-z ]{0,80}", width in 1usize..20) {
            let lines = wrap(&text, width);
            for line in &lines {
                prop_assert!(line.width() <= width, "{line:?} wider than {width}");
            }
            let joined: String = lines.concat();
            let original: String = text.split_whitespace().collect();
            prop_assert_eq!(joined.replace(' ', ""), original);
        }
    }
}
