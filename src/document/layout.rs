//! Fixed-column text layout shared by the builder and the encoder.
//!
//! Widths are counted in characters; after [`cp437::sanitize`] every
//! character is exactly one printer column.
//!
//! [`cp437::sanitize`]: crate::protocol::cp437::sanitize

/// Continuation lines allowed after the first line of wrapped text.
pub const MAX_CONTINUATION_LINES: usize = 3;

/// Appended to the last kept line when wrapped text is cut short.
pub const ELLIPSIS: &str = "...";

/// Printed width of `s` in columns.
#[inline]
pub fn width_of(s: &str) -> usize {
    s.chars().count()
}

fn split_at_col(s: &str, col: usize) -> (&str, &str) {
    let idx = s.char_indices().nth(col).map(|(i, _)| i).unwrap_or(s.len());
    s.split_at(idx)
}

/// Greedy word wrap.
///
/// Runs of whitespace collapse to one space. Words longer than a line are
/// hard-split. At most `1 + MAX_CONTINUATION_LINES` lines come back; if the
/// text needed more, the last one ends in [`ELLIPSIS`]. Always returns at
/// least one (possibly empty) line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(ELLIPSIS.len() + 1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for mut word in text.split_whitespace() {
        loop {
            let current_w = width_of(&current);
            let word_w = width_of(word);

            if current_w == 0 {
                if word_w <= width {
                    current.push_str(word);
                    break;
                }
                let (head, tail) = split_at_col(word, width);
                lines.push(head.to_string());
                word = tail;
                continue;
            }

            if current_w + 1 + word_w <= width {
                current.push(' ');
                current.push_str(word);
                break;
            }
            lines.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    cap_lines(lines, width)
}

fn cap_lines(mut lines: Vec<String>, width: usize) -> Vec<String> {
    let max = 1 + MAX_CONTINUATION_LINES;
    if lines.len() <= max {
        return lines;
    }
    lines.truncate(max);
    if let Some(last) = lines.last_mut() {
        let keep = width - ELLIPSIS.len();
        let (head, _) = split_at_col(last.trim_end(), keep);
        *last = format!("{}{}", head.trim_end(), ELLIPSIS);
    }
    lines
}

/// Lay out `left` and `right` on a line of `width` columns, `right` flush
/// against the right edge.
///
/// When `right` does not fit after the (wrapped) left text with at least
/// one space between them, it moves to its own right-aligned line instead
/// of being cut.
pub fn two_column(left: &str, right: &str, width: usize) -> Vec<String> {
    let mut lines = wrap(left, width);
    if right.is_empty() {
        return lines;
    }

    let right_w = width_of(right);
    if let Some(last) = lines.last_mut() {
        let last_w = width_of(last);
        if last_w + 1 + right_w <= width {
            let gap = width - last_w - right_w;
            *last = format!("{}{}{}", last, " ".repeat(gap), right);
            return lines;
        }
    }

    for part in wrap(right, width) {
        lines.push(format!("{:>w$}", part, w = width));
    }
    lines
}

/// Full-width dashed rule.
pub fn divider(width: usize) -> String {
    "-".repeat(width)
}

/// Pad `text` so it sits centered in `width` columns (left padding only).
pub fn center(text: &str, width: usize) -> String {
    let w = width_of(text);
    if w >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - w) / 2), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wrap_short_text_untouched() {
        assert_eq!(wrap("Terima kasih", 32), vec!["Terima kasih"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 32), vec![""]);
        assert_eq!(wrap("   ", 32), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let lines = wrap("jangan dicampur dengan pakaian putih", 16);
        assert_eq!(lines, vec!["jangan dicampur", "dengan pakaian", "putih"]);
    }

    #[test]
    fn test_wrap_hard_splits_long_words() {
        let lines = wrap("ABCDEFGHIJKLMNOPQRST", 8);
        assert_eq!(lines, vec!["ABCDEFGH", "IJKLMNOP", "QRST"]);
    }

    #[test]
    fn test_wrap_caps_with_ellipsis() {
        let text = "satu dua tiga empat lima enam tujuh delapan sembilan sepuluh";
        let lines = wrap(text, 10);
        assert_eq!(lines.len(), 1 + MAX_CONTINUATION_LINES);
        assert!(lines.last().unwrap().ends_with(ELLIPSIS));
        assert!(lines.iter().all(|l| width_of(l) <= 10));
    }

    #[test]
    fn test_wrap_exactly_four_lines_has_no_ellipsis() {
        let lines = wrap("aaaa bbbb cccc dddd", 4);
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc", "dddd"]);
    }

    #[test]
    fn test_two_column_fits() {
        let lines = two_column("Cuci x2", "Rp 20.000", 32);
        assert_eq!(lines, vec![format!("Cuci x2{}Rp 20.000", " ".repeat(16))]);
        assert_eq!(width_of(&lines[0]), 32);
    }

    #[test]
    fn test_two_column_overflow_moves_value() {
        let left = "Cuci Setrika Express Premium x12";
        let lines = two_column(left, "Rp 1.200.000", 32);
        assert_eq!(lines[0], left);
        assert_eq!(lines[1], format!("{:>32}", "Rp 1.200.000"));
    }

    #[test]
    fn test_two_column_needs_a_gap() {
        // 20 + 12 = 32: would touch without a space
        let lines = two_column("AAAAAAAAAAAAAAAAAAAA", "BBBBBBBBBBBB", 32);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_two_column_long_value_wraps_right_aligned() {
        let lines = two_column("Pelanggan", "Ibu Siti Nurhaliza binti Abdullah Rahman", 32);
        assert_eq!(lines[0], "Pelanggan");
        assert!(lines[1..].iter().all(|l| width_of(l) == 32));
        assert!(lines[1].trim_start().starts_with("Ibu Siti"));
    }

    #[test]
    fn test_divider() {
        assert_eq!(divider(4), "----");
    }

    #[test]
    fn test_center() {
        assert_eq!(center("ab", 6), "  ab");
        assert_eq!(center("abcdef", 4), "abcdef");
    }
}
