//! # Text Preview
//!
//! Renders an IR program to the plain-text lines it would put on paper.
//! Runs on the same [`Program`] the codegen consumes, so alignment and
//! wrapping in the preview are exactly what the printer does.
//!
//! ```
//! use nota::ir::{Op, Program};
//! use nota::printer::PaperProfile;
//! use nota::preview::render_text;
//! use nota::protocol::text::Alignment;
//!
//! let mut program = Program::with_init();
//! program.push(Op::SetAlign { align: Alignment::Center });
//! program.push(Op::text("LAUNDRY"));
//! program.push(Op::Newline);
//!
//! let lines = render_text(&program, PaperProfile::Narrow);
//! assert_eq!(lines, vec![format!("{}LAUNDRY", " ".repeat(12))]);
//! ```

use crate::document::layout::{self, width_of};
use crate::ir::{Op, Program, StyleState};
use crate::printer::PaperProfile;
use crate::protocol::text::Alignment;

/// Marker printed where the paper is cut.
pub const CUT_MARKER: &str = "- - - - - cut - - - - -";

/// Render `program` as paper lines for `profile`.
///
/// Style ops other than alignment have no textual effect. QR symbols show
/// as a bracketed placeholder carrying their payload.
pub fn render_text(program: &Program, profile: PaperProfile) -> Vec<String> {
    let width = profile.columns();
    let mut out = Vec::new();
    let mut state = StyleState::default();
    let mut current = String::new();
    // Alignment is latched by the first character of a line.
    let mut line_align = None;

    let flush = |out: &mut Vec<String>, current: &mut String, align: Option<Alignment>| {
        let text = std::mem::take(current);
        out.push(place(&text, align.unwrap_or_default(), width));
    };

    for op in program {
        match op {
            Op::Init => state = StyleState::default(),
            Op::SetAlign { align } => state.alignment = *align,
            Op::SetBold { on } => state.bold = *on,
            Op::SetDoubleHeight { on } => state.double_height = *on,
            Op::Text { text } => {
                line_align.get_or_insert(state.alignment);
                current.push_str(text);
            }
            Op::Newline => {
                flush(&mut out, &mut current, line_align.take());
            }
            Op::Feed { lines } => {
                if !current.is_empty() {
                    flush(&mut out, &mut current, line_align.take());
                }
                out.extend(std::iter::repeat_n(String::new(), *lines as usize));
            }
            Op::Cut { .. } => {
                if !current.is_empty() {
                    flush(&mut out, &mut current, line_align.take());
                }
                out.push(layout::center(CUT_MARKER, width));
            }
            Op::QrCode { data, .. } => {
                if !current.is_empty() {
                    flush(&mut out, &mut current, line_align.take());
                }
                let label = format!("[QR: {}]", data);
                let align = state.alignment;
                for part in layout::wrap(&label, width) {
                    out.push(place(&part, align, width));
                }
            }
            Op::SetCodeTable { .. } => {}
        }
    }

    if !current.is_empty() {
        flush(&mut out, &mut current, line_align.take());
    }
    out
}

fn place(text: &str, align: Alignment, width: usize) -> String {
    match align {
        Alignment::Left => text.to_string(),
        Alignment::Center => layout::center(text, width),
        Alignment::Right => {
            let w = width_of(text);
            if w >= width {
                text.to_string()
            } else {
                format!("{}{}", " ".repeat(width - w), text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{self, EncodeOptions, ReceiptDocument, ReceiptLine};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alignment_latched_at_line_start() {
        let mut program = Program::new();
        program.push(Op::text("left"));
        program.push(Op::SetAlign {
            align: Alignment::Right,
        });
        program.push(Op::Newline);
        program.push(Op::text("right"));
        program.push(Op::Newline);

        let lines = render_text(&program, PaperProfile::Narrow);
        assert_eq!(lines[0], "left");
        assert_eq!(lines[1], format!("{:>32}", "right"));
    }

    #[test]
    fn test_feed_and_cut() {
        let program: Program = vec![Op::text("x"), Op::Feed { lines: 2 }, Op::Cut { partial: true }]
            .into_iter()
            .collect();
        let lines = render_text(&program, PaperProfile::Wide);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "x");
        assert_eq!(lines[1], "");
        assert!(lines[3].contains("cut"));
    }

    #[test]
    fn test_document_preview() {
        let doc = ReceiptDocument::from_lines(vec![
            ReceiptLine::Header("LAUNDRY".into()),
            ReceiptLine::Divider,
            ReceiptLine::KeyValue {
                label: "No".into(),
                value: "TRX-1".into(),
            },
            ReceiptLine::QrPayload("TRX-1".into()),
        ]);
        let program = document::lower(&doc, PaperProfile::Narrow, &EncodeOptions::default());
        let lines = render_text(&program, PaperProfile::Narrow);

        assert_eq!(lines[0], format!("{}LAUNDRY", " ".repeat(12)));
        assert_eq!(lines[1], "-".repeat(32));
        assert_eq!(lines[2], format!("No{}TRX-1", " ".repeat(25)));
        assert_eq!(lines[3].trim(), "[QR: TRX-1]");
    }

    #[test]
    fn test_preview_lines_fit_paper() {
        let doc = ReceiptDocument::from_lines(vec![ReceiptLine::Raw("a ".repeat(40))]);
        for profile in PaperProfile::ALL {
            let program = document::lower(&doc, profile, &EncodeOptions::default());
            for line in render_text(&program, profile) {
                assert!(width_of(&line) <= profile.columns(), "{:?}", line);
            }
        }
    }
}
