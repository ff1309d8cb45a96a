//! Lowers a [`ReceiptDocument`] to IR and encodes it to ESC/POS bytes.
//!
//! Every styled line restores left alignment, normal size and bold off
//! before the next line, so the printer state between lines is always the
//! state right after `ESC @`.

use serde::{Deserialize, Serialize};

use super::layout::{divider, two_column, width_of, wrap};
use super::money::format_rupiah;
use super::{ReceiptDocument, ReceiptLine};
use crate::ir::{Op, Program};
use crate::printer::PaperProfile;
use crate::protocol::barcode::qr::QrErrorLevel;
use crate::protocol::text::Alignment;

/// PC437 in the `ESC t n` table.
const CODE_TABLE_PC437: u8 = 0;

/// How the receipt ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutPolicy {
    /// `GS V 1`: leaves a hinge so the receipt doesn't fall.
    #[default]
    Partial,
    /// `GS V 0`
    Full,
    /// Feed only. For printers without a cutter.
    None,
}

/// Encoder knobs that don't change the document's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub cut: CutPolicy,
    /// Blank lines fed before the cut so the last line clears the blade.
    pub feed_lines: u8,
    pub qr_module_size: u8,
    pub qr_error_level: QrErrorLevel,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            cut: CutPolicy::Partial,
            feed_lines: 4,
            qr_module_size: 6,
            qr_error_level: QrErrorLevel::M,
        }
    }
}

/// Encode with default options.
pub fn encode(doc: &ReceiptDocument, profile: PaperProfile) -> Vec<u8> {
    encode_with(doc, profile, &EncodeOptions::default())
}

/// Encode a document to the exact bytes sent to the printer.
pub fn encode_with(doc: &ReceiptDocument, profile: PaperProfile, opts: &EncodeOptions) -> Vec<u8> {
    let bytes = lower(doc, profile, opts).optimize().to_bytes();
    tracing::debug!(
        lines = doc.lines().len(),
        bytes = bytes.len(),
        paper = %profile,
        "encoded receipt"
    );
    bytes
}

/// Lower a document to an unoptimized IR program.
pub fn lower(doc: &ReceiptDocument, profile: PaperProfile, opts: &EncodeOptions) -> Program {
    let width = profile.columns();
    let mut program = Program::with_init();
    program.push(Op::SetCodeTable {
        table: CODE_TABLE_PC437,
    });

    for line in doc.lines() {
        match line {
            ReceiptLine::Header(text) => {
                program.push(Op::SetAlign {
                    align: Alignment::Center,
                });
                program.push(Op::SetBold { on: true });
                program.push(Op::SetDoubleHeight { on: true });
                push_fitted(&mut program, text, width);
                program.push(Op::SetDoubleHeight { on: false });
                program.push(Op::SetBold { on: false });
                program.push(Op::SetAlign {
                    align: Alignment::Left,
                });
            }
            ReceiptLine::Centered(text) => {
                program.push(Op::SetAlign {
                    align: Alignment::Center,
                });
                push_fitted(&mut program, text, width);
                program.push(Op::SetAlign {
                    align: Alignment::Left,
                });
            }
            ReceiptLine::KeyValue { label, value } => {
                push_lines(&mut program, two_column(label, value, width));
            }
            ReceiptLine::ServiceRow(row) | ReceiptLine::ProductRow(row) => {
                push_lines(&mut program, two_column(&row.label(), &row.price_text(), width));
            }
            ReceiptLine::Divider => push_line(&mut program, &divider(width)),
            ReceiptLine::TotalRow { label, amount } => {
                program.push(Op::SetBold { on: true });
                program.push(Op::SetDoubleHeight { on: true });
                push_lines(&mut program, two_column(label, &format_rupiah(*amount), width));
                program.push(Op::SetDoubleHeight { on: false });
                program.push(Op::SetBold { on: false });
            }
            ReceiptLine::QrPayload(data) => {
                program.push(Op::SetAlign {
                    align: Alignment::Center,
                });
                program.push(Op::QrCode {
                    data: data.clone(),
                    module_size: opts.qr_module_size,
                    error_level: opts.qr_error_level,
                });
                program.push(Op::Newline);
                program.push(Op::SetAlign {
                    align: Alignment::Left,
                });
            }
            ReceiptLine::Raw(text) => push_fitted(&mut program, text, width),
        }
    }

    if opts.feed_lines > 0 {
        program.push(Op::Feed {
            lines: opts.feed_lines,
        });
    }
    match opts.cut {
        CutPolicy::Partial => program.push(Op::Cut { partial: true }),
        CutPolicy::Full => program.push(Op::Cut { partial: false }),
        CutPolicy::None => {}
    }
    program
}

fn push_line(program: &mut Program, text: &str) {
    if !text.is_empty() {
        program.push(Op::text(text));
    }
    program.push(Op::Newline);
}

/// Push `text` as is when it fits, wrapped otherwise.
fn push_fitted(program: &mut Program, text: &str, width: usize) {
    if width_of(text) <= width {
        push_line(program, text);
    } else {
        push_lines(program, wrap(text, width));
    }
}

fn push_lines(program: &mut Program, lines: Vec<String>) {
    for line in lines {
        push_line(program, &line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ItemRow, layout};
    use crate::protocol::barcode::qr;
    use pretty_assertions::assert_eq;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn sample() -> ReceiptDocument {
        ReceiptDocument::from_lines(vec![
            ReceiptLine::Header("LAUNDRY BERSIH".into()),
            ReceiptLine::Divider,
            ReceiptLine::KeyValue {
                label: "No".into(),
                value: "TRX-0001".into(),
            },
            ReceiptLine::ServiceRow(ItemRow {
                name: "Cuci".into(),
                unit: None,
                quantity: 2,
                subtotal: 20000,
                is_free: false,
            }),
            ReceiptLine::ServiceRow(ItemRow {
                name: "Cuci".into(),
                unit: None,
                quantity: 1,
                subtotal: 0,
                is_free: true,
            }),
            ReceiptLine::TotalRow {
                label: "TOTAL".into(),
                amount: 20000,
            },
            ReceiptLine::QrPayload("TRX-0001".into()),
            ReceiptLine::Centered("Terima kasih".into()),
        ])
    }

    #[test]
    fn test_stream_starts_with_init_and_code_table() {
        let bytes = encode(&sample(), PaperProfile::Narrow);
        assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x00]);
    }

    #[test]
    fn test_stream_ends_with_feed_and_partial_cut() {
        let bytes = encode(&sample(), PaperProfile::Narrow);
        assert!(bytes.ends_with(&[0x1B, 0x64, 0x04, 0x1D, 0x56, 0x01]));
    }

    #[test]
    fn test_cut_policy() {
        let doc = sample();
        let full = EncodeOptions {
            cut: CutPolicy::Full,
            ..Default::default()
        };
        assert!(encode_with(&doc, PaperProfile::Narrow, &full).ends_with(&[0x1D, 0x56, 0x00]));

        let none = EncodeOptions {
            cut: CutPolicy::None,
            feed_lines: 0,
            ..Default::default()
        };
        let bytes = encode_with(&doc, PaperProfile::Narrow, &none);
        assert_eq!(find(&bytes, &[0x1D, 0x56]), None);
        assert_eq!(find(&bytes, &[0x1B, 0x64]), None);
    }

    #[test]
    fn test_header_is_styled_then_restored() {
        let bytes = encode(&sample(), PaperProfile::Narrow);
        let title = find(&bytes, b"LAUNDRY BERSIH").unwrap();
        assert_eq!(
            &bytes[title - 9..title],
            &[0x1B, 0x61, 0x01, 0x1B, 0x45, 0x01, 0x1D, 0x21, 0x01]
        );
        let after = title + "LAUNDRY BERSIH".len();
        assert_eq!(
            &bytes[after..after + 10],
            &[0x0A, 0x1D, 0x21, 0x00, 0x1B, 0x45, 0x00, 0x1B, 0x61, 0x00]
        );
    }

    #[test]
    fn test_rows_are_right_aligned() {
        let bytes = encode(&sample(), PaperProfile::Narrow);
        let row = format!("Cuci x2{}Rp 20.000\n", " ".repeat(16));
        assert!(find(&bytes, row.as_bytes()).is_some());
        let free = format!("Cuci x1{}GRATIS\n", " ".repeat(19));
        assert!(find(&bytes, free.as_bytes()).is_some());
    }

    #[test]
    fn test_total_row_is_double_height() {
        let bytes = encode(&sample(), PaperProfile::Narrow);
        let total = find(&bytes, b"TOTAL").unwrap();
        assert_eq!(&bytes[total - 6..total], &[0x1B, 0x45, 0x01, 0x1D, 0x21, 0x01]);
    }

    #[test]
    fn test_qr_store_length_prefix() {
        let bytes = encode(&sample(), PaperProfile::Narrow);
        let store = find(&bytes, &[0x1D, 0x28, 0x6B, 11, 0x00, 0x31, 0x50, 0x30]).unwrap();
        assert_eq!(&bytes[store + 8..store + 16], b"TRX-0001");
        assert!(find(&bytes, &qr::print()).is_some());
    }

    #[test]
    fn test_qr_options_flow_through() {
        let opts = EncodeOptions {
            qr_module_size: 4,
            qr_error_level: QrErrorLevel::H,
            ..Default::default()
        };
        let bytes = encode_with(&sample(), PaperProfile::Narrow, &opts);
        assert!(find(&bytes, &qr::set_module_size(4)).is_some());
        assert!(find(&bytes, &qr::set_error_correction(QrErrorLevel::H)).is_some());
    }

    #[test]
    fn test_no_line_exceeds_paper_width() {
        let doc = ReceiptDocument::from_lines(vec![
            ReceiptLine::KeyValue {
                label: "Pelanggan".into(),
                value: "Ibu Siti Nurhaliza binti Abdullah Rahman".into(),
            },
            ReceiptLine::TotalRow {
                label: "TOTAL PEMBAYARAN TERMASUK PAJAK".into(),
                amount: 1_250_000,
            },
            ReceiptLine::ServiceRow(ItemRow {
                name: "Cuci Kering Setrika Express Bedcover Jumbo King Size".into(),
                unit: None,
                quantity: 12,
                subtotal: 1_440_000_000,
                is_free: false,
            }),
            ReceiptLine::ServiceRow(ItemRow {
                name: "Cuci Kering Setrika Express Bedcover Jumbo King Size".into(),
                unit: None,
                quantity: 1,
                subtotal: 0,
                is_free: true,
            }),
            ReceiptLine::ProductRow(ItemRow {
                name: "Pewangi Pakaian Premium Aroma Lavender Isi Ulang".into(),
                unit: Some("botol".into()),
                quantity: 3,
                subtotal: 987_654_321,
                is_free: false,
            }),
        ]);
        for profile in PaperProfile::ALL {
            let opts = EncodeOptions {
                cut: CutPolicy::None,
                feed_lines: 0,
                ..Default::default()
            };
            let program = lower(&doc, profile, &opts);
            let mut line = 0usize;
            for op in program.iter() {
                match op {
                    Op::Text { text } => line += layout::width_of(text),
                    Op::Newline => {
                        assert!(line <= profile.columns());
                        line = 0;
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let doc = sample();
        assert_eq!(
            encode(&doc, PaperProfile::Wide),
            encode(&doc, PaperProfile::Wide)
        );
    }

    #[test]
    fn test_paper_width_changes_layout() {
        let doc = sample();
        assert_ne!(
            encode(&doc, PaperProfile::Narrow),
            encode(&doc, PaperProfile::Wide)
        );
    }
}
