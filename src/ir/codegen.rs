//! # Code Generation
//!
//! Converts IR programs to ESC/POS bytes.

use super::ops::{Op, Program};
use crate::protocol::barcode::qr;
use crate::protocol::{commands, cp437, text};

impl Program {
    /// Compile the IR program to ESC/POS bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for op in &self.ops {
            match op {
                // ===== Printer Control =====
                Op::Init => out.extend(commands::init()),
                Op::SetCodeTable { table } => out.extend(commands::code_table(*table)),
                Op::Feed { lines } => out.extend(commands::feed_lines(*lines)),
                Op::Cut { partial } => {
                    if *partial {
                        out.extend(commands::cut_partial());
                    } else {
                        out.extend(commands::cut_full());
                    }
                }

                // ===== Style Changes =====
                Op::SetAlign { align } => out.extend(text::align(*align)),
                Op::SetBold { on } => {
                    if *on {
                        out.extend(text::bold_on());
                    } else {
                        out.extend(text::bold_off());
                    }
                }
                Op::SetDoubleHeight { on } => {
                    if *on {
                        out.extend(text::double_height_on());
                    } else {
                        out.extend(text::double_height_off());
                    }
                }

                // ===== Content =====
                Op::Text { text } => out.extend(cp437::encode(text)),
                Op::Newline => out.push(commands::LF),

                // ===== Barcodes =====
                Op::QrCode {
                    data,
                    module_size,
                    error_level,
                } => out.extend(qr::generate(data.as_bytes(), *module_size, *error_level)),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::barcode::qr::QrErrorLevel;
    use crate::protocol::text::Alignment;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_program() {
        assert!(Program::new().to_bytes().is_empty());
    }

    #[test]
    fn test_init_only() {
        assert_eq!(Program::with_init().to_bytes(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_simple_text() {
        let mut program = Program::with_init();
        program.push(Op::text("Hello"));
        program.push(Op::Newline);

        let bytes = program.to_bytes();
        assert!(bytes.starts_with(&[0x1B, 0x40]));
        assert!(bytes.ends_with(b"Hello\n"));
    }

    #[test]
    fn test_text_uses_code_page() {
        let mut program = Program::new();
        program.push(Op::text("é"));
        assert_eq!(program.to_bytes(), vec![0x82]);
    }

    #[test]
    fn test_styles() {
        let program: Program = vec![
            Op::SetAlign { align: Alignment::Center },
            Op::SetBold { on: true },
            Op::SetDoubleHeight { on: true },
            Op::SetDoubleHeight { on: false },
            Op::SetBold { on: false },
            Op::SetAlign { align: Alignment::Left },
        ]
        .into_iter()
        .collect();
        assert_eq!(
            program.to_bytes(),
            vec![
                0x1B, 0x61, 0x01, // center
                0x1B, 0x45, 0x01, // bold
                0x1D, 0x21, 0x01, // double height
                0x1D, 0x21, 0x00, // normal size
                0x1B, 0x45, 0x00, // bold off
                0x1B, 0x61, 0x00, // left
            ]
        );
    }

    #[test]
    fn test_feed_and_cuts() {
        let program: Program = vec![
            Op::SetCodeTable { table: 0 },
            Op::Feed { lines: 4 },
            Op::Cut { partial: true },
            Op::Cut { partial: false },
        ]
        .into_iter()
        .collect();
        assert_eq!(
            program.to_bytes(),
            vec![0x1B, 0x74, 0x00, 0x1B, 0x64, 0x04, 0x1D, 0x56, 0x01, 0x1D, 0x56, 0x00]
        );
    }

    #[test]
    fn test_qr_code() {
        let mut program = Program::new();
        program.push(Op::QrCode {
            data: "TRX-1".into(),
            module_size: 6,
            error_level: QrErrorLevel::M,
        });
        assert_eq!(program.to_bytes(), qr::generate(b"TRX-1", 6, QrErrorLevel::M));
    }
}
