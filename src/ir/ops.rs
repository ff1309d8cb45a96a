//! # IR Opcodes
//!
//! The IR is a sequence of opcodes that can be inspected, optimized, and
//! compiled to ESC/POS bytes:
//!
//! ```text
//! ReceiptDocument → IR (inspectable) → Optimizer → Codegen → Bytes
//! ```
//!
//! Each opcode is a single, atomic operation. Style changes are individual
//! ops (not combined) so the optimizer can drop the ones that change nothing.

use serde::{Deserialize, Serialize};

use crate::protocol::barcode::qr::QrErrorLevel;
use crate::protocol::text::Alignment;

/// Text formatting state, tracked by the optimizer and the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleState {
    pub alignment: Alignment,
    pub bold: bool,
    pub double_height: bool,
}

/// IR opcodes: the "bytecode" for receipt printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    // ========== Printer Control ==========
    /// Initialize printer (ESC @). Resets to default state.
    Init,

    /// Select character code table (ESC t n).
    SetCodeTable { table: u8 },

    /// Feed `lines` blank lines (ESC d n).
    Feed { lines: u8 },

    /// Cut paper. `partial: true` leaves a small hinge.
    Cut { partial: bool },

    // ========== Style Changes ==========
    SetAlign { align: Alignment },
    SetBold { on: bool },
    /// Double-height characters (GS ! 0x01 / 0x00).
    SetDoubleHeight { on: bool },

    // ========== Content ==========
    /// Text without trailing newline. Encoded to the code page at codegen.
    Text { text: String },

    /// Line feed.
    Newline,

    // ========== Barcodes ==========
    QrCode {
        data: String,
        module_size: u8,
        error_level: QrErrorLevel,
    },
}

impl Op {
    pub fn text(s: impl Into<String>) -> Self {
        Op::Text { text: s.into() }
    }

    /// Whether this op changes [`StyleState`].
    pub fn is_style(&self) -> bool {
        matches!(
            self,
            Op::SetAlign { .. } | Op::SetBold { .. } | Op::SetDoubleHeight { .. }
        )
    }
}

/// A compiled IR program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Create a program with an initial Init op.
    pub fn with_init() -> Self {
        Self {
            ops: vec![Op::Init],
        }
    }

    /// Add an op to the program.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
