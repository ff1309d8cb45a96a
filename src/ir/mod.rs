//! # Intermediate Representation (IR)
//!
//! The IR is a "bytecode" representation that sits between a
//! [`ReceiptDocument`](crate::document::ReceiptDocument) and raw ESC/POS
//! bytes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────┐     ┌──────────┐
//! │  Document   │ ──► │     IR      │ ──► │ Optimizer │ ──► │ Codegen  │
//! │  (lines)    │     │  (Vec<Op>)  │     │           │     │ (bytes)  │
//! └─────────────┘     └─────────────┘     └───────────┘     └──────────┘
//! ```
//!
//! The same program feeds [`preview::render_text`](crate::preview::render_text),
//! so what the preview shows is what the printer gets.
//!
//! ## Example
//!
//! ```
//! use nota::ir::{Op, Program};
//! use nota::protocol::text::Alignment;
//!
//! let mut program = Program::with_init();
//! program.push(Op::SetAlign { align: Alignment::Center });
//! program.push(Op::SetBold { on: true });
//! program.push(Op::text("HELLO"));
//! program.push(Op::Newline);
//! program.push(Op::Cut { partial: true });
//!
//! let bytes = program.optimize().to_bytes();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod codegen;
mod ops;
mod optimize;

// Re-export the ops types (codegen and optimize add methods to Program via impl)
pub use ops::*;
