//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS dialect spoken by BLE thermal
//! receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, code table, feed, cut)
//! - [`text`]: Text styling (alignment, bold, character size)
//! - [`barcode`]: QR code block commands
//! - [`cp437`]: Single-byte text encoding
//!
//! ## Usage Example
//!
//! ```
//! use nota::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align_center());
//! data.extend(text::double_height_on());
//! data.extend(b"LAUNDRY\n");
//! data.extend(text::double_height_off());
//! data.extend(text::align_left());
//! data.extend(commands::feed_lines(3));
//! data.extend(commands::cut_partial());
//! ```

pub mod barcode;
pub mod commands;
pub mod cp437;
pub mod text;
