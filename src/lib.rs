//! # Nota - Laundry POS Receipt Printing
//!
//! Nota turns a completed laundry transaction into a printed receipt on a
//! cheap ESC/POS thermal printer over Bluetooth LE. It provides:
//!
//! - **Receipt builder**: reconciles free/paid quantities, groups rows,
//!   projects loyalty progress, lays text out for 58mm or 80mm paper
//! - **Protocol implementation**: ESC/POS command builders (text, QR, cut)
//! - **Transport**: BLE printer negotiation and chunked, paced streaming
//!
//! ## Quick Start
//!
//! ```
//! use nota::{document, printer::PaperProfile, receipt::PrintRequest};
//!
//! let request = PrintRequest::from_json(r#"{
//!     "transaction": {
//!         "code": "TRX-0001", "branch": "Laundry Bersih", "customer": "Budi",
//!         "payment_method": "cash", "total": 20000,
//!         "timestamp": "2026-10-16T09:30:00"
//!     },
//!     "services": [{ "name": "Cuci", "quantity": 2, "unit_price": 10000 }]
//! }"#)?;
//!
//! // Pure: request → document → bytes
//! let doc = document::build(&request, PaperProfile::Narrow)?;
//! let bytes = document::encode(&doc, PaperProfile::Narrow);
//!
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]); // ESC @
//! # Ok::<(), nota::NotaError>(())
//! ```
//!
//! Printing goes through a [`job::PrintJob`], which negotiates a printer
//! through a [`transport::BluetoothCapability`] while the receipt is built,
//! then streams it.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`receipt`] | Input records from the POS API |
//! | [`document`] | Receipt builder, layout, ESC/POS lowering |
//! | [`ir`] | Printer op IR, optimizer and codegen |
//! | [`preview`] | Plain-text rendering of the IR |
//! | [`protocol`] | ESC/POS command builders |
//! | [`transport`] | BLE negotiation, streaming, file fallback |
//! | [`job`] | End-to-end print orchestration |
//! | [`config`] | Store configuration |
//! | [`printer`] | Paper profiles |
//! | [`error`] | Error types |

pub mod config;
pub mod document;
pub mod error;
pub mod ir;
pub mod job;
pub mod logging;
pub mod preview;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod transport;

// Re-exports for convenience
pub use config::PrintConfig;
pub use error::NotaError;
pub use job::{PrintEvent, PrintJob, PrintReport};
pub use printer::PaperProfile;
