//! # Printer Module
//!
//! Printer-side facts the layout depends on.
//!
//! ## Modules
//!
//! - [`config`]: Paper profiles and their column widths

pub mod config;

pub use config::PaperProfile;
