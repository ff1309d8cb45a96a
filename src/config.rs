//! # Print Configuration
//!
//! Per-store settings, loaded from a JSON file. Every field has a default,
//! so an empty object (or no file at all) is a valid configuration.
//!
//! ```
//! use nota::config::PrintConfig;
//! use nota::printer::PaperProfile;
//!
//! let config = PrintConfig::from_json(r#"{ "paper": "80mm", "chunk_size": 64 }"#).unwrap();
//! assert_eq!(config.paper, PaperProfile::Wide);
//! assert_eq!(config.stream_options().chunk_size, 64);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::{CutPolicy, EncodeOptions, ReceiptOptions};
use crate::error::NotaError;
use crate::printer::PaperProfile;
use crate::protocol::barcode::qr::QrErrorLevel;
use crate::transport::StreamOptions;
use crate::transport::stream::{DEFAULT_CHUNK_SIZE, DEFAULT_PACING_MS};

/// Largest chunk a single BLE write can carry (ATT MTU 517 minus header).
pub const MAX_CHUNK_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub paper: PaperProfile,

    // Transport
    pub chunk_size: usize,
    pub pacing_ms: u64,
    pub scan_timeout_secs: u64,

    // Encoder
    pub cut: CutPolicy,
    pub feed_lines: u8,
    pub qr_module_size: u8,
    pub qr_error_level: QrErrorLevel,

    // Receipt content
    /// Address, phone, ... printed under the branch name.
    pub store_lines: Vec<String>,
    pub footer_lines: Vec<String>,
    /// `{code}` is replaced by the transaction code. Empty disables the QR.
    pub qr_template: String,
    pub show_loyalty: bool,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        let receipt = ReceiptOptions::default();
        let encode = EncodeOptions::default();
        Self {
            paper: PaperProfile::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            pacing_ms: DEFAULT_PACING_MS,
            scan_timeout_secs: 30,
            cut: encode.cut,
            feed_lines: encode.feed_lines,
            qr_module_size: encode.qr_module_size,
            qr_error_level: encode.qr_error_level,
            store_lines: receipt.store_lines,
            footer_lines: receipt.footer_lines,
            qr_template: receipt.qr_template.unwrap_or_default(),
            show_loyalty: receipt.show_loyalty,
            log_level: "info".into(),
        }
    }
}

impl PrintConfig {
    pub fn from_json(json: &str) -> Result<Self, NotaError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NotaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NotaError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, NotaError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), NotaError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(NotaError::Config(format!(
                "chunk_size must be between 1 and {}, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.scan_timeout_secs == 0 {
            return Err(NotaError::Config("scan_timeout_secs must be positive".into()));
        }
        if !(1..=16).contains(&self.qr_module_size) {
            return Err(NotaError::Config(format!(
                "qr_module_size must be between 1 and 16, got {}",
                self.qr_module_size
            )));
        }
        Ok(())
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn receipt_options(&self) -> ReceiptOptions {
        ReceiptOptions {
            store_lines: self.store_lines.clone(),
            footer_lines: self.footer_lines.clone(),
            qr_template: (!self.qr_template.is_empty()).then(|| self.qr_template.clone()),
            show_loyalty: self.show_loyalty,
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            cut: self.cut,
            feed_lines: self.feed_lines,
            qr_module_size: self.qr_module_size,
            qr_error_level: self.qr_error_level,
        }
    }

    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            chunk_size: self.chunk_size,
            pacing: Duration::from_millis(self.pacing_ms),
        }
    }
}
