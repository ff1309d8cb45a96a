//! # Printer Transport Layer
//!
//! Getting encoded bytes onto paper:
//!
//! - [`negotiate`]: find a BLE printer, resolve a writable characteristic
//! - [`stream`]: write the byte stream in small, strictly ordered chunks
//! - [`file`]: save-as-file fallback channel
//! - `btle`: btleplug backend for [`capability`] (feature `ble`)
//!
//! ```text
//! BluetoothCapability ──Negotiator──► PrinterSession ─┐
//!                                                     ├─► Streamer
//!                                       FileChannel ──┘
//! ```

use async_trait::async_trait;

use crate::error::TransportError;

#[cfg(feature = "ble")]
pub mod btle;
pub mod capability;
pub mod file;
pub mod negotiate;
pub mod stream;
pub mod uuids;

pub use capability::{
    BluetoothCapability, CapabilityError, CharProperties, CharacteristicInfo, DeviceInfo, GattLink,
    Unsupported,
};
pub use file::FileChannel;
pub use negotiate::{NegotiationState, Negotiator, PrinterSession};
pub use stream::{StreamOptions, StreamResult, Streamer};

/// How a chunk write completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The write returns once the device acknowledged it.
    WithResponse,
    /// Fire and forget; the streamer paces writes with a fixed delay.
    WithoutResponse,
}

/// Somewhere encoded receipt bytes can be delivered to, one chunk at a time.
#[async_trait]
pub trait DeliveryChannel: Send {
    /// Human-readable target, for logs and reports.
    fn describe(&self) -> String;

    fn write_mode(&self) -> WriteMode;

    /// Largest chunk this channel accepts, if limited.
    fn max_chunk_len(&self) -> Option<usize> {
        None
    }

    /// Write one chunk. Must not return before the chunk is handed off.
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), TransportError>;

    /// Best-effort teardown. Never fails.
    async fn release(&mut self);
}
