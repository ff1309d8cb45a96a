//! # Platform Bluetooth Capability
//!
//! The negotiator never touches a Bluetooth stack directly. It talks to a
//! [`BluetoothCapability`] (device chooser + connect) and the
//! [`GattLink`] it hands back. The btleplug backend implements both; tests
//! use in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::WriteMode;
use crate::error::TransportError;

/// A device the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Platform identifier (MAC address on Linux/Windows).
    pub id: String,
    pub name: Option<String>,
}

impl DeviceInfo {
    /// Name if advertised, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Write-related characteristic properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharProperties {
    pub write: bool,
    pub write_without_response: bool,
}

impl CharProperties {
    pub fn is_writable(&self) -> bool {
        self.write || self.write_without_response
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicInfo {
    pub uuid: Uuid,
    pub properties: CharProperties,
}

/// Errors reported by a capability implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// No usable Bluetooth LE stack or adapter.
    #[error("Bluetooth LE unavailable: {0}")]
    Unavailable(String),

    /// The user dismissed the chooser.
    #[error("Cancelled by user")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

/// Device chooser and connector.
#[async_trait]
pub trait BluetoothCapability: Send + Sync {
    /// Let the user choose a device. Any device may be picked; `services`
    /// are declared so they can be accessed after connecting.
    ///
    /// May wait indefinitely; callers bound it with a timeout.
    async fn request_device(&self, services: &[Uuid]) -> Result<DeviceInfo, CapabilityError>;

    /// Open a GATT connection to a chosen device.
    async fn connect(&self, device: &DeviceInfo) -> Result<Box<dyn GattLink>, CapabilityError>;
}

/// An open GATT connection.
#[async_trait]
pub trait GattLink: Send + Sync {
    /// Whether the device exposes `service` as a primary service.
    async fn has_service(&self, service: Uuid) -> Result<bool, CapabilityError>;

    /// Characteristics of `service`, in the order the device reports them.
    async fn characteristics(&self, service: Uuid)
    -> Result<Vec<CharacteristicInfo>, CapabilityError>;

    /// Largest payload one write may carry, if the platform knows it.
    fn max_write_len(&self) -> Option<usize> {
        None
    }

    async fn write(
        &self,
        service: Uuid,
        characteristic: Uuid,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError>;

    /// Best-effort disconnect. Never fails.
    async fn disconnect(&self);
}

/// Capability for hosts built without a Bluetooth backend.
#[derive(Debug, Clone, Default)]
pub struct Unsupported {
    reason: String,
}

impl Unsupported {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl BluetoothCapability for Unsupported {
    async fn request_device(&self, _services: &[Uuid]) -> Result<DeviceInfo, CapabilityError> {
        Err(CapabilityError::Unavailable(self.reason.clone()))
    }

    async fn connect(&self, _device: &DeviceInfo) -> Result<Box<dyn GattLink>, CapabilityError> {
        Err(CapabilityError::Unavailable(self.reason.clone()))
    }
}
