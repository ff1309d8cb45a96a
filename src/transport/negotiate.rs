//! # Device Negotiator
//!
//! Turns "some BLE printer nearby" into a [`PrinterSession`] with a
//! writable characteristic:
//!
//! ```text
//! Idle → Scanning → Connecting → ProbingServices → ProbingCharacteristics → Ready
//!   └──────────┴───────────┴──────────────┴────────────────────┴──► Failed
//! ```
//!
//! Connection failures are surfaced immediately, never retried. Only the
//! device chooser is bounded by a timeout; everything after it relies on
//! the platform stack's own timeouts.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::capability::{BluetoothCapability, CapabilityError, CharacteristicInfo, DeviceInfo, GattLink};
use super::uuids::{self, KNOWN_SERVICES, PRINTER_WRITE_CHARACTERISTIC};
use super::{DeliveryChannel, WriteMode};
use crate::error::{NegotiationError, TransportError};

/// Negotiation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    Scanning,
    Connecting,
    ProbingServices,
    ProbingCharacteristics,
    Ready,
    Failed,
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::Scanning => "scanning",
            NegotiationState::Connecting => "connecting",
            NegotiationState::ProbingServices => "probing-services",
            NegotiationState::ProbingCharacteristics => "probing-characteristics",
            NegotiationState::Ready => "ready",
            NegotiationState::Failed => "failed",
        };
        f.write_str(s)
    }
}

type StateObserver = Box<dyn Fn(NegotiationState) + Send + Sync>;

/// Drives one negotiation against a [`BluetoothCapability`].
pub struct Negotiator {
    capability: Arc<dyn BluetoothCapability>,
    observer: Option<StateObserver>,
}

impl Negotiator {
    pub fn new(capability: Arc<dyn BluetoothCapability>) -> Self {
        Self {
            capability,
            observer: None,
        }
    }

    /// Report every state transition to `observer`.
    pub fn with_observer(mut self, observer: impl Fn(NegotiationState) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn enter(&self, state: NegotiationState) {
        tracing::debug!(%state, "negotiation state");
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }

    fn fail(&self, err: NegotiationError) -> NegotiationError {
        if err.is_user_cancelled() {
            tracing::info!("device selection cancelled by user");
        } else {
            tracing::warn!(error = %err, "negotiation failed");
        }
        self.enter(NegotiationState::Failed);
        err
    }

    /// Find, connect and resolve a printer. `timeout` bounds the device
    /// chooser only.
    pub async fn negotiate(&self, timeout: Duration) -> Result<PrinterSession, NegotiationError> {
        self.enter(NegotiationState::Idle);

        self.enter(NegotiationState::Scanning);
        let services = uuids::known_service_uuids();
        let device = match tokio::time::timeout(timeout, self.capability.request_device(&services)).await
        {
            Err(_) => return Err(self.fail(NegotiationError::DiscoveryTimeout(timeout))),
            Ok(Err(CapabilityError::Unavailable(reason))) => {
                return Err(self.fail(NegotiationError::UnsupportedPlatform(reason)));
            }
            Ok(Err(CapabilityError::Cancelled)) => {
                return Err(self.fail(NegotiationError::UserCancelled));
            }
            Ok(Err(CapabilityError::Failed(reason))) => {
                return Err(self.fail(NegotiationError::ConnectionFailed(reason)));
            }
            Ok(Ok(device)) => device,
        };
        tracing::info!(device = device.display_name(), id = %device.id, "device selected");

        self.enter(NegotiationState::Connecting);
        let link = match self.capability.connect(&device).await {
            Ok(link) => link,
            Err(CapabilityError::Unavailable(reason)) => {
                return Err(self.fail(NegotiationError::UnsupportedPlatform(reason)));
            }
            Err(err) => return Err(self.fail(NegotiationError::ConnectionFailed(err.to_string()))),
        };

        let resolved = self.resolve(link.as_ref()).await;
        match resolved {
            Ok((service, characteristic)) => {
                let write_mode = if characteristic.properties.write_without_response {
                    WriteMode::WithoutResponse
                } else {
                    WriteMode::WithResponse
                };
                let session = PrinterSession {
                    max_write_len: link.max_write_len(),
                    link,
                    device,
                    service,
                    characteristic: characteristic.uuid,
                    write_mode,
                };
                tracing::info!(
                    device = session.device.display_name(),
                    service = %session.service,
                    characteristic = %session.characteristic,
                    write_mode = ?session.write_mode,
                    "printer ready"
                );
                self.enter(NegotiationState::Ready);
                Ok(session)
            }
            Err(err) => {
                link.disconnect().await;
                Err(self.fail(err))
            }
        }
    }

    async fn resolve(
        &self,
        link: &dyn GattLink,
    ) -> Result<(Uuid, CharacteristicInfo), NegotiationError> {
        self.enter(NegotiationState::ProbingServices);
        let service = find_service(link).await?;

        self.enter(NegotiationState::ProbingCharacteristics);
        let characteristics = link
            .characteristics(service)
            .await
            .map_err(|e| NegotiationError::ConnectionFailed(e.to_string()))?;
        let characteristic = pick_characteristic(&characteristics)
            .ok_or(NegotiationError::NoWritableCharacteristic(service))?;
        Ok((service, characteristic.clone()))
    }
}

/// First known service the device resolves, in table order.
async fn find_service(link: &dyn GattLink) -> Result<Uuid, NegotiationError> {
    for (uuid, label) in KNOWN_SERVICES {
        match link.has_service(uuid).await {
            Ok(true) => {
                tracing::debug!(service = label, %uuid, "service resolved");
                return Ok(uuid);
            }
            Ok(false) => tracing::trace!(service = label, "service not present"),
            // A probe error only rules out this candidate
            Err(err) => tracing::debug!(service = label, error = %err, "service probe failed"),
        }
    }
    Err(NegotiationError::NoMatchingService)
}

/// The dedicated printer characteristic if writable, otherwise the first
/// writable one.
fn pick_characteristic(characteristics: &[CharacteristicInfo]) -> Option<&CharacteristicInfo> {
    characteristics
        .iter()
        .find(|c| c.uuid == PRINTER_WRITE_CHARACTERISTIC && c.properties.is_writable())
        .or_else(|| characteristics.iter().find(|c| c.properties.is_writable()))
}

/// A negotiated printer: link plus the resolved write target.
pub struct PrinterSession {
    link: Box<dyn GattLink>,
    device: DeviceInfo,
    service: Uuid,
    characteristic: Uuid,
    max_write_len: Option<usize>,
    write_mode: WriteMode,
}

impl fmt::Debug for PrinterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterSession")
            .field("device", &self.device)
            .field("service", &self.service)
            .field("characteristic", &self.characteristic)
            .field("max_write_len", &self.max_write_len)
            .field("write_mode", &self.write_mode)
            .finish_non_exhaustive()
    }
}

impl PrinterSession {
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn service(&self) -> Uuid {
        self.service
    }

    pub fn characteristic(&self) -> Uuid {
        self.characteristic
    }

    pub fn max_write_len(&self) -> Option<usize> {
        self.max_write_len
    }
}

#[async_trait]
impl DeliveryChannel for PrinterSession {
    fn describe(&self) -> String {
        format!("{} ({})", self.device.display_name(), uuids::service_label(self.service))
    }

    fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn max_chunk_len(&self) -> Option<usize> {
        self.max_write_len
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), TransportError> {
        self.link
            .write(self.service, self.characteristic, chunk, self.write_mode)
            .await
    }

    async fn release(&mut self) {
        tracing::debug!(device = self.device.display_name(), "releasing printer session");
        self.link.disconnect().await;
    }
}
