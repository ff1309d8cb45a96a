//! # btleplug Backend
//!
//! [`BluetoothCapability`] over the host Bluetooth stack (BlueZ, CoreBluetooth,
//! WinRT) via `btleplug`.
//!
//! There is no system device chooser on a headless host, so the chooser is
//! a scan that picks the first device matching a [`DeviceSelector`]. The
//! scan itself is unfiltered; filtering happens on advertisement data.

use std::collections::HashMap;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::sync::{Mutex, OnceCell};
use uuid::Uuid;

use super::WriteMode;
use super::capability::{
    BluetoothCapability, CapabilityError, CharProperties, CharacteristicInfo, DeviceInfo, GattLink,
};
use crate::error::TransportError;

/// Which scanned device the chooser settles on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// First device advertising one of the requested services.
    #[default]
    First,
    /// First device whose name contains this (case-insensitive).
    Name(String),
    /// Device with this address (`AA:BB:CC:DD:EE:FF`, case-insensitive).
    Address(String),
}

impl DeviceSelector {
    fn matches(&self, name: Option<&str>, address: &str, advertised: &[Uuid], wanted: &[Uuid]) -> bool {
        match self {
            DeviceSelector::First => advertised.iter().any(|u| wanted.contains(u)),
            DeviceSelector::Name(needle) => name
                .map(|n| n.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            DeviceSelector::Address(addr) => address.eq_ignore_ascii_case(addr),
        }
    }
}

fn unavailable(e: btleplug::Error) -> CapabilityError {
    CapabilityError::Unavailable(e.to_string())
}

fn failed(e: btleplug::Error) -> CapabilityError {
    CapabilityError::Failed(e.to_string())
}

/// btleplug-backed capability. Adapter lookup is lazy so a missing stack
/// surfaces as [`CapabilityError::Unavailable`] during negotiation.
pub struct BtleCapability {
    selector: DeviceSelector,
    adapter: OnceCell<Adapter>,
    seen: Mutex<HashMap<String, Peripheral>>,
}

impl BtleCapability {
    pub fn new(selector: DeviceSelector) -> Self {
        Self {
            selector,
            adapter: OnceCell::new(),
            seen: Mutex::new(HashMap::new()),
        }
    }

    async fn adapter(&self) -> Result<&Adapter, CapabilityError> {
        self.adapter
            .get_or_try_init(|| async {
                let manager = Manager::new().await.map_err(unavailable)?;
                let adapters = manager.adapters().await.map_err(unavailable)?;
                let adapter = adapters
                    .into_iter()
                    .next()
                    .ok_or_else(|| CapabilityError::Unavailable("no Bluetooth adapter found".into()))?;
                match adapter.adapter_info().await {
                    Ok(info) => tracing::debug!(adapter = %info, "using Bluetooth adapter"),
                    Err(e) => tracing::debug!(error = %e, "adapter info unavailable"),
                }
                Ok::<_, CapabilityError>(adapter)
            })
            .await
    }
}

#[async_trait]
impl BluetoothCapability for BtleCapability {
    async fn request_device(&self, services: &[Uuid]) -> Result<DeviceInfo, CapabilityError> {
        let adapter = self.adapter().await?;
        let mut events = adapter.events().await.map_err(failed)?;
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(failed)?;
        let scan = ScanGuard::new(adapter.clone());
        tracing::info!(selector = ?self.selector, "scanning for printers");

        let mut chosen = None;
        while let Some(event) = events.next().await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                _ => continue,
            };
            let Ok(peripheral) = adapter.peripheral(&id).await else {
                continue;
            };
            let Ok(Some(props)) = peripheral.properties().await else {
                continue;
            };
            let address = props.address.to_string();
            tracing::trace!(%address, name = ?props.local_name, "advertisement");

            if self
                .selector
                .matches(props.local_name.as_deref(), &address, &props.services, services)
            {
                let device = DeviceInfo {
                    id: address.clone(),
                    name: props.local_name.clone(),
                };
                self.seen.lock().await.insert(address, peripheral);
                chosen = Some(device);
                break;
            }
        }

        scan.stop().await;
        chosen.ok_or_else(|| CapabilityError::Failed("scan ended without a matching device".into()))
    }

    async fn connect(&self, device: &DeviceInfo) -> Result<Box<dyn GattLink>, CapabilityError> {
        let peripheral = self
            .seen
            .lock()
            .await
            .get(&device.id)
            .cloned()
            .ok_or_else(|| CapabilityError::Failed(format!("unknown device {}", device.id)))?;

        peripheral.connect().await.map_err(failed)?;
        if let Err(e) = peripheral.discover_services().await {
            let _ = peripheral.disconnect().await;
            return Err(failed(e));
        }
        tracing::debug!(
            device = device.display_name(),
            services = peripheral.services().len(),
            "connected"
        );
        Ok(Box::new(BtleLink { peripheral }))
    }
}

/// Something that can stop its own scan.
trait ActiveScan: Send + 'static {
    fn halt(self) -> impl Future<Output = ()> + Send;
}

impl ActiveScan for Adapter {
    async fn halt(self) {
        match self.stop_scan().await {
            Ok(()) => tracing::debug!("scan stopped"),
            Err(e) => tracing::debug!(error = %e, "stop_scan failed"),
        }
    }
}

/// Stops an active scan. The negotiator drops `request_device` on timeout,
/// so the stop has to run from `Drop` too.
struct ScanGuard<S: ActiveScan> {
    scan: Option<S>,
}

impl<S: ActiveScan> ScanGuard<S> {
    fn new(scan: S) -> Self {
        Self { scan: Some(scan) }
    }

    async fn stop(mut self) {
        if let Some(scan) = self.scan.take() {
            scan.halt().await;
        }
    }
}

impl<S: ActiveScan> Drop for ScanGuard<S> {
    fn drop(&mut self) {
        let Some(scan) = self.scan.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(scan.halt());
            }
            Err(_) => tracing::warn!("scan abandoned outside a runtime; adapter may keep scanning"),
        }
    }
}

struct BtleLink {
    peripheral: Peripheral,
}

impl BtleLink {
    fn find_characteristic(&self, service: Uuid, uuid: Uuid) -> Option<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.service_uuid == service && c.uuid == uuid)
    }
}

#[async_trait]
impl GattLink for BtleLink {
    async fn has_service(&self, service: Uuid) -> Result<bool, CapabilityError> {
        Ok(self
            .peripheral
            .services()
            .iter()
            .any(|s| s.primary && s.uuid == service))
    }

    async fn characteristics(&self, service: Uuid) -> Result<Vec<CharacteristicInfo>, CapabilityError> {
        let services = self.peripheral.services();
        let Some(found) = services.iter().find(|s| s.uuid == service) else {
            return Ok(Vec::new());
        };
        Ok(found
            .characteristics
            .iter()
            .map(|c| CharacteristicInfo {
                uuid: c.uuid,
                properties: CharProperties {
                    write: c.properties.contains(CharPropFlags::WRITE),
                    write_without_response: c
                        .properties
                        .contains(CharPropFlags::WRITE_WITHOUT_RESPONSE),
                },
            })
            .collect())
    }

    async fn write(
        &self,
        service: Uuid,
        characteristic: Uuid,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<(), TransportError> {
        let target = self
            .find_characteristic(service, characteristic)
            .ok_or(TransportError::Disconnected)?;
        let write_type = match mode {
            WriteMode::WithResponse => WriteType::WithResponse,
            WriteMode::WithoutResponse => WriteType::WithoutResponse,
        };
        self.peripheral
            .write(&target, data, write_type)
            .await
            .map_err(|e| match e {
                btleplug::Error::NotConnected => TransportError::Disconnected,
                other => TransportError::Write(other.to_string()),
            })
    }

    async fn disconnect(&self) {
        if let Err(e) = self.peripheral.disconnect().await {
            tracing::debug!(error = %e, "disconnect failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::uuids;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_selector_first_needs_known_service() {
        let wanted = uuids::known_service_uuids();
        let sel = DeviceSelector::First;
        assert!(sel.matches(None, "AA", &[uuids::SERIAL_SERVICE], &wanted));
        assert!(!sel.matches(Some("Phone"), "AA", &[Uuid::from_u128(9)], &wanted));
    }

    #[derive(Clone)]
    struct FakeScan(Arc<AtomicUsize>);

    impl ActiveScan for FakeScan {
        async fn halt(self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_scan_stopped_when_discovery_times_out() {
        let stops = Arc::new(AtomicUsize::new(0));
        let scan = FakeScan(stops.clone());
        let discovery = async move {
            let _guard = ScanGuard::new(scan);
            std::future::pending::<()>().await;
        };

        let result = tokio::time::timeout(Duration::from_millis(20), discovery).await;
        assert!(result.is_err());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scan_stopped_once_on_success() {
        let stops = Arc::new(AtomicUsize::new(0));
        ScanGuard::new(FakeScan(stops.clone())).stop().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_selector_by_name_and_address() {
        let sel = DeviceSelector::Name("rpp02".into());
        assert!(sel.matches(Some("RPP02N-1234"), "AA", &[], &[]));
        assert!(!sel.matches(None, "AA", &[], &[]));

        let sel = DeviceSelector::Address("aa:bb:cc:dd:ee:ff".into());
        assert!(sel.matches(None, "AA:BB:CC:DD:EE:FF", &[], &[]));
    }
}
