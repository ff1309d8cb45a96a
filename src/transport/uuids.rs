//! # Known GATT UUIDs
//!
//! Cheap BLE receipt printers don't agree on a service. These are the ones
//! seen in the field, in the order they are probed.
//!
//! | Service | UUID |
//! |---------|------|
//! | Printer service (0x18F0) | `000018f0-0000-1000-8000-00805f9b34fb` |
//! | Nordic UART | `6e400001-b5a3-f393-e0a9-e50e24dcca9e` |
//! | Serial (0xFFE0) | `0000ffe0-0000-1000-8000-00805f9b34fb` |
//! | ISSC transparent UART | `49535343-fe7d-4ae5-8fa9-9fafd205e455` |

use uuid::Uuid;

/// 16-bit SIG UUID expanded onto the Bluetooth base UUID.
pub const fn short_uuid(short: u16) -> Uuid {
    Uuid::from_u128(0x0000_0000_0000_1000_8000_0080_5f9b_34fb | ((short as u128) << 96))
}

pub const PRINTER_SERVICE: Uuid = short_uuid(0x18F0);
pub const NORDIC_UART_SERVICE: Uuid = Uuid::from_u128(0x6e40_0001_b5a3_f393_e0a9_e50e_24dc_ca9e);
pub const SERIAL_SERVICE: Uuid = short_uuid(0xFFE0);
pub const ISSC_UART_SERVICE: Uuid = Uuid::from_u128(0x4953_5343_fe7d_4ae5_8fa9_9faf_d205_e455);

/// Write characteristic of the 0x18F0 printer service.
pub const PRINTER_WRITE_CHARACTERISTIC: Uuid = short_uuid(0x2AF1);

/// Services in probe order; the first one the device exposes wins.
pub const KNOWN_SERVICES: [(Uuid, &str); 4] = [
    (PRINTER_SERVICE, "printer"),
    (NORDIC_UART_SERVICE, "nordic-uart"),
    (SERIAL_SERVICE, "serial"),
    (ISSC_UART_SERVICE, "issc-uart"),
];

/// Service UUIDs only, as passed to the device chooser.
pub fn known_service_uuids() -> Vec<Uuid> {
    KNOWN_SERVICES.iter().map(|(uuid, _)| *uuid).collect()
}

/// Short label for a known service, for logs.
pub fn service_label(uuid: Uuid) -> &'static str {
    KNOWN_SERVICES
        .iter()
        .find(|(u, _)| *u == uuid)
        .map(|(_, label)| *label)
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_uuids_expand() {
        assert_eq!(
            PRINTER_SERVICE.to_string(),
            "000018f0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            SERIAL_SERVICE.to_string(),
            "0000ffe0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            PRINTER_WRITE_CHARACTERISTIC.to_string(),
            "00002af1-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_vendor_uuids() {
        assert_eq!(
            NORDIC_UART_SERVICE.to_string(),
            "6e400001-b5a3-f393-e0a9-e50e24dcca9e"
        );
        assert_eq!(
            ISSC_UART_SERVICE.to_string(),
            "49535343-fe7d-4ae5-8fa9-9fafd205e455"
        );
    }

    #[test]
    fn test_probe_order() {
        assert_eq!(
            known_service_uuids(),
            vec![PRINTER_SERVICE, NORDIC_UART_SERVICE, SERIAL_SERVICE, ISSC_UART_SERVICE]
        );
        assert_eq!(service_label(SERIAL_SERVICE), "serial");
        assert_eq!(service_label(Uuid::nil()), "unknown");
    }
}
