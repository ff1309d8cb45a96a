//! # ESC/POS QR Code Commands
//!
//! QR codes are generated in a multi-step process, all through the
//! `GS ( k pL pH cn fn [params]` function family with `cn = 49` ('1'):
//!
//! 1. Select the model (fn 65)
//! 2. Set the module size (fn 67)
//! 3. Set the error correction level (fn 69)
//! 4. Store the data in the symbol buffer (fn 80)
//! 5. Print the stored symbol (fn 81)
//!
//! ```
//! use nota::protocol::barcode::qr;
//!
//! let mut data = Vec::new();
//! data.extend(qr::set_model(qr::QrModel::Model2));
//! data.extend(qr::set_module_size(6));
//! data.extend(qr::set_error_correction(qr::QrErrorLevel::M));
//! data.extend(qr::store_data(b"NOTA-0001"));
//! data.extend(qr::print());
//! ```

use super::commands::GS;

/// QR Code command builders
pub mod qr {
    use super::GS;
    use crate::protocol::commands::u16_le;
    use serde::{Deserialize, Serialize};

    /// `cn` byte selecting the QR symbol family.
    const CN_QR: u8 = 49;

    /// Bytes counted by `pL pH` in addition to the payload: `cn fn m`.
    pub const STORE_HEADER_LEN: usize = 3;

    /// QR Code model selection
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum QrModel {
        /// Original QR Code
        Model1 = 49,
        /// Enhanced QR Code (recommended)
        #[default]
        Model2 = 50,
    }

    /// QR Code error correction level
    ///
    /// | Level | Recovery |
    /// |-------|----------|
    /// | L | ~7% |
    /// | M | ~15% |
    /// | Q | ~25% |
    /// | H | ~30% |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum QrErrorLevel {
        L = 48,
        #[default]
        M = 49,
        Q = 50,
        H = 51,
    }

    /// # Select QR Model (GS ( k 04 00 31 41 n 00)
    pub fn set_model(model: QrModel) -> Vec<u8> {
        vec![GS, b'(', b'k', 4, 0, CN_QR, 65, model as u8, 0]
    }

    /// # Set Module Size (GS ( k 03 00 31 43 n)
    ///
    /// `n` is the module edge in dots, clamped to 1-16.
    pub fn set_module_size(size: u8) -> Vec<u8> {
        vec![GS, b'(', b'k', 3, 0, CN_QR, 67, size.clamp(1, 16)]
    }

    /// # Set Error Correction Level (GS ( k 03 00 31 45 n)
    pub fn set_error_correction(level: QrErrorLevel) -> Vec<u8> {
        vec![GS, b'(', b'k', 3, 0, CN_QR, 69, level as u8]
    }

    /// # Store Symbol Data (GS ( k pL pH 31 50 30 d1...dk)
    ///
    /// `pL pH` is the little-endian length of everything after it:
    /// the payload plus the three `cn fn m` bytes, i.e. `len + 3`.
    /// Payloads longer than the 16-bit frame allows are truncated.
    pub fn store_data(data: &[u8]) -> Vec<u8> {
        let max_payload = u16::MAX as usize - STORE_HEADER_LEN;
        let data = &data[..data.len().min(max_payload)];
        let len = (data.len() + STORE_HEADER_LEN) as u16;

        let mut cmd = Vec::with_capacity(8 + data.len());
        cmd.extend([GS, b'(', b'k']);
        cmd.extend(u16_le(len));
        cmd.extend([CN_QR, 80, 48]);
        cmd.extend_from_slice(data);
        cmd
    }

    /// # Print Stored Symbol (GS ( k 03 00 31 51 30)
    pub fn print() -> Vec<u8> {
        vec![GS, b'(', b'k', 3, 0, CN_QR, 81, 48]
    }

    /// Complete QR sequence: model 2, module size, error level, store, print.
    pub fn generate(data: &[u8], module_size: u8, error_level: QrErrorLevel) -> Vec<u8> {
        let mut cmd = Vec::new();
        cmd.extend(set_model(QrModel::Model2));
        cmd.extend(set_module_size(module_size));
        cmd.extend(set_error_correction(error_level));
        cmd.extend(store_data(data));
        cmd.extend(print());
        cmd
    }

    /// Read back the `pL pH` length of a store command.
    pub fn framed_len(store_cmd: &[u8]) -> Option<usize> {
        match store_cmd {
            [0x1D, b'(', b'k', lo, hi, CN_QR, 80, 48, ..] => {
                Some(u16::from_le_bytes([*lo, *hi]) as usize)
            }
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod qr_tests {
        use super::qr::*;

        #[test]
        fn test_set_model() {
            assert_eq!(
                set_model(QrModel::Model2),
                vec![0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]
            );
            assert_eq!(set_model(QrModel::Model1)[7], 0x31);
        }

        #[test]
        fn test_set_module_size() {
            assert_eq!(
                set_module_size(6),
                vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, 0x06]
            );
            assert_eq!(set_module_size(0)[7], 1);
            assert_eq!(set_module_size(40)[7], 16);
        }

        #[test]
        fn test_set_error_correction() {
            assert_eq!(
                set_error_correction(QrErrorLevel::L),
                vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x30]
            );
            assert_eq!(set_error_correction(QrErrorLevel::M)[7], 0x31);
            assert_eq!(set_error_correction(QrErrorLevel::Q)[7], 0x32);
            assert_eq!(set_error_correction(QrErrorLevel::H)[7], 0x33);
        }

        #[test]
        fn test_store_data_header() {
            let cmd = store_data(b"ABC");
            // len = 3 + 3 = 6
            assert_eq!(
                cmd,
                vec![0x1D, 0x28, 0x6B, 0x06, 0x00, 0x31, 0x50, 0x30, b'A', b'B', b'C']
            );
        }

        #[test]
        fn test_store_data_length_prefix_is_len_plus_three() {
            for len in [0usize, 1, 20, 252, 253, 255, 256, 257, 1000, 4093] {
                let payload = vec![b'x'; len];
                let cmd = store_data(&payload);
                assert_eq!(framed_len(&cmd), Some(len + 3), "payload len {}", len);
                assert_eq!(cmd.len(), 8 + len);
            }
        }

        #[test]
        fn test_store_data_high_byte_carries() {
            // 300 + 3 = 303 = 0x012F
            let cmd = store_data(&[b'a'; 300]);
            assert_eq!(cmd[3], 0x2F);
            assert_eq!(cmd[4], 0x01);
        }

        #[test]
        fn test_print() {
            assert_eq!(print(), vec![0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]);
        }

        #[test]
        fn test_generate_order() {
            let cmd = generate(b"NOTA", 6, QrErrorLevel::M);
            let mut expected = Vec::new();
            expected.extend(set_model(QrModel::Model2));
            expected.extend(set_module_size(6));
            expected.extend(set_error_correction(QrErrorLevel::M));
            expected.extend(store_data(b"NOTA"));
            expected.extend(print());
            assert_eq!(cmd, expected);
        }

        #[test]
        fn test_framed_len_rejects_other_commands() {
            assert_eq!(framed_len(&print()), None);
            assert_eq!(framed_len(&[]), None);
        }
    }
}
