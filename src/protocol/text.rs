//! # ESC/POS Text Styling Commands
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | Left / center / right |
//! | Bold | ESC E n | **Emphasized** text |
//! | Character size | GS ! n | Height/width multipliers |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```
//!
//! Alignment only takes effect at the start of a line, and it sticks until
//! changed. Every styled line therefore restores the default state before
//! the next line is emitted.

use serde::{Deserialize, Serialize};

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Text Alignment (ESC a n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC a n  |
/// | Hex     | 1B 61 n  |
///
/// ```
/// use nota::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

/// Convenience function for left alignment
#[inline]
pub fn align_left() -> Vec<u8> {
    align(Alignment::Left)
}

/// Convenience function for center alignment
#[inline]
pub fn align_center() -> Vec<u8> {
    align(Alignment::Center)
}

// ============================================================================
// TEXT EMPHASIS (BOLD)
// ============================================================================

/// # Enable Bold (ESC E 1)
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E', 1]
}

/// # Disable Bold (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// # Select Character Size (GS ! n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS ! n   |
/// | Hex     | 1D 21 n  |
///
/// `n` packs the width multiplier in the high nibble and the height
/// multiplier in the low nibble, both zero-based (0 = 1x, 7 = 8x).
pub fn size(height_mult: u8, width_mult: u8) -> Vec<u8> {
    let h = height_mult.min(7);
    let w = width_mult.min(7);
    vec![GS, b'!', (w << 4) | h]
}

/// Normal size (GS ! 0x00)
#[inline]
pub fn size_normal() -> Vec<u8> {
    size(0, 0)
}

/// # Double Height (GS ! 0x01)
///
/// Doubles the glyph height only, so the column count is unchanged.
#[inline]
pub fn double_height_on() -> Vec<u8> {
    size(1, 0)
}

/// Back to single height (GS ! 0x00)
#[inline]
pub fn double_height_off() -> Vec<u8> {
    size_normal()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align_left(), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align_center(), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold_on(), vec![0x1B, 0x45, 0x01]);
        assert_eq!(bold_off(), vec![0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_size() {
        assert_eq!(size(0, 0), vec![0x1D, 0x21, 0x00]);
        assert_eq!(size(1, 1), vec![0x1D, 0x21, 0x11]);
        assert_eq!(size(2, 0), vec![0x1D, 0x21, 0x02]);
        // Clamped to 8x
        assert_eq!(size(9, 9), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_double_height() {
        assert_eq!(double_height_on(), vec![0x1D, 0x21, 0x01]);
        assert_eq!(double_height_off(), vec![0x1D, 0x21, 0x00]);
    }
}
