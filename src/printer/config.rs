//! # Paper Profiles
//!
//! BLE receipt printers come in two paper widths. The text layout of a
//! receipt depends only on how many Font A characters fit on one line.
//!
//! | Profile | Paper | Columns |
//! |---------|-------|---------|
//! | Narrow  | 58mm  | 32      |
//! | Wide    | 80mm  | 42      |
//!
//! ```
//! use nota::printer::PaperProfile;
//!
//! assert_eq!(PaperProfile::Narrow.columns(), 32);
//! assert_eq!(PaperProfile::from_mm(80), Some(PaperProfile::Wide));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Physical paper width, selecting the column count used for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaperProfile {
    /// 58mm stock, 32 columns.
    #[default]
    #[serde(rename = "58mm", alias = "narrow")]
    Narrow,
    /// 80mm stock, 42 columns.
    #[serde(rename = "80mm", alias = "wide")]
    Wide,
}

impl PaperProfile {
    /// All known profiles, narrowest first.
    pub const ALL: [PaperProfile; 2] = [PaperProfile::Narrow, PaperProfile::Wide];

    /// Characters per printed line.
    #[inline]
    pub const fn columns(self) -> usize {
        match self {
            PaperProfile::Narrow => 32,
            PaperProfile::Wide => 42,
        }
    }

    /// Paper width in millimeters.
    #[inline]
    pub const fn width_mm(self) -> u16 {
        match self {
            PaperProfile::Narrow => 58,
            PaperProfile::Wide => 80,
        }
    }

    /// Look up a profile by paper width.
    pub fn from_mm(mm: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.width_mm() == mm)
    }
}

impl fmt::Display for PaperProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.width_mm())
    }
}

impl FromStr for PaperProfile {
    type Err = String;

    /// Accepts `58`, `58mm`, `80`, `80mm`, `narrow`, `wide`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "narrow" => return Ok(PaperProfile::Narrow),
            "wide" => return Ok(PaperProfile::Wide),
            _ => {}
        }
        s.trim_end_matches("mm")
            .parse::<u16>()
            .ok()
            .and_then(Self::from_mm)
            .ok_or_else(|| format!("unknown paper width '{}' (expected 58mm or 80mm)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        assert_eq!(PaperProfile::Narrow.columns(), 32);
        assert_eq!(PaperProfile::Wide.columns(), 42);
    }

    #[test]
    fn test_from_mm() {
        assert_eq!(PaperProfile::from_mm(58), Some(PaperProfile::Narrow));
        assert_eq!(PaperProfile::from_mm(80), Some(PaperProfile::Wide));
        assert_eq!(PaperProfile::from_mm(72), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("58mm".parse::<PaperProfile>(), Ok(PaperProfile::Narrow));
        assert_eq!("80".parse::<PaperProfile>(), Ok(PaperProfile::Wide));
        assert_eq!("Wide".parse::<PaperProfile>(), Ok(PaperProfile::Wide));
        assert!("110mm".parse::<PaperProfile>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(PaperProfile::Narrow.to_string(), "58mm");
    }

    #[test]
    fn test_serde_names() {
        let p: PaperProfile = serde_json::from_str("\"80mm\"").unwrap();
        assert_eq!(p, PaperProfile::Wide);
        let p: PaperProfile = serde_json::from_str("\"narrow\"").unwrap();
        assert_eq!(p, PaperProfile::Narrow);
        assert_eq!(serde_json::to_string(&PaperProfile::Narrow).unwrap(), "\"58mm\"");
    }
}
