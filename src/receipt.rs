//! # Receipt Input Records
//!
//! The shapes the POS API hands over for one print request. They are
//! read-only here: the builder borrows them and never writes back.
//!
//! ```
//! use nota::receipt::PrintRequest;
//!
//! let json = r#"{
//!     "transaction": {
//!         "code": "TRX-0001",
//!         "branch": "Laundry Bersih Cabang Utama",
//!         "customer": "Budi",
//!         "payment_method": "cash",
//!         "total": 20000,
//!         "timestamp": "2026-10-16T09:30:00"
//!     },
//!     "services": [{ "name": "Cuci", "quantity": 2, "unit_price": 10000 }]
//! }"#;
//! let request: PrintRequest = serde_json::from_str(json).unwrap();
//! assert_eq!(request.services[0].quantity, 2);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(alias = "tunai")]
    Cash,
    Qris,
    #[serde(alias = "belum_lunas")]
    Unpaid,
}

impl PaymentMethod {
    /// Label printed on the receipt.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Tunai",
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::Unpaid => "Belum Lunas",
        }
    }
}

/// A completed POS transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction code, e.g. `TRX-20261016-0007`.
    pub code: String,
    pub branch: String,
    pub customer: String,
    pub payment_method: PaymentMethod,
    /// Grand total in rupiah, as computed by the backend.
    pub total: i64,
    #[serde(default)]
    pub note: String,
    /// Wall-clock time as printed. RFC 3339 input keeps its own offset's
    /// local time; naive input (`T` or space separated) is taken as is.
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
}

/// One laundry service record (wash, dry, iron, ...).
///
/// The backend may send one record per physical unit; the builder merges
/// them. `free_quantity` defaults to zero. When `paid_quantity` is absent it
/// is derived from the other two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub free_quantity: Option<i64>,
    #[serde(default)]
    pub paid_quantity: Option<i64>,
    pub unit_price: i64,
}

/// One retail product record (detergent, softener, plastic bags, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Unit label such as `pcs` or `btl`.
    #[serde(default)]
    pub unit: String,
    pub quantity: i64,
    #[serde(default)]
    pub free_quantity: Option<i64>,
    #[serde(default)]
    pub paid_quantity: Option<i64>,
    pub unit_price: i64,
}

/// Customer loyalty counters at the time of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoyaltySnapshot {
    /// Cumulative paid washes before this transaction.
    pub total_cuci: i64,
    /// Free-wash credits available before this transaction.
    pub free_remaining: i64,
    /// Washes left until the next free one, as the backend last computed.
    #[serde(default)]
    pub until_next_free: i64,
}

/// Everything needed to print one receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRequest {
    pub transaction: Transaction,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub loyalty: Option<LoyaltySnapshot>,
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        t.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(t.naive_local());
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    }
}

impl PrintRequest {
    /// Parse a request as delivered by the API layer.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_payment_method_names() {
        let m: PaymentMethod = serde_json::from_str("\"qris\"").unwrap();
        assert_eq!(m, PaymentMethod::Qris);
        let m: PaymentMethod = serde_json::from_str("\"tunai\"").unwrap();
        assert_eq!(m, PaymentMethod::Cash);
        assert_eq!(PaymentMethod::Unpaid.label(), "Belum Lunas");
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{
            "transaction": {
                "code": "T1", "branch": "B", "customer": "C",
                "payment_method": "unpaid", "total": 0,
                "timestamp": "2026-01-02T03:04:05"
            }
        }"#;
        let req = PrintRequest::from_json(json).unwrap();
        assert!(req.services.is_empty());
        assert!(req.products.is_empty());
        assert!(req.loyalty.is_none());
        assert_eq!(req.transaction.note, "");
    }

    fn timestamp_of(raw: &str) -> NaiveDateTime {
        let json = format!(
            r#"{{"transaction": {{
                "code": "T1", "branch": "B", "customer": "C",
                "payment_method": "cash", "total": 0, "timestamp": "{}"
            }}}}"#,
            raw
        );
        PrintRequest::from_json(&json).unwrap().transaction.timestamp
    }

    #[test]
    fn test_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(timestamp_of("2026-10-16T09:30:00"), expected);
        assert_eq!(timestamp_of("2026-10-16 09:30:00"), expected);
        assert_eq!(timestamp_of("2026-10-16T09:30:00Z"), expected);
        assert_eq!(timestamp_of("2026-10-16T09:30:00.000Z"), expected);
        assert_eq!(timestamp_of("2026-10-16T09:30:00+07:00"), expected);
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let json = r#"{"transaction": {
            "code": "T1", "branch": "B", "customer": "C",
            "payment_method": "cash", "total": 0, "timestamp": "16/10/2026"
        }}"#;
        let err = PrintRequest::from_json(json).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn test_product_record() {
        let json = r#"{"name": "Pewangi", "unit": "btl", "quantity": 3,
                       "free_quantity": 1, "unit_price": 5000}"#;
        let rec: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.free_quantity, Some(1));
        assert_eq!(rec.paid_quantity, None);
    }
}
