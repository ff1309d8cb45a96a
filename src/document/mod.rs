//! # Receipt Document Model
//!
//! A [`ReceiptDocument`] is the width-aware but byte-agnostic middle of the
//! pipeline:
//!
//! ```text
//! PrintRequest ──build()──► ReceiptDocument ──encode()──► ESC/POS bytes
//!                              (lines)          (IR → codegen)
//! ```
//!
//! ```
//! use nota::document::{ReceiptDocument, ReceiptLine};
//! use nota::printer::PaperProfile;
//!
//! let doc = ReceiptDocument::from_lines(vec![
//!     ReceiptLine::Header("LAUNDRY".into()),
//!     ReceiptLine::Divider,
//!     ReceiptLine::Centered("Terima kasih".into()),
//! ]);
//! let bytes = nota::document::encode(&doc, PaperProfile::Narrow);
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod build;
mod emit;
pub mod layout;
pub mod money;

pub use build::{LOYALTY_CYCLE, ReceiptOptions, build, build_with};
pub use emit::{CutPolicy, EncodeOptions, encode, encode_with, lower};

use serde::{Deserialize, Serialize};

/// A reconciled service or product line.
///
/// Invariant: `paid_quantity + free_quantity == total_quantity`, all
/// non-negative, `subtotal == unit_price * paid_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit label for products (`pcs`, `btl`); `None` for services.
    pub unit: Option<String>,
    pub total_quantity: i64,
    pub free_quantity: i64,
    pub paid_quantity: i64,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// One printed item row: a group of line items sharing `(name, is_free)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub name: String,
    pub unit: Option<String>,
    pub quantity: i64,
    /// Sum of paid subtotals; always 0 for free rows.
    pub subtotal: i64,
    pub is_free: bool,
}

impl ItemRow {
    /// Marker printed instead of a price on free rows.
    pub const FREE_MARKER: &'static str = "GRATIS";

    /// Left column: `"Cuci x2"` or `"Pewangi x3 btl"`.
    pub fn label(&self) -> String {
        match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{} x{} {}", self.name, self.quantity, unit),
            _ => format!("{} x{}", self.name, self.quantity),
        }
    }

    /// Right column: the formatted subtotal or the free marker.
    pub fn price_text(&self) -> String {
        if self.is_free {
            Self::FREE_MARKER.to_string()
        } else {
            money::format_rupiah(self.subtotal)
        }
    }
}

/// A typed receipt line. Styling is decided by the encoder, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ReceiptLine {
    /// Centered, double-height, bold title.
    Header(String),
    /// Label left, value right-aligned.
    KeyValue { label: String, value: String },
    ServiceRow(ItemRow),
    ProductRow(ItemRow),
    /// Full-width dashed rule.
    Divider,
    /// Double-height total line.
    TotalRow { label: String, amount: i64 },
    /// Centered plain text.
    Centered(String),
    /// QR symbol carrying this payload.
    QrPayload(String),
    /// Left-aligned text printed as-is.
    Raw(String),
}

/// Projected loyalty progress after this transaction. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyProjection {
    /// Free-wash credits left after the ones used in this transaction.
    pub free_remaining: i64,
    /// Position within the current cycle of [`LOYALTY_CYCLE`] washes.
    pub progress: i64,
    /// Paid washes still needed for the next free wash.
    pub washes_until_free: i64,
}

/// Figures the builder computed along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub services: Vec<LineItem>,
    pub products: Vec<LineItem>,
    pub services_subtotal: i64,
    pub products_subtotal: i64,
    /// Copied verbatim from the transaction.
    pub grand_total: i64,
    pub loyalty: Option<LoyaltyProjection>,
}

/// An ordered, immutable sequence of receipt lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDocument {
    lines: Vec<ReceiptLine>,
    summary: ReceiptSummary,
}

impl ReceiptDocument {
    /// Wrap hand-made lines (tests, test prints) without a summary.
    pub fn from_lines(lines: Vec<ReceiptLine>) -> Self {
        Self {
            lines,
            summary: ReceiptSummary::default(),
        }
    }

    pub(crate) fn new(lines: Vec<ReceiptLine>, summary: ReceiptSummary) -> Self {
        Self { lines, summary }
    }

    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    pub fn summary(&self) -> &ReceiptSummary {
        &self.summary
    }

    /// Item rows in print order, services first.
    pub fn item_rows(&self) -> impl Iterator<Item = &ItemRow> + '_ {
        self.lines.iter().filter_map(|line| match line {
            ReceiptLine::ServiceRow(row) | ReceiptLine::ProductRow(row) => Some(row),
            _ => None,
        })
    }
}
