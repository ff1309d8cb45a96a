//! Builds a [`ReceiptDocument`] from a [`PrintRequest`].
//!
//! Pure: no I/O, same output for the same input. Text is sanitized to the
//! printer's code page and wrapped to the paper width here, so the encoder
//! only ever lays out single lines.

use super::layout::{self, wrap};
use super::money::format_rupiah;
use super::{
    ItemRow, LineItem, LoyaltyProjection, ReceiptDocument, ReceiptLine, ReceiptSummary,
};
use crate::error::BuildError;
use crate::printer::PaperProfile;
use crate::protocol::cp437::sanitize;
use crate::receipt::{LoyaltySnapshot, PrintRequest};

/// Paid washes per free wash.
pub const LOYALTY_CYCLE: i64 = 10;

/// Placeholder in [`ReceiptOptions::qr_template`] replaced by the
/// transaction code.
const CODE_PLACEHOLDER: &str = "{code}";

/// Store-specific receipt content that does not come with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOptions {
    /// Centered lines under the branch name (address, phone).
    pub store_lines: Vec<String>,
    /// Centered lines at the very end.
    pub footer_lines: Vec<String>,
    /// QR payload template; `{code}` is replaced by the transaction code.
    /// `None` leaves the QR block out.
    pub qr_template: Option<String>,
    /// Print the loyalty progress message when a snapshot is present.
    pub show_loyalty: bool,
}

impl Default for ReceiptOptions {
    fn default() -> Self {
        Self {
            store_lines: Vec::new(),
            footer_lines: vec!["Terima kasih".into()],
            qr_template: Some(CODE_PLACEHOLDER.into()),
            show_loyalty: true,
        }
    }
}

/// Build a receipt with default options.
pub fn build(request: &PrintRequest, profile: PaperProfile) -> Result<ReceiptDocument, BuildError> {
    build_with(request, profile, &ReceiptOptions::default())
}

/// Build a receipt.
pub fn build_with(
    request: &PrintRequest,
    profile: PaperProfile,
    options: &ReceiptOptions,
) -> Result<ReceiptDocument, BuildError> {
    let services = request
        .services
        .iter()
        .map(|r| reconcile(&r.name, None, r.quantity, r.free_quantity, r.paid_quantity, r.unit_price))
        .collect::<Result<Vec<_>, _>>()?;
    let products = request
        .products
        .iter()
        .map(|r| {
            reconcile(
                &r.name,
                Some(&r.unit),
                r.quantity,
                r.free_quantity,
                r.paid_quantity,
                r.unit_price,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tx = &request.transaction;
    let mut out = Lines::new(profile.columns());

    // Header
    out.wrapped(&tx.branch, ReceiptLine::Header);
    for line in &options.store_lines {
        out.wrapped(line, ReceiptLine::Centered);
    }
    out.push(ReceiptLine::Divider);

    // Transaction info
    out.key_value("No", &tx.code);
    out.key_value("Tanggal", &tx.timestamp.format("%d/%m/%Y %H:%M").to_string());
    out.key_value("Pelanggan", &tx.customer);
    out.key_value("Bayar", tx.payment_method.label());
    out.push(ReceiptLine::Divider);

    // Items
    if !services.is_empty() {
        out.push(ReceiptLine::Raw("LAYANAN".into()));
        for row in group_rows(&services)? {
            out.push(ReceiptLine::ServiceRow(row));
        }
    }
    if !products.is_empty() {
        out.push(ReceiptLine::Raw("PRODUK".into()));
        for row in group_rows(&products)? {
            out.push(ReceiptLine::ProductRow(row));
        }
    }
    out.push(ReceiptLine::Divider);

    // Totals
    let services_subtotal = paid_sum(&services, "Subtotal Layanan")?;
    let products_subtotal = paid_sum(&products, "Subtotal Produk")?;
    if !services.is_empty() {
        out.key_value("Subtotal Layanan", &format_rupiah(services_subtotal));
    }
    if !products.is_empty() {
        out.key_value("Subtotal Produk", &format_rupiah(products_subtotal));
    }
    out.push(ReceiptLine::TotalRow {
        label: "TOTAL".into(),
        amount: tx.total,
    });
    out.push(ReceiptLine::Divider);

    // Note
    if !tx.note.trim().is_empty() {
        out.push(ReceiptLine::Raw("Catatan:".into()));
        for paragraph in tx.note.lines().filter(|p| !p.trim().is_empty()) {
            out.wrapped(paragraph, ReceiptLine::Raw);
        }
    }

    // Loyalty
    let loyalty = request
        .loyalty
        .map(|snapshot| project_loyalty(&snapshot, &services))
        .transpose()?;
    if let (Some(projection), true) = (loyalty, options.show_loyalty) {
        for message in loyalty_messages(&projection) {
            out.wrapped(&message, ReceiptLine::Centered);
        }
    }

    // QR + footer
    if let Some(template) = &options.qr_template {
        let code = sanitize(&tx.code);
        out.push(ReceiptLine::QrPayload(template.replace(CODE_PLACEHOLDER, &code)));
        out.wrapped(&code, ReceiptLine::Centered);
    }
    for line in &options.footer_lines {
        out.wrapped(line, ReceiptLine::Centered);
    }

    tracing::debug!(
        code = %tx.code,
        lines = out.lines.len(),
        services = services.len(),
        products = products.len(),
        paper = %profile,
        "built receipt document"
    );

    let summary = ReceiptSummary {
        services,
        products,
        services_subtotal,
        products_subtotal,
        grand_total: tx.total,
        loyalty,
    };
    Ok(ReceiptDocument::new(out.lines, summary))
}

/// Line accumulator that sanitizes and wraps text as it goes.
struct Lines {
    width: usize,
    lines: Vec<ReceiptLine>,
}

impl Lines {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: ReceiptLine) {
        self.lines.push(line);
    }

    fn wrapped(&mut self, text: &str, make: impl Fn(String) -> ReceiptLine) {
        let clean = sanitize(text);
        if clean.trim().is_empty() {
            return;
        }
        for part in wrap(&clean, self.width) {
            self.lines.push(make(part));
        }
    }

    fn key_value(&mut self, label: &str, value: &str) {
        self.lines.push(ReceiptLine::KeyValue {
            label: sanitize(label),
            value: sanitize(value),
        });
    }
}

fn malformed(name: &str, reason: String) -> BuildError {
    BuildError::MalformedLineItem {
        name: name.to_string(),
        reason,
    }
}

/// Reconcile the free/paid split of one record.
///
/// - `paid` absent: `paid = max(0, total - free)`.
/// - `paid` present: trusted, but clamped so `paid + free` never exceeds
///   `total`. If `free` is absent it becomes the remainder; if both are
///   present and leave units unaccounted for, the record is rejected.
fn reconcile(
    name: &str,
    unit: Option<&str>,
    total: i64,
    free: Option<i64>,
    paid: Option<i64>,
    unit_price: i64,
) -> Result<LineItem, BuildError> {
    if total < 0 {
        return Err(malformed(name, format!("negative total quantity {}", total)));
    }
    if unit_price < 0 {
        return Err(malformed(name, format!("negative unit price {}", unit_price)));
    }
    if let Some(f) = free {
        if f < 0 {
            return Err(malformed(name, format!("negative free quantity {}", f)));
        }
        if f > total {
            return Err(malformed(
                name,
                format!("free quantity {} exceeds total {}", f, total),
            ));
        }
    }
    if let Some(p) = paid {
        if p < 0 {
            return Err(malformed(name, format!("negative paid quantity {}", p)));
        }
    }

    let (paid, free) = match (paid, free) {
        (None, free) => {
            let free = free.unwrap_or(0);
            ((total - free).max(0), free)
        }
        (Some(p), None) => {
            let p = p.min(total);
            (p, total - p)
        }
        (Some(p), Some(f)) => {
            let p = p.min(total - f);
            if p + f < total {
                return Err(malformed(
                    name,
                    format!("paid {} + free {} does not add up to total {}", p, f, total),
                ));
            }
            (p, f)
        }
    };

    let subtotal = unit_price
        .checked_mul(paid)
        .ok_or_else(|| malformed(name, "subtotal overflows".into()))?;

    Ok(LineItem {
        name: sanitize(name).trim().to_string(),
        unit: unit.map(|u| sanitize(u).trim().to_string()),
        total_quantity: total,
        free_quantity: free,
        paid_quantity: paid,
        unit_price,
        subtotal,
    })
}

/// Collapse line items into printed rows keyed by `(name, is_free)`,
/// keeping first-seen order. A line item with both paid and free units
/// contributes to two rows, paid first.
fn group_rows(items: &[LineItem]) -> Result<Vec<ItemRow>, BuildError> {
    let mut rows: Vec<ItemRow> = Vec::new();
    let mut add = |item: &LineItem, quantity: i64, subtotal: i64, is_free: bool| -> Result<(), BuildError> {
        if quantity == 0 {
            return Ok(());
        }
        match rows
            .iter_mut()
            .find(|r| r.name == item.name && r.is_free == is_free)
        {
            Some(row) => {
                row.quantity = row
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| malformed(&item.name, "grouped quantity overflows".into()))?;
                row.subtotal = row
                    .subtotal
                    .checked_add(subtotal)
                    .ok_or_else(|| malformed(&item.name, "grouped subtotal overflows".into()))?;
            }
            None => rows.push(ItemRow {
                name: item.name.clone(),
                unit: item.unit.clone(),
                quantity,
                subtotal,
                is_free,
            }),
        }
        Ok(())
    };

    for item in items {
        add(item, item.paid_quantity, item.subtotal, false)?;
        add(item, item.free_quantity, 0, true)?;
    }
    Ok(rows)
}

fn checked_sum(values: impl IntoIterator<Item = i64>) -> Option<i64> {
    values.into_iter().try_fold(0i64, |acc, v| acc.checked_add(v))
}

fn paid_sum(items: &[LineItem], label: &str) -> Result<i64, BuildError> {
    checked_sum(items.iter().map(|i| i.subtotal))
        .ok_or_else(|| malformed(label, "sum of subtotals overflows".into()))
}

fn invalid_loyalty(reason: impl Into<String>) -> BuildError {
    BuildError::InvalidLoyalty {
        reason: reason.into(),
    }
}

/// Project loyalty counters forward by this transaction's services.
fn project_loyalty(
    snapshot: &LoyaltySnapshot,
    services: &[LineItem],
) -> Result<LoyaltyProjection, BuildError> {
    if snapshot.total_cuci < 0 {
        return Err(invalid_loyalty(format!(
            "negative wash count {}",
            snapshot.total_cuci
        )));
    }
    if snapshot.free_remaining < 0 {
        return Err(invalid_loyalty(format!(
            "negative free-wash balance {}",
            snapshot.free_remaining
        )));
    }

    let free_used = checked_sum(services.iter().map(|s| s.free_quantity))
        .ok_or_else(|| invalid_loyalty("free wash count overflows"))?;
    let paid_washes = checked_sum(services.iter().map(|s| s.paid_quantity))
        .ok_or_else(|| invalid_loyalty("paid wash count overflows"))?;
    let progress = snapshot
        .total_cuci
        .checked_add(paid_washes)
        .ok_or_else(|| invalid_loyalty("wash count overflows"))?
        .rem_euclid(LOYALTY_CYCLE);

    Ok(LoyaltyProjection {
        free_remaining: (snapshot.free_remaining - free_used).max(0),
        progress,
        washes_until_free: LOYALTY_CYCLE - progress,
    })
}

fn loyalty_messages(p: &LoyaltyProjection) -> Vec<String> {
    let mut messages = vec![format!("Poin cuci: {}/{}", p.progress, LOYALTY_CYCLE)];
    if p.progress == 0 {
        messages.push("Selamat! Cuci berikutnya GRATIS".into());
    } else {
        messages.push(format!(
            "{} cuci lagi untuk 1x cuci gratis",
            p.washes_until_free
        ));
    }
    if p.free_remaining > 0 {
        messages.push(format!("Sisa cuci gratis: {}", p.free_remaining));
    }
    messages
}
