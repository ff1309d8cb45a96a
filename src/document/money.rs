//! Rupiah formatting: `Rp 1.250.000`, dot as thousands separator, no
//! decimals.

/// Format an integer rupiah amount.
///
/// ```
/// use nota::document::money::format_rupiah;
///
/// assert_eq!(format_rupiah(20000), "Rp 20.000");
/// assert_eq!(format_rupiah(-1500), "-Rp 1.500");
/// ```
pub fn format_rupiah(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}Rp {}", sign, group_thousands(amount.unsigned_abs()))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_amounts() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(500), "Rp 500");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_rupiah(1000), "Rp 1.000");
        assert_eq!(format_rupiah(20000), "Rp 20.000");
        assert_eq!(format_rupiah(100000), "Rp 100.000");
        assert_eq!(format_rupiah(1250000), "Rp 1.250.000");
    }

    #[test]
    fn test_negative() {
        assert_eq!(format_rupiah(-20000), "-Rp 20.000");
    }

    #[test]
    fn test_extremes() {
        assert_eq!(format_rupiah(i64::MIN), "-Rp 9.223.372.036.854.775.808");
    }
}
