// format.rs — NotificationFormatter: change list → chat message text.
//
// Layout of a message:
//
//   🔔 *Parts Stock Weight Changes Detected*
//
//   *Changes:*
//   • WINGS: 10.00 kg → 15.00 kg
//
//   *Current Parts Weights:*
//   • WINGS: 15.00 kg
//   • TOTAL: 105.00 kg
//
//   _Updated at: 2024-01-01 01:00:00 PM WAT_
//
// Plain non-negative decimals ("12", "12.5", ".5") are rendered with two
// decimals, thousands separators and the unit; anything else is shown as-is.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use pm_snapshot::{Change, LabeledValues, SheetLayout, Snapshot, TOTAL_LABEL};

const HEADER: &str = "🔔 *Parts Stock Weight Changes Detected*";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p %Z";

/// Renders notification messages. Holds no state beyond its settings.
#[derive(Debug, Clone)]
pub struct NotificationFormatter {
    layout: SheetLayout,
    timezone: Tz,
    unit: String,
}

impl NotificationFormatter {
    pub fn new(layout: SheetLayout, timezone: Tz, unit: impl Into<String>) -> Self {
        Self {
            layout,
            timezone,
            unit: unit.into(),
        }
    }

    /// Render `changes` plus the full current listing of `current`.
    pub fn render(&self, changes: &[Change], current: &Snapshot, now: DateTime<Utc>) -> String {
        let mut message = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(message, "{HEADER}\n");

        let _ = writeln!(message, "*Changes:*");
        for change in changes {
            let _ = writeln!(
                message,
                "• {}: {} → {}",
                change.label,
                self.value(&change.old),
                self.value(&change.new)
            );
        }

        let _ = writeln!(message, "\n*Current Parts Weights:*");
        for (label, value) in LabeledValues::extract(current, &self.layout).iter() {
            let _ = writeln!(message, "• {}: {}", label, self.value(value));
        }
        if let Some(total) = self.layout.total(current) {
            let _ = writeln!(message, "• {}: {}", TOTAL_LABEL, self.value(total));
        }

        let local = now.with_timezone(&self.timezone);
        let _ = write!(message, "\n_Updated at: {}_", local.format(TIMESTAMP_FORMAT));
        message
    }

    fn value(&self, raw: &str) -> String {
        format_value(raw, &self.unit)
    }
}

/// True for a trimmed string of ASCII digits with at most one `.`.
pub fn is_plain_decimal(raw: &str) -> bool {
    let digits = raw.trim().replacen('.', "", 1);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Format a cell for display: plain decimals as `1,234.50 kg`, others verbatim.
pub fn format_value(raw: &str, unit: &str) -> String {
    if !is_plain_decimal(raw) {
        return raw.to_string();
    }
    match raw.trim().parse::<f64>() {
        Ok(n) => format!("{} {}", group_thousands(&format!("{n:.2}")), unit),
        Err(_) => raw.to_string(),
    }
}

/// Insert `,` every three digits of the integer part of `fixed`.
fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed, None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn formatter() -> NotificationFormatter {
        NotificationFormatter::new(SheetLayout::PARTS, chrono_tz::Africa::Lagos, "kg")
    }

    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn plain_decimal_detection() {
        assert!(is_plain_decimal("5"));
        assert!(is_plain_decimal(" 12.5 "));
        assert!(is_plain_decimal(".5"));
        assert!(is_plain_decimal("5."));
        assert!(!is_plain_decimal(""));
        assert!(!is_plain_decimal("."));
        assert!(!is_plain_decimal("-5"));
        assert!(!is_plain_decimal("1.2.3"));
        assert!(!is_plain_decimal("1e3"));
        assert!(!is_plain_decimal("n/a"));
    }

    #[test]
    fn numeric_values_get_two_decimals_and_unit() {
        assert_eq!(format_value("15", "kg"), "15.00 kg");
        assert_eq!(format_value(" 0.5 ", "kg"), "0.50 kg");
        assert_eq!(format_value("1234567.891", "kg"), "1,234,567.89 kg");
        assert_eq!(format_value("999", "kg"), "999.00 kg");
        assert_eq!(format_value("1000", "kg"), "1,000.00 kg");
    }

    #[test]
    fn non_numeric_values_are_verbatim() {
        assert_eq!(format_value("", "kg"), "");
        assert_eq!(format_value("-3", "kg"), "-3");
        assert_eq!(format_value("pending", "kg"), "pending");
    }

    #[test]
    fn render_full_message() {
        let current = Snapshot::from_rows(&[
            &["2024-01-01", "105", "15", "20"],
            &["", "TYPE", "WINGS", "LAPS"],
            &[],
        ]);
        let changes = vec![
            Change::new("WINGS", "10", "15"),
            Change::new("TOTAL", "100", "105"),
        ];

        let message = formatter().render(&changes, &current, noon_utc());
        let expected = "🔔 *Parts Stock Weight Changes Detected*\n\n\
*Changes:*\n\
• WINGS: 10.00 kg → 15.00 kg\n\
• TOTAL: 100.00 kg → 105.00 kg\n\
\n\
*Current Parts Weights:*\n\
• WINGS: 15.00 kg\n\
• LAPS: 20.00 kg\n\
• TOTAL: 105.00 kg\n\
\n\
_Updated at: 2024-01-01 01:00:00 PM WAT_";
        assert_eq!(message, expected);
    }

    #[test]
    fn listing_includes_unchanged_labels() {
        let current = Snapshot::from_rows(&[
            &["d", "30", "10", "n/a"],
            &["", "TYPE", "WINGS", "LAPS"],
            &[],
        ]);
        let message = formatter().render(&[Change::new("WINGS", "", "10")], &current, noon_utc());
        assert!(message.contains("• WINGS:  → 10.00 kg\n"));
        assert!(message.contains("• LAPS: n/a\n"));
    }

    #[test]
    fn total_line_omitted_when_absent() {
        let current = Snapshot::from_rows(&[&["d"], &["", "TYPE"], &[]]);
        let message = formatter().render(&[], &current, noon_utc());
        assert!(!message.contains("TOTAL"));
        assert!(message.ends_with("_Updated at: 2024-01-01 01:00:00 PM WAT_"));
    }

    #[test]
    fn timestamp_uses_configured_zone() {
        let fmt = NotificationFormatter::new(SheetLayout::PARTS, chrono_tz::UTC, "kg");
        let current = Snapshot::from_rows(&[&["d"], &[], &[]]);
        let message = fmt.render(&[], &current, noon_utc());
        assert!(message.ends_with("_Updated at: 2024-01-01 12:00:00 PM UTC_"));
    }
}
