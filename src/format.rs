//! Display formatting for currency amounts and transaction timestamps.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision, Scales};
use time::{
    OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

/// The unit suffixes used to abbreviate large amounts.
const UNITS: [&str; 5] = ["", "K", "M", "B", "T"];
/// The magnitude at which each suffix in [UNITS] starts to apply.
const THRESHOLDS: [f64; 5] = [1.0, 1_000.0, 1_000_000.0, 1_000_000_000.0, 1_000_000_000_000.0];
/// Amounts below this are shown in full with digit grouping, amounts at or
/// above it are abbreviated with a suffix from [UNITS].
const ABBREVIATION_THRESHOLD: f64 = 10_000.0;

/// Format an amount of Uzbek som for display.
///
/// Zero renders as "0 UZS". Amounts under 10 000 render in full with spaces
/// grouping the digits, e.g. "9 999 UZS". Larger amounts are abbreviated
/// with K/M/B/T suffixes and one or two decimals using a comma as the
/// decimal separator, e.g. "12,3K UZS". Negative amounts carry a leading
/// minus sign.
pub fn format_currency(amount: f64) -> String {
    if amount == 0.0 {
        return "0 UZS".to_owned();
    }

    let magnitude = amount.abs();
    let sign = if amount < 0.0 { "-" } else { "" };

    if magnitude < ABBREVIATION_THRESHOLD {
        return format!("{sign}{} UZS", format_grouped(magnitude));
    }

    for (unit, threshold) in UNITS.iter().zip(THRESHOLDS).rev() {
        if magnitude >= threshold {
            let short = magnitude / threshold;

            let formatted = if short >= 100.0 {
                format!("{}", short.floor())
            } else {
                // One decimal for two-digit values, two decimals for
                // single-digit values.
                let decimals = (2 - short.log10().floor() as i32).clamp(1, 2) as usize;
                format!("{short:.decimals$}").replace('.', ",")
            };

            return format!("{sign}{formatted}{unit} UZS");
        }
    }

    format!("{sign}{magnitude} UZS")
}

fn format_grouped(magnitude: f64) -> String {
    static GROUPED_FMT: OnceLock<Formatter> = OnceLock::new();

    let grouped_fmt = GROUPED_FMT.get_or_init(|| {
        // The default formatter abbreviates thousands with an SI suffix,
        // which is only wanted above the abbreviation threshold.
        Formatter::default()
            .scales(Scales::none())
            .separator(' ')
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    grouped_fmt.fmt_string(magnitude.round())
}

/// Date time format for transaction timestamps, e.g. "02 Jan 2026 at 15:04".
const DATE_TIME_DISPLAY_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day] [month repr:short] [year] at [hour]:[minute]");

/// Date format for timestamps where the time of day is noise, e.g. "02 Jan 2026".
const DATE_DISPLAY_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day] [month repr:short] [year]");

/// Format a timestamp as "02 Jan 2026 at 15:04".
pub fn format_date_time(date_time: OffsetDateTime) -> String {
    date_time
        .format(DATE_TIME_DISPLAY_FORMAT)
        .unwrap_or_else(|_| date_time.to_string())
}

/// Format a timestamp as "02 Jan 2026".
pub fn format_date(date_time: OffsetDateTime) -> String {
    date_time
        .format(DATE_DISPLAY_FORMAT)
        .unwrap_or_else(|_| date_time.to_string())
}

#[cfg(test)]
mod format_currency_tests {
    use super::format_currency;

    #[test]
    fn zero_renders_without_grouping() {
        assert_eq!(format_currency(0.0), "0 UZS");
    }

    #[test]
    fn small_amounts_render_in_full() {
        assert_eq!(format_currency(1.0), "1 UZS");
        assert_eq!(format_currency(9_999.0), "9 999 UZS");
    }

    #[test]
    fn small_negative_amounts_keep_the_sign() {
        assert_eq!(format_currency(-2_500.0), "-2 500 UZS");
    }

    #[test]
    fn amounts_over_the_threshold_are_abbreviated() {
        assert_eq!(format_currency(10_000.0), "10,0K UZS");
        assert_eq!(format_currency(12_345.0), "12,3K UZS");
    }

    #[test]
    fn three_digit_short_values_are_floored() {
        assert_eq!(format_currency(150_000.0), "150K UZS");
        assert_eq!(format_currency(999_999.0), "999K UZS");
    }

    #[test]
    fn single_digit_short_values_get_two_decimals() {
        assert_eq!(format_currency(2_500_000.0), "2,50M UZS");
        assert_eq!(format_currency(-2_500_000.0), "-2,50M UZS");
    }

    #[test]
    fn billions_and_trillions_use_their_suffixes() {
        assert_eq!(format_currency(1_200_000_000.0), "1,20B UZS");
        assert_eq!(format_currency(1_000_000_000_000.0), "1,00T UZS");
    }
}
