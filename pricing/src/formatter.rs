use common::models::{is_currency_code, Currency};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// Below this rate a currency is formatted by significant digits
pub const LOW_VALUE_RATE: f64 = 0.01;

const MIN_SIGNIFICANT_DIGITS: u32 = 4;
const MAX_SIGNIFICANT_DIGITS: u32 = 6;
const DEFAULT_MINOR_UNITS: u32 = 2;

/// Symbols missing from common locale data
const SYMBOL_OVERRIDES: &[(&str, &str)] = &[
    ("BTC", "\u{20BF}"),
    ("THB", "฿"),
    ("NGN", "₦"),
    ("RUB", "₽"),
    ("GEL", "₾"),
    ("PHP", "₱"),
    ("PYG", "₲"),
    ("GHS", "₵"),
    ("KZT", "₸"),
    ("UAH", "₴"),
    ("TRY", "₺"),
    ("AZN", "₼"),
    ("LAK", "₭"),
    ("MNT", "₮"),
    ("CRC", "₡"),
    ("SVC", "₡"),
];

/// en-US default symbols; any other code is shown as-is
const DEFAULT_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CNY", "CN¥"),
    ("INR", "₹"),
    ("KRW", "₩"),
    ("ILS", "₪"),
    ("VND", "₫"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
    ("NZD", "NZ$"),
    ("HKD", "HK$"),
    ("MXN", "MX$"),
    ("BRL", "R$"),
    ("TWD", "NT$"),
    ("XCD", "EC$"),
    ("XAF", "FCFA"),
    ("XOF", "F\u{202F}CFA"),
    ("XPF", "CFPF"),
];

/// ISO 4217 minor units that differ from two
const MINOR_UNITS: &[(&str, u32)] = &[
    ("BIF", 0),
    ("CLP", 0),
    ("DJF", 0),
    ("GNF", 0),
    ("ISK", 0),
    ("JPY", 0),
    ("KMF", 0),
    ("KRW", 0),
    ("PYG", 0),
    ("RWF", 0),
    ("UGX", 0),
    ("VND", 0),
    ("VUV", 0),
    ("XAF", 0),
    ("XOF", 0),
    ("XPF", 0),
    ("BHD", 3),
    ("IQD", 3),
    ("JOD", 3),
    ("KWD", 3),
    ("LYD", 3),
    ("OMR", 3),
    ("TND", 3),
    ("CLF", 4),
];

fn lookup<T: Copy>(table: &[(&str, T)], code: &str) -> Option<T> {
    table
        .iter()
        .find(|(entry, _)| *entry == code)
        .map(|(_, value)| *value)
}

/// Symbol printed in front of amounts of this currency
pub fn currency_symbol(code: &str) -> &str {
    lookup(SYMBOL_OVERRIDES, code)
        .or_else(|| lookup(DEFAULT_SYMBOLS, code))
        .unwrap_or(code)
}

/// Number of fraction digits used for fixed precision formatting
pub fn minor_units(code: &str) -> u32 {
    lookup(MINOR_UNITS, code).unwrap_or(DEFAULT_MINOR_UNITS)
}

/// How many digits an amount is rounded to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Exactly this many fraction digits
    Fraction(u32),
    /// Between `min` and `max` significant digits
    Significant { min: u32, max: u32 },
}

/// Digit separators of a number locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub grouping_separator: char,
    pub decimal_separator: char,
    pub grouping_size: usize,
}

impl NumberLocale {
    pub const EN_US: NumberLocale = NumberLocale {
        grouping_separator: ',',
        decimal_separator: '.',
        grouping_size: 3,
    };
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::EN_US
    }
}

/// Formats amounts as currency strings, e.g. `$1,234.50` or `CHF4.40`.
///
/// The symbol comes from the override table, then the locale's default
/// symbol, then the code itself. Amounts are rounded half-even.
#[derive(Debug, Clone, Default)]
pub struct CurrencyFormatter {
    locale: NumberLocale,
}

impl CurrencyFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(locale: NumberLocale) -> Self {
        Self { locale }
    }

    /// Formats with the currency's standard fraction digits
    pub fn format(&self, code: &str, amount: f64) -> Option<String> {
        self.format_with_precision(code, amount, Precision::Fraction(minor_units(code)))
    }

    /// Formats an amount that was converted at `rate`. Currencies whose rate
    /// is below [`LOW_VALUE_RATE`] switch to significant digits so small
    /// amounts never collapse to zero.
    pub fn format_with_rate(&self, code: &str, amount: f64, rate: f64) -> Option<String> {
        let precision = if rate < LOW_VALUE_RATE {
            Precision::Significant {
                min: MIN_SIGNIFICANT_DIGITS,
                max: MAX_SIGNIFICANT_DIGITS,
            }
        } else {
            Precision::Fraction(minor_units(code))
        };
        self.format_with_precision(code, amount, precision)
    }

    /// Converts a base currency amount into `currency` and formats it
    pub fn format_converted(&self, currency: &Currency, base_amount: f64) -> Option<String> {
        self.format_with_rate(
            &currency.code,
            base_amount * currency.exchange_rate,
            currency.exchange_rate,
        )
    }

    pub fn format_with_precision(
        &self,
        code: &str,
        amount: f64,
        precision: Precision,
    ) -> Option<String> {
        if !is_currency_code(code) {
            debug!("Cannot format amount for invalid currency code {:?}", code);
            return None;
        }

        let Some(value) = Decimal::from_f64(amount) else {
            debug!("Cannot format {} {} as a decimal", amount, code);
            return None;
        };

        let rounded = match precision {
            Precision::Fraction(places) => round_fraction(value.abs(), places),
            Precision::Significant { min, max } => round_significant(value.abs(), min, max),
        };
        let Some(rounded) = rounded else {
            debug!("Cannot round {} {} to {:?}", amount, code, precision);
            return None;
        };

        let sign = if value.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        Some(format!(
            "{}{}{}",
            sign,
            currency_symbol(code),
            self.localize_digits(&rounded.to_string())
        ))
    }

    /// Applies grouping and the decimal separator to a plain "1234.50"
    fn localize_digits(&self, plain: &str) -> String {
        let (integer, fraction) = match plain.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (plain, None),
        };

        let size = self.locale.grouping_size.max(1);
        let mut out = String::with_capacity(plain.len() + integer.len() / size);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % size == 0 {
                out.push(self.locale.grouping_separator);
            }
            out.push(digit);
        }

        if let Some(fraction) = fraction {
            out.push(self.locale.decimal_separator);
            out.push_str(fraction);
        }

        out
    }
}

/// `None` when the value has too many integer digits to carry `places`
fn round_fraction(value: Decimal, places: u32) -> Option<Decimal> {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(places);
    (rounded.scale() == places).then_some(rounded)
}

fn round_significant(value: Decimal, min: u32, max: u32) -> Option<Decimal> {
    if value.is_zero() {
        let mut zero = Decimal::ZERO;
        zero.rescale(min.saturating_sub(1));
        return Some(zero);
    }

    let places = i64::from(max) - 1 - decimal_exponent(value);
    let rounded = if places >= 0 {
        value.round_dp_with_strategy(places as u32, RoundingStrategy::MidpointNearestEven)
    } else {
        let factor = power_of_ten((-places) as u32)?;
        (value / factor)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .checked_mul(factor)?
    };

    // Rounding may carry into a new digit (9.999999 -> 10.0000)
    let min_places = (i64::from(min) - 1 - decimal_exponent(rounded)).max(0) as u32;
    let mut trimmed = rounded.normalize();
    if trimmed.scale() < min_places {
        trimmed.rescale(min_places);
    }
    Some(trimmed)
}

/// Power of ten of the leading digit: 1234.5 -> 3, 0.00105 -> -3
fn decimal_exponent(value: Decimal) -> i64 {
    let normalized = value.normalize();
    let digits = normalized.mantissa().unsigned_abs().to_string().len() as i64;
    digits - 1 - i64::from(normalized.scale())
}

fn power_of_ten(exponent: u32) -> Option<Decimal> {
    (0..exponent).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(Decimal::TEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(code: &str, amount: f64) -> String {
        CurrencyFormatter::new().format(code, amount).unwrap()
    }

    #[test]
    fn test_base_currency_one_dollar() {
        assert_eq!(format("USD", 1.0), "$1.00");
        assert_eq!(
            CurrencyFormatter::new().format_converted(&Currency::base(), 1.0),
            Some("$1.00".to_string())
        );
    }

    #[test]
    fn test_code_as_symbol() {
        assert_eq!(format("CHF", 4.4), "CHF4.40");
        assert_eq!(format("CHF", 1.1), "CHF1.10");
    }

    #[test]
    fn test_override_symbols() {
        let formatter = CurrencyFormatter::new();
        for (code, symbol) in SYMBOL_OVERRIDES {
            let formatted = formatter.format(code, 10.0).unwrap();
            assert!(
                formatted.starts_with(symbol),
                "{} formatted as {}",
                code,
                formatted
            );
        }
        assert_eq!(format("THB", 10.0), "฿10.00");
        assert_eq!(format("PYG", 5000.0), "₲5,000");
    }

    #[test]
    fn test_default_symbols() {
        assert_eq!(format("EUR", 2.5), "€2.50");
        assert_eq!(format("GBP", 0.99), "£0.99");
        assert_eq!(format("CAD", 3.0), "CA$3.00");
    }

    #[test]
    fn test_grouping_and_minor_units() {
        assert_eq!(format("USD", 1234567.891), "$1,234,567.89");
        assert_eq!(format("JPY", 440.4), "¥440");
        assert_eq!(format("KWD", 1.5), "KWD1.500");
        assert_eq!(format("USD", 100.0), "$100.00");
    }

    #[test]
    fn test_half_even_rounding() {
        assert_eq!(format("USD", 0.125), "$0.12");
        assert_eq!(format("USD", 0.375), "$0.38");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format("USD", -1.0), "-$1.00");
        assert_eq!(format("USD", -0.001), "$0.00");
    }

    #[test]
    fn test_invalid_input() {
        let formatter = CurrencyFormatter::new();
        assert_eq!(formatter.format("usd", 1.0), None);
        assert_eq!(formatter.format("US", 1.0), None);
        assert_eq!(formatter.format("USD", f64::NAN), None);
        assert_eq!(formatter.format("USD", f64::INFINITY), None);
    }

    #[test]
    fn test_low_value_rate_uses_significant_digits() {
        let formatter = CurrencyFormatter::new();
        let btc = Currency::new("BTC", 0.000264);

        assert_eq!(
            formatter.format_converted(&btc, 4.0),
            Some("₿0.001056".to_string())
        );
        assert_eq!(
            formatter.format_converted(&btc, 0.95),
            Some("₿0.0002508".to_string())
        );
        assert_eq!(
            formatter.format_with_rate("BTC", 2.0, 0.0005),
            Some("₿2.000".to_string())
        );
    }

    #[test]
    fn test_low_value_rate_never_renders_zero() {
        let formatter = CurrencyFormatter::new();
        for amount in [0.0, 0.0000123, 0.004, 0.0049999, 12.5] {
            let formatted = formatter.format_with_rate("BTC", amount, 0.00002).unwrap();
            let digits = formatted.trim_start_matches('\u{20BF}');
            assert_ne!(digits, "0.00", "{} formatted as {}", amount, formatted);

            let significant = digits
                .chars()
                .filter(|c| c.is_ascii_digit())
                .skip_while(|c| *c == '0')
                .count();
            assert!(amount == 0.0 || significant >= 4, "{}", formatted);
        }
        assert_eq!(
            formatter.format_with_rate("BTC", 0.0, 0.00002),
            Some("₿0.000".to_string())
        );
    }

    #[test]
    fn test_significant_digits_cap() {
        let formatter = CurrencyFormatter::new();
        assert_eq!(
            formatter.format_with_rate("XAU", 1234567.0, 0.0008),
            Some("XAU1,234,570".to_string())
        );
        assert_eq!(
            formatter.format_with_rate("XAU", 9.9999999, 0.0008),
            Some("XAU10.00".to_string())
        );
    }

    #[test]
    fn test_amount_past_decimal_range() {
        let formatter = CurrencyFormatter::new();
        assert_eq!(formatter.format_with_rate("BTC", 7.9228162e28, 0.000264), None);
        assert_eq!(formatter.format("USD", 7.9228162e28), None);
        assert_eq!(
            formatter.format("USD", 1.0e15),
            Some("$1,000,000,000,000,000.00".to_string())
        );
    }

    #[test]
    fn test_custom_locale() {
        let formatter = CurrencyFormatter::with_locale(NumberLocale {
            grouping_separator: '.',
            decimal_separator: ',',
            grouping_size: 3,
        });
        assert_eq!(formatter.format("EUR", 1234.5), Some("€1.234,50".to_string()));
    }
}
