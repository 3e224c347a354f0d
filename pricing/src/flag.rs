use common::models::is_currency_code;

/// Shifts 'A'..='Z' onto REGIONAL INDICATOR SYMBOL LETTER A..=Z
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

/// Emoji flag for a currency code, e.g. "CHF" -> "🇨🇭".
///
/// The first two letters of an ISO 4217 code are the issuing country's
/// ISO 3166-1 code. Bitcoin has no country and gets its currency sign,
/// ANG is shared by Curaçao and Sint Maarten, and `X` codes (metals,
/// funds, supranational units) have no flag.
pub fn country_flag_for(code: &str) -> Option<String> {
    match code {
        "BTC" => return Some("\u{20BF}".to_string()),
        "ANG" => return Some("🇨🇼🇸🇽".to_string()),
        _ => {}
    }

    if !is_currency_code(code) || code.starts_with('X') {
        return None;
    }

    code.chars()
        .take(2)
        .map(|letter| char::from_u32(REGIONAL_INDICATOR_OFFSET + letter as u32))
        .collect()
}
