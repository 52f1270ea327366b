//! Human-readable formatting of financial figures

use crate::language::Language;

/// Placeholder for a missing figure
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an amount with a thousands/millions/billions suffix.
///
/// ```
/// use compare_stock::format::format_currency;
/// use compare_stock::Language;
///
/// assert_eq!(format_currency(Some(2.5e9), Language::French), "2.50 Md");
/// assert_eq!(format_currency(Some(2.5e9), Language::English), "2.50 B");
/// assert_eq!(format_currency(Some(-1_500_000.0), Language::English), "-1.50 M");
/// assert_eq!(format_currency(None, Language::English), "N/A");
/// ```
pub fn format_currency(value: Option<f64>, lang: Language) -> String {
    let Some(v) = value else {
        return NOT_AVAILABLE.to_string();
    };

    let abs = v.abs();
    if abs > 1e9 {
        format!("{:.2} {}", v / 1e9, lang.billion_suffix())
    } else if abs > 1e6 {
        format!("{:.2} M", v / 1e6)
    } else if abs > 1e3 {
        format!("{:.2} K", v / 1e3)
    } else {
        format!("{v:.2}")
    }
}

/// Raw value, or N/A
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Ratio as a percentage with two decimals (`0.1234` -> `12.34%`)
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Optional text, or N/A
pub fn format_text(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}
