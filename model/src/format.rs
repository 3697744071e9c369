//! FILENAME: model/src/format.rs
//! PURPOSE: Number and date formatting for displayed values.
//! CONTEXT: This module converts raw values to formatted display strings
//! based on an element's NumberFormat setting. Values that a format does not
//! apply to (text under a Currency format, say) fall back to plain display.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Number format types for displaying values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NumberFormat {
    #[default]
    General,
    Number {
        decimal_places: u8,
        use_thousands_separator: bool,
    },
    Currency {
        decimal_places: u8,
        symbol: String,
        symbol_position: CurrencyPosition,
    },
    Percentage {
        decimal_places: u8,
    },
    Scientific {
        decimal_places: u8,
    },
    Date {
        format: String, // chrono pattern, e.g. "%Y-%m-%d" or "%d/%m/%Y %H:%M"
    },
    Custom {
        format: String,
    },
}

/// Position of currency symbol relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyPosition {
    #[default]
    Before, // $100
    After,  // 100$
}

/// Format a value according to the specified format.
pub fn format_value(value: &Value, format: &NumberFormat) -> String {
    match (value, format) {
        (Value::DateTime(dt), NumberFormat::Date { format }) => format_date(*dt, format),
        (Value::Number(n), _) => format_number(*n, format),
        _ => value.display(),
    }
}

/// Format a datetime with a user-supplied chrono pattern. Patterns that do
/// not parse, or that need the timezone a naive datetime lacks (%Z, %z, %+),
/// fall back to plain display.
fn format_date(datetime: chrono::NaiveDateTime, pattern: &str) -> String {
    use chrono::format::{Item, StrftimeItems};
    use std::fmt::Write;

    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if !items.iter().any(|item| matches!(item, Item::Error)) {
        let mut formatted = String::new();
        if write!(formatted, "{}", datetime.format_with_items(items.iter())).is_ok() {
            return formatted;
        }
    }
    Value::DateTime(datetime).display()
}

/// Format a number according to the specified format.
pub fn format_number(value: f64, format: &NumberFormat) -> String {
    match format {
        NumberFormat::General => format_general(value),
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator,
        } => format_decimal(value, *decimal_places, *use_thousands_separator),
        NumberFormat::Currency {
            decimal_places,
            symbol,
            symbol_position,
        } => format_currency(value, *decimal_places, symbol, *symbol_position),
        NumberFormat::Percentage { decimal_places } => format_percentage(value, *decimal_places),
        NumberFormat::Scientific { decimal_places } => format_scientific(value, *decimal_places),
        // A bare number has no calendar meaning; show it plainly
        NumberFormat::Date { .. } => format_general(value),
        NumberFormat::Custom { format: custom_fmt } => format_custom(value, custom_fmt),
    }
}

/// Format a number in general format (auto-detect best representation).
fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let abs_value = value.abs();

    // Use scientific notation for very large or very small numbers
    if abs_value >= 1e10 || (abs_value < 1e-4 && abs_value > 0.0) {
        return format!("{:.5e}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }

    // For integers, don't show decimal point
    if value.fract() == 0.0 && abs_value < 1e15 {
        return format!("{:.0}", value);
    }

    // For decimals, show up to 10 significant digits but trim trailing zeros
    let formatted = format!("{:.10}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a number with specified decimal places and optional thousands separator.
fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Format a number as currency. Negative amounts print in parentheses.
fn format_currency(
    value: f64,
    decimal_places: u8,
    symbol: &str,
    position: CurrencyPosition,
) -> String {
    let formatted =
        add_thousands_separator(&format!("{:.prec$}", value.abs(), prec = decimal_places as usize));

    let with_symbol = match position {
        CurrencyPosition::Before => format!("{}{}", symbol, formatted),
        CurrencyPosition::After => format!("{}{}", formatted, symbol),
    };

    if value < 0.0 {
        format!("({})", with_symbol)
    } else {
        with_symbol
    }
}

/// Format a number as percentage.
fn format_percentage(value: f64, decimal_places: u8) -> String {
    let percentage = value * 100.0;
    format!("{:.prec$}%", percentage, prec = decimal_places as usize)
}

/// Format a number in scientific notation.
fn format_scientific(value: f64, decimal_places: u8) -> String {
    format!("{:.prec$e}", value, prec = decimal_places as usize).replace("e", "E")
}

/// Format a number using a custom format string.
/// Supports basic patterns like "0.00", "#,##0", etc.
fn format_custom(value: f64, format: &str) -> String {
    // Count decimal places from the pattern
    let decimal_places = if let Some(dot_pos) = format.find('.') {
        format[dot_pos + 1..]
            .chars()
            .take_while(|c| *c == '0' || *c == '#')
            .count() as u8
    } else {
        0
    };

    let use_thousands = format.contains(',');

    format_decimal(value, decimal_places, use_thousands)
}

/// Predefined number formats for common use cases.
pub mod presets {
    use super::*;

    pub fn number(decimal_places: u8) -> NumberFormat {
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator: false,
        }
    }

    pub fn number_with_separators(decimal_places: u8) -> NumberFormat {
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator: true,
        }
    }

    pub fn currency_usd(decimal_places: u8) -> NumberFormat {
        NumberFormat::Currency {
            decimal_places,
            symbol: "$".to_string(),
            symbol_position: CurrencyPosition::Before,
        }
    }

    pub fn percentage(decimal_places: u8) -> NumberFormat {
        NumberFormat::Percentage { decimal_places }
    }

    pub fn date_iso() -> NumberFormat {
        NumberFormat::Date {
            format: "%Y-%m-%d".to_string(),
        }
    }
}
