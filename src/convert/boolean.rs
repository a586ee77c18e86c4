use crate::convert::ConvertContext;
use crate::spreadsheet::cell::CellValue;

/// Literal spellings accepted for true, compared case-insensitively.
const TRUE_LITERALS: &[&str] = &["yes", "y", "on", "是", "对", "真", "√"];

/// Literal spellings accepted for false, compared case-insensitively.
const FALSE_LITERALS: &[&str] = &["no", "n", "off", "否", "错", "假", "×"];

/// Converts a raw cell to a boolean.
///
/// Numbers are true when non-zero. Text is tried as `true`/`false`, then as a
/// number, then against the yes/no literal tables.
pub(crate) fn to_bool(raw: &CellValue, context: &ConvertContext) -> Option<bool> {
    match raw {
        CellValue::Bool(value) => Some(*value),
        CellValue::Number(value) if value.is_finite() => Some(*value != 0.0),
        CellValue::Text(text) => parse_bool(text.trim(), context),
        _ => None,
    }
}

fn parse_bool(text: &str, context: &ConvertContext) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Some(false);
    }
    if let Some(number) = context.culture.parse_number(text) {
        return Some(number != 0.0);
    }
    let lower = text.to_lowercase();
    if TRUE_LITERALS.contains(&lower.as_str()) {
        Some(true)
    } else if FALSE_LITERALS.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}
