use crate::convert::datetime::to_serial;
use crate::convert::ConvertContext;
use crate::convert::Culture;
use crate::convert::TargetKind;
use crate::convert::Value;
use crate::spreadsheet::cell::CellValue;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts a raw cell to a numeric target, saturating at the target bounds.
pub(crate) fn to_number(raw: &CellValue, kind: &TargetKind, context: &ConvertContext) -> Option<Value> {
    match raw {
        CellValue::Bool(value) => narrow(if *value { 1.0 } else { 0.0 }, kind),
        CellValue::Number(value) => narrow(*value, kind),
        CellValue::DateTime(value) => narrow(to_serial(value), kind),
        CellValue::TimeSpan(value) => {
            let days = value.num_milliseconds() as f64 / 86_400_000f64;
            narrow(days, kind)
        }
        CellValue::Text(text) => parse_number(text.trim(), kind, context.culture),
        CellValue::Empty => None,
    }
}

/// Parses text as an exact integer first, then as a culture-formatted number,
/// then under the invariant culture.
fn parse_number(text: &str, kind: &TargetKind, culture: &Culture) -> Option<Value> {
    if kind.is_integer() {
        if let Ok(integer) = text.parse::<i128>() {
            return narrow_integer(integer, kind);
        }
    }
    if *kind == TargetKind::Decimal {
        if let Some(decimal) = parse_decimal(text, culture) {
            return Some(Value::Decimal(decimal));
        }
    }
    if let Some(number) = culture.parse_number(text) {
        return narrow(number, kind);
    }
    if !culture.is_invariant() {
        if let Some(number) = Culture::invariant().parse_number(text) {
            return narrow(number, kind);
        }
    }
    None
}

/// Narrows a double to the target kind. Integers round to nearest and
/// saturate at the target's min/max; NaN and infinities degrade to `None`.
pub(crate) fn narrow(value: f64, kind: &TargetKind) -> Option<Value> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    match kind {
        TargetKind::I8 => Some(Value::Int((rounded as i8) as i64)),
        TargetKind::I16 => Some(Value::Int((rounded as i16) as i64)),
        TargetKind::I32 => Some(Value::Int((rounded as i32) as i64)),
        TargetKind::I64 => Some(Value::Int(rounded as i64)),
        TargetKind::U8 => Some(Value::UInt((rounded as u8) as u64)),
        TargetKind::U16 => Some(Value::UInt((rounded as u16) as u64)),
        TargetKind::U32 => Some(Value::UInt((rounded as u32) as u64)),
        TargetKind::U64 => Some(Value::UInt(rounded as u64)),
        TargetKind::F32 => Some(Value::Float(value.clamp(f32::MIN as f64, f32::MAX as f64) as f32 as f64)),
        TargetKind::F64 => Some(Value::Float(value)),
        TargetKind::Decimal => Some(Value::Decimal(narrow_decimal(value))),
        _ => None,
    }
}

/// Converts a finite double to a decimal, saturating at `Decimal::MIN`/`MAX`.
/// Magnitudes below the smallest decimal step become zero.
pub(crate) fn narrow_decimal(value: f64) -> Decimal {
    if value.abs() < 1e-28 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(if value > 0.0 { Decimal::MAX } else { Decimal::MIN })
}

/// Reads decimal text exactly, without a round trip through `f64`.
/// Out-of-range text falls back to saturating narrowing.
fn parse_decimal(text: &str, culture: &Culture) -> Option<Decimal> {
    let exact = |culture: &Culture| {
        let normalized = culture.normalize_number(text)?;
        Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .ok()
    };
    exact(culture).or_else(|| if culture.is_invariant() { None } else { exact(&Culture::invariant()) })
}

/// Narrows an exactly parsed integer, saturating at the target bounds.
fn narrow_integer(value: i128, kind: &TargetKind) -> Option<Value> {
    fn clamp(value: i128, min: i128, max: i128) -> i128 {
        value.clamp(min, max)
    }
    match kind {
        TargetKind::I8 => Some(Value::Int(clamp(value, i8::MIN as i128, i8::MAX as i128) as i64)),
        TargetKind::I16 => Some(Value::Int(clamp(value, i16::MIN as i128, i16::MAX as i128) as i64)),
        TargetKind::I32 => Some(Value::Int(clamp(value, i32::MIN as i128, i32::MAX as i128) as i64)),
        TargetKind::I64 => Some(Value::Int(clamp(value, i64::MIN as i128, i64::MAX as i128) as i64)),
        TargetKind::U8 => Some(Value::UInt(clamp(value, 0, u8::MAX as i128) as u64)),
        TargetKind::U16 => Some(Value::UInt(clamp(value, 0, u16::MAX as i128) as u64)),
        TargetKind::U32 => Some(Value::UInt(clamp(value, 0, u32::MAX as i128) as u64)),
        TargetKind::U64 => Some(Value::UInt(clamp(value, 0, u64::MAX as i128) as u64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tests::context;
    use crate::convert::EnumCache;
    use chrono::Duration;
    use chrono::NaiveDate;

    #[test]
    fn saturating_narrowing() {
        assert_eq!(narrow(f64::MAX, &TargetKind::U8), Some(Value::UInt(255)));
        assert_eq!(narrow(1e300, &TargetKind::U8), Some(Value::UInt(255)));
        assert_eq!(narrow(-1.0, &TargetKind::U8), Some(Value::UInt(0)));
        assert_eq!(narrow(-1e10, &TargetKind::I16), Some(Value::Int(i16::MIN as i64)));
        assert_eq!(narrow(1e10, &TargetKind::I32), Some(Value::Int(i32::MAX as i64)));
        assert_eq!(narrow(f64::MAX, &TargetKind::U64), Some(Value::UInt(u64::MAX)));
        assert_eq!(narrow(f64::MAX, &TargetKind::F32), Some(Value::Float(f32::MAX as f64)));
        assert_eq!(narrow(6.9999999, &TargetKind::I32), Some(Value::Int(7)));
    }

    #[test]
    fn non_finite_degrades() {
        for kind in [TargetKind::U8, TargetKind::I64, TargetKind::F32, TargetKind::F64] {
            assert_eq!(narrow(f64::NAN, &kind), None);
            assert_eq!(narrow(f64::INFINITY, &kind), None);
            assert_eq!(narrow(f64::NEG_INFINITY, &kind), None);
        }
    }

    #[test]
    fn decimal_narrowing() {
        assert_eq!(narrow(2.5, &TargetKind::Decimal), Some(Value::Decimal(Decimal::new(25, 1))));
        assert_eq!(narrow(1e40, &TargetKind::Decimal), Some(Value::Decimal(Decimal::MAX)));
        assert_eq!(narrow(-1e40, &TargetKind::Decimal), Some(Value::Decimal(Decimal::MIN)));
        assert_eq!(narrow(f64::MAX, &TargetKind::Decimal), Some(Value::Decimal(Decimal::MAX)));
        assert_eq!(narrow(1e-300, &TargetKind::Decimal), Some(Value::Decimal(Decimal::ZERO)));
        assert_eq!(narrow(f64::NAN, &TargetKind::Decimal), None);
        assert_eq!(narrow(f64::INFINITY, &TargetKind::Decimal), None);
        assert_eq!(narrow(f64::NEG_INFINITY, &TargetKind::Decimal), None);
    }

    #[test]
    fn decimals_from_text() {
        let culture = Culture::invariant();
        let enums = EnumCache::new();
        let context = context(&culture, &enums);
        let decimal = |text: &str| to_number(&CellValue::from(text), &TargetKind::Decimal, &context);

        assert_eq!(decimal("0.1"), Some(Value::Decimal(Decimal::new(1, 1))));
        assert_eq!(decimal("1,234.56"), Some(Value::Decimal(Decimal::new(123456, 2))));
        assert_eq!(decimal("12345678901234567890.12"), Some(Value::Decimal(Decimal::from_i128_with_scale(1_234_567_890_123_456_789_012, 2))));
        assert_eq!(decimal("2.5e3"), Some(Value::Decimal(Decimal::from(2500))));
        assert_eq!(decimal("1e40"), Some(Value::Decimal(Decimal::MAX)));
        assert_eq!(decimal("abc"), None);

        let culture = Culture::de_de();
        let context = crate::convert::tests::context(&culture, &enums);
        assert_eq!(
            to_number(&CellValue::from("1.234,5"), &TargetKind::Decimal, &context),
            Some(Value::Decimal(Decimal::new(12345, 1)))
        );
    }

    #[test]
    fn numbers_from_cells() {
        let culture = Culture::invariant();
        let enums = EnumCache::new();
        let context = context(&culture, &enums);

        assert_eq!(to_number(&CellValue::Bool(true), &TargetKind::I32, &context), Some(Value::Int(1)));
        assert_eq!(to_number(&CellValue::Number(300.0), &TargetKind::U8, &context), Some(Value::UInt(255)));
        assert_eq!(to_number(&CellValue::TimeSpan(Duration::hours(12)), &TargetKind::F64, &context), Some(Value::Float(0.5)));
        let date = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(to_number(&CellValue::DateTime(date), &TargetKind::I32, &context), Some(Value::Int(61)));
    }

    #[test]
    fn numbers_from_text() {
        let culture = Culture::invariant();
        let enums = EnumCache::new();
        let context = context(&culture, &enums);

        assert_eq!(to_number(&CellValue::from(" 7 "), &TargetKind::I32, &context), Some(Value::Int(7)));
        assert_eq!(to_number(&CellValue::from("99999999999999999999999"), &TargetKind::I64, &context), Some(Value::Int(i64::MAX)));
        assert_eq!(to_number(&CellValue::from("-5"), &TargetKind::U32, &context), Some(Value::UInt(0)));
        assert_eq!(to_number(&CellValue::from("1,234.5"), &TargetKind::F64, &context), Some(Value::Float(1234.5)));
        assert_eq!(to_number(&CellValue::from("abc"), &TargetKind::I32, &context), None);
        assert_eq!(to_number(&CellValue::from("NaN"), &TargetKind::F64, &context), None);
    }

    #[test]
    fn culture_then_invariant() {
        let culture = Culture::de_de();
        let enums = EnumCache::new();
        let context = context(&culture, &enums);

        assert_eq!(to_number(&CellValue::from("1.234,5"), &TargetKind::F64, &context), Some(Value::Float(1234.5)));
        assert_eq!(to_number(&CellValue::from("2,5"), &TargetKind::F64, &context), Some(Value::Float(2.5)));

        let culture = Culture::fr_fr();
        let context = crate::convert::tests::context(&culture, &enums);
        assert_eq!(to_number(&CellValue::from("1 234,5"), &TargetKind::F64, &context), Some(Value::Float(1234.5)));
        assert_eq!(to_number(&CellValue::from("1234.5"), &TargetKind::F64, &context), Some(Value::Float(1234.5)));
    }
}
