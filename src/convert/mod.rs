//! # Value Conversion Module
//!
//! Converts raw cell values into typed values for binding, and typed values
//! back into raw cells for writing. Every converter is total: a value that
//! cannot be converted degrades to `None` instead of raising an error, and
//! the caller decides whether a default, a null or nothing is bound.
use crate::spreadsheet::cell::CellValue;
use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use std::fmt::Display;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use url::Url;
use uuid::Uuid;

pub mod boolean;
pub mod culture;
pub mod datetime;
pub mod enums;
pub mod interval;
pub mod numeric;
pub mod text;

pub use culture::Culture;
pub use culture::DateOrder;
pub use enums::EnumCache;
pub use enums::EnumType;
pub use enums::EnumValue;
pub use enums::EnumVariant;

/// Target type family of a bound column.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetKind {
    /// Untyped: raw values pass through with their natural shape
    Any,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Fixed-point decimal, exact for decimal text
    Decimal,
    String,
    /// Date without time component
    Date,
    /// Naive date and time
    DateTime,
    /// Time of day
    Time,
    /// Date and time with UTC offset
    Timestamp,
    /// Time interval
    Interval,
    Enum(EnumType),
    Uuid,
    Url,
    IpAddr,
    Version,
}

impl TargetKind {
    pub fn is_integer(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || matches!(self, Self::Decimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time | Self::Timestamp)
    }

    /// Text targets keep whitespace-only input instead of treating it as empty.
    fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Any)
    }
}

/// Target shape of a bound column: the type family and whether it accepts nulls.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetType {
    pub kind: TargetKind,
    pub nullable: bool,
}

impl TargetType {
    pub fn new(kind: TargetKind) -> Self {
        Self { kind, nullable: false }
    }

    pub fn nullable(kind: TargetKind) -> Self {
        Self { kind, nullable: true }
    }

    /// Untyped, nullable target used by dictionary and dynamic rows.
    pub fn any() -> Self {
        Self::nullable(TargetKind::Any)
    }

    pub fn as_nullable(self) -> Self {
        Self { nullable: true, ..self }
    }
}

impl Default for TargetType {
    fn default() -> Self {
        Self::any()
    }
}

/// A converted, strongly-typed cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Signed integers of every width, already narrowed to the target range
    Int(i64),
    /// Unsigned integers of every width, already narrowed to the target range
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Timestamp(DateTime<FixedOffset>),
    Interval(Duration),
    Enum(EnumValue),
    Uuid(Uuid),
    Url(Url),
    IpAddr(IpAddr),
    Version(semver::Version),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            Value::Int(value) => Some(*value != 0),
            Value::UInt(value) => Some(*value != 0),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::UInt(value) => Some(i64::try_from(*value).unwrap_or(i64::MAX)),
            Value::Float(value) if value.is_finite() => Some(value.round() as i64),
            Value::Decimal(value) => {
                let limit = if value.is_sign_negative() { i64::MIN } else { i64::MAX };
                Some(round_half_away(value).to_i64().unwrap_or(limit))
            }
            Value::Bool(value) => Some(*value as i64),
            Value::Enum(value) => Some(value.ordinal),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(value) => Some(u64::try_from(*value).unwrap_or(0)),
            Value::UInt(value) => Some(*value),
            Value::Float(value) if value.is_finite() => Some(value.round() as u64),
            Value::Decimal(value) => {
                let limit = if value.is_sign_negative() { 0 } else { u64::MAX };
                Some(round_half_away(value).to_u64().unwrap_or(limit))
            }
            Value::Bool(value) => Some(*value as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::UInt(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Decimal(value) => value.to_f64(),
            Value::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(*value),
            Value::Date(value) => Some(value.and_time(NaiveTime::MIN)),
            Value::Timestamp(value) => Some(value.naive_local()),
            _ => None,
        }
    }

    /// Returns true if the value can be bound to a column of the given kind.
    pub fn fits(&self, kind: &TargetKind) -> bool {
        match (self, kind) {
            (Value::Null, _) | (_, TargetKind::Any) => true,
            (Value::Bool(_), TargetKind::Bool) => true,
            (Value::Int(_) | Value::UInt(_), kind) if kind.is_numeric() => true,
            (Value::Float(_), kind) if kind.is_float() || *kind == TargetKind::Decimal => true,
            (Value::Decimal(_), kind) if kind.is_numeric() => true,
            (Value::Text(_), TargetKind::String) => true,
            (Value::Date(_) | Value::DateTime(_), TargetKind::Date | TargetKind::DateTime) => true,
            (Value::Time(_), TargetKind::Time) => true,
            (Value::Timestamp(_), TargetKind::Timestamp) => true,
            (Value::Interval(_), TargetKind::Interval) => true,
            (Value::Enum(value), TargetKind::Enum(kind)) => kind.variant_by_ordinal(value.ordinal).is_some(),
            (Value::Int(ordinal), TargetKind::Enum(kind)) => kind.variant_by_ordinal(*ordinal).is_some(),
            (Value::Uuid(_), TargetKind::Uuid) => true,
            (Value::Url(_), TargetKind::Url) => true,
            (Value::IpAddr(_), TargetKind::IpAddr) => true,
            (Value::Version(_), TargetKind::Version) => true,
            _ => false,
        }
    }
}

fn round_half_away(value: &Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::UInt(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Decimal(value) => write!(f, "{}", value),
            Value::Text(value) => write!(f, "{}", value),
            Value::Date(value) => write!(f, "{}", value),
            Value::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Time(value) => write!(f, "{}", value),
            Value::Timestamp(value) => write!(f, "{}", value.to_rfc3339()),
            Value::Interval(value) => write!(f, "{}", crate::spreadsheet::cell::format_duration(value)),
            Value::Enum(value) => write!(f, "{}", value.name),
            Value::Uuid(value) => write!(f, "{}", value),
            Value::Url(value) => write!(f, "{}", value),
            Value::IpAddr(value) => write!(f, "{}", value),
            Value::Version(value) => write!(f, "{}", value),
        }
    }
}

macro_rules! value_from {
    ($($source:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(impl From<$source> for Value {
            fn from(value: $source) -> Self {
                Value::$variant(value as $target)
            }
        })*
    };
}

value_from! {
    i8 => Int as i64, i16 => Int as i64, i32 => Int as i64, i64 => Int as i64,
    u8 => UInt as u64, u16 => UInt as u64, u32 => UInt as u64, u64 => UInt as u64,
    f32 => Float as f64, f64 => Float as f64,
    bool => Bool as bool,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Interval(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

/// Per-cell conversion settings.
#[derive(Copy, Clone)]
pub struct ConvertContext<'a> {
    /// Parse/format hint, a chrono strftime pattern for dates
    pub format: Option<&'a str>,
    pub culture: &'a Culture,
    /// Trim surrounding whitespace from string results
    pub trim: bool,
    pub enums: &'a EnumCache,
}

/// Converts a raw cell to the target type.
///
/// Blank cells yield `Value::Null` for nullable targets and the target's zero
/// value otherwise. `None` means the input could not be converted.
pub fn convert(raw: &CellValue, target: &TargetType, context: &ConvertContext) -> Option<Value> {
    let blank = match raw {
        CellValue::Empty => true,
        CellValue::Text(text) => !target.kind.is_textual() && text.trim().is_empty(),
        _ => false,
    };
    if blank {
        return if target.nullable {
            Some(Value::Null)
        } else {
            zero_value(&target.kind)
        };
    }
    let value = match &target.kind {
        TargetKind::Any => passthrough(raw, context),
        TargetKind::Bool => boolean::to_bool(raw, context).map(Value::Bool),
        kind if kind.is_numeric() => numeric::to_number(raw, kind, context),
        TargetKind::Date => datetime::to_datetime(raw, context).map(|value| Value::Date(value.date())),
        TargetKind::DateTime => datetime::to_datetime(raw, context).map(Value::DateTime),
        TargetKind::Time => datetime::to_time(raw, context).map(Value::Time),
        TargetKind::Timestamp => datetime::to_timestamp(raw, context).map(Value::Timestamp),
        TargetKind::Interval => interval::to_interval(raw, context).map(Value::Interval),
        TargetKind::Enum(kind) => enums::to_enum(raw, kind, context).map(Value::Enum),
        TargetKind::String => text::to_string(raw, context).map(Value::Text),
        TargetKind::Uuid => text::to_uuid(raw).map(Value::Uuid),
        TargetKind::Url => text::to_url(raw).map(Value::Url),
        TargetKind::IpAddr => text::to_ip_addr(raw).map(Value::IpAddr),
        TargetKind::Version => text::to_version(raw).map(Value::Version),
        _ => None,
    };
    if value.is_none() {
        log::trace!("cannot convert {:?} to {:?}, degrading to default", raw, target.kind);
    }
    value
}

/// Maps a raw cell to its natural typed value. NaN and infinities have none.
fn passthrough(raw: &CellValue, context: &ConvertContext) -> Option<Value> {
    let value = match raw {
        CellValue::Empty => Value::Null,
        CellValue::Bool(value) => Value::Bool(*value),
        CellValue::Number(value) if !value.is_finite() => return None,
        CellValue::Number(value) => Value::Float(*value),
        CellValue::Text(value) if context.trim => Value::Text(value.trim().to_owned()),
        CellValue::Text(value) => Value::Text(value.to_owned()),
        CellValue::DateTime(value) => Value::DateTime(*value),
        CellValue::TimeSpan(value) => Value::Interval(*value),
    };
    Some(value)
}

/// The value bound to a non-nullable target when the cell is empty.
pub fn zero_value(kind: &TargetKind) -> Option<Value> {
    let epoch = datetime::default_epoch();
    match kind {
        TargetKind::Any => Some(Value::Null),
        TargetKind::Bool => Some(Value::Bool(false)),
        kind if kind.is_signed() => Some(Value::Int(0)),
        kind if kind.is_unsigned() => Some(Value::UInt(0)),
        kind if kind.is_float() => Some(Value::Float(0.0)),
        TargetKind::Decimal => Some(Value::Decimal(Decimal::ZERO)),
        TargetKind::String => Some(Value::Text(String::new())),
        TargetKind::Date => Some(Value::Date(epoch.date())),
        TargetKind::DateTime => Some(Value::DateTime(epoch)),
        TargetKind::Time => Some(Value::Time(NaiveTime::MIN)),
        TargetKind::Timestamp => Some(Value::Timestamp(epoch.and_utc().fixed_offset())),
        TargetKind::Interval => Some(Value::Interval(Duration::zero())),
        TargetKind::Enum(kind) => kind.default_variant().map(|variant| variant.to_value()),
        TargetKind::Uuid => Some(Value::Uuid(Uuid::nil())),
        TargetKind::IpAddr => Some(Value::IpAddr(IpAddr::V4(Ipv4Addr::UNSPECIFIED))),
        TargetKind::Version => Some(Value::Version(semver::Version::new(0, 0, 0))),
        _ => None,
    }
}

/// Converts a typed value back to a raw cell for writing.
///
/// When `declared` is given, the declared type decides the cell shape;
/// otherwise the runtime variant of the value does.
pub fn to_cell(value: &Value, declared: Option<&TargetKind>) -> CellValue {
    if value.is_null() || value.as_str().map(str::is_empty).unwrap_or(false) {
        return CellValue::Empty;
    }
    let declared_cell = match declared {
        Some(kind) if kind.is_numeric() => value
            .as_f64()
            .and_then(|number| numeric::narrow(number, kind))
            .and_then(|narrowed| narrowed.as_f64())
            .map(CellValue::Number),
        Some(TargetKind::Bool) => value.as_bool().map(CellValue::Bool),
        Some(TargetKind::Date | TargetKind::DateTime) => value.as_datetime().map(CellValue::DateTime),
        Some(TargetKind::Time) => match value {
            Value::Time(time) => Some(CellValue::TimeSpan(*time - NaiveTime::MIN)),
            _ => None,
        },
        Some(TargetKind::Interval) => match value {
            Value::Interval(interval) => Some(CellValue::TimeSpan(*interval)),
            _ => None,
        },
        Some(TargetKind::String | TargetKind::Timestamp | TargetKind::Uuid | TargetKind::Url)
        | Some(TargetKind::IpAddr | TargetKind::Version | TargetKind::Enum(_)) => Some(text_cell(value)),
        _ => None,
    };
    declared_cell.unwrap_or_else(|| match value {
        Value::Null => CellValue::Empty,
        Value::Bool(value) => CellValue::Bool(*value),
        Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Decimal(_) => {
            value.as_f64().map(CellValue::Number).unwrap_or_default()
        }
        Value::Date(_) | Value::DateTime(_) => value.as_datetime().map(CellValue::DateTime).unwrap_or_default(),
        Value::Time(time) => CellValue::TimeSpan(*time - NaiveTime::MIN),
        Value::Interval(interval) => CellValue::TimeSpan(*interval),
        _ => text_cell(value),
    })
}

fn text_cell(value: &Value) -> CellValue {
    match value {
        Value::Enum(value) => CellValue::Text(value.description.unwrap_or(value.name).to_owned()),
        value => CellValue::Text(value.to_string()),
    }
}
