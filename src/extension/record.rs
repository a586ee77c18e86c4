//! Capability traits binding typed records to columns.
use crate::convert::TargetKind;
use crate::convert::TargetType;
use crate::convert::Value;
use crate::database::column::ColumnSpec;
use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::any::TypeId;
use std::net::IpAddr;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// A type that can be stored in or read from a single column.
pub trait Bindable: Sized {
    /// The converter target for this type.
    fn target_type() -> TargetType;

    /// Unwraps a converted value; `None` if the value has another shape.
    fn from_value(value: Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

/// Field accessors of a record type.
///
/// Implemented by the [`record!`](crate::record) macro.
pub trait Record: Default + 'static {
    /// Declared columns, one per field, in field order.
    fn columns() -> Vec<ColumnSpec>;

    /// Assigns a converted value; false if the field is unknown or the value does not fit.
    fn set_field(&mut self, field: &str, value: Value) -> bool;

    fn get_field(&self, field: &str) -> Option<Value>;
}

/// Applies a column configuration closure. Used by [`record!`](crate::record).
pub fn configure<F: FnOnce(ColumnSpec) -> ColumnSpec>(column: ColumnSpec, configure: F) -> ColumnSpec {
    configure(column)
}

/// Implements [`Record`] for a struct whose fields implement [`Bindable`].
///
/// Every field may be followed by `=> |c| ...` to configure its column.
///
/// ```
/// #[derive(Default)]
/// struct Employee {
///     id: i32,
///     name: Option<String>,
/// }
///
/// rusty_sheet_bind::record!(Employee {
///     id: i32 => |c| c.name("EmpId").required(),
///     name: Option<String>,
/// });
/// ```
#[macro_export]
macro_rules! record {
    ($record:ty { $($field:ident : $kind:ty $(=> $configure:expr)?),* $(,)? }) => {
        impl $crate::Record for $record {
            fn columns() -> Vec<$crate::ColumnSpec> {
                vec![$({
                    let column = $crate::ColumnSpec::field(
                        stringify!($field),
                        <$kind as $crate::Bindable>::target_type(),
                    );
                    $(let column = $crate::extension::record::configure(column, $configure);)?
                    column
                }),*]
            }

            fn set_field(&mut self, field: &str, value: $crate::Value) -> bool {
                match field {
                    $(stringify!($field) => match <$kind as $crate::Bindable>::from_value(value) {
                        Some(value) => {
                            self.$field = value;
                            true
                        }
                        None => false,
                    },)*
                    _ => false,
                }
            }

            fn get_field(&self, field: &str) -> Option<$crate::Value> {
                match field {
                    $(stringify!($field) => Some($crate::Bindable::to_value(&self.$field)),)*
                    _ => None,
                }
            }
        }
    };
}

macro_rules! bindable_signed {
    ($($ty:ty => $kind:ident),*) => {
        $(impl Bindable for $ty {
            fn target_type() -> TargetType {
                TargetType::new(TargetKind::$kind)
            }

            fn from_value(value: Value) -> Option<Self> {
                value.as_i64().and_then(|value| <$ty>::try_from(value).ok())
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }
        })*
    };
}

macro_rules! bindable_unsigned {
    ($($ty:ty => $kind:ident),*) => {
        $(impl Bindable for $ty {
            fn target_type() -> TargetType {
                TargetType::new(TargetKind::$kind)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(value) if value < 0 => None,
                    value => value.as_u64().and_then(|value| <$ty>::try_from(value).ok()),
                }
            }

            fn to_value(&self) -> Value {
                Value::UInt(*self as u64)
            }
        })*
    };
}

bindable_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
bindable_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

impl Bindable for f64 {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::F64)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Bindable for f32 {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::F32)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64().map(|value| value as f32)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }
}

impl Bindable for Decimal {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::Decimal)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Decimal(value) => Some(value),
            Value::Int(value) => Some(Decimal::from(value)),
            Value::UInt(value) => Some(Decimal::from(value)),
            Value::Float(value) if value.is_finite() => Some(crate::convert::numeric::narrow_decimal(value)),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }
}

impl Bindable for bool {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::Bool)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Bindable for String {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::String)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl Bindable for NaiveDate {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::Date)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_datetime().map(|value| value.date())
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl Bindable for NaiveDateTime {
    fn target_type() -> TargetType {
        TargetType::new(TargetKind::DateTime)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_datetime()
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

/// Generates `Bindable` for types stored in exactly one `Value` variant.
macro_rules! bindable_variant {
    ($($ty:ty => $kind:ident / $variant:ident),* $(,)?) => {
        $(impl Bindable for $ty {
            fn target_type() -> TargetType {
                TargetType::new(TargetKind::$kind)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        })*
    };
}

bindable_variant! {
    NaiveTime => Time / Time,
    DateTime<FixedOffset> => Timestamp / Timestamp,
    Duration => Interval / Interval,
    Uuid => Uuid / Uuid,
    Url => Url / Url,
    IpAddr => IpAddr / IpAddr,
    semver::Version => Version / Version,
}

/// Raw passthrough of whatever the cell holds.
impl Bindable for Value {
    fn target_type() -> TargetType {
        TargetType::any()
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

/// Nullable column: blank cells bind `None` instead of the zero value.
impl<T: Bindable> Bindable for Option<T> {
    fn target_type() -> TargetType {
        T::target_type().as_nullable()
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map(T::to_value).unwrap_or(Value::Null)
    }
}

/// Populate-once cache of declared record columns keyed by record type.
#[derive(Debug, Default)]
pub struct RecordCache {
    columns: DashMap<TypeId, Arc<Vec<ColumnSpec>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<T: Record>(&self) -> Arc<Vec<ColumnSpec>> {
        self.columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(T::columns()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::convert::enums::tests::Level;

    #[derive(Debug, Default, PartialEq)]
    pub(crate) struct Employee {
        pub(crate) id: i32,
        pub(crate) name: String,
        pub(crate) manager: Option<String>,
        pub(crate) level: Level,
        pub(crate) hired: Option<NaiveDate>,
    }

    crate::record!(Employee {
        id: i32 => |c| c.name("EmpId").required(),
        name: String => |c| c.names(["Name", "Full Name"]).trimmed(),
        manager: Option<String>,
        level: Level => |c| c.default_value(5),
        hired: Option<NaiveDate> => |c| c.name("Hired").format("%d.%m.%Y"),
    });

    #[test]
    fn test_declared_columns() {
        let columns = Employee::columns();
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].names, vec!["EmpId"]);
        assert!(columns[0].required);
        assert_eq!(columns[0].target, TargetType::new(TargetKind::I32));
        assert_eq!(columns[1].names, vec!["Name", "Full Name"]);
        assert!(columns[1].trim);
        assert!(columns[2].names.is_empty());
        assert!(columns[2].target.nullable);
        assert_eq!(columns[3].default, Some(Value::Int(5)));
        assert_eq!(columns[4].accessor.as_deref(), Some("hired"));
        assert_eq!(columns[4].format.as_deref(), Some("%d.%m.%Y"));
    }

    #[test]
    fn test_field_access() {
        let mut employee = Employee::default();
        assert!(employee.set_field("id", Value::Int(7)));
        assert!(employee.set_field("name", Value::from("Ada")));
        assert!(employee.set_field("manager", Value::Null));
        assert!(!employee.set_field("id", Value::from("seven")));
        assert!(!employee.set_field("salary", Value::Int(1)));
        assert_eq!(employee.id, 7);
        assert_eq!(employee.get_field("name"), Some(Value::from("Ada")));
        assert_eq!(employee.get_field("manager"), Some(Value::Null));
        assert_eq!(employee.get_field("salary"), None);
    }

    #[test]
    fn test_narrowing_on_assignment() {
        assert_eq!(u8::from_value(Value::Int(-1)), None);
        assert_eq!(u8::from_value(Value::UInt(255)), Some(255));
        assert_eq!(i8::from_value(Value::Int(300)), None);
        assert_eq!(f64::from_value(Value::Int(3)), Some(3.0));
        assert_eq!(Option::<i32>::from_value(Value::Null), Some(None));
        assert_eq!(Option::<i32>::target_type(), TargetType::nullable(TargetKind::I32));
    }

    #[test]
    fn test_decimal_fields() {
        assert_eq!(Decimal::target_type(), TargetType::new(TargetKind::Decimal));
        assert_eq!(Decimal::from_value(Value::Decimal(Decimal::new(1234, 2))), Some(Decimal::new(1234, 2)));
        assert_eq!(Decimal::from_value(Value::Int(-3)), Some(Decimal::from(-3)));
        assert_eq!(Decimal::from_value(Value::Float(2.5)), Some(Decimal::new(25, 1)));
        assert_eq!(Decimal::from_value(Value::Float(f64::NAN)), None);
        assert_eq!(Decimal::from_value(Value::from("1.5")), None);
        assert_eq!(Decimal::new(5, 1).to_value(), Value::Decimal(Decimal::new(5, 1)));
    }

    #[test]
    fn test_record_cache_populates_once() {
        let cache = RecordCache::new();
        let first = cache.columns::<Employee>();
        let second = cache.columns::<Employee>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
