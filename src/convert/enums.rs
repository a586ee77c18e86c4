use crate::convert::ConvertContext;
use crate::convert::TargetType;
use crate::convert::TargetKind;
use crate::convert::Value;
use crate::spreadsheet::cell::CellValue;
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// One variant of a bindable enum with its alternative spellings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub ordinal: i64,
    /// Explicit cell literals mapped to this variant
    pub literals: &'static [&'static str],
    /// Human readable description, also used when writing
    pub description: Option<&'static str>,
    /// Name used by serialized representations
    pub serialized_name: Option<&'static str>,
}

impl EnumVariant {
    pub const fn new(name: &'static str, ordinal: i64) -> Self {
        Self {
            name,
            ordinal,
            literals: &[],
            description: None,
            serialized_name: None,
        }
    }

    pub const fn literals(self, literals: &'static [&'static str]) -> Self {
        Self { literals, ..self }
    }

    pub const fn description(self, description: &'static str) -> Self {
        Self { description: Some(description), ..self }
    }

    pub const fn serialized_name(self, serialized_name: &'static str) -> Self {
        Self { serialized_name: Some(serialized_name), ..self }
    }

    pub fn to_value(&self) -> Value {
        Value::Enum(EnumValue {
            name: self.name,
            ordinal: self.ordinal,
            description: self.description,
        })
    }
}

/// A converted enum value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub name: &'static str,
    pub ordinal: i64,
    pub description: Option<&'static str>,
}

/// Type descriptor of a bindable enum.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumType {
    pub id: TypeId,
    pub name: &'static str,
    pub variants: &'static [EnumVariant],
}

impl EnumType {
    pub fn of<E: SheetEnum>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            variants: E::variants(),
        }
    }

    pub fn variant_by_ordinal(&self, ordinal: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|variant| variant.ordinal == ordinal)
    }

    /// The variant with ordinal 0, or the first declared one.
    pub fn default_variant(&self) -> Option<&EnumVariant> {
        self.variant_by_ordinal(0).or_else(|| self.variants.first())
    }
}

/// Fieldless enum that can be bound to a cell.
///
/// Usually generated by [`sheet_enum!`](crate::sheet_enum); a hand-written
/// impl needs the macro's list form to become a record field.
pub trait SheetEnum: Sized + Copy + 'static {
    fn variants() -> &'static [EnumVariant];

    fn ordinal(&self) -> i64;

    fn from_ordinal(ordinal: i64) -> Option<Self>;
}

pub fn target_type<E: SheetEnum>() -> TargetType {
    TargetType::new(TargetKind::Enum(EnumType::of::<E>()))
}

pub fn from_value<E: SheetEnum>(value: &Value) -> Option<E> {
    match value {
        Value::Enum(value) => E::from_ordinal(value.ordinal),
        Value::Int(ordinal) => E::from_ordinal(*ordinal),
        _ => None,
    }
}

pub fn to_value<E: SheetEnum>(value: &E) -> Value {
    let ordinal = value.ordinal();
    E::variants()
        .iter()
        .find(|variant| variant.ordinal == ordinal)
        .map(EnumVariant::to_value)
        .unwrap_or(Value::Int(ordinal))
}

/// Declares a bindable enum, or makes existing [`SheetEnum`] types bindable.
///
/// The declarative form defines the enum, its variant table and the
/// [`SheetEnum`] and [`Bindable`](crate::Bindable) impls. Each variant may be
/// followed by [`EnumVariant`] builder calls after `=>`:
///
/// ```
/// rusty_sheet_bind::sheet_enum! {
///     #[derive(Copy, Clone, Debug, Default, PartialEq)]
///     pub enum Priority {
///         #[default]
///         Low = 0 => literals(&["L"]).description("Low priority"),
///         High = 9 => serialized_name("hi"),
///         Blocker = 10,
///     }
/// }
///
/// use rusty_sheet_bind::convert::enums::SheetEnum;
/// assert_eq!(Priority::variants()[1].serialized_name, Some("hi"));
/// assert_eq!(Priority::from_ordinal(10), Some(Priority::Blocker));
/// ```
///
/// The list form, `sheet_enum!(Priority, Status)`, only implements
/// [`Bindable`](crate::Bindable) for types with a hand-written [`SheetEnum`] impl.
#[macro_export]
macro_rules! sheet_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $ordinal:literal $(=> $($method:ident($($arg:expr),* $(,)?)).+)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$variant_meta])* $variant = $ordinal,)+
        }

        impl $crate::convert::enums::SheetEnum for $name {
            fn variants() -> &'static [$crate::convert::EnumVariant] {
                const VARIANTS: &[$crate::convert::EnumVariant] = &[
                    $($crate::convert::EnumVariant::new(stringify!($variant), $ordinal)$($(.$method($($arg),*))+)?,)+
                ];
                VARIANTS
            }

            fn ordinal(&self) -> i64 {
                *self as i64
            }

            fn from_ordinal(ordinal: i64) -> Option<Self> {
                match ordinal {
                    $($ordinal => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        $crate::sheet_enum!($name);
    };
    ($($enum:ty),+ $(,)?) => {
        $(impl $crate::Bindable for $enum {
            fn target_type() -> $crate::TargetType {
                $crate::convert::enums::target_type::<$enum>()
            }

            fn from_value(value: $crate::Value) -> Option<Self> {
                $crate::convert::enums::from_value::<$enum>(&value)
            }

            fn to_value(&self) -> $crate::Value {
                $crate::convert::enums::to_value(self)
            }
        })+
    };
}

/// Lookup tables of one enum type, keys are lower-cased.
#[derive(Debug, Default)]
struct EnumLiterals {
    names: HashMap<String, usize>,
    literals: HashMap<String, usize>,
    descriptions: HashMap<String, usize>,
    serialized_names: HashMap<String, usize>,
}

impl EnumLiterals {
    fn build(kind: &EnumType) -> Self {
        let mut tables = Self::default();
        for (index, variant) in kind.variants.iter().enumerate() {
            tables.names.entry(variant.name.to_lowercase()).or_insert(index);
            for literal in variant.literals {
                tables.literals.entry(literal.to_lowercase()).or_insert(index);
            }
            if let Some(description) = variant.description {
                tables.descriptions.entry(description.to_lowercase()).or_insert(index);
            }
            if let Some(serialized_name) = variant.serialized_name {
                tables.serialized_names.entry(serialized_name.to_lowercase()).or_insert(index);
            }
        }
        tables
    }

    /// Name, then explicit literal, then description, then serialized name.
    fn find(&self, text: &str) -> Option<usize> {
        let key = text.to_lowercase();
        self.names
            .get(&key)
            .or_else(|| self.literals.get(&key))
            .or_else(|| self.descriptions.get(&key))
            .or_else(|| self.serialized_names.get(&key))
            .copied()
    }
}

/// Populate-once cache of enum lookup tables keyed by enum type.
#[derive(Debug, Default)]
pub struct EnumCache {
    tables: DashMap<TypeId, Arc<EnumLiterals>>,
}

impl EnumCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enum types with built tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn tables(&self, kind: &EnumType) -> Arc<EnumLiterals> {
        self.tables
            .entry(kind.id)
            .or_insert_with(|| Arc::new(EnumLiterals::build(kind)))
            .clone()
    }
}

/// Converts a raw cell to an enum variant by ordinal or by any of its spellings.
pub(crate) fn to_enum(raw: &CellValue, kind: &EnumType, context: &ConvertContext) -> Option<EnumValue> {
    let variant = match raw {
        CellValue::Number(value) if value.is_finite() && value.fract() == 0.0 => {
            kind.variant_by_ordinal(*value as i64)
        }
        CellValue::Text(text) => {
            let text = text.trim();
            context
                .enums
                .tables(kind)
                .find(text)
                .map(|index| &kind.variants[index])
                .or_else(|| text.parse::<i64>().ok().and_then(|ordinal| kind.variant_by_ordinal(ordinal)))
        }
        _ => None,
    };
    variant.map(|variant| EnumValue {
        name: variant.name,
        ordinal: variant.ordinal,
        description: variant.description,
    })
}
