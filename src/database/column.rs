use crate::convert::TargetType;
use crate::convert::Value;

bitflags::bitflags! {
    /// How a column's candidate names are compared with header text.
    ///
    /// Flags compose; when several shape flags are set the first one in the
    /// order `CONTAINS`, `PREFIX`, `SUFFIX`, `REGEX` wins. No shape flag means
    /// exact equality.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MatchStrategy: u8 {
        const IGNORE_CASE = 0b0000_0001;
        const CONTAINS    = 0b0000_0010;
        const PREFIX      = 0b0000_0100;
        const SUFFIX      = 0b0000_1000;
        const REGEX       = 0b0001_0000;
    }
}

impl Default for MatchStrategy {
    /// Case-insensitive exact match.
    fn default() -> Self {
        Self::IGNORE_CASE
    }
}

/// Declarative description of one logical column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    /// Logical identifier: record field name or dictionary key
    pub key: String,
    /// Candidate header names, in insertion order, without duplicates
    pub names: Vec<String>,
    /// Explicit physical column (0-based); overrides name matching
    pub index: Option<usize>,
    pub strategy: MatchStrategy,
    /// Fail the session if the column cannot be resolved
    pub required: bool,
    /// Excluded from matching, binding and writing
    pub ignore: bool,
    /// Substituted when a cell is blank or cannot be converted
    pub default: Option<Value>,
    /// Parse/format hint handed to the converter and the backend writer
    pub format: Option<String>,
    pub target: TargetType,
    /// Trim whitespace around string results
    pub trim: bool,
    /// Record field the value is bound to; `None` for dictionary columns
    pub accessor: Option<String>,
}

impl ColumnSpec {
    /// Untyped dictionary column.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            names: Vec::new(),
            index: None,
            strategy: MatchStrategy::default(),
            required: false,
            ignore: false,
            default: None,
            format: None,
            target: TargetType::any(),
            trim: false,
            accessor: None,
        }
    }

    /// Column bound to a record field of the given type.
    pub fn field(field: &str, target: TargetType) -> Self {
        Self {
            target,
            accessor: Some(field.to_owned()),
            ..Self::new(field)
        }
    }

    /// Adds a candidate header name.
    pub fn name(mut self, name: &str) -> Self {
        if !self.names.iter().any(|existing| existing == name) {
            self.names.push(name.to_owned());
        }
        self
    }

    pub fn names<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().fold(self, |column, name| column.name(name))
    }

    /// Binds the column to a 0-based physical index.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_owned());
        self
    }

    pub fn target(mut self, target: TargetType) -> Self {
        self.target = target;
        self
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Name shown in headers and error messages.
    pub fn display_name(&self) -> &str {
        self.names
            .iter()
            .find(|name| !name.is_empty())
            .unwrap_or(&self.key)
    }

    /// Injects the logical identifier as candidate name when none was declared.
    pub(crate) fn ensure_names(&mut self) {
        if self.names.iter().all(|name| name.is_empty()) && !self.key.is_empty() {
            self.names.push(self.key.to_owned());
        }
    }

    /// The configured default, if it fits the unwrapped target type.
    pub(crate) fn compatible_default(&self) -> Option<&Value> {
        self.default.as_ref().filter(|value| value.fits(&self.target.kind))
    }
}

/// Runtime override of a declared column, applied by logical identifier.
/// Only the fields that are set replace the declared ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnOverride {
    pub key: String,
    pub names: Option<Vec<String>>,
    pub index: Option<usize>,
    pub strategy: Option<MatchStrategy>,
    pub required: Option<bool>,
    pub ignore: Option<bool>,
    pub default: Option<Value>,
    pub format: Option<String>,
    pub target: Option<TargetType>,
    pub trim: Option<bool>,
}

impl ColumnOverride {
    pub fn new(key: &str) -> Self {
        Self { key: key.to_owned(), ..Default::default() }
    }

    /// Replaces the candidate names.
    pub fn names<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.names = Some(names.into_iter().map(str::to_owned).collect());
        self
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = Some(ignore);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_owned());
        self
    }

    pub fn target(mut self, target: TargetType) -> Self {
        self.target = Some(target);
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = Some(trim);
        self
    }

    fn apply(&self, column: &mut ColumnSpec) {
        if let Some(names) = &self.names {
            column.names.clear();
            for name in names {
                if !column.names.contains(name) {
                    column.names.push(name.to_owned());
                }
            }
        }
        if let Some(index) = self.index {
            column.index = Some(index);
        }
        if let Some(strategy) = self.strategy {
            column.strategy = strategy;
        }
        if let Some(required) = self.required {
            column.required = required;
        }
        if let Some(ignore) = self.ignore {
            column.ignore = ignore;
        }
        if let Some(default) = &self.default {
            column.default = Some(default.clone());
        }
        if let Some(format) = &self.format {
            column.format = Some(format.to_owned());
        }
        if let Some(target) = &self.target {
            column.target = target.clone();
        }
        if let Some(trim) = self.trim {
            column.trim = trim;
        }
    }

    fn into_column(self) -> ColumnSpec {
        let mut column = ColumnSpec::new(&self.key);
        self.apply(&mut column);
        column
    }
}

/// Merges runtime overrides into declared columns, keyed by logical identifier.
///
/// Declared order is preserved. Overrides naming an unknown key are appended
/// as new dictionary columns when `append_unknown` is set and dropped
/// otherwise. Every resulting column has at least one candidate name.
pub fn merge_columns(
    declared: Vec<ColumnSpec>,
    overrides: &[ColumnOverride],
    append_unknown: bool,
) -> Vec<ColumnSpec> {
    let mut columns = declared;
    for column_override in overrides {
        match columns.iter_mut().find(|column| column.key == column_override.key) {
            Some(column) => column_override.apply(column),
            None if append_unknown => columns.push(column_override.clone().into_column()),
            None => log::warn!("Column override '{}' matches no declared column", column_override.key),
        }
    }
    for column in columns.iter_mut() {
        column.ensure_names();
    }
    columns
}
