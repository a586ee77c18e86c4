use crate::database::column::ColumnSpec;
use crate::database::column::MatchStrategy;
use crate::database::table::ConfigurationError;
use crate::database::table::WhitespaceMode;
use regex::Regex;
use regex::RegexBuilder;
use std::collections::BTreeMap;
use std::collections::HashSet;
use thiserror::Error;

/// Failure to bind declared columns to the physical header.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Required column(s) not found: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("None of the declared columns matches the header")]
    NoColumns,
}

/// Frozen physical-index to column map of one table session.
///
/// One physical column may feed several columns (fan-out); a column is bound
/// to at most one physical index.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBinding {
    columns: Vec<ColumnSpec>,
    targets: BTreeMap<usize, Vec<usize>>,
}

impl ResolvedBinding {
    /// Columns bound to a physical index, in declaration order.
    pub fn columns_at(&self, index: usize) -> impl Iterator<Item = &ColumnSpec> {
        self.targets
            .get(&index)
            .into_iter()
            .flatten()
            .map(|position| &self.columns[*position])
    }

    /// `(physical index, column)` pairs ordered by physical index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ColumnSpec)> {
        self.targets
            .iter()
            .flat_map(move |(index, positions)| positions.iter().map(move |position| (*index, &self.columns[*position])))
    }

    /// `(physical index, column)` pairs ordered by column declaration.
    pub fn in_declared_order(&self) -> Vec<(usize, &ColumnSpec)> {
        let mut pairs = self
            .targets
            .iter()
            .flat_map(|(index, positions)| positions.iter().map(move |position| (*position, *index)))
            .collect::<Vec<_>>();
        pairs.sort_unstable();
        pairs.into_iter().map(|(position, index)| (index, &self.columns[position])).collect()
    }

    /// Physical index a column was bound to.
    pub fn physical_index(&self, key: &str) -> Option<usize> {
        self.iter().find(|(_, column)| column.key == key).map(|(index, _)| index)
    }

    /// Physical indexes with at least one bound column.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.targets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Matches column specs against header text.
///
/// Regular expressions are compiled once here, so an invalid pattern is a
/// configuration error raised before any row is read.
#[derive(Debug)]
pub struct ColumnResolver {
    columns: Vec<ColumnSpec>,
    patterns: Vec<Vec<Regex>>,
    whitespace: WhitespaceMode,
}

impl ColumnResolver {
    pub fn new(columns: Vec<ColumnSpec>, whitespace: WhitespaceMode) -> Result<Self, ConfigurationError> {
        let patterns = columns
            .iter()
            .map(|column| {
                if column.ignore || !column.strategy.contains(MatchStrategy::REGEX) {
                    return Ok(Vec::new());
                }
                column
                    .names
                    .iter()
                    .filter(|name| !name.is_empty())
                    .map(|name| {
                        RegexBuilder::new(name)
                            .case_insensitive(column.strategy.contains(MatchStrategy::IGNORE_CASE))
                            .build()
                            .map_err(|e| ConfigurationError::InvalidPattern {
                                pattern: name.to_owned(),
                                message: e.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, patterns, whitespace })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Binds every column to a physical index.
    ///
    /// # Arguments
    /// * `headers` - Header text per physical index; column letters when the
    ///   table has no header row
    ///
    /// # Returns
    /// The binding, or a `MappingError` naming every unresolved required column.
    pub fn resolve(&self, headers: &BTreeMap<usize, String>) -> Result<ResolvedBinding, MappingError> {
        let mut targets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut bound = vec![false; self.columns.len()];

        for (position, column) in self.columns.iter().enumerate() {
            if let (false, Some(index)) = (column.ignore, column.index) {
                targets.entry(index).or_default().push(position);
                bound[position] = true;
            }
        }

        let mut seen = HashSet::new();
        for (index, header) in headers {
            let processed = self.whitespace.apply(header);
            if !processed.is_empty() && !seen.insert(processed.to_lowercase()) {
                log::warn!("Duplicate header '{}' at column {}", header, crate::spreadsheet::reference::index_to_col(*index));
            }
            for (position, column) in self.columns.iter().enumerate() {
                if bound[position] || column.ignore || column.index.is_some() {
                    continue;
                }
                if !column.names.iter().any(|name| !name.is_empty()) {
                    continue;
                }
                if self.matches(position, &processed) || (processed != header.as_str() && self.matches(position, header)) {
                    targets.entry(*index).or_default().push(position);
                    bound[position] = true;
                }
            }
        }
        for positions in targets.values_mut() {
            positions.sort_unstable();
        }

        let missing = self
            .columns
            .iter()
            .zip(&bound)
            .filter(|(column, bound)| column.required && !column.ignore && !**bound)
            .map(|(column, _)| column.display_name().to_owned())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(MappingError::MissingColumns(missing));
        }
        if targets.is_empty() && self.columns.iter().any(|column| !column.ignore) {
            return Err(MappingError::NoColumns);
        }

        let binding = ResolvedBinding { columns: self.columns.clone(), targets };
        log::debug!(
            "Resolved columns: {}",
            binding
                .iter()
                .map(|(index, column)| format!("{} => {}", crate::spreadsheet::reference::index_to_col(index), column.key))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(binding)
    }

    /// Applies the first strategy branch in precedence order.
    fn matches(&self, position: usize, header: &str) -> bool {
        let column = &self.columns[position];
        let strategy = column.strategy;
        let ignore_case = strategy.contains(MatchStrategy::IGNORE_CASE);
        let fold = |text: &str| if ignore_case { text.to_lowercase() } else { text.to_owned() };
        let header = fold(header);
        let mut names = column.names.iter().filter(|name| !name.is_empty()).map(|name| fold(name.as_str()));

        if strategy.contains(MatchStrategy::CONTAINS) {
            let key = fold(column.key.as_str());
            (!key.is_empty() && header.contains(&key)) || names.any(|name| header.contains(&name))
        } else if strategy.contains(MatchStrategy::PREFIX) {
            names.any(|name| header.starts_with(&name))
        } else if strategy.contains(MatchStrategy::SUFFIX) {
            names.any(|name| header.ends_with(&name))
        } else if strategy.contains(MatchStrategy::REGEX) {
            header == fold(column.key.as_str()) || self.patterns[position].iter().any(|pattern| pattern.is_match(&header))
        } else {
            names.any(|name| name == header)
        }
    }
}
