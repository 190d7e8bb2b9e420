use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::aideon::leads::aliases::AliasTable;
use crate::aideon::leads::model::{CanonicalField, RawRecord};

/// A source column chosen for a canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    /// Position of the column in the header row.
    pub index: usize,
    /// Header text exactly as it appeared in the file.
    pub header: String,
}

/// Result of matching one file's header row against the alias table.
///
/// Fields with no matching header are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, SourceColumn>,
}

impl ColumnMapping {
    pub fn column(&self, field: CanonicalField) -> Option<&SourceColumn> {
        self.columns.get(&field)
    }

    /// Source header resolved for `field`, if any.
    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.column(field).map(|column| column.header.as_str())
    }

    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Rows can only produce records when a phone column exists.
    pub fn has_phone(&self) -> bool {
        self.is_resolved(CanonicalField::Phone)
    }

    /// Reads the cell backing `field` from `row`.
    pub fn value<'r>(&self, field: CanonicalField, row: &'r RawRecord) -> Option<&'r str> {
        self.column(field).and_then(|column| row.cell(column.index))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &SourceColumn)> {
        self.columns.iter().map(|(field, column)| (*field, column))
    }
}

/// Matches header rows to canonical fields using an injected [`AliasTable`].
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    aliases: AliasTable,
}

impl ColumnResolver {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolves each canonical field to at most one header. For every field
    /// the first alias, in declaration order, that matches a header wins.
    /// Headers are compared lowercased and trimmed; when two headers collide
    /// after normalisation the left-most one is used.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ColumnMapping {
        let mut by_key: HashMap<String, usize> = HashMap::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            by_key.entry(normalize_header(header.as_ref())).or_insert(index);
        }

        let mut columns = BTreeMap::new();
        for field in self.aliases.fields() {
            let matched = self
                .aliases
                .aliases(field)
                .iter()
                .find_map(|alias| by_key.get(&normalize_header(alias)).copied());

            if let Some(index) = matched {
                let header = headers[index].as_ref().to_string();
                debug!(%field, header = %header, "resolved column");
                columns.insert(field, SourceColumn { index, header });
            }
        }

        ColumnMapping { columns }
    }
}

/// Lowercases and trims a header or alias for comparison.
pub fn normalize_header(text: &str) -> String {
    text.trim().to_lowercase()
}
