//! Parsed records and header mapping

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CsvError, CsvResult};

/// Column-name to index mapping shared by all records of one parse.
#[derive(Debug)]
pub struct HeaderMap {
    names: Vec<String>,
    index: HashMap<String, usize>,
    ignore_case: bool,
}

impl HeaderMap {
    pub(crate) fn new(
        names: Vec<String>,
        ignore_case: bool,
        allow_missing_column_names: bool,
    ) -> CsvResult<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let key = fold(name, ignore_case);
            let missing = name.trim().is_empty();
            if index.insert(key, i).is_some() && !(missing && allow_missing_column_names) {
                return Err(CsvError::DuplicateHeaderName { name: name.clone() });
            }
        }
        Ok(HeaderMap {
            names,
            index,
            ignore_case,
        })
    }

    /// The column names in declaration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of a column, honoring the dialect's case sensitivity
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&fold(name, self.ignore_case)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn fold(name: &str, ignore_case: bool) -> String {
    if ignore_case {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

/// One parsed record.
///
/// A field whose raw text matched the dialect's null string is stored as
/// `None`; everything else is `Some`.
#[derive(Debug, Clone)]
pub struct CsvRecord {
    values: Vec<Option<String>>,
    mapping: Option<Arc<HeaderMap>>,
    comment: Option<String>,
    record_number: u64,
    character_position: u64,
}

impl CsvRecord {
    pub(crate) fn new(
        values: Vec<Option<String>>,
        mapping: Option<Arc<HeaderMap>>,
        comment: Option<String>,
        record_number: u64,
        character_position: u64,
    ) -> Self {
        CsvRecord {
            values,
            mapping,
            comment,
            record_number,
            character_position,
        }
    }

    /// Field at `index`; `None` when the index is out of range or the field
    /// was the null string
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Field by column name.
    ///
    /// Errors when the parse carried no header, the name is unknown, or the
    /// header is wider than this record.
    pub fn get_by_name(&self, name: &str) -> CsvResult<Option<&str>> {
        let mapping = self.mapping.as_ref().ok_or(CsvError::NoHeaderMapping)?;
        let index = mapping
            .index_of(name)
            .ok_or_else(|| CsvError::ColumnNotFound {
                name: name.to_string(),
                known: mapping.names().join(", "),
            })?;
        match self.values.get(index) {
            Some(v) => Ok(v.as_deref()),
            None => Err(CsvError::ColumnIndexOutOfRange {
                name: name.to_string(),
                index,
                size: self.values.len(),
            }),
        }
    }

    /// All fields in order
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the field count matches the header width (vacuously true
    /// without a header)
    pub fn is_consistent(&self) -> bool {
        self.mapping
            .as_ref()
            .map_or(true, |m| m.len() == self.values.len())
    }

    /// Whether the parse carried a header
    pub fn is_mapped(&self, name: &str) -> bool {
        self.mapping.as_ref().is_some_and(|m| m.contains(name))
    }

    /// Whether `name` is mapped to an index this record actually has
    pub fn is_set(&self, name: &str) -> bool {
        self.mapping
            .as_ref()
            .and_then(|m| m.index_of(name))
            .is_some_and(|i| i < self.values.len())
    }

    /// Whether comment lines preceded this record
    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    /// Comment lines preceding this record, joined with `\n`
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// 1-based ordinal of this record within the parse
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    /// Character offset of the start of this record within the input
    pub fn character_position(&self) -> u64 {
        self.character_position
    }

    /// Copy the record into a name-to-value map; requires a header
    pub fn to_map(&self) -> CsvResult<HashMap<String, Option<String>>> {
        let mapping = self.mapping.as_ref().ok_or(CsvError::NoHeaderMapping)?;
        let mut map = HashMap::with_capacity(mapping.len());
        for name in mapping.names() {
            map.insert(name.clone(), self.get_by_name(name)?.map(String::from));
        }
        Ok(map)
    }
}

impl fmt::Display for CsvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CsvRecord [comment={:?}, mapping={:?}, record_number={}, values={:?}]",
            self.comment,
            self.mapping.as_ref().map(|m| m.names()),
            self.record_number,
            self.values
        )
    }
}

impl<'a> IntoIterator for &'a CsvRecord {
    type Item = &'a Option<String>;
    type IntoIter = std::slice::Iter<'a, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
