use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The one representation of an absent value
pub const MISSING: &str = ".";

/// Column holding the Venn membership label of a comparison table
pub const MEMBERSHIP_COLUMN: &str = "VENN";

/// Separator between sample names in table names and membership labels
pub const NAME_SEP: &str = ":";

/// Places kept when rounding numeric columns
pub const ROUND_PLACES: i32 = 6;

/// One allele at one site
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantKey {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alt: String,
}

impl VariantKey {
    pub fn new(chrom: &str, pos: u64, reference: &str, alt: &str) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_string(),
            alt: alt.to_string(),
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}>{}", self.chrom, self.pos, self.reference, self.alt)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

static MISSING_VALUE: Value = Value::Missing;

impl Value {
    /// Builds a value from source text; blanks, `.` and `nan` are missing
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == MISSING || raw.eq_ignore_ascii_case("nan") {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|x| !x.is_nan()),
            Value::Missing => None,
        }
    }

    /// Numeric coercion. Anything unparseable becomes missing.
    pub fn coerce_number(&self) -> Value {
        match self.as_number() {
            Some(x) => Value::Number(x),
            None => Value::Missing,
        }
    }

    pub fn rounded(&self, places: i32) -> Value {
        match self {
            Value::Number(x) => {
                let scale = 10f64.powi(places);
                Value::Number((x * scale).round() / scale)
            }
            other => other.clone(),
        }
    }

    /// This value, or `other` when this one is missing
    pub fn or<'a>(&'a self, other: &'a Value) -> &'a Value {
        if self.is_missing() {
            other
        } else {
            self
        }
    }

    /// Values are compared on their rendered form
    pub fn same_as(&self, other: &Value) -> bool {
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "{}", MISSING),
            // avoid printing -0
            Value::Number(x) if *x == 0.0 => write!(f, "0"),
            Value::Number(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::from_raw(raw)
    }
}

impl From<String> for Value {
    fn from(raw: String) -> Self {
        Value::from_raw(&raw)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        if x.is_nan() {
            Value::Missing
        } else {
            Value::Number(x)
        }
    }
}

/// A key plus a sparse column -> value mapping. Absent columns read as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRow {
    pub key: VariantKey,
    pub values: IndexMap<String, Value>,
}

impl VariantRow {
    pub fn new(key: VariantKey) -> Self {
        Self {
            key,
            values: IndexMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&MISSING_VALUE)
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    pub fn take(&mut self, column: &str) -> Value {
        self.values.shift_remove(column).unwrap_or_default()
    }
}

/// Ordered rows plus the provenance name of the sample(s) they came from
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    name: String,
    columns: IndexSet<String>,
    rows: Vec<VariantRow>,
}

/// A table carrying a membership column. Only the comparison engine makes these.
pub type ComparisonTable = ParsedTable;

impl ParsedTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: IndexSet::new(),
            rows: vec![],
        }
    }

    pub fn with_columns<I, S>(name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constituent sample names, in comparison order
    pub fn sample_names(&self) -> Vec<&str> {
        self.name.split(NAME_SEP).collect()
    }

    pub fn columns(&self) -> &IndexSet<String> {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Error unless `column` is present
    pub fn require_column(&self, column: &str) -> crate::vvlib::Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(crate::vvlib::VarvennError::MissingColumn {
                column: column.to_string(),
                table: self.name.clone(),
            })
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.has_column(MEMBERSHIP_COLUMN)
    }

    pub fn rows(&self) -> &[VariantRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [VariantRow] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<VariantRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_column(&mut self, column: &str) {
        if !self.columns.contains(column) {
            self.columns.insert(column.to_string());
        }
    }

    /// Appends a row, registering any columns the table hasn't seen
    pub fn push_row(&mut self, row: VariantRow) {
        for column in row.values.keys() {
            if !self.columns.contains(column) {
                self.columns.insert(column.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn drop_column(&mut self, column: &str) {
        if self.columns.shift_remove(column) {
            for row in self.rows.iter_mut() {
                row.values.shift_remove(column);
            }
        }
    }

    pub fn drop_columns<S: AsRef<str>>(&mut self, columns: &[S]) {
        for column in columns {
            self.drop_column(column.as_ref());
        }
    }

    /// Renames a column in place, keeping its position. Overwrites `to` if present.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to || !self.columns.contains(from) {
            return;
        }
        self.drop_column(to);
        self.columns = self
            .columns
            .drain(..)
            .map(|c| if c == from { to.to_string() } else { c })
            .collect();
        for row in self.rows.iter_mut() {
            if let Some(idx) = row.values.get_index_of(from) {
                if let Some((_, value)) = row.values.shift_remove_index(idx) {
                    row.values.shift_insert(idx, to.to_string(), value);
                }
            }
        }
    }

    /// Replaces every value of `column` with `f(value)`
    pub fn map_column<F>(&mut self, column: &str, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        if !self.has_column(column) {
            return;
        }
        for row in self.rows.iter_mut() {
            let new_value = f(row.get(column));
            row.set(column, new_value);
        }
    }

    /// Rows for which `keep` is true, under the same name and columns
    pub fn filtered<F>(&self, mut keep: F) -> ParsedTable
    where
        F: FnMut(&VariantRow) -> bool,
    {
        ParsedTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Row position by key
    pub fn key_index(&self) -> HashMap<&VariantKey, usize> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (&row.key, idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(alt: &str, pairs: &[(&str, &str)]) -> VariantRow {
        let mut row = VariantRow::new(VariantKey::new("1", 100, "A", alt));
        for (k, v) in pairs {
            row.set(k, Value::from(*v));
        }
        row
    }

    #[test]
    fn raw_missing_forms_collapse() {
        assert!(Value::from_raw("").is_missing());
        assert!(Value::from_raw(".").is_missing());
        assert!(Value::from_raw("nan").is_missing());
        assert_eq!(Value::from_raw("PASS"), Value::Text("PASS".to_string()));
    }

    #[test]
    fn coercion_and_rounding() {
        assert_eq!(Value::from("0.1234567").coerce_number().rounded(6).to_string(), "0.123457");
        assert!(Value::from("abc").coerce_number().is_missing());
        assert_eq!(Value::Number(12.0).to_string(), "12");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
    }

    #[test]
    fn rename_keeps_position() {
        let mut table = ParsedTable::new("S1");
        table.push_row(row("C", &[("A1", "x"), ("B1", "y"), ("C1", "z")]));
        table.rename_column("B1", "BB");
        let cols: Vec<&str> = table.columns().iter().map(|s| s.as_str()).collect();
        assert_eq!(cols, vec!["A1", "BB", "C1"]);
        let keys: Vec<&str> = table.rows()[0].values.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["A1", "BB", "C1"]);
        assert_eq!(table.rows()[0].get("BB").to_string(), "y");
    }

    #[test]
    fn absent_values_read_missing() {
        let mut table = ParsedTable::new("S1");
        table.push_row(row("C", &[("DP", "10")]));
        table.push_row(row("T", &[("AF", "0.5")]));
        assert!(table.rows()[0].get("AF").is_missing());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn filtered_keeps_name() {
        let mut table = ParsedTable::new("S1:S2");
        table.push_row(row("C", &[]));
        table.push_row(row("T", &[]));
        let sub = table.filtered(|r| r.key.alt == "T");
        assert_eq!(sub.name(), "S1:S2");
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.sample_names(), vec!["S1", "S2"]);
    }
}
