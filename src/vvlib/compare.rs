use crate::vvlib::{
    ComparisonMode, ComparisonTable, CompareParams, ParsedTable, RecordParser, Region, Result,
    Value, VariantKey, VariantRow, VarvennError, MEMBERSHIP_COLUMN, NAME_SEP, ZYGOSITY_COLUMN,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Where an output column's value comes from
#[derive(Debug, Clone)]
enum ColumnSource {
    First(String),
    Second(String),
    /// Collapsed collision: first side unless missing
    Merged(String),
}

/// Roles of the two inputs for one comparison
struct Plan<'a> {
    mode: ComparisonMode,
    /// Constituent names in argument order, which is also region letter order
    names: Vec<&'a str>,
    /// Trios only: which argument holds the existing duos table
    duos_is_first: bool,
}

impl Plan<'_> {
    /// Trios only: letter and name of the sample being folded in
    fn single(&self) -> (Region, &str) {
        if self.duos_is_first {
            (Region::C, self.names[2])
        } else {
            (Region::A, self.names[0])
        }
    }
}

/// Merges two tables into a membership-labelled table
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    params: CompareParams,
}

impl Comparator {
    pub fn new(params: CompareParams) -> Self {
        Self { params }
    }

    /// Parses `source` and compares `left` against it
    pub fn compare_source(
        &self,
        left: &ParsedTable,
        parser: &RecordParser,
        source: &Path,
        region: Option<&str>,
    ) -> Result<ComparisonTable> {
        let right = parser.parse_path(source)?;
        self.compare(left, &right, region)
    }

    /// Outer join of two tables on variant key. When one side is already a
    /// duos comparison, the result is a trios comparison. Inputs are left
    /// untouched.
    pub fn compare(
        &self,
        left: &ParsedTable,
        right: &ParsedTable,
        region: Option<&str>,
    ) -> Result<ComparisonTable> {
        let plan = plan(left, right)?;
        let wanted = region
            .map(|r| Region::parse(r, plan.mode))
            .transpose()?;
        let name = plan.names.join(NAME_SEP);
        info!("running {} analysis on {}", plan.mode, name);

        let (first, second) = self.prepare(left, right, &plan);
        let layout = self.column_layout(&first, &second);

        let mut columns: Vec<String> = layout.iter().map(|(c, _)| c.clone()).collect();
        columns.push(MEMBERSHIP_COLUMN.to_string());
        let mut table = ParsedTable::with_columns(&name, columns);

        let second_index = second.key_index();
        let mut matched = vec![false; second.len()];
        let mut joined: Vec<(Option<&VariantRow>, Option<&VariantRow>)> =
            Vec::with_capacity(first.len() + second.len());
        for row in first.rows() {
            match second_index.get(&row.key) {
                Some(&idx) => {
                    matched[idx] = true;
                    joined.push((Some(row), Some(&second.rows()[idx])));
                }
                None => joined.push((Some(row), None)),
            }
        }
        for (row, seen) in second.rows().iter().zip(matched.iter()) {
            if !seen {
                joined.push((None, Some(row)));
            }
        }

        for (first_row, second_row) in joined {
            let (row_region, label) = membership(&plan, first_row, second_row)?;
            if wanted.is_some_and(|w| w != row_region) {
                continue;
            }
            let key = match (first_row, second_row) {
                (Some(r), _) | (None, Some(r)) => r.key.clone(),
                (None, None) => continue,
            };
            let mut out = VariantRow::new(key);
            for (column, source) in layout.iter() {
                let value = match source {
                    ColumnSource::First(c) => side_value(first_row, c),
                    ColumnSource::Second(c) => side_value(second_row, c),
                    ColumnSource::Merged(c) => side_value(first_row, c)
                        .or(&side_value(second_row, c))
                        .clone(),
                };
                out.set(column, value);
            }
            out.set(MEMBERSHIP_COLUMN, Value::Text(label));
            table.push_row(out);
        }

        if table.is_empty() {
            return Err(VarvennError::EmptySelection {
                region: wanted.map(|w| w.code()).unwrap_or_else(|| "*".to_string()),
                table: name,
            });
        }
        info!("{} rows in {}", table.len(), table.name());
        Ok(table)
    }

    /// Copies of both inputs with call-quality columns dropped. In trios mode
    /// the single sample's zygosity is renamed.
    fn prepare(
        &self,
        left: &ParsedTable,
        right: &ParsedTable,
        plan: &Plan,
    ) -> (ParsedTable, ParsedTable) {
        let mut first = left.clone();
        let mut second = right.clone();
        first.drop_columns(&self.params.call_quality_columns);
        second.drop_columns(&self.params.call_quality_columns);

        if plan.mode == ComparisonMode::Trios {
            let single = if plan.duos_is_first {
                &mut second
            } else {
                &mut first
            };
            let renamed = format!("{}_{}", ZYGOSITY_COLUMN, single.name());
            single.rename_column(ZYGOSITY_COLUMN, &renamed);
        }
        (first, second)
    }

    /// Output columns in order: first side's columns (collisions resolved in
    /// place), then the second side's own columns. An existing membership
    /// column is replaced, not carried.
    fn column_layout(
        &self,
        first: &ParsedTable,
        second: &ParsedTable,
    ) -> Vec<(String, ColumnSource)> {
        let second_index = second.key_index();
        let mut layout = vec![];

        for column in first.columns() {
            if column == MEMBERSHIP_COLUMN {
                continue;
            }
            if !second.has_column(column) {
                layout.push((column.clone(), ColumnSource::First(column.clone())));
                continue;
            }
            if self.params.is_invariant(column)
                || agrees(first, second, &second_index, column)
            {
                layout.push((column.clone(), ColumnSource::Merged(column.clone())));
                continue;
            }
            warn!(
                "{} differs between {} and {}, keeping both",
                column,
                first.name(),
                second.name()
            );
            layout.push((
                format!("{}_{}", column, first.name()),
                ColumnSource::First(column.clone()),
            ));
            layout.push((
                format!("{}_{}", column, second.name()),
                ColumnSource::Second(column.clone()),
            ));
        }

        for column in second.columns() {
            if column != MEMBERSHIP_COLUMN && !first.has_column(column) {
                layout.push((column.clone(), ColumnSource::Second(column.clone())));
            }
        }
        layout
    }
}

/// Decides duos vs trios and the name order
fn plan<'a>(left: &'a ParsedTable, right: &'a ParsedTable) -> Result<Plan<'a>> {
    let ambiguous = || VarvennError::AmbiguousMerge {
        left: left.name().to_string(),
        right: right.name().to_string(),
    };

    let (mode, names, duos_is_first) = match (left.is_comparison(), right.is_comparison()) {
        (true, true) => return Err(ambiguous()),
        (false, false) => (ComparisonMode::Duos, vec![left.name(), right.name()], false),
        (true, false) => {
            let mut names = left.sample_names();
            names.push(right.name());
            (ComparisonMode::Trios, names, true)
        }
        (false, true) => {
            let mut names = vec![left.name()];
            names.extend(right.sample_names());
            (ComparisonMode::Trios, names, false)
        }
    };

    if names.len() != mode.n_samples() {
        return Err(ambiguous());
    }
    let mut seen = HashSet::new();
    for name in names.iter() {
        if !seen.insert(*name) {
            return Err(VarvennError::DuplicateSample {
                name: name.to_string(),
            });
        }
    }

    Ok(Plan {
        mode,
        names,
        duos_is_first,
    })
}

fn side_value(row: Option<&VariantRow>, column: &str) -> Value {
    row.map(|r| r.get(column).clone()).unwrap_or_default()
}

/// Every key present on both sides holds the same value for `column`
fn agrees(
    first: &ParsedTable,
    second: &ParsedTable,
    second_index: &HashMap<&VariantKey, usize>,
    column: &str,
) -> bool {
    first.rows().iter().all(|row| match second_index.get(&row.key) {
        Some(&idx) => row.get(column).same_as(second.rows()[idx].get(column)),
        None => true,
    })
}

/// Region and membership label of one joined row. In trios the label
/// extends the duos row's existing label with the single's name.
fn membership(
    plan: &Plan,
    first_row: Option<&VariantRow>,
    second_row: Option<&VariantRow>,
) -> Result<(Region, String)> {
    if plan.mode == ComparisonMode::Duos {
        let region = match (first_row, second_row) {
            (Some(_), Some(_)) => Region::A | Region::B,
            (Some(_), None) => Region::A,
            _ => Region::B,
        };
        return Ok((region, region.label(&plan.names)));
    }

    let (duos_row, single_row) = if plan.duos_is_first {
        (first_row, second_row)
    } else {
        (second_row, first_row)
    };
    let (single_bit, single_name) = plan.single();
    let existing = duos_row.map(|row| row.get(MEMBERSHIP_COLUMN).to_string());

    let mut region = match &existing {
        Some(label) => Region::from_label(label, &plan.names).ok_or_else(|| {
            VarvennError::InvalidRegion {
                region: label.clone(),
                mode: ComparisonMode::Duos.to_string(),
            }
        })?,
        None => Region::empty(),
    };
    if single_row.is_some() {
        region |= single_bit;
    }

    let label = match (existing, single_row) {
        (Some(label), Some(_)) => format!("{}{}{}", label, NAME_SEP, single_name),
        (Some(label), None) => label,
        (None, _) => single_name.to_string(),
    };
    Ok((region, label))
}
