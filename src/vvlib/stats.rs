use crate::vvlib::{
    ComparisonMode, ParsedTable, Region, Result, VarvennError, MEMBERSHIP_COLUMN,
    ZYGOSITY_COLUMN,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VennCount {
    /// Letter form, e.g. `A:C`
    pub region: String,
    /// Same region with sample names
    pub label: String,
    pub count: usize,
}

/// Rows per membership region, every legal region listed even when empty
pub fn venn_counts(table: &ParsedTable) -> Result<Vec<VennCount>> {
    table.require_column(MEMBERSHIP_COLUMN)?;
    let names = table.sample_names();
    let mode = ComparisonMode::for_samples(names.len()).ok_or_else(|| {
        VarvennError::InvalidRegion {
            region: table.name().to_string(),
            mode: format!("{} samples", names.len()),
        }
    })?;

    let regions = mode.regions();
    let mut counts: Vec<VennCount> = regions
        .iter()
        .map(|r| VennCount {
            region: r.code(),
            label: r.label(&names),
            count: 0,
        })
        .collect();

    for row in table.rows() {
        let label = row.get(MEMBERSHIP_COLUMN).to_string();
        let slot = Region::from_label(&label, &names)
            .and_then(|r| regions.iter().position(|p| *p == r));
        match slot {
            Some(idx) => counts[idx].count += 1,
            None => debug!("{} has unrecognized membership {}", row.key, label),
        }
    }
    Ok(counts)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralStats {
    pub columns: Vec<String>,
    pub groups: Vec<GroupCount>,
}

/// Row counts grouped by chromosome, zygosity (single samples only), variant
/// type, impact and effect. `None` when any grouping column is absent.
pub fn general_stats(table: &ParsedTable) -> Option<GeneralStats> {
    let mut columns = vec!["CHROM", ZYGOSITY_COLUMN, "VARTYPE", "IMPACT", "EFFECT"];
    if table.is_comparison() {
        columns.retain(|c| *c != ZYGOSITY_COLUMN);
    }
    if columns[1..].iter().any(|c| !table.has_column(c)) {
        return None;
    }
    info!("calculating general statistics for {}", table.name());

    let mut groups: BTreeMap<Vec<String>, usize> = BTreeMap::new();
    for row in table.rows() {
        let group: Vec<String> = columns
            .iter()
            .map(|c| match *c {
                "CHROM" => row.key.chrom.clone(),
                other => row.get(other).to_string(),
            })
            .collect();
        *groups.entry(group).or_insert(0) += 1;
    }

    Some(GeneralStats {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        groups: groups
            .into_iter()
            .map(|(group, count)| GroupCount { group, count })
            .collect(),
    })
}

/// Everything `--stats` writes for one result table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub name: String,
    pub rows: usize,
    pub venn: Option<Vec<VennCount>>,
    pub general: Option<GeneralStats>,
}

impl TableStats {
    pub fn new(table: &ParsedTable) -> Result<Self> {
        let venn = if table.is_comparison() {
            Some(venn_counts(table)?)
        } else {
            None
        };
        Ok(Self {
            name: table.name().to_string(),
            rows: table.len(),
            venn,
            general: general_stats(table),
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| VarvennError::file(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| VarvennError::file(path, e))?;
        info!("wrote statistics to {}", path.display());
        Ok(())
    }
}
