use crate::vvlib::{
    ParsedTable, Result, Value, VariantKey, VariantRow, VarvennError, GENE_COLUMN, HET, HOM,
    ROUND_PLACES, ZYGOSITY_COLUMN,
};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Genotype recorded for a sample whose table carries no zygosity
pub const UNKNOWN_GENOTYPE: &str = "UNKWN";

pub const STORE_FREQ_COLUMN: &str = "VARDB_FREQ";
pub const ALLELE_FREQ_COLUMN: &str = "ALLELE_FREQ";

const JOIN_SEP: &str = " | ";

/// Everything the store keeps about one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub key: VariantKey,
    pub genes: IndexSet<String>,
    pub hgvs_c: IndexSet<String>,
    pub hgvs_p: IndexSet<String>,
    /// sample -> HOM / HET / UNKWN
    pub genotypes: IndexMap<String, String>,
}

impl FrequencyEntry {
    fn new(key: VariantKey) -> Self {
        Self {
            key,
            genes: IndexSet::new(),
            hgvs_c: IndexSet::new(),
            hgvs_p: IndexSet::new(),
            genotypes: IndexMap::new(),
        }
    }

    fn absorb(&mut self, sample: &str, row: &VariantRow, has_zygosity: bool) {
        for (set, column) in [
            (&mut self.genes, GENE_COLUMN),
            (&mut self.hgvs_c, "HGVS.C"),
            (&mut self.hgvs_p, "HGVS.P"),
        ] {
            let value = row.get(column);
            if !value.is_missing() {
                set.insert(value.to_string());
            }
        }
        let genotype = if has_zygosity {
            row.get(ZYGOSITY_COLUMN).to_string()
        } else {
            UNKNOWN_GENOTYPE.to_string()
        };
        self.genotypes.insert(sample.to_string(), genotype);
    }

    fn count(&self, genotype: &str) -> usize {
        self.genotypes.values().filter(|g| *g == genotype).count()
    }
}

fn joined(set: &IndexSet<String>) -> Value {
    Value::from(set.iter().join(JOIN_SEP))
}

/// Per-variant carrier counts across every sample added so far
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyStore {
    samples: IndexSet<String>,
    entries: Vec<FrequencyEntry>,
    #[serde(skip)]
    index: HashMap<VariantKey, usize>,
}

impl FrequencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &IndexSet<String> {
        &self.samples
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records one sample's variants. A sample already present is skipped.
    pub fn add_table(&mut self, table: &ParsedTable) -> bool {
        let sample = table.name();
        if self.samples.contains(sample) {
            warn!("{} already in the frequency store, skipping", sample);
            return false;
        }
        if table.is_comparison() {
            warn!("adding comparison table {} as one sample", sample);
        }
        let has_zygosity = table.has_column(ZYGOSITY_COLUMN);
        if !has_zygosity {
            warn!("{} has no {}, genotypes stored as {}", sample, ZYGOSITY_COLUMN, UNKNOWN_GENOTYPE);
        }

        self.samples.insert(sample.to_string());
        for row in table.rows() {
            let idx = match self.index.get(&row.key) {
                Some(&idx) => idx,
                None => {
                    self.entries.push(FrequencyEntry::new(row.key.clone()));
                    self.index.insert(row.key.clone(), self.entries.len() - 1);
                    self.entries.len() - 1
                }
            };
            self.entries[idx].absorb(sample, row, has_zygosity);
        }
        info!(
            "frequency store: {} samples, {} variants",
            self.samples.len(),
            self.entries.len()
        );
        true
    }

    pub fn get(&self, key: &VariantKey) -> Option<&FrequencyEntry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Share of samples carrying the variant
    pub fn freq(&self, key: &VariantKey) -> Option<f64> {
        let entry = self.get(key)?;
        Some(entry.genotypes.len() as f64 / self.samples.len() as f64)
    }

    /// Share of alleles carrying the variant, counting HOM twice
    pub fn allele_freq(&self, key: &VariantKey) -> Option<f64> {
        let entry = self.get(key)?;
        let alleles = 2 * entry.count(HOM) + entry.count(HET);
        Some(alleles as f64 / (2 * self.samples.len()) as f64)
    }

    /// A copy of `table` with the store's frequencies appended
    pub fn annotate(&self, table: &ParsedTable) -> ParsedTable {
        let mut result = table.clone();
        result.drop_columns(&[STORE_FREQ_COLUMN, ALLELE_FREQ_COLUMN]);
        for row in result.rows_mut() {
            let freq = self.freq(&row.key).map(Value::from).unwrap_or_default();
            let allele_freq = self.allele_freq(&row.key).map(Value::from).unwrap_or_default();
            row.set(STORE_FREQ_COLUMN, freq.rounded(ROUND_PLACES));
            row.set(ALLELE_FREQ_COLUMN, allele_freq.rounded(ROUND_PLACES));
        }
        result.add_column(STORE_FREQ_COLUMN);
        result.add_column(ALLELE_FREQ_COLUMN);
        result
    }

    /// One row per variant: genes, HGVS, frequencies and every sample's genotype
    pub fn to_table(&self) -> ParsedTable {
        let mut columns: Vec<String> = vec![
            GENE_COLUMN.to_string(),
            "HGVS.C".to_string(),
            "HGVS.P".to_string(),
            "FREQ".to_string(),
            ALLELE_FREQ_COLUMN.to_string(),
        ];
        columns.extend(self.samples.iter().cloned());
        let mut table = ParsedTable::with_columns("vardb", columns);

        for entry in self.entries.iter() {
            let mut row = VariantRow::new(entry.key.clone());
            row.set(GENE_COLUMN, joined(&entry.genes));
            row.set("HGVS.C", joined(&entry.hgvs_c));
            row.set("HGVS.P", joined(&entry.hgvs_p));
            let freq = self.freq(&entry.key).map(Value::from).unwrap_or_default();
            let allele_freq = self.allele_freq(&entry.key).map(Value::from).unwrap_or_default();
            row.set("FREQ", freq.rounded(ROUND_PLACES));
            row.set(ALLELE_FREQ_COLUMN, allele_freq.rounded(ROUND_PLACES));
            for sample in self.samples.iter() {
                let genotype = entry
                    .genotypes
                    .get(sample)
                    .map(|g| Value::from(g.as_str()))
                    .unwrap_or_default();
                row.set(sample, genotype);
            }
            table.push_row(row);
        }
        table
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| VarvennError::file(path, e))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| VarvennError::file(path, e))?;
        info!("saved frequency store to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| VarvennError::file(path, e))?;
        let reader = BufReader::new(file);
        let mut store: FrequencyStore =
            serde_json::from_reader(reader)
                .map_err(|e| VarvennError::parse(&path.display().to_string(), e))?;
        store.index = store
            .entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.key.clone(), idx))
            .collect();
        info!(
            "loaded frequency store {} ({} samples, {} variants)",
            path.display(),
            store.samples.len(),
            store.entries.len()
        );
        Ok(store)
    }
}
