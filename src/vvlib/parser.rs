use crate::vvlib::{
    amino_change, resolve_annotations, split_compound, strip_parentheses, translate,
    zygosity_from_flag, zygosity_from_genotype, ParsedTable, ParserParams, Result, SourceHeader,
    Value, VariantKey, VariantRow, VarvennError, FLAG_SET, HET, HOM, MISSING, ROUND_PLACES,
    ZYGOSITY_COLUMN,
};
use flate2::read::MultiGzDecoder;
use indexmap::IndexMap;
use itertools::Itertools;
use noodles_vcf::{
    self as vcf,
    variant::record_buf::{
        info::field::{value::Array, Value as InfoValue},
        samples::sample::Value as SampleValue,
    },
    variant::RecordBuf,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Where a source's zygosity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZygositySource {
    Flag,
    Genotype,
    Absent,
}

/// One VCF record before allele decomposition
#[derive(Debug)]
struct RawSite {
    chrom: String,
    pos: u64,
    reference: String,
    alts: Vec<String>,
    values: IndexMap<String, Value>,
    genotype: Option<String>,
}

impl RawSite {
    fn from_record(record: &RecordBuf) -> std::result::Result<Self, String> {
        let pos = record
            .variant_start()
            .map(|p| usize::from(p) as u64)
            .ok_or("missing position")?;
        let reference = record.reference_bases().to_string();
        if reference.is_empty() {
            return Err(format!("empty reference allele at position {}", pos));
        }
        let mut alts: Vec<String> = record.alternate_bases().as_ref().to_vec();
        if alts.is_empty() {
            alts.push(MISSING.to_string());
        }

        let mut values = IndexMap::new();
        values.insert(
            "ID".to_string(),
            Value::from_raw(&record.ids().as_ref().iter().join(";")),
        );
        values.insert(
            "QUAL".to_string(),
            record
                .quality_score()
                .map(|q| Value::from_raw(&q.to_string()))
                .unwrap_or_default(),
        );
        values.insert(
            "FILTER".to_string(),
            Value::from_raw(&record.filters().as_ref().iter().join(";")),
        );
        for (key, value) in record.info().as_ref().iter() {
            values.insert(key.clone(), info_value(value.as_ref()));
        }

        Ok(Self {
            chrom: record.reference_sequence_name().to_string(),
            pos,
            reference,
            alts,
            values,
            genotype: first_genotype(record),
        })
    }

    /// Raw entry identity: chrom, pos, ref and the whole ALT list
    fn site_key(&self) -> (String, u64, String, String) {
        (
            self.chrom.clone(),
            self.pos,
            self.reference.clone(),
            self.alts.join(","),
        )
    }
}

/// Text form of a typed INFO value. Lists are comma joined, flags become
/// [`FLAG_SET`].
fn info_value(value: Option<&InfoValue>) -> Value {
    let text = match value {
        None => return Value::Missing,
        Some(InfoValue::Flag) => FLAG_SET.to_string(),
        Some(InfoValue::Integer(n)) => n.to_string(),
        Some(InfoValue::Float(x)) => x.to_string(),
        Some(InfoValue::Character(c)) => c.to_string(),
        Some(InfoValue::String(s)) => s.clone(),
        Some(InfoValue::Array(array)) => match array {
            Array::Integer(items) => join_items(items),
            Array::Float(items) => join_items(items),
            Array::Character(items) => join_items(items),
            Array::String(items) => join_items(items),
        },
    };
    Value::from_raw(&text)
}

fn join_items<T: ToString>(items: &[Option<T>]) -> String {
    items
        .iter()
        .map(|i| match i {
            Some(x) => x.to_string(),
            None => MISSING.to_string(),
        })
        .join(",")
}

/// GT of the first sample as allele indexes, e.g. `0/1`
fn first_genotype(record: &RecordBuf) -> Option<String> {
    let samples = record.samples();
    let idx = samples.keys().as_ref().get_index_of("GT")?;
    let sample = samples.values().next()?;
    match sample.values().get(idx)? {
        Some(SampleValue::Genotype(genotype)) => Some(
            genotype
                .as_ref()
                .iter()
                .map(|allele| match allele.position() {
                    Some(p) => p.to_string(),
                    None => MISSING.to_string(),
                })
                .join("/"),
        ),
        Some(SampleValue::String(gt)) => Some(gt.clone()),
        _ => None,
    }
}

/// The `idx`th of `n_alleles` pieces of a per-allele value. A single value is
/// shared by every allele and any surplus stays on the last allele.
fn allele_piece(value: &Value, idx: usize, n_alleles: usize) -> Value {
    let Value::Text(text) = value else {
        return value.clone();
    };
    let parts: Vec<&str> = text.split(',').collect();
    let piece = if parts.len() == 1 {
        text.clone()
    } else if idx + 1 < n_alleles {
        match parts.get(idx) {
            Some(p) => p.to_string(),
            None => return Value::Missing,
        }
    } else if idx < parts.len() {
        parts[idx..].join(",")
    } else {
        return Value::Missing;
    };
    Value::from_raw(&strip_parentheses(&piece))
}

/// Name used when a source declares no sample: the file name minus extensions
pub fn source_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    name.strip_suffix(".vcf").unwrap_or(name).to_string()
}

/// Turns one annotated VCF into a [`ParsedTable`]
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    params: ParserParams,
}

impl RecordParser {
    pub fn new(params: ParserParams) -> Self {
        Self { params }
    }

    /// Plain or gzip/bgzip compressed VCF on disk
    pub fn parse_path(&self, path: &Path) -> Result<ParsedTable> {
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| VarvennError::parse(&source, e))?;
        let is_gz = path.extension().is_some_and(|ext| ext == "gz");
        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        self.parse_reader(reader, &source, &source_label(path))
    }

    /// `source` names the input in errors. `fallback_name` names the table
    /// when the header has no sample column.
    pub fn parse_reader<R: BufRead>(
        &self,
        reader: R,
        source: &str,
        fallback_name: &str,
    ) -> Result<ParsedTable> {
        let mut reader = vcf::io::Reader::new(reader);
        let header = reader
            .read_header()
            .map_err(|e| VarvennError::parse(source, format!("malformed header: {}", e)))?;
        let meta = SourceHeader::new(&header, &self.params.annotation_field)
            .map_err(|e| VarvennError::parse(source, e))?;
        let name = meta
            .sample
            .clone()
            .unwrap_or_else(|| fallback_name.to_string());

        let mut sites: IndexMap<(String, u64, String, String), RawSite> = IndexMap::new();
        let mut n_entries = 0;
        let mut record = RecordBuf::default();
        loop {
            match reader.read_record_buf(&header, &mut record) {
                Ok(0) => break,
                Ok(_) => {
                    n_entries += 1;
                    let site = RawSite::from_record(&record).map_err(|e| {
                        VarvennError::parse(source, format!("record {}: {}", n_entries, e))
                    })?;
                    // a repeated entry replaces the earlier one in its original position
                    sites.insert(site.site_key(), site);
                }
                Err(e) => {
                    return Err(VarvennError::parse(
                        source,
                        format!("record {}: {}", n_entries + 1, e),
                    ))
                }
            }
        }
        debug!("{}: {} entries, {} unique", source, n_entries, sites.len());

        let zygosity = if meta.flags.contains(HOM) {
            ZygositySource::Flag
        } else if meta.has_genotype {
            ZygositySource::Genotype
        } else {
            ZygositySource::Absent
        };

        let mut rows = vec![];
        for site in sites.into_values() {
            rows.extend(self.decompose(site, &meta, zygosity));
        }

        let (rows, summary) = resolve_annotations(
            rows,
            &self.params.annotation_field,
            meta.annotation.as_ref(),
            self.params.drop_unannotated,
        );
        if meta.annotation.is_none() {
            warn!(
                "{} declares no {} layout, rows are unannotated",
                source, self.params.annotation_field
            );
        }

        let mut table = ParsedTable::new(&name);
        for row in rows {
            table.push_row(row);
        }
        self.normalize(&mut table, &meta, zygosity);

        info!(
            "parsed {} ({}): {} rows, {} unannotated dropped, {} candidates superseded",
            source,
            table.name(),
            table.len(),
            summary.unannotated,
            summary.superseded
        );
        Ok(table)
    }

    /// One row per ALT allele
    fn decompose(
        &self,
        site: RawSite,
        meta: &SourceHeader,
        zygosity: ZygositySource,
    ) -> Vec<VariantRow> {
        let n_alleles = site.alts.len();
        let split_columns: HashSet<&String> = site
            .values
            .keys()
            .filter(|k| {
                self.params.is_per_allele(k) || meta.per_allele.contains(&k.to_uppercase())
            })
            .collect();

        site.alts
            .iter()
            .enumerate()
            .map(|(idx, alt)| {
                let mut row = VariantRow::new(VariantKey::new(
                    &site.chrom,
                    site.pos,
                    &site.reference,
                    alt,
                ));
                for (column, value) in site.values.iter() {
                    let value = if n_alleles > 1 && split_columns.contains(column) {
                        allele_piece(value, idx, n_alleles)
                    } else {
                        value.clone()
                    };
                    row.set(column, value);
                }
                if zygosity == ZygositySource::Genotype {
                    let call = site
                        .genotype
                        .as_deref()
                        .map(zygosity_from_genotype)
                        .unwrap_or(HET);
                    row.set(ZYGOSITY_COLUMN, Value::from(call));
                }
                row
            })
            .collect()
    }

    /// Column naming, zygosity, compound splits, numeric coercion and
    /// derived columns
    fn normalize(&self, table: &mut ParsedTable, meta: &SourceHeader, zygosity: ZygositySource) {
        let columns: Vec<String> = table.columns().iter().cloned().collect();
        for column in columns {
            table.rename_column(&column, &column.to_uppercase());
        }

        if zygosity == ZygositySource::Flag {
            for row in table.rows_mut() {
                let call = zygosity_from_flag(row.get(HOM));
                row.set(HOM, Value::from(call));
            }
            table.add_column(HOM);
            table.drop_column(HET);
            table.rename_column(HOM, ZYGOSITY_COLUMN);
        }

        for field in self.params.compound_fields.iter() {
            split_compound(table, field);
        }

        let skip: HashSet<&str> = self
            .params
            .compound_fields
            .iter()
            .flat_map(|f| f.targets.iter().map(|t| t.name.as_str()))
            .collect();
        let numeric: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| {
                (c.as_str() == "QUAL" || meta.numeric.contains(*c)) && !skip.contains(c.as_str())
            })
            .cloned()
            .collect();
        for column in numeric {
            table.map_column(&column, Value::coerce_number);
        }
        for row in table.rows_mut() {
            for value in row.values.values_mut() {
                *value = value.rounded(ROUND_PLACES);
            }
        }

        for vocabulary in self.params.vocabularies.iter() {
            translate(table, vocabulary);
        }

        if table.has_column("HGVS.P") {
            for row in table.rows_mut() {
                let change = amino_change(row.get("HGVS.P"));
                row.set("AMINOCHANGE", change);
            }
            table.add_column("AMINOCHANGE");
        }

        for (from, to) in self.params.renames.iter() {
            table.rename_column(from, to);
        }
    }
}
