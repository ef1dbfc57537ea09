use crate::vvlib::{consequence_rank, Value, VariantKey, VariantRow};
use indexmap::{map::Entry, IndexMap};

/// Sub-field order of the packed annotation field, as the header declares it
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLayout {
    fields: Vec<String>,
    allele: Option<usize>,
    consequence: Option<usize>,
    hgvs_c: Option<usize>,
}

fn position_of(fields: &[String], names: &[&str]) -> Option<usize> {
    fields
        .iter()
        .position(|f| names.iter().any(|n| f.eq_ignore_ascii_case(n)))
}

impl AnnotationLayout {
    pub fn new(fields: Vec<String>) -> Self {
        let allele = position_of(&fields, &["Allele"]);
        let consequence = position_of(&fields, &["Annotation", "Consequence"]);
        let hgvs_c = position_of(&fields, &["HGVS.c", "HGVSc"]);
        Self {
            fields,
            allele,
            consequence,
            hgvs_c,
        }
    }

    /// Reads the layout out of an INFO description such as
    /// `Functional annotations: 'Allele | Annotation | ...'` or
    /// `Consequence annotations from Ensembl VEP. Format: Allele|Consequence|...`
    pub fn from_description(description: &str) -> Result<Self, String> {
        let body = match (description.find('\''), description.rfind('\'')) {
            (Some(start), Some(end)) if start < end => &description[start + 1..end],
            _ => match description.find("Format:") {
                Some(idx) => &description[idx + "Format:".len()..],
                None => description,
            },
        };

        let fields: Vec<String> = body.split('|').map(|f| f.trim().to_string()).collect();
        if fields.len() < 2 || fields.iter().any(|f| f.is_empty()) {
            return Err(format!(
                "annotation description declares no sub-fields: {}",
                description
            ));
        }
        Ok(Self::new(fields))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// One candidate per comma separated transcript hit
    pub fn explode(&self, packed: &str) -> Vec<AnnotationEntry> {
        packed
            .split(',')
            .filter(|hit| !hit.trim().is_empty())
            .map(|hit| {
                let parts: Vec<&str> = hit.split('|').collect();
                let piece = |idx: Option<usize>| -> String {
                    idx.and_then(|i| parts.get(i))
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default()
                };

                let fields = self
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| {
                        let raw = parts.get(idx).copied().unwrap_or_default();
                        let value = if Some(idx) == self.hgvs_c && raw.contains("null") {
                            Value::Missing
                        } else {
                            Value::from_raw(raw)
                        };
                        (name.clone(), value)
                    })
                    .collect();

                AnnotationEntry {
                    allele: piece(self.allele),
                    consequence: piece(self.consequence),
                    fields,
                }
            })
            .collect()
    }
}

/// One transcript-level consequence call
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEntry {
    pub allele: String,
    pub consequence: String,
    /// Every sub-field under its declared name
    pub fields: IndexMap<String, Value>,
}

/// Sort key for candidates of one variant. Smaller is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateRank {
    /// Annotated allele differs from the row's ALT
    pub spillover: bool,
    pub severity: u32,
}

impl AnnotationEntry {
    pub fn severity(&self) -> u32 {
        consequence_rank(&self.consequence)
    }

    pub fn rank(&self, alt: &str) -> CandidateRank {
        CandidateRank {
            spillover: self.allele != alt,
            severity: self.severity(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveSummary {
    pub kept: usize,
    pub unannotated: usize,
    pub superseded: usize,
}

/// Best candidate so far for one key. `None` rank means no annotation.
struct Pick {
    rank: Option<CandidateRank>,
    row_idx: usize,
    entry: Option<AnnotationEntry>,
}

fn improves(new: &Option<CandidateRank>, old: &Option<CandidateRank>) -> bool {
    match (new, old) {
        (Some(n), Some(o)) => n < o,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Explodes the packed annotation column of every row and keeps one row per
/// key carrying its best candidate. Ties keep the earliest candidate. Without a
/// layout, rows are only de-duplicated. Rows with no candidates are dropped
/// when `drop_unannotated` is set.
pub fn resolve_annotations(
    rows: Vec<VariantRow>,
    field: &str,
    layout: Option<&AnnotationLayout>,
    drop_unannotated: bool,
) -> (Vec<VariantRow>, ResolveSummary) {
    let mut summary = ResolveSummary::default();
    let n_rows = rows.len();
    let mut picks: IndexMap<VariantKey, Pick> = IndexMap::new();
    let mut rows: Vec<Option<VariantRow>> = rows.into_iter().map(Some).collect();

    for (row_idx, slot) in rows.iter_mut().enumerate() {
        let Some(row) = slot.as_mut() else { continue };
        let packed = row.take(field);

        let candidates = match (layout, &packed) {
            (Some(layout), Value::Text(text)) => layout.explode(text),
            _ => vec![],
        };

        if candidates.is_empty() {
            if layout.is_some() && drop_unannotated {
                summary.unannotated += 1;
                *slot = None;
                continue;
            }
            if let Entry::Vacant(vacant) = picks.entry(row.key.clone()) {
                vacant.insert(Pick {
                    rank: None,
                    row_idx,
                    entry: None,
                });
            }
            continue;
        }

        for entry in candidates {
            let rank = Some(entry.rank(&row.key.alt));
            let pick = Pick {
                rank,
                row_idx,
                entry: Some(entry),
            };
            match picks.entry(row.key.clone()) {
                Entry::Occupied(mut current) => {
                    if improves(&pick.rank, &current.get().rank) {
                        current.insert(pick);
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(pick);
                }
            }
        }
    }

    let mut kept = Vec::with_capacity(picks.len());
    for (_, pick) in picks {
        let Some(mut row) = rows[pick.row_idx].take() else {
            continue;
        };
        if let Some(entry) = pick.entry {
            for (name, value) in entry.fields {
                row.values.insert(name, value);
            }
        }
        kept.push(row);
    }
    summary.kept = kept.len();
    summary.superseded = n_rows - summary.unannotated - summary.kept;
    (kept, summary)
}
