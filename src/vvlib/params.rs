use crate::vvlib::{Result, VarvennError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How one piece of a split compound field is cleaned up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Keep as is
    Keep,
    /// Percentage -> fraction. Unparseable text passes through unchanged.
    Percent,
    /// Strip leading/trailing `.` and `,`
    TrimPunctuation,
    /// Keep only the first comma separated item
    FirstItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundTarget {
    pub name: String,
    pub transform: Transform,
}

/// A field packing several estimates into one delimited string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundField {
    pub column: String,
    pub delimiter: char,
    pub targets: Vec<CompoundTarget>,
}

/// Code -> label substitutions applied to one column's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub column: String,
    pub codes: Vec<(String, String)>,
}

fn target(name: &str, transform: Transform) -> CompoundTarget {
    CompoundTarget {
        name: name.to_string(),
        transform,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

lazy_static::lazy_static! {
    static ref PER_ALLELE_COLUMNS: Vec<String> = strings(&[
        "ID", "AC", "AF", "SAMPLES_AF", "MLEAC", "MLEAF", "VARTYPE", "DBSNPBUILDID",
    ]);

    static ref PER_ALLELE_PREFIXES: Vec<String> = strings(&["1000", "CLINVAR"]);

    static ref COMPOUND_FIELDS: Vec<CompoundField> = vec![
        CompoundField {
            column: "ESP6500_MAF".to_string(),
            delimiter: ',',
            targets: vec![
                target("ESP6500_MAF_EA", Transform::Percent),
                target("ESP6500_MAF_AA", Transform::Percent),
                target("ESP6500_MAF_ALL", Transform::Percent),
            ],
        },
        CompoundField {
            column: "ESP6500_PH".to_string(),
            delimiter: ':',
            targets: vec![
                target("POLYPHEN_PRED", Transform::TrimPunctuation),
                target("POLYPHEN_SCORE", Transform::FirstItem),
            ],
        },
    ];

    static ref VOCABULARIES: Vec<Vocabulary> = vec![Vocabulary {
        column: "CLINVAR_CLNSIG".to_string(),
        codes: [
            ("255", "other"),
            ("0", "Uncertain significance"),
            ("1", "not provided"),
            ("2", "Benign"),
            ("3", "Likely Benign"),
            ("4", "Likely pathogenic"),
            ("5", "Pathogenic"),
            ("6", "drug response"),
            ("7", "histocompatibility"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    }];

    static ref RENAMES: Vec<(String, String)> = [
        ("ANNOTATION", "EFFECT"),
        ("ANNOTATION_IMPACT", "IMPACT"),
        ("ID", "RSID"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    static ref CALL_QUALITY_COLUMNS: Vec<String> = strings(&[
        "QUAL", "FILTER", "DP", "FS", "MQ", "SOR", "QD", "SET", "BASEQRANKSUM",
        "CLIPPINGRANKSUM", "MQRANKSUM", "READPOSRANKSUM", "AC", "SAMPLES_AF", "MLEAC",
        "MLEAF", "DBSNPBUILDID",
    ]);

    static ref INVARIANT_SUBSTRINGS: Vec<String> =
        strings(&["1000GP3", "CLINVAR", "ESP6500", "RSID", "POLYPHEN"]);
}

/// Record parser settings. Column names are matched upper case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserParams {
    /// INFO key holding the packed transcript annotations
    pub annotation_field: String,
    /// Drop rows that end up with no annotation candidate
    pub drop_unannotated: bool,
    /// Columns distributed positionally across decomposed alleles
    pub per_allele_columns: Vec<String>,
    /// Column name prefixes also distributed across alleles
    pub per_allele_prefixes: Vec<String>,
    pub compound_fields: Vec<CompoundField>,
    pub vocabularies: Vec<Vocabulary>,
    /// Renames applied after upper-casing
    pub renames: Vec<(String, String)>,
}

impl Default for ParserParams {
    fn default() -> Self {
        Self {
            annotation_field: "ANN".to_string(),
            drop_unannotated: true,
            per_allele_columns: PER_ALLELE_COLUMNS.clone(),
            per_allele_prefixes: PER_ALLELE_PREFIXES.clone(),
            compound_fields: COMPOUND_FIELDS.clone(),
            vocabularies: VOCABULARIES.clone(),
            renames: RENAMES.clone(),
        }
    }
}

impl ParserParams {
    pub fn is_per_allele(&self, column: &str) -> bool {
        let column = column.to_uppercase();
        self.per_allele_columns.iter().any(|c| c.eq_ignore_ascii_case(&column))
            || self
                .per_allele_prefixes
                .iter()
                .any(|p| column.starts_with(&p.to_uppercase()))
    }
}

/// Comparison engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareParams {
    /// Call-batch specific columns removed before joining
    pub call_quality_columns: Vec<String>,
    /// Colliding columns containing any of these are always collapsed
    pub invariant_substrings: Vec<String>,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            call_quality_columns: CALL_QUALITY_COLUMNS.clone(),
            invariant_substrings: INVARIANT_SUBSTRINGS.clone(),
        }
    }
}

impl CompareParams {
    pub fn is_invariant(&self, column: &str) -> bool {
        self.invariant_substrings
            .iter()
            .any(|s| column.contains(s.as_str()))
    }
}

/// `--config` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parser: ParserParams,
    pub compare: CompareParams,
    /// Core count the dispatcher plans around (default: all available)
    pub cores: Option<usize>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let err = |reason: String| VarvennError::Config {
            path: path.display().to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| err(e.to_string()))
    }

    /// Defaults unless a config file is given
    pub fn load(path: &Option<std::path::PathBuf>) -> Result<Self> {
        match path {
            Some(p) => {
                info!("loading config {}", p.display());
                Self::from_path(p)
            }
            None => Ok(Self::default()),
        }
    }
}
