use std::io;
use std::path::Path;
use thiserror::Error;

/// Every fatal condition names the source, region, or table it came from
#[derive(Error, Debug)]
pub enum VarvennError {
    #[error("no variant sources were provided")]
    NoInput,

    #[error("{mode} needs {expected} variant sources, got {found}")]
    InputCount {
        mode: String,
        expected: usize,
        found: usize,
    },

    #[error("unable to parse {input}: {reason}")]
    Parse { input: String, reason: String },

    #[error("cannot merge {left} with {right}: only one side may already be a duos comparison")]
    AmbiguousMerge { left: String, right: String },

    #[error("both tables are named {name}; sample names must differ to be compared")]
    DuplicateSample { name: String },

    #[error("region {region} selects no variants in {table}")]
    EmptySelection { region: String, table: String },

    #[error("region {region} is not valid for a {mode} comparison")]
    InvalidRegion { region: String, mode: String },

    #[error("table {table} has no {column} column")]
    MissingColumn { column: String, table: String },

    #[error("unable to load gene panel {path}: {reason}")]
    Panel { path: String, reason: String },

    #[error("unable to load {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("unable to access {path}: {reason}")]
    File { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl VarvennError {
    pub fn parse(input: &str, reason: impl ToString) -> Self {
        VarvennError::Parse {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn file(path: &Path, reason: impl ToString) -> Self {
        VarvennError::File {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VarvennError>;
