use crate::vvlib::{ColumnFilter, ComparisonMode, Region};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Clone, Debug)]
#[command(name = "varvenn")]
#[command(about = "Variant table comparison of annotated VCFs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

pub trait VarvennParams: std::fmt::Debug {
    fn validate(&self) -> bool;
    fn debug(&self) -> bool;
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(about = "Parse one sample, optionally through a gene panel")]
    Single(SingleArgs),

    #[command(about = "Compare two samples")]
    Duos(DuosArgs),

    #[command(about = "Compare three samples")]
    Trios(TriosArgs),

    #[command(about = "Build or extend a variant frequency store")]
    Vardb(VardbArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct ReportParams {
    /// Output table (tab separated, default stdout)
    #[arg(short, long, help_heading = "Report")]
    pub out: Option<PathBuf>,

    /// Gene list restricting the report (text or GeneSymbol column)
    #[arg(long, help_heading = "Report")]
    pub panel: Option<PathBuf>,

    /// Remove rows whose COLUMN contains TEXT ("COLUMN TEXT", TEXT=Empty for blanks)
    #[arg(long = "filter", help_heading = "Report")]
    pub filters: Vec<String>,

    /// Frequency store to annotate rows with
    #[arg(long, help_heading = "Report")]
    pub vardb: Option<PathBuf>,

    /// Write region counts and grouped statistics as JSON
    #[arg(long, help_heading = "Report")]
    pub stats: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct RunParams {
    /// Cores to plan parsing around (default all)
    #[arg(short, long, help_heading = "Run")]
    pub threads: Option<usize>,

    /// JSON document overriding parser and comparison settings
    #[arg(long, help_heading = "Run")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, default_value_t = false, help_heading = "Run")]
    pub debug: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SingleArgs {
    /// Sample VCF (.vcf or .vcf.gz)
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub report: ReportParams,

    #[command(flatten)]
    pub run: RunParams,
}

#[derive(Parser, Debug, Clone)]
pub struct DuosArgs {
    /// Sample VCFs, in comparison order
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Venn region to keep (A, B or A:B)
    #[arg(long)]
    pub region: Option<String>,

    #[command(flatten)]
    pub report: ReportParams,

    #[command(flatten)]
    pub run: RunParams,
}

#[derive(Parser, Debug, Clone)]
pub struct TriosArgs {
    /// Sample VCFs, in comparison order
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Venn region to keep (A, B, C, A:B, A:C, B:C or A:B:C)
    #[arg(long)]
    pub region: Option<String>,

    #[command(flatten)]
    pub report: ReportParams,

    #[command(flatten)]
    pub run: RunParams,
}

#[derive(Parser, Debug, Clone)]
pub struct VardbArgs {
    /// Sample VCFs to add
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Existing store to extend
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Output store (JSON)
    #[arg(short, long)]
    pub out: PathBuf,

    /// Also write the store as a table
    #[arg(long)]
    pub table: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunParams,
}

impl VarvennParams for SingleArgs {
    fn debug(&self) -> bool {
        self.run.debug
    }

    fn validate(&self) -> bool {
        let mut is_ok = validate_file(&self.input, "--input");
        is_ok &= self.report.validate();
        is_ok &= self.run.validate();
        is_ok
    }
}

impl VarvennParams for DuosArgs {
    fn debug(&self) -> bool {
        self.run.debug
    }

    fn validate(&self) -> bool {
        let mut is_ok = validate_inputs(&self.input, ComparisonMode::Duos);
        is_ok &= validate_region(&self.region, ComparisonMode::Duos);
        is_ok &= self.report.validate();
        is_ok &= self.run.validate();
        is_ok
    }
}

impl VarvennParams for TriosArgs {
    fn debug(&self) -> bool {
        self.run.debug
    }

    fn validate(&self) -> bool {
        let mut is_ok = validate_inputs(&self.input, ComparisonMode::Trios);
        is_ok &= validate_region(&self.region, ComparisonMode::Trios);
        is_ok &= self.report.validate();
        is_ok &= self.run.validate();
        is_ok
    }
}

impl VarvennParams for VardbArgs {
    fn debug(&self) -> bool {
        self.run.debug
    }

    fn validate(&self) -> bool {
        let mut is_ok = true;
        for path in self.input.iter() {
            is_ok &= validate_file(path, "--input");
        }
        if let Some(db) = &self.db {
            is_ok &= validate_file(db, "--db");
        }
        is_ok &= self.run.validate();
        is_ok
    }
}

impl ReportParams {
    fn validate(&self) -> bool {
        let mut is_ok = true;

        if let Some(panel) = &self.panel {
            is_ok &= validate_file(panel, "--panel");
        }

        if let Some(vardb) = &self.vardb {
            is_ok &= validate_file(vardb, "--vardb");
        }

        for filter in self.filters.iter() {
            if ColumnFilter::parse(filter).is_none() {
                error!(
                    "--filter accepts exactly two words (COLUMN TEXT), got {:?}",
                    filter
                );
                is_ok = false;
            }
        }

        is_ok
    }

    pub fn column_filters(&self) -> Vec<ColumnFilter> {
        self.filters
            .iter()
            .filter_map(|f| ColumnFilter::parse(f))
            .collect()
    }
}

impl RunParams {
    fn validate(&self) -> bool {
        let mut is_ok = true;

        if let Some(config) = &self.config {
            is_ok &= validate_file(config, "--config");
        }

        if self.threads == Some(0) {
            error!("--threads must be at least 1");
            is_ok = false;
        }

        is_ok
    }
}

/// Helper function to validate a file's existence and type
fn validate_file(path: &Path, label: &str) -> bool {
    if !path.exists() {
        error!("{} {} does not exist", label, path.display());
        return false;
    }
    if !path.is_file() {
        error!("{} {} is not a file", label, path.display());
        return false;
    }
    true
}

/// One existing file per compared sample
fn validate_inputs(inputs: &[PathBuf], mode: ComparisonMode) -> bool {
    let mut is_ok = true;
    if inputs.len() != mode.n_samples() {
        error!(
            "{} needs exactly {} --input files, got {}",
            mode,
            mode.n_samples(),
            inputs.len()
        );
        is_ok = false;
    }
    for path in inputs {
        is_ok &= validate_file(path, "--input");
    }
    is_ok
}

fn validate_region(region: &Option<String>, mode: ComparisonMode) -> bool {
    match region {
        Some(r) => match Region::parse(r, mode) {
            Ok(_) => true,
            Err(e) => {
                error!("--region: {}", e);
                false
            }
        },
        None => true,
    }
}
