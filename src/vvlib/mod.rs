mod annotation;
pub use crate::vvlib::annotation::{
    resolve_annotations, AnnotationEntry, AnnotationLayout, CandidateRank, ResolveSummary,
};

mod cli;
pub use crate::vvlib::cli::{
    Cli, Commands, DuosArgs, ReportParams, RunParams, SingleArgs, TriosArgs, VardbArgs,
    VarvennParams,
};

mod commands;
pub use crate::vvlib::commands::{duos_main, single_main, trios_main, vardb_main};

mod compare;
pub use crate::vvlib::compare::Comparator;

mod dispatcher;
pub use crate::vvlib::dispatcher::Dispatcher;

mod errors;
pub use crate::vvlib::errors::{Result, VarvennError};

mod freqstore;
pub use crate::vvlib::freqstore::{
    FrequencyEntry, FrequencyStore, ALLELE_FREQ_COLUMN, STORE_FREQ_COLUMN, UNKNOWN_GENOTYPE,
};

mod header;
pub use crate::vvlib::header::SourceHeader;

mod infofields;
pub use crate::vvlib::infofields::{
    amino_change, split_compound, strip_parentheses, translate, zygosity_from_flag,
    zygosity_from_genotype, FLAG_SET, HET, HOM, ZYGOSITY_COLUMN,
};

mod membership;
pub use crate::vvlib::membership::{ComparisonMode, Region};

mod panel;
pub use crate::vvlib::panel::{ColumnFilter, GenePanel, EMPTY_SENTINEL, GENE_COLUMN};

mod params;
pub use crate::vvlib::params::{
    CompareParams, CompoundField, CompoundTarget, Config, ParserParams, Transform, Vocabulary,
};

mod parser;
pub use crate::vvlib::parser::{source_label, RecordParser};

mod severity;
pub use crate::vvlib::severity::{consequence_rank, primary_term, severity_rank, UNRANKED};

mod stats;
pub use crate::vvlib::stats::{
    general_stats, venn_counts, GeneralStats, GroupCount, TableStats, VennCount,
};

mod table;
pub use crate::vvlib::table::{
    ComparisonTable, ParsedTable, Value, VariantKey, VariantRow, MEMBERSHIP_COLUMN, MISSING,
    NAME_SEP, ROUND_PLACES,
};

mod tablewriter;
pub use crate::vvlib::tablewriter::TableWriter;
