use std::collections::HashMap;

/// Consequence terms ordered from most to least severe. A term's rank is its
/// position in this list plus one.
pub const SEVERITY_ORDER: [&str; 29] = [
    "exon_loss_variant",
    "frameshift_variant",
    "stop_gained",
    "stop_lost",
    "start_lost",
    "splice_acceptor_variant",
    "splice_donor_variant",
    "disruptive_inframe_deletion",
    "inframe_insertion",
    "disruptive_inframe_insertion",
    "inframe_deletion",
    "missense_variant",
    "splice_region_variant",
    "stop_retained_variant",
    "initiator_codon_variant",
    "synonymous_variant",
    "start_retained",
    "coding_sequence_variant",
    "5_prime_UTR_variant",
    "3_prime_UTR_variant",
    "5_prime_UTR_premature_start_codon_gain_variant",
    "intron_variant",
    "non_coding_exon_variant",
    "upstream_gene_variant",
    "downstream_gene_variant",
    "TF_binding_site_variant",
    "regulatory_region_variant",
    "intergenic_region",
    "transcript",
];

/// Rank given to any term missing from the table
pub const UNRANKED: u32 = SEVERITY_ORDER.len() as u32 + 1;

lazy_static::lazy_static! {
    static ref SEVERITY_RANKS: HashMap<&'static str, u32> = SEVERITY_ORDER
        .iter()
        .enumerate()
        .map(|(idx, term)| (*term, idx as u32 + 1))
        .collect();
}

/// Severity rank of a single consequence term. Lower is more severe.
pub fn severity_rank(term: &str) -> u32 {
    *SEVERITY_RANKS.get(term.trim()).unwrap_or(&UNRANKED)
}

/// First term of an `&`-joined consequence string
pub fn primary_term(consequence: &str) -> &str {
    consequence.split('&').next().unwrap_or_default().trim()
}

/// Severity of a possibly compound consequence string; only the first term counts
pub fn consequence_rank(consequence: &str) -> u32 {
    severity_rank(primary_term(consequence))
}
