#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "##fileformat=VCFv4.2
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Approximate read depth\">
##INFO=<ID=MQ,Number=1,Type=Float,Description=\"RMS Mapping Quality\">
##INFO=<ID=HOM,Number=0,Type=Flag,Description=\"Homozygous call\">
##INFO=<ID=HET,Number=0,Type=Flag,Description=\"Heterozygous call\">
##INFO=<ID=VARTYPE,Number=A,Type=String,Description=\"Variant type\">
##INFO=<ID=ESP6500_MAF,Number=.,Type=String,Description=\"ESP6500 minor allele frequencies EA,AA,ALL\">
##INFO=<ID=ESP6500_PH,Number=.,Type=String,Description=\"ESP6500 PolyPhen prediction\">
##INFO=<ID=CLINVAR_CLNSIG,Number=A,Type=String,Description=\"Clinical significance\">
##INFO=<ID=ANN,Number=.,Type=String,Description=\"Functional annotations: 'Allele | Annotation | Annotation_Impact | Gene_Name | Gene_ID | Feature_Type | Feature_ID | Transcript_BioType | Rank | HGVS.c | HGVS.p'\">
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
";

/// One packed annotation candidate
pub fn ann(allele: &str, effect: &str, impact: &str, gene: &str, hgvs_c: &str, hgvs_p: &str) -> String {
    format!(
        "{}|{}|{}|{}|{}|transcript|NM_{}|protein_coding|1/2|{}|{}",
        allele, effect, impact, gene, gene, gene, hgvs_c, hgvs_p
    )
}

/// A single-sample annotated VCF assembled line by line
#[derive(Debug, Clone)]
pub struct VcfBuilder {
    pub sample: String,
    records: Vec<String>,
}

impl VcfBuilder {
    pub fn new(sample: &str) -> Self {
        Self {
            sample: sample.to_string(),
            records: vec![],
        }
    }

    pub fn record(mut self, chrom: &str, pos: u64, reference: &str, alt: &str, qual: &str, info: &str) -> Self {
        let gt = if info.split(';').any(|i| i == "HOM") { "1/1" } else { "0/1" };
        self.records.push(format!(
            "{}\t{}\t.\t{}\t{}\t{}\tPASS\t{}\tGT\t{}",
            chrom, pos, reference, alt, qual, info, gt
        ));
        self
    }

    /// Missense in GENE1 at `pos`, with the given zygosity flag
    pub fn missense(self, pos: u64, zygosity: &str) -> Self {
        let info = format!(
            "{};AF=0.5;DP=20;VARTYPE=SNP;ANN={}",
            zygosity,
            ann("C", "missense_variant", "MODERATE", "GENE1", "c.10A>C", "p.Lys4Thr")
        );
        self.record("1", pos, "A", "C", "50", &info)
    }

    pub fn text(&self) -> String {
        let mut text = HEADER.to_string();
        text.push_str(&format!(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t{}\n",
            self.sample
        ));
        for record in self.records.iter() {
            text.push_str(record);
            text.push('\n');
        }
        text
    }

    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.vcf", self.sample));
        std::fs::write(&path, self.text()).unwrap();
        path
    }

    pub fn write_gz(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.vcf.gz", self.sample));
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(self.text().as_bytes()).unwrap();
        encoder.finish().unwrap();
        path
    }
}
