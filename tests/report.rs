mod common;

use clap::Parser;
use common::{ann, VcfBuilder};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use varvenn::{duos_main, single_main, trios_main, vardb_main, Cli, Commands, FrequencyStore};

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn gene_record(b: VcfBuilder, pos: u64, gene: &str, effect: &str, zygosity: &str) -> VcfBuilder {
    let info = format!(
        "{};AF=0.5;DP=30;VARTYPE=SNP;ANN={}",
        zygosity,
        ann("T", effect, "MODERATE", gene, "c.1G>T", "p.Gly1Val")
    );
    b.record("2", pos, "G", "T", "60", &info)
}

fn patient(name: &str, sites: &[(u64, &str, &str)]) -> VcfBuilder {
    sites.iter().fold(VcfBuilder::new(name), |b, (pos, gene, effect)| {
        gene_record(b, *pos, gene, effect, "HET")
    })
}

fn run(args: &[&str]) {
    let mut full = vec!["varvenn"];
    full.extend_from_slice(args);
    match Cli::parse_from(full).command {
        Commands::Single(a) => single_main(&a),
        Commands::Duos(a) => duos_main(&a),
        Commands::Trios(a) => trios_main(&a),
        Commands::Vardb(a) => vardb_main(&a),
    }
    .unwrap();
}

fn read_tsv(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split('\t').map(String::from).collect())
        .collect()
}

fn column(rows: &[Vec<String>], name: &str) -> Vec<String> {
    let idx = rows[0].iter().position(|c| c == name).unwrap();
    rows[1..].iter().map(|r| r[idx].clone()).collect()
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[rstest]
fn duos_with_panel_and_stats(workdir: TempDir) {
    let a = patient(
        "P1",
        &[(10, "BRCA1", "missense_variant"), (20, "TP53", "missense_variant")],
    )
    .write(workdir.path());
    let b = patient(
        "P2",
        &[(20, "TP53", "missense_variant"), (30, "BRCA1", "stop_gained")],
    )
    .write(workdir.path());
    let panel = workdir.path().join("panel.txt");
    std::fs::write(&panel, "BRCA1\n").unwrap();
    let out = workdir.path().join("out.tsv");
    let stats = workdir.path().join("stats.json");

    run(&[
        "duos", "-i", s(&a), "-i", s(&b), "--panel", s(&panel), "--stats", s(&stats), "-o",
        s(&out),
    ]);

    let rows = read_tsv(&out);
    assert_eq!(&rows[0][..4], &["CHROM", "POS", "REF", "ALT"]);
    assert_eq!(column(&rows, "POS"), vec!["10", "30"]);
    assert_eq!(column(&rows, "VENN"), vec!["P1", "P2"]);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stats).unwrap()).unwrap();
    assert_eq!(json["name"], "P1:P2");
    assert_eq!(json["rows"], 2);
    let counts: Vec<u64> = json["venn"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 1, 0]);
}

#[rstest]
fn duos_region_and_filter(workdir: TempDir) {
    let a = patient(
        "P1",
        &[(10, "BRCA1", "missense_variant"), (20, "TP53", "stop_gained")],
    )
    .write(workdir.path());
    let b = patient(
        "P2",
        &[(10, "BRCA1", "missense_variant"), (20, "TP53", "stop_gained")],
    )
    .write(workdir.path());
    let out = workdir.path().join("out.tsv");

    run(&[
        "duos", "-i", s(&a), "-i", s(&b), "--region", "A:B", "--filter", "EFFECT stop", "-o",
        s(&out),
    ]);

    let rows = read_tsv(&out);
    assert_eq!(column(&rows, "POS"), vec!["10"]);
    assert_eq!(column(&rows, "VENN"), vec!["P1:P2"]);
}

#[rstest]
fn trios_shared_region(workdir: TempDir) {
    let paths: Vec<PathBuf> = [
        ("M", vec![10u64, 20]),
        ("F", vec![20, 30]),
        ("K", vec![20, 40]),
    ]
    .iter()
    .map(|(name, sites)| {
        let sites: Vec<(u64, &str, &str)> = sites
            .iter()
            .map(|p| (*p, "GENE1", "missense_variant"))
            .collect();
        patient(name, &sites).write(workdir.path())
    })
    .collect();
    let out = workdir.path().join("trio.tsv");

    run(&[
        "trios", "-i", s(&paths[0]), "-i", s(&paths[1]), "-i", s(&paths[2]), "--region",
        "A:B:C", "-o", s(&out),
    ]);

    let rows = read_tsv(&out);
    assert_eq!(column(&rows, "POS"), vec!["20"]);
    assert_eq!(column(&rows, "VENN"), vec!["M:F:K"]);
    assert_eq!(column(&rows, "ZIGOSITY_K"), vec!["HET"]);
}

#[rstest]
fn vardb_then_single(workdir: TempDir) {
    let a = patient("S1", &[(10, "BRCA1", "missense_variant")]).write(workdir.path());
    let b = gene_record(VcfBuilder::new("S2"), 10, "BRCA1", "missense_variant", "HOM")
        .write(workdir.path());
    let store = workdir.path().join("vardb.json");
    let store_table = workdir.path().join("vardb.tsv");

    run(&[
        "vardb", "-i", s(&a), "-i", s(&b), "-o", s(&store), "--table", s(&store_table),
    ]);

    let loaded = FrequencyStore::load(&store).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.samples().len(), 2);

    let rows = read_tsv(&store_table);
    assert_eq!(column(&rows, "FREQ"), vec!["1"]);
    assert_eq!(column(&rows, "ALLELE_FREQ"), vec!["0.75"]);
    assert_eq!(column(&rows, "S2"), vec!["HOM"]);

    let out = workdir.path().join("single.tsv");
    run(&["single", "-i", s(&a), "--vardb", s(&store), "-o", s(&out)]);
    let rows = read_tsv(&out);
    assert_eq!(column(&rows, "VARDB_FREQ"), vec!["1"]);
    assert_eq!(column(&rows, "ZIGOSITY"), vec!["HET"]);
}
