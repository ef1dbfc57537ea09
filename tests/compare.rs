mod common;

use common::VcfBuilder;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::collections::HashSet;
use tempfile::TempDir;
use varvenn::{
    Comparator, Dispatcher, ParsedTable, RecordParser, VarvennError, MEMBERSHIP_COLUMN,
};

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn sample(name: &str, positions: &[u64]) -> VcfBuilder {
    positions
        .iter()
        .fold(VcfBuilder::new(name), |b, pos| b.missense(*pos, "HET"))
}

fn parse_all(dir: &TempDir, builders: &[VcfBuilder]) -> Vec<ParsedTable> {
    let paths: Vec<_> = builders.iter().map(|b| b.write(dir.path())).collect();
    Dispatcher::new(RecordParser::default(), Some(4))
        .dispatch(&paths)
        .unwrap()
}

fn labels(table: &ParsedTable) -> Vec<String> {
    table
        .rows()
        .iter()
        .map(|r| r.get(MEMBERSHIP_COLUMN).to_string())
        .collect()
}

#[rstest]
fn duos_name_ignores_region(workdir: TempDir) {
    let tables = parse_all(&workdir, &[sample("A", &[100, 200]), sample("B", &[200, 300])]);
    let comparator = Comparator::default();

    let all = comparator.compare(&tables[0], &tables[1], None).unwrap();
    assert_eq!(all.name(), "A:B");
    assert_eq!(labels(&all), vec!["A", "A:B", "B"]);

    let only_a = comparator.compare(&tables[0], &tables[1], Some("A")).unwrap();
    assert_eq!(only_a.name(), "A:B");
    assert_eq!(labels(&only_a), vec!["A"]);
}

#[rstest]
fn trios_labels_are_complete(workdir: TempDir) {
    let tables = parse_all(
        &workdir,
        &[
            sample("A", &[1, 2, 4, 5]),
            sample("B", &[2, 3, 5, 6]),
            sample("C", &[4, 5, 6, 7]),
        ],
    );
    let comparator = Comparator::default();
    let duos = comparator.compare(&tables[0], &tables[1], None).unwrap();
    let trios = comparator.compare(&duos, &tables[2], None).unwrap();
    assert_eq!(trios.name(), "A:B:C");
    assert_eq!(trios.len(), 7);

    let legal: HashSet<&str> = ["A", "B", "C", "A:B", "A:C", "B:C", "A:B:C"]
        .into_iter()
        .collect();
    let seen: HashSet<String> = labels(&trios).into_iter().collect();
    assert!(seen.iter().all(|l| legal.contains(l.as_str())));
    assert_eq!(seen.len(), 7);
    assert!(trios.has_column("ZIGOSITY_C"));

    let shared = comparator.compare(&duos, &tables[2], Some("A:B:C")).unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared.rows()[0].key.pos, 5);
}

#[rstest]
fn empty_trio_region_is_fatal(workdir: TempDir) {
    let tables = parse_all(
        &workdir,
        &[sample("A", &[1, 2]), sample("B", &[2, 3]), sample("C", &[4])],
    );
    let comparator = Comparator::default();
    let duos = comparator.compare(&tables[0], &tables[1], None).unwrap();
    let err = comparator
        .compare(&duos, &tables[2], Some("A:B:C"))
        .unwrap_err();
    match err {
        VarvennError::EmptySelection { region, table } => {
            assert_eq!(region, "A:B:C");
            assert_eq!(table, "A:B:C");
        }
        other => panic!("unexpected error {}", other),
    }
}

#[rstest]
fn dispatch_keeps_input_order(workdir: TempDir) {
    let big: Vec<u64> = (1..=3000).collect();
    let tables = parse_all(
        &workdir,
        &[sample("S1", &big), sample("S2", &[1]), sample("S3", &[1, 2])],
    );
    let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["S1", "S2", "S3"]);
    assert_eq!(tables[0].len(), 3000);
}

#[rstest]
fn quality_columns_dropped_before_join(workdir: TempDir) {
    let a = VcfBuilder::new("A").record(
        "1",
        100,
        "A",
        "C",
        "50",
        &format!(
            "HET;DP=10;MQ=60;ANN={}",
            common::ann("C", "missense_variant", "MODERATE", "GENE1", "c.10A>C", "p.Lys4Thr")
        ),
    );
    let b = VcfBuilder::new("B").record(
        "1",
        100,
        "A",
        "C",
        "99",
        &format!(
            "HET;DP=42;MQ=30;ANN={}",
            common::ann("C", "missense_variant", "MODERATE", "GENE1", "c.10A>C", "p.Lys4Thr")
        ),
    );
    let tables = parse_all(&workdir, &[a, b]);
    let result = Comparator::default()
        .compare(&tables[0], &tables[1], None)
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(labels(&result), vec!["A:B"]);
    for dropped in ["QUAL", "QUAL_A", "QUAL_B", "DP", "DP_A", "MQ_B", "FILTER"] {
        assert!(!result.has_column(dropped), "{} survived the join", dropped);
    }
    assert!(result.has_column("EFFECT"));
    assert!(result.has_column("ZIGOSITY"));
}

#[rstest]
fn four_samples_refused(workdir: TempDir) {
    let tables = parse_all(
        &workdir,
        &[sample("A", &[1]), sample("B", &[1]), sample("C", &[1]), sample("D", &[1])],
    );
    let comparator = Comparator::default();
    let ab = comparator.compare(&tables[0], &tables[1], None).unwrap();
    let cd = comparator.compare(&tables[2], &tables[3], None).unwrap();
    assert!(matches!(
        comparator.compare(&ab, &cd, None),
        Err(VarvennError::AmbiguousMerge { .. })
    ));
}

#[rstest]
fn compare_against_unparsed_source(workdir: TempDir) {
    let parser = RecordParser::default();
    let left = parser
        .parse_path(&sample("A", &[100, 200]).write(workdir.path()))
        .unwrap();
    let right_path = sample("B", &[200]).write_gz(workdir.path());
    let result = Comparator::default()
        .compare_source(&left, &parser, &right_path, Some("A:B"))
        .unwrap();
    assert_eq!(result.name(), "A:B");
    assert_eq!(labels(&result), vec!["A:B"]);
}
