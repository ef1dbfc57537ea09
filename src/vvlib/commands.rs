use crate::vvlib::{
    Comparator, ComparisonMode, Config, Dispatcher, DuosArgs, FrequencyStore, GenePanel,
    ParsedTable, RecordParser, ReportParams, Result, RunParams, SingleArgs, TableStats,
    TableWriter, TriosArgs, VardbArgs, VarvennError,
};
use std::path::PathBuf;

/// Config, then a dispatcher built from it. `--threads` wins over the config's cores.
fn setup(run: &RunParams) -> Result<(Config, Dispatcher)> {
    let config = Config::load(&run.config)?;
    let cores = run.threads.or(config.cores);
    let dispatcher = Dispatcher::new(RecordParser::new(config.parser.clone()), cores);
    Ok((config, dispatcher))
}

fn parse_sources(
    dispatcher: &Dispatcher,
    inputs: &[PathBuf],
    mode: ComparisonMode,
) -> Result<Vec<ParsedTable>> {
    if inputs.len() != mode.n_samples() {
        return Err(VarvennError::InputCount {
            mode: mode.to_string(),
            expected: mode.n_samples(),
            found: inputs.len(),
        });
    }
    dispatcher.dispatch(inputs)
}

/// Panel, column filters, frequency annotation, statistics, then the table itself
fn report(mut table: ParsedTable, params: &ReportParams) -> Result<()> {
    if let Some(path) = &params.panel {
        table = GenePanel::from_path(path)?.filter(&table)?;
    }

    for filter in params.column_filters() {
        table = filter.apply(&table)?;
    }

    if let Some(path) = &params.vardb {
        table = FrequencyStore::load(path)?.annotate(&table);
    }

    if let Some(path) = &params.stats {
        TableStats::new(&table)?.write_json(path)?;
    }

    TableWriter::new(&params.out)?.write_table(&table)
}

pub fn single_main(args: &SingleArgs) -> Result<()> {
    let (_, dispatcher) = setup(&args.run)?;
    let table = dispatcher
        .dispatch(std::slice::from_ref(&args.input))?
        .into_iter()
        .next()
        .ok_or(VarvennError::NoInput)?;
    report(table, &args.report)?;
    info!("single analysis complete");
    Ok(())
}

pub fn duos_main(args: &DuosArgs) -> Result<()> {
    let (config, dispatcher) = setup(&args.run)?;
    let tables = parse_sources(&dispatcher, &args.input, ComparisonMode::Duos)?;

    let comparator = Comparator::new(config.compare);
    let result = comparator.compare(&tables[0], &tables[1], args.region.as_deref())?;
    report(result, &args.report)?;
    info!("duos analysis complete");
    Ok(())
}

pub fn trios_main(args: &TriosArgs) -> Result<()> {
    let (config, dispatcher) = setup(&args.run)?;
    let tables = parse_sources(&dispatcher, &args.input, ComparisonMode::Trios)?;

    let comparator = Comparator::new(config.compare);
    let duos = comparator.compare(&tables[0], &tables[1], None)?;
    let result = comparator.compare(&duos, &tables[2], args.region.as_deref())?;
    report(result, &args.report)?;
    info!("trios analysis complete");
    Ok(())
}

pub fn vardb_main(args: &VardbArgs) -> Result<()> {
    let (_, dispatcher) = setup(&args.run)?;
    let mut store = match &args.db {
        Some(path) => FrequencyStore::load(path)?,
        None => FrequencyStore::new(),
    };

    let tables = dispatcher.dispatch(&args.input)?;
    let added = tables.iter().filter(|t| store.add_table(t)).count();
    info!("added {} of {} samples", added, tables.len());

    store.save(&args.out)?;
    if args.table.is_some() {
        TableWriter::new(&args.table)?.write_table(&store.to_table())?;
    }
    Ok(())
}
