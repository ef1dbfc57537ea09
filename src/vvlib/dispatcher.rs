use crate::vvlib::{ParsedTable, RecordParser, Result, VarvennError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use std::thread::JoinHandle;

type InputType = Option<(usize, PathBuf)>;
type OutputType = (usize, Result<ParsedTable>);

/// Parses several sources at once, one worker per source up to the core budget
#[derive(Debug, Clone)]
pub struct Dispatcher {
    parser: RecordParser,
    cores: usize,
    /// What the machine reports
    available: usize,
}

fn available_cores() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Dispatcher {
    /// `cores` defaults to what the machine reports
    pub fn new(parser: RecordParser, cores: Option<usize>) -> Self {
        let available = available_cores();
        Self {
            parser,
            cores: cores.unwrap_or(available).max(1),
            available,
        }
    }

    /// min(sources, cores - 1, available cores), never below one
    pub fn pool_size(&self, n_sources: usize) -> usize {
        n_sources
            .min(self.cores.saturating_sub(1))
            .min(self.available)
            .max(1)
    }

    /// One table per source, in input order. The first failing source, by
    /// input position, is reported.
    pub fn dispatch(&self, sources: &[PathBuf]) -> Result<Vec<ParsedTable>> {
        match sources.len() {
            0 => Err(VarvennError::NoInput),
            1 => Ok(vec![self.parser.parse_path(&sources[0])?]),
            n => self.dispatch_pool(sources, n),
        }
    }

    fn dispatch_pool(&self, sources: &[PathBuf], n_sources: usize) -> Result<Vec<ParsedTable>> {
        let (task_sender, task_receiver): (Sender<InputType>, Receiver<InputType>) = unbounded();
        let (result_sender, result_receiver): (Sender<OutputType>, Receiver<OutputType>) =
            unbounded();

        let n_workers = self.pool_size(n_sources);
        info!("parsing {} sources on {} threads", n_sources, n_workers);
        let task_handles: Vec<JoinHandle<()>> = (0..n_workers)
            .map(|_| {
                let m_parser = self.parser.clone();
                let m_receiver = task_receiver.clone();
                let m_result_sender = result_sender.clone();
                thread::spawn(move || loop {
                    match m_receiver.recv() {
                        Ok(None) | Err(_) => break,
                        Ok(Some((idx, path))) => {
                            let result = m_parser.parse_path(&path);
                            if m_result_sender.send((idx, result)).is_err() {
                                break;
                            }
                        }
                    }
                })
            })
            .collect();
        drop(result_sender);

        for (idx, path) in sources.iter().enumerate() {
            // receivers only hang up after every sentinel, so this can't fail
            let _ = task_sender.send(Some((idx, path.clone())));
        }
        for _ in 0..n_workers {
            let _ = task_sender.send(None);
        }

        let sty = ProgressStyle::with_template(
            " [{elapsed_precise}] {bar:44.cyan/blue} > {pos} completed",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        let pbar = ProgressBar::new(n_sources as u64).with_style(sty);
        let tables = resequence(result_receiver.iter(), sources, &pbar);
        pbar.finish();

        for handle in task_handles {
            if handle.join().is_err() {
                error!("parser thread panicked");
            }
        }
        tables
    }
}

/// Puts results arriving in completion order back in source order
fn resequence<I>(results: I, sources: &[PathBuf], pbar: &ProgressBar) -> Result<Vec<ParsedTable>>
where
    I: IntoIterator<Item = OutputType>,
{
    let mut slots: Vec<Option<Result<ParsedTable>>> = (0..sources.len()).map(|_| None).collect();
    for (idx, result) in results {
        slots[idx] = Some(result);
        pbar.inc(1);
    }

    slots
        .into_iter()
        .zip(sources.iter())
        .map(|(slot, path)| match slot {
            Some(result) => result,
            None => Err(VarvennError::parse(
                &path.display().to_string(),
                "parser thread stopped before finishing",
            )),
        })
        .collect()
}
