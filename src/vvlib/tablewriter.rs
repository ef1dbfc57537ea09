use crate::vvlib::{ParsedTable, Result, VarvennError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const KEY_COLUMNS: [&str; 4] = ["CHROM", "POS", "REF", "ALT"];

/// Tab separated export of tables
pub struct TableWriter {
    writer: csv::Writer<Box<dyn Write>>,
    /// Destination named in errors
    target: PathBuf,
}

impl TableWriter {
    /// Writes to `out_path`, or stdout when none is given
    pub fn new(out_path: &Option<PathBuf>) -> Result<Self> {
        let out: Box<dyn Write> = match out_path {
            Some(path) => Box::new(BufWriter::with_capacity(
                page_size::get() * 500,
                File::create(path).map_err(|e| VarvennError::file(path, e))?,
            )),
            None => Box::new(BufWriter::with_capacity(
                page_size::get() * 500,
                std::io::stdout(),
            )),
        };
        let target = out_path.clone().unwrap_or_else(|| PathBuf::from("stdout"));
        Ok(Self::from_writer(out, &target))
    }

    pub fn from_writer(out: Box<dyn Write>, target: &Path) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(out);
        Self {
            writer,
            target: target.to_path_buf(),
        }
    }

    /// Header line then one line per row, missing values as `.`
    pub fn write_table(&mut self, table: &ParsedTable) -> Result<()> {
        let mut header: Vec<&str> = KEY_COLUMNS.to_vec();
        header.extend(table.columns().iter().map(|c| c.as_str()));
        self.writer
            .write_record(&header)
            .map_err(|e| VarvennError::file(&self.target, e))?;

        for row in table.rows() {
            let mut record: Vec<String> = vec![
                row.key.chrom.clone(),
                row.key.pos.to_string(),
                row.key.reference.clone(),
                row.key.alt.clone(),
            ];
            record.extend(table.columns().iter().map(|c| row.get(c).to_string()));
            self.writer
                .write_record(&record)
                .map_err(|e| VarvennError::file(&self.target, e))?;
        }
        self.writer
            .flush()
            .map_err(|e| VarvennError::file(&self.target, e))?;
        info!("wrote {} rows of {}", table.len(), table.name());
        Ok(())
    }
}
