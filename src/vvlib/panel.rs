use crate::vvlib::{ParsedTable, Result, VarvennError};
use csv::ReaderBuilder;
use indexmap::IndexSet;
use std::path::Path;

pub const GENE_COLUMN: &str = "GENE_NAME";

/// Header naming the symbol column in a delimited gene list
pub const SYMBOL_HEADER: &str = "GeneSymbol";

/// Literal that turns a column filter into a missing-value filter
pub const EMPTY_SENTINEL: &str = "Empty";

/// An ordered, de-duplicated list of gene symbols
#[derive(Debug, Clone, PartialEq)]
pub struct GenePanel {
    name: String,
    genes: IndexSet<String>,
}

impl GenePanel {
    pub fn new<I, S>(name: &str, genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            genes: genes
                .into_iter()
                .map(|g| g.as_ref().trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
        }
    }

    /// Either a delimited file with a `GeneSymbol` header column (comma or tab)
    /// or plain text with one symbol per line
    pub fn from_path(path: &Path) -> Result<Self> {
        let err = |reason: String| VarvennError::Panel {
            path: path.display().to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let first_line = text.lines().next().unwrap_or_default();
        let panel = if first_line.contains(SYMBOL_HEADER) {
            let delimiter = if first_line.contains('\t') { b'\t' } else { b',' };
            let mut reader = ReaderBuilder::new()
                .delimiter(delimiter)
                .has_headers(true)
                .flexible(true)
                .from_reader(text.as_bytes());
            let headers = reader.headers().map_err(|e| err(e.to_string()))?.clone();
            let column = headers
                .iter()
                .position(|h| h.trim().trim_matches('"') == SYMBOL_HEADER)
                .ok_or_else(|| err(format!("no {} column", SYMBOL_HEADER)))?;
            let mut genes = vec![];
            for record in reader.records() {
                let record = record.map_err(|e| err(e.to_string()))?;
                if let Some(gene) = record.get(column) {
                    genes.push(gene.trim_matches('"').to_string());
                }
            }
            GenePanel::new(&name, genes)
        } else {
            GenePanel::new(&name, text.lines())
        };

        if panel.is_empty() {
            return Err(err("no gene symbols".to_string()));
        }
        info!("loaded panel {} with {} genes", panel.name, panel.len());
        Ok(panel)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn genes(&self) -> &IndexSet<String> {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Rows whose gene is in the panel, grouped in panel order. The table keeps
    /// its name. An empty result is logged, not raised.
    pub fn filter(&self, table: &ParsedTable) -> Result<ParsedTable> {
        info!("running panel {} on {}", self.name, table.name());
        table.require_column(GENE_COLUMN)?;

        let mut by_gene: Vec<Vec<usize>> = vec![vec![]; self.genes.len()];
        for (idx, row) in table.rows().iter().enumerate() {
            if let Some(slot) = self.genes.get_index_of(&row.get(GENE_COLUMN).to_string()) {
                by_gene[slot].push(idx);
            }
        }

        let mut result = table.filtered(|_| false);
        for idx in by_gene.into_iter().flatten() {
            result.push_row(table.rows()[idx].clone());
        }
        if result.is_empty() {
            error!("after running panel {}, {} holds no variants", self.name, table.name());
        }
        Ok(result)
    }
}

/// `COLUMN TEXT` row exclusion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: String,
    pub text: String,
}

impl ColumnFilter {
    /// Exactly two whitespace separated words
    pub fn parse(raw: &str) -> Option<Self> {
        let words: Vec<&str> = raw.split_whitespace().collect();
        match words.as_slice() {
            [column, text] => Some(Self {
                column: column.to_string(),
                text: text.to_string(),
            }),
            _ => None,
        }
    }

    /// Drops rows whose column contains the text, or with `Empty`, rows
    /// whose column is missing
    pub fn apply(&self, table: &ParsedTable) -> Result<ParsedTable> {
        table.require_column(&self.column)?;
        let result = if self.text == EMPTY_SENTINEL {
            table.filtered(|row| !row.get(&self.column).is_missing())
        } else {
            table.filtered(|row| {
                let value = row.get(&self.column);
                value.is_missing() || !value.to_string().contains(&self.text)
            })
        };
        info!(
            "filter {} {} removed {} rows",
            self.column,
            self.text,
            table.len() - result.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vvlib::{Value, VariantKey, VariantRow};
    use std::io::Write;

    fn table() -> ParsedTable {
        let mut table = ParsedTable::new("PAT01");
        for (pos, gene, effect) in [
            (1, "BRCA1", "missense_variant"),
            (2, "TP53", "intron_variant"),
            (3, "BRCA1", "."),
            (4, "APOE", "stop_gained"),
        ] {
            let mut row = VariantRow::new(VariantKey::new("1", pos, "A", "C"));
            row.set(GENE_COLUMN, Value::from(gene));
            row.set("EFFECT", Value::from(effect));
            table.push_row(row);
        }
        table
    }

    #[test]
    fn panel_order_wins() {
        let panel = GenePanel::new("cancer", ["TP53", "BRCA1", "TP53"]);
        assert_eq!(panel.len(), 2);
        let result = panel.filter(&table()).unwrap();
        assert_eq!(result.name(), "PAT01");
        let positions: Vec<u64> = result.rows().iter().map(|r| r.key.pos).collect();
        assert_eq!(positions, vec![2, 1, 3]);
    }

    #[test]
    fn empty_panel_result_is_not_fatal() {
        let panel = GenePanel::new("none", ["CFTR"]);
        let result = panel.filter(&table()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), table().columns());
    }

    #[test]
    fn panel_needs_gene_column() {
        let panel = GenePanel::new("p", ["CFTR"]);
        assert!(matches!(
            panel.filter(&ParsedTable::new("X")),
            Err(VarvennError::MissingColumn { .. })
        ));
    }

    #[test]
    fn panel_files() {
        let mut plain = tempfile::NamedTempFile::new().unwrap();
        writeln!(plain, "BRCA1\nBRCA2\n\nBRCA1").unwrap();
        let panel = GenePanel::from_path(plain.path()).unwrap();
        assert_eq!(panel.len(), 2);

        let mut sheet = tempfile::NamedTempFile::new().unwrap();
        writeln!(sheet, "Id,GeneSymbol,Notes\n1,CFTR,x\n2,APOE,y").unwrap();
        let panel = GenePanel::from_path(sheet.path()).unwrap();
        let genes: Vec<&str> = panel.genes().iter().map(|g| g.as_str()).collect();
        assert_eq!(genes, vec!["CFTR", "APOE"]);
    }

    #[test]
    fn column_filters() {
        assert!(ColumnFilter::parse("EFFECT").is_none());
        assert!(ColumnFilter::parse("EFFECT a b").is_none());

        let f = ColumnFilter::parse("EFFECT intron").unwrap();
        assert_eq!(f.apply(&table()).unwrap().len(), 3);

        let f = ColumnFilter::parse("EFFECT Empty").unwrap();
        assert_eq!(f.apply(&table()).unwrap().len(), 3);

        let f = ColumnFilter::parse("NOPE x").unwrap();
        assert!(f.apply(&table()).is_err());
    }
}
