//! Positional table extraction over tag soup.
//!
//! The source pages are not well-formed, so tables are located with
//! shortest-match expressions instead of a DOM: a block expression isolates
//! the table, a row expression splits it, and a cell expression pulls a
//! fixed number of cells out of each row. Rows that do not yield every cell
//! are skipped so one broken row never costs the rest of the page.

use crate::utils::error::Result;
use regex::Regex;

#[derive(Debug, Clone)]
pub enum CellPattern {
    /// One expression whose capture groups are the cells, in order.
    Sequence(Regex),
    /// A single-cell expression applied repeatedly; the first `arity`
    /// matches are the cells.
    Repeated { cell: Regex, arity: usize },
}

impl CellPattern {
    pub fn sequence(pattern: &str) -> Result<Self> {
        Ok(CellPattern::Sequence(Regex::new(pattern)?))
    }

    pub fn repeated(pattern: &str, arity: usize) -> Result<Self> {
        Ok(CellPattern::Repeated {
            cell: Regex::new(pattern)?,
            arity,
        })
    }

    pub fn arity(&self) -> usize {
        match self {
            CellPattern::Sequence(re) => re.captures_len() - 1,
            CellPattern::Repeated { arity, .. } => *arity,
        }
    }

    fn cells(&self, row: &str) -> Option<Vec<String>> {
        match self {
            CellPattern::Sequence(re) => {
                let caps = re.captures(row)?;
                Some(
                    (1..re.captures_len())
                        .map(|i| caps.get(i).map_or("", |m| m.as_str()).trim().to_string())
                        .collect(),
                )
            }
            CellPattern::Repeated { cell, arity } => {
                let cells: Vec<String> = cell
                    .captures_iter(row)
                    .take(*arity)
                    .map(|caps| {
                        caps.get(1)
                            .or_else(|| caps.get(0))
                            .map_or("", |m| m.as_str())
                            .trim()
                            .to_string()
                    })
                    .collect();
                (cells.len() == *arity).then_some(cells)
            }
        }
    }
}

/// Block → row → cell pattern for one kind of table.
#[derive(Debug, Clone)]
pub struct TablePattern {
    blocks: Vec<Regex>,
    row: Regex,
    cells: CellPattern,
    skip_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub rows: Vec<Vec<String>>,
    /// Row candidates that did not yield every cell.
    pub skipped: usize,
    pub block_found: bool,
}

impl TablePattern {
    pub fn new(block: &str, row: &str, cells: CellPattern) -> Result<Self> {
        Ok(Self {
            blocks: vec![Regex::new(block)?],
            row: Regex::new(row)?,
            cells,
            skip_rows: 0,
        })
    }

    /// 在前一個區塊內再縮小範圍
    pub fn within(mut self, block: &str) -> Result<Self> {
        self.blocks.push(Regex::new(block)?);
        Ok(self)
    }

    /// 略過前幾列（表頭），不論它們能否匹配
    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn arity(&self) -> usize {
        self.cells.arity()
    }

    /// First match of every block expression in turn; `None` means the page
    /// has no such table.
    pub fn isolate_block<'a>(&self, markup: &'a str) -> Option<&'a str> {
        let mut block = markup;
        for re in &self.blocks {
            block = re.find(block)?.as_str();
        }
        Some(block)
    }

    pub fn extract(&self, markup: &str) -> Extraction {
        let Some(block) = self.isolate_block(markup) else {
            return Extraction::default();
        };

        let mut extraction = Extraction {
            block_found: true,
            ..Default::default()
        };
        for row in self.row.find_iter(block).skip(self.skip_rows) {
            match self.cells.cells(row.as_str()) {
                Some(cells) => extraction.rows.push(cells),
                None => extraction.skipped += 1,
            }
        }
        extraction
    }
}

/// 抽取表格中所有完整的列，每列固定 `pattern.arity()` 欄
pub fn extract_records(markup: &str, pattern: &TablePattern) -> Vec<Vec<String>> {
    pattern.extract(markup).rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub label: String,
}

/// Second-pass pattern re-applied to one captured cell to pull out a link.
/// The expression must capture the href first and the label second.
#[derive(Debug, Clone)]
pub struct AnchorPattern(Regex);

impl AnchorPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self(Regex::new(pattern)?))
    }

    pub fn extract(&self, cell: &str) -> Option<Anchor> {
        let caps = self.0.captures(cell)?;
        Some(Anchor {
            href: caps.get(1)?.as_str().trim().to_string(),
            label: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
        })
    }
}
