use std::collections::HashSet;

use ego_tree::NodeId;
use scraper::{ElementRef, Selector};

use crate::error::{ExtractionError, ExtractionResult};
use crate::model::{CellValue, TableRow};
use crate::numeric::NumericParser;
use crate::text::element_text;

/// Extracts ordered typed data rows from a table root
pub struct RowExtractor {
    numeric: NumericParser,
    rows: Selector,
    cells: Selector,
    header_cells: Selector,
    thead_rows: Selector,
}

impl RowExtractor {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            numeric: NumericParser::new()?,
            rows: Selector::parse("tr").map_err(ExtractionError::selector)?,
            cells: Selector::parse("td, th").map_err(ExtractionError::selector)?,
            header_cells: Selector::parse("th").map_err(ExtractionError::selector)?,
            thead_rows: Selector::parse("thead tr").map_err(ExtractionError::selector)?,
        })
    }

    /// Data rows of `table` keyed by the declared `columns`.
    ///
    /// Every declared column is present in every row (missing cells become
    /// Null); cells beyond the declared columns get synthesized
    /// "columna_N" keys. Rows whose values are all Null are dropped.
    pub fn extract(
        &self,
        table: ElementRef,
        columns: &[String],
    ) -> ExtractionResult<Vec<TableRow>> {
        let all_rows: Vec<ElementRef> = table.select(&self.rows).collect();
        let mut rows = Vec::new();

        for row in self.data_rows(table, &all_rows) {
            let cells: Vec<ElementRef> = row.select(&self.cells).collect();
            if cells.is_empty() {
                continue;
            }

            let mut record = TableRow::new();
            for name in columns {
                record.insert(name.clone(), CellValue::Null);
            }
            for (i, cell) in cells.iter().enumerate() {
                let name = columns
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("columna_{}", i + 1));
                record.insert(name, self.numeric.parse_cell(&element_text(*cell)));
            }

            if record.values().any(|value| !value.is_null()) {
                rows.push(record);
            }
        }

        Ok(rows)
    }

    /// Data rows are whatever the header rule does not claim: rows under a
    /// `<thead>` when one exists, else rows carrying `<th>` cells; if
    /// neither excludes anything, everything after the first row.
    ///
    /// The parser always synthesizes `<tbody>`, so membership there says
    /// nothing about a row being data.
    fn data_rows<'a>(
        &self,
        table: ElementRef<'a>,
        all_rows: &[ElementRef<'a>],
    ) -> Vec<ElementRef<'a>> {
        let thead_rows: HashSet<NodeId> =
            table.select(&self.thead_rows).map(|row| row.id()).collect();
        if !thead_rows.is_empty() {
            return all_rows
                .iter()
                .copied()
                .filter(|row| !thead_rows.contains(&row.id()))
                .collect();
        }

        let without_headers: Vec<ElementRef> = all_rows
            .iter()
            .copied()
            .filter(|row| row.select(&self.header_cells).next().is_none())
            .collect();

        if without_headers.len() == all_rows.len() {
            // Nothing was header-flagged, so the first row was the header
            return all_rows.get(1..).unwrap_or_default().to_vec();
        }

        without_headers
    }
}
