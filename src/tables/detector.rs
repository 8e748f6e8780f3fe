use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::DetectionConfig;
use crate::error::{ExtractionError, ExtractionResult};

/// Locates qualifying, non-nested table roots in document order
pub struct TableDetector {
    config: DetectionConfig,
    tables: Selector,
    rows: Selector,
    cells: Selector,
}

impl TableDetector {
    pub fn new(config: DetectionConfig) -> ExtractionResult<Self> {
        Ok(Self {
            config,
            tables: Selector::parse("table").map_err(ExtractionError::selector)?,
            rows: Selector::parse("tr").map_err(ExtractionError::selector)?,
            cells: Selector::parse("td, th").map_err(ExtractionError::selector)?,
        })
    }

    /// All outermost `<table>` roots with at least `min_rows` rows and
    /// `min_cols` colspan-weighted columns, in document order.
    ///
    /// Never fails: malformed or table-free markup yields an empty list.
    pub fn detect<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let mut found = Vec::new();

        for table in document.select(&self.tables) {
            if self.is_nested(table) {
                continue;
            }

            let rows: Vec<ElementRef> = table.select(&self.rows).collect();
            if rows.len() < self.config.min_rows {
                continue;
            }

            let max_cols = rows
                .iter()
                .map(|row| self.column_span(*row))
                .max()
                .unwrap_or(0);
            if max_cols < self.config.min_cols {
                continue;
            }

            found.push(table);
        }

        debug!(tables = found.len(), "table detection finished");
        found
    }

    /// Inner tables of a nested group are only reported through their
    /// outermost root; their markup still counts toward that root's rows
    fn is_nested(&self, table: ElementRef) -> bool {
        table
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| ancestor.value().name() == "table")
    }

    /// Colspan-weighted cell count of one row (default span 1)
    fn column_span(&self, row: ElementRef) -> usize {
        row.select(&self.cells)
            .map(|cell| {
                cell.value()
                    .attr("colspan")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1)
            })
            .sum()
    }
}
