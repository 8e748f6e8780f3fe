use crate::error::ExtractionResult;
use crate::model::{CellValue, TableRow};
use crate::numeric;

/// Canonical pipe-delimited text rendering of an extracted table
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Header line, dash separator, one line per row. Numbers are formatted
    /// in the Argentine convention; nulls render as a dash. No columns or no
    /// rows yields empty text.
    pub fn render(&self, columns: &[String], data: &[TableRow]) -> ExtractionResult<String> {
        if columns.is_empty() || data.is_empty() {
            return Ok(String::new());
        }

        let mut lines = Vec::with_capacity(data.len() + 2);
        lines.push(format!("| {} |", columns.join(" | ")));
        lines.push(format!("| {} |", vec!["---"; columns.len()].join(" | ")));

        for row in data {
            let cells: Vec<String> = columns
                .iter()
                .map(|name| format_cell(row.get(name)))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }

        Ok(lines.join("\n"))
    }
}

fn format_cell(value: Option<&CellValue>) -> String {
    match value {
        None | Some(CellValue::Null) => "-".to_string(),
        Some(CellValue::Integer(n)) => numeric::format_thousands(*n),
        Some(CellValue::Number(x)) => numeric::format_decimal(*x),
        Some(CellValue::Text(t)) => t.clone(),
    }
}
