use ego_tree::NodeRef;
use regex::Regex;
use scraper::{ElementRef, Node};

use crate::config::ContextConfig;
use crate::error::ExtractionResult;
use crate::model::ColumnType;
use crate::tables::headers::UNNAMED_COLUMN;
use crate::text::element_text;

/// Fixed context used when a table has no surrounding text
pub const NO_CONTEXT: &str = "Tabla sin contexto";

/// Labelled-section markers that may carry a table's title. Checked in
/// order; the captured clause runs to the next period.
const TITLE_PATTERNS: &[&str] = &[
    r"(?i)(?:Artículo|Art\.?)\s*\d+[°º]?\s*[-:.]?\s*([^.]+)",
    r"(?i)Anexo\s*[IVX\d]+\s*[-:.]?\s*([^.]+)",
    r"(?i)Tabla\s*\d*\s*[-:.]?\s*([^.]+)",
    r"(?i)Cuadro\s*\d*\s*[-:.]?\s*([^.]+)",
];

#[derive(Clone, Copy)]
enum Direction {
    Before,
    After,
}

/// Bounded-window capture of the text surrounding a table
pub struct ContextExtractor {
    max_chars: usize,
}

impl ContextExtractor {
    pub fn new(config: ContextConfig) -> Self {
        Self {
            max_chars: config.max_chars,
        }
    }

    /// Up to `max_chars` trailing characters of preceding-sibling text plus
    /// up to `max_chars` leading characters of following-sibling text
    pub fn extract(&self, table: ElementRef) -> ExtractionResult<String> {
        let mut parts = Vec::new();

        let before = self.sibling_text(table, Direction::Before);
        if !before.is_empty() {
            parts.push(tail_chars(&before, self.max_chars));
        }

        let after = self.sibling_text(table, Direction::After);
        if !after.is_empty() {
            parts.push(head_chars(&after, self.max_chars));
        }

        let context = parts.join(" ").trim().to_string();
        Ok(if context.is_empty() {
            NO_CONTEXT.to_string()
        } else {
            context
        })
    }

    fn sibling_text(&self, table: ElementRef, direction: Direction) -> String {
        let mut texts: Vec<String> = Vec::new();
        let mut total = 0usize;

        let siblings: Box<dyn Iterator<Item = NodeRef<Node>> + '_> = match direction {
            Direction::Before => Box::new(table.prev_siblings()),
            Direction::After => Box::new(table.next_siblings()),
        };

        for sibling in siblings {
            let text = match sibling.value() {
                Node::Text(text) => text.trim().to_string(),
                Node::Element(_) => ElementRef::wrap(sibling)
                    .map(element_text)
                    .unwrap_or_default(),
                _ => String::new(),
            };

            if !text.is_empty() {
                total += text.chars().count() + 1;
                match direction {
                    // prev_siblings walks away from the table; keep document order
                    Direction::Before => texts.insert(0, text),
                    Direction::After => texts.push(text),
                }
            }

            // Scan cap: twice the window bounds the walk on long documents
            if total > self.max_chars * 2 {
                break;
            }
        }

        texts.join(" ")
    }
}

/// Heuristic title and description text from context and column names
pub struct TitleGenerator {
    patterns: Vec<Regex>,
}

impl TitleGenerator {
    pub fn new() -> ExtractionResult<Self> {
        let patterns = TITLE_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Title from the first labelled-section clause of acceptable length,
    /// else from up to three significant column names, else a generic one
    pub fn title(&self, context: &str, columns: &[String]) -> ExtractionResult<String> {
        for pattern in &self.patterns {
            if let Some(clause) = pattern
                .captures(context)
                .and_then(|caps| caps.get(1))
            {
                let clause = clause.as_str().trim();
                let len = clause.chars().count();
                if (10..=100).contains(&len) {
                    return Ok(head_chars(clause, 100));
                }
            }
        }

        let significant = significant_columns(columns);
        if !significant.is_empty() {
            return Ok(format!("Tabla de {}", significant.join(", ")));
        }

        Ok("Tabla de datos".to_string())
    }

    /// Deterministic sentence reporting row, column and numeric-column
    /// counts plus the leading significant column names
    pub fn description(
        &self,
        columns: &[String],
        types: &[ColumnType],
        row_count: usize,
    ) -> ExtractionResult<String> {
        let numeric_cols = types
            .iter()
            .filter(|column_type| **column_type == ColumnType::Number)
            .count();

        let mut parts = vec![format!(
            "Tabla con {} filas y {} columnas",
            row_count,
            columns.len()
        )];

        if numeric_cols > 0 {
            parts.push(format!("({} numéricas)", numeric_cols));
        }

        let significant = significant_columns(columns);
        if !significant.is_empty() {
            parts.push(format!("Columnas: {}", significant.join(", ")));
        }

        Ok(format!("{}.", parts.join(". ")))
    }
}

/// Leading column names that are neither "sin_nombre" nor synthesized
/// "columna_N" placeholders, capped at three
fn significant_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .take(3)
        .filter(|name| *name != UNNAMED_COLUMN && !name.starts_with("columna_"))
        .cloned()
        .collect()
}

fn head_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn tail_chars(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        text.to_string()
    } else {
        text.chars().skip(count - limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn context_of(html: &str) -> String {
        let document = Html::parse_document(html);
        let selector = Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();
        ContextExtractor::new(ContextConfig { max_chars: 500 })
            .extract(table)
            .unwrap()
    }

    #[test]
    fn test_context_captures_both_sides() {
        let context = context_of(
            "<html><body><p>Contexto anterior de la tabla.</p>
             <table><tr><td>a</td></tr></table>
             <p>Contexto posterior de la tabla.</p></body></html>",
        );
        assert!(context.contains("Contexto anterior"));
        assert!(context.contains("Contexto posterior"));
    }

    #[test]
    fn test_context_default_when_isolated() {
        let context = context_of("<html><body><table><tr><td>a</td></tr></table></body></html>");
        assert_eq!(context, NO_CONTEXT);
    }

    #[test]
    fn test_context_respects_window() {
        let long_paragraph = format!("<p>{}</p>", "x".repeat(2000));
        let html = format!(
            "<html><body>{long_paragraph}<table><tr><td>a</td></tr></table></body></html>"
        );
        let context = context_of(&html);
        assert_eq!(context.chars().count(), 500);
    }

    #[test]
    fn test_title_from_article_marker() {
        let titles = TitleGenerator::new().unwrap();
        let title = titles
            .title(
                "Artículo 2: Las tasas se aplicarán según la siguiente escala. Más texto.",
                &[],
            )
            .unwrap();
        assert_eq!(title, "Las tasas se aplicarán según la siguiente escala");
    }

    #[test]
    fn test_title_skips_short_clauses() {
        let titles = TitleGenerator::new().unwrap();
        let title = titles
            .title("Artículo 5: corto.", &["categoria".to_string(), "monto".to_string()])
            .unwrap();
        assert_eq!(title, "Tabla de categoria, monto");
    }

    #[test]
    fn test_generic_title_fallback() {
        let titles = TitleGenerator::new().unwrap();
        let title = titles
            .title("Sin marcadores aquí", &["columna_1".to_string(), "sin_nombre".to_string()])
            .unwrap();
        assert_eq!(title, "Tabla de datos");
    }

    #[test]
    fn test_description_sentence() {
        let titles = TitleGenerator::new().unwrap();
        let description = titles
            .description(
                &["nombre".to_string(), "edad".to_string(), "monto".to_string()],
                &[ColumnType::String, ColumnType::Number, ColumnType::Number],
                2,
            )
            .unwrap();
        assert_eq!(
            description,
            "Tabla con 2 filas y 3 columnas. (2 numéricas). Columnas: nombre, edad, monto."
        );
    }
}
