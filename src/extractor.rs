use std::collections::HashMap;

use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::model::{ColumnType, StructuredTable, TableSchema, TableStats};
use crate::tables::{
    ContextExtractor, HeaderExtractor, MarkdownRenderer, RowExtractor, StatsCalculator,
    TableDetector, TitleGenerator, TypeInferencer, NO_CONTEXT,
};
use crate::text::{char_offset_of, TextRenderer};

/// Inputs shorter than this cannot carry a qualifying table and are
/// returned as-is
const MIN_HTML_CHARS: usize = 50;

/// Orchestrates table detection, per-table structuring and placeholder
/// layout over one HTML document.
///
/// One instance is reusable and shareable: `extract` takes `&self`, holds no
/// mutable state across calls, and never fails.
pub struct TableExtractor {
    detector: TableDetector,
    headers: HeaderExtractor,
    rows: RowExtractor,
    types: TypeInferencer,
    stats: StatsCalculator,
    renderer: MarkdownRenderer,
    context: ContextExtractor,
    titles: TitleGenerator,
    text: TextRenderer,
}

impl TableExtractor {
    pub fn new() -> ExtractionResult<Self> {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> ExtractionResult<Self> {
        Ok(Self {
            detector: TableDetector::new(config.detection)?,
            headers: HeaderExtractor::new()?,
            rows: RowExtractor::new()?,
            types: TypeInferencer::new()?,
            stats: StatsCalculator,
            renderer: MarkdownRenderer,
            context: ContextExtractor::new(config.context),
            titles: TitleGenerator::new()?,
            text: TextRenderer::new()?,
        })
    }

    /// Extract tables from `html`.
    ///
    /// Returns the document text with every detected table replaced by its
    /// "[TABLE_N]" placeholder, plus one structured record per table in
    /// detection order. On a whole-document failure the text degrades to a
    /// plain-text rendering and finally to the raw input, both with an
    /// empty table list.
    pub fn extract(&self, html: &str) -> (String, Vec<StructuredTable>) {
        if html.chars().count() < MIN_HTML_CHARS {
            return (html.to_string(), Vec::new());
        }

        match self.try_extract(html) {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "document extraction failed, falling back to plain text");
                match self.plain_text(html) {
                    Ok(text) => (text, Vec::new()),
                    Err(err) => {
                        warn!(error = %err, "plain-text fallback failed, returning raw input");
                        (html.to_string(), Vec::new())
                    }
                }
            }
        }
    }

    fn try_extract(&self, html: &str) -> ExtractionResult<(String, Vec<StructuredTable>)> {
        let document = Html::parse_document(html);

        let elements = self.detector.detect(&document);
        if elements.is_empty() {
            return Ok((self.text.render(&document), Vec::new()));
        }
        debug!(tables = elements.len(), "processing detected tables");

        let tables: Vec<StructuredTable> = elements
            .iter()
            .enumerate()
            .map(|(idx, element)| self.process_table(*element, idx))
            .collect();

        let placeholders: HashMap<_, _> = elements
            .iter()
            .enumerate()
            .map(|(idx, element)| (element.id(), placeholder_token(idx)))
            .collect();
        let content = self.text.render_with_placeholders(&document, &placeholders);

        // Finalize: the one-time position assignment
        let tables = tables
            .into_iter()
            .enumerate()
            .map(|(idx, table)| {
                let position =
                    char_offset_of(&content, &placeholder_token(idx)).unwrap_or(0);
                table.at_position(position)
            })
            .collect();

        Ok((content, tables))
    }

    fn plain_text(&self, html: &str) -> ExtractionResult<String> {
        let document = Html::parse_document(html);
        Ok(self.text.render(&document))
    }

    /// Build one structured table. Every sub-step is isolated: a failure is
    /// recorded in this table's error list and replaced by a safe default so
    /// the remaining sub-steps still run; other tables are unaffected.
    fn process_table(&self, element: ElementRef, idx: usize) -> StructuredTable {
        let id = format!("TABLE_{}", idx + 1);
        let mut errors = Vec::new();

        let context = run_step(&mut errors, "contexto", NO_CONTEXT.to_string(), || {
            self.context.extract(element)
        });

        let columns = run_step(&mut errors, "encabezados", Vec::new(), || {
            self.headers.extract(element)
        });

        let data = run_step(&mut errors, "datos", Vec::new(), || {
            self.rows.extract(element, &columns)
        });

        let types = run_step(
            &mut errors,
            "tipos",
            vec![ColumnType::String; columns.len()],
            || self.types.infer(&columns, &data),
        );

        let stats = run_step(&mut errors, "estadisticas", TableStats::empty(data.len()), || {
            self.stats.calculate(&columns, &types, &data)
        });

        let markdown = run_step(&mut errors, "markdown", String::new(), || {
            self.renderer.render(&columns, &data)
        });

        let title = run_step(&mut errors, "titulo", format!("Tabla {}", idx + 1), || {
            self.titles.title(&context, &columns)
        });
        let description = run_step(
            &mut errors,
            "descripcion",
            format!("Tabla con {} filas", data.len()),
            || self.titles.description(&columns, &types, data.len()),
        );

        if !errors.is_empty() {
            warn!(table = %id, errors = errors.len(), "table extracted with sub-step errors");
        }

        StructuredTable {
            id,
            title,
            context,
            description,
            position: 0,
            schema: TableSchema { columns, types },
            data,
            stats,
            markdown,
            extraction_errors: errors,
        }
    }
}

fn placeholder_token(idx: usize) -> String {
    format!("[TABLE_{}]", idx + 1)
}

/// Run one isolated sub-step: an error becomes an entry in `errors` and the
/// step's safe default
fn run_step<T>(
    errors: &mut Vec<String>,
    step: &str,
    fallback: T,
    op: impl FnOnce() -> ExtractionResult<T>,
) -> T {
    match op() {
        Ok(value) => value,
        Err(source) => {
            let err = ExtractionError::table_step(step, source.to_string());
            warn!(error = %err, recoverable = err.is_recoverable(), "table sub-step isolated");
            errors.push(format!("Error en {}: {}", step, source));
            fallback
        }
    }
}
