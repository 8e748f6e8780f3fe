use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::error::{ExtractionError, ExtractionResult};
use crate::text::element_text;

/// Placeholder identifier for headers that normalize to nothing
pub const UNNAMED_COLUMN: &str = "sin_nombre";

/// Ordered symbol replacements applied after lowercasing
const REPLACEMENTS: &[(&str, &str)] = &[
    ("nº", "numero"),
    ("n°", "numero"),
    ("#", "numero"),
    ("$", "pesos"),
    ("%", "porcentaje"),
    ("€", "euros"),
    ("ñ", "n"),
    ("á", "a"),
    ("é", "e"),
    ("í", "i"),
    ("ó", "o"),
    ("ú", "u"),
    ("ü", "u"),
];

/// Turns raw header text into canonical, collision-free identifiers
pub struct HeaderNormalizer {
    symbols: Regex,
    whitespace: Regex,
    underscores: Regex,
}

impl HeaderNormalizer {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            symbols: Regex::new(r"[^\w\s]")?,
            whitespace: Regex::new(r"\s+")?,
            underscores: Regex::new(r"_+")?,
        })
    }

    /// Canonical identifier for one raw header text
    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return UNNAMED_COLUMN.to_string();
        }

        let mut name = raw.to_lowercase();
        for (from, to) in REPLACEMENTS {
            name = name.replace(from, to);
        }

        let name = self.symbols.replace_all(&name, "");
        let name = self.whitespace.replace_all(name.trim(), "_");
        let name = self.underscores.replace_all(&name, "_");
        let name = name.trim_matches('_');

        if name.is_empty() {
            UNNAMED_COLUMN.to_string()
        } else {
            name.to_string()
        }
    }

    /// Resolve a collision against already-used names with the first unused
    /// "_2", "_3", … suffix
    pub fn dedupe(&self, name: String, used: &[String]) -> String {
        if !used.contains(&name) {
            return name;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{name}_{counter}");
            if !used.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Extracts the ordered column names of a table root
pub struct HeaderExtractor {
    normalizer: HeaderNormalizer,
    thead_rows: Selector,
    rows: Selector,
    header_cells: Selector,
    cells: Selector,
}

impl HeaderExtractor {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            normalizer: HeaderNormalizer::new()?,
            thead_rows: Selector::parse("thead tr").map_err(ExtractionError::selector)?,
            rows: Selector::parse("tr").map_err(ExtractionError::selector)?,
            header_cells: Selector::parse("th").map_err(ExtractionError::selector)?,
            cells: Selector::parse("th, td").map_err(ExtractionError::selector)?,
        })
    }

    /// Canonical column names for one table root.
    ///
    /// Falls back to synthesized "columna_N" names when no header row can be
    /// identified.
    pub fn extract(&self, table: ElementRef) -> ExtractionResult<Vec<String>> {
        let mut headers = Vec::new();

        if let Some(row) = self.header_row(table) {
            for cell in row.select(&self.cells) {
                let text = element_text(cell);
                let name = self.normalizer.normalize(text.trim());
                let name = self.normalizer.dedupe(name, &headers);
                headers.push(name);
            }
        }

        if headers.is_empty() {
            if let Some(first) = table.select(&self.rows).next() {
                let count = first.select(&self.cells).count();
                headers = (1..=count).map(|i| format!("columna_{i}")).collect();
            }
        }

        Ok(headers)
    }

    /// Header row preference: first row of a `<thead>`, else the first row
    /// carrying `<th>` cells, else the first row
    fn header_row<'a>(&self, table: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if let Some(row) = table.select(&self.thead_rows).next() {
            return Some(row);
        }
        if let Some(row) = table
            .select(&self.rows)
            .find(|row| row.select(&self.header_cells).next().is_some())
        {
            return Some(row);
        }
        table.select(&self.rows).next()
    }
}
