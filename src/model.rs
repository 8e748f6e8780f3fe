use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Inferred type tag for a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Date,
}

/// A single cell value as extracted from a table.
///
/// Integers and fractional values are kept apart so that "25" and "1.500,00"
/// serialize as 25 and 1500.0 respectively. Untagged: the JSON form is the
/// plain value (null, number, or string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Number(_))
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(value) => Some(*value as f64),
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// One data row: ordered column name → value mapping.
///
/// Every declared column key is present in every row; an absent cell is
/// `CellValue::Null`, never an omitted key.
pub type TableRow = IndexMap<String, CellValue>;

/// Schema of an extracted table: ordered unique column names plus a parallel
/// list of inferred types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<String>,
    pub types: Vec<ColumnType>,
}

/// Aggregate statistics for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub sum: f64,
    pub max: f64,
    pub min: f64,
    pub avg: f64,
    pub count: usize,
}

/// Statistics block for an extracted table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStats {
    pub row_count: usize,
    #[serde(default)]
    pub numeric_stats: IndexMap<String, ColumnStats>,
}

impl TableStats {
    pub fn empty(row_count: usize) -> Self {
        Self {
            row_count,
            numeric_stats: IndexMap::new(),
        }
    }
}

/// Complete structured representation of one extracted table.
///
/// Immutable after construction; `position` is assigned exactly once through
/// [`StructuredTable::at_position`] when placeholders have been laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTable {
    pub id: String,
    pub title: String,
    pub context: String,
    pub description: String,
    pub position: usize,
    pub schema: TableSchema,
    pub data: Vec<TableRow>,
    pub stats: TableStats,
    pub markdown: String,
    #[serde(default)]
    pub extraction_errors: Vec<String>,
}

impl StructuredTable {
    /// Finalize step: produce the same record with `position` set
    pub fn at_position(self, position: usize) -> Self {
        Self { position, ..self }
    }
}

/// Serialize a table list to pretty JSON. Non-ASCII text is preserved
/// unescaped.
pub fn tables_to_json(tables: &[StructuredTable]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tables)
}

/// Inverse of [`tables_to_json`]
pub fn tables_from_json(json: &str) -> serde_json::Result<Vec<StructuredTable>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_json_forms() {
        assert_eq!(serde_json::to_string(&CellValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&CellValue::Integer(25)).unwrap(), "25");
        assert_eq!(
            serde_json::to_string(&CellValue::Number(1500.5)).unwrap(),
            "1500.5"
        );
        assert_eq!(
            serde_json::to_string(&CellValue::Text("Juan".into())).unwrap(),
            "\"Juan\""
        );

        let parsed: CellValue = serde_json::from_str("25").unwrap();
        assert_eq!(parsed, CellValue::Integer(25));
        let parsed: CellValue = serde_json::from_str("1500.5").unwrap();
        assert_eq!(parsed, CellValue::Number(1500.5));
        let parsed: CellValue = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, CellValue::Null);
    }

    #[test]
    fn test_at_position_preserves_fields() {
        let table = StructuredTable {
            id: "TABLE_1".into(),
            title: "Tabla de datos".into(),
            context: "Tabla sin contexto".into(),
            description: "Tabla con 0 filas y 0 columnas.".into(),
            position: 0,
            schema: TableSchema {
                columns: vec![],
                types: vec![],
            },
            data: vec![],
            stats: TableStats::empty(0),
            markdown: String::new(),
            extraction_errors: vec![],
        };

        let placed = table.clone().at_position(42);
        assert_eq!(placed.position, 42);
        assert_eq!(placed.id, table.id);
        assert_eq!(placed.schema, table.schema);
    }

    #[test]
    fn test_json_roundtrip_preserves_unicode() {
        let mut row = TableRow::new();
        row.insert("nombre".to_string(), CellValue::Text("Año 2026".into()));
        row.insert("valor".to_string(), CellValue::Integer(100));

        let table = StructuredTable {
            id: "TABLE_1".into(),
            title: "Tasas por categoría".into(),
            context: "Artículo 2: escala de tasas".into(),
            description: "Tabla con 1 filas y 2 columnas.".into(),
            position: 10,
            schema: TableSchema {
                columns: vec!["nombre".into(), "valor".into()],
                types: vec![ColumnType::String, ColumnType::Number],
            },
            data: vec![row],
            stats: TableStats::empty(1),
            markdown: "| nombre | valor |".into(),
            extraction_errors: vec![],
        };

        let json = tables_to_json(std::slice::from_ref(&table)).unwrap();
        assert!(json.contains("Año 2026"));
        assert!(!json.contains("\\u"));

        let restored = tables_from_json(&json).unwrap();
        assert_eq!(restored, vec![table]);
    }
}
