// Public module exports for the library and the extract_tables binary
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod model;
pub mod montos;
pub mod numeric;
pub mod tables;
pub mod text;

pub use config::ExtractorConfig;
pub use error::{ExtractionError, ExtractionResult};
pub use extractor::TableExtractor;
pub use model::{
    tables_from_json, tables_to_json, CellValue, ColumnStats, ColumnType, StructuredTable,
    TableRow, TableSchema, TableStats,
};
pub use montos::{MontoMatch, MontoScanner};
