use indexmap::IndexMap;
use regex::Regex;

use crate::error::ExtractionResult;
use crate::model::{CellValue, ColumnStats, ColumnType, TableRow, TableStats};

/// Date-like shape: 1-2 digits, separator, 1-2 digits, the same separator,
/// then a 2- or 4-digit year
const DATE_SHAPE: &str = r"^(?:\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})|\d{1,2}-\d{1,2}-(?:\d{4}|\d{2}))$";

/// Majority-vote column type classification
pub struct TypeInferencer {
    date_shape: Regex,
}

impl TypeInferencer {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            date_shape: Regex::new(DATE_SHAPE)?,
        })
    }

    /// One type tag per declared column
    pub fn infer(
        &self,
        columns: &[String],
        data: &[TableRow],
    ) -> ExtractionResult<Vec<ColumnType>> {
        Ok(columns
            .iter()
            .map(|name| self.infer_column(name, data))
            .collect())
    }

    fn infer_column(&self, column: &str, data: &[TableRow]) -> ColumnType {
        let values: Vec<&CellValue> = data
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_null())
            .collect();

        if values.is_empty() {
            return ColumnType::String;
        }

        let numeric = values.iter().filter(|value| value.is_numeric()).count();
        if numeric > values.len() - numeric {
            return ColumnType::Number;
        }

        let dates = values
            .iter()
            .filter(|value| matches!(value, CellValue::Text(t) if self.date_shape.is_match(t)))
            .count();
        if dates * 2 > values.len() {
            ColumnType::Date
        } else {
            ColumnType::String
        }
    }
}

/// Aggregate statistics over the numeric columns of a table
pub struct StatsCalculator;

impl StatsCalculator {
    /// Sum, max, min, avg (2-decimal rounded) and count per Number column.
    ///
    /// Columns without a single numeric observation are omitted from the
    /// map; `row_count` always reflects every extracted data row.
    pub fn calculate(
        &self,
        columns: &[String],
        types: &[ColumnType],
        data: &[TableRow],
    ) -> ExtractionResult<TableStats> {
        let mut numeric_stats = IndexMap::new();

        for (name, column_type) in columns.iter().zip(types) {
            if *column_type != ColumnType::Number {
                continue;
            }

            let values: Vec<f64> = data
                .iter()
                .filter_map(|row| row.get(name))
                .filter_map(CellValue::as_f64)
                .collect();
            if values.is_empty() {
                continue;
            }

            let sum: f64 = values.iter().sum();
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);

            numeric_stats.insert(
                name.clone(),
                ColumnStats {
                    sum: round2(sum),
                    max: round2(max),
                    min: round2(min),
                    avg: round2(sum / values.len() as f64),
                    count: values.len(),
                },
            );
        }

        Ok(TableStats {
            row_count: data.len(),
            numeric_stats,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> TableRow {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_infer_number_and_string() {
        let inferencer = TypeInferencer::new().unwrap();
        let data = vec![
            row(&[
                ("nombre", CellValue::Text("Juan".into())),
                ("edad", CellValue::Integer(25)),
            ]),
            row(&[
                ("nombre", CellValue::Text("María".into())),
                ("edad", CellValue::Integer(30)),
            ]),
        ];
        let types = inferencer
            .infer(&["nombre".into(), "edad".into()], &data)
            .unwrap();
        assert_eq!(types, vec![ColumnType::String, ColumnType::Number]);
    }

    #[test]
    fn test_infer_date_shape() {
        let inferencer = TypeInferencer::new().unwrap();
        let data = vec![
            row(&[("fecha", CellValue::Text("01/02/2026".into()))]),
            row(&[("fecha", CellValue::Text("15-03-26".into()))]),
            row(&[("fecha", CellValue::Text("3/4/2026".into()))]),
        ];
        let types = inferencer.infer(&["fecha".into()], &data).unwrap();
        assert_eq!(types, vec![ColumnType::Date]);
    }

    #[test]
    fn test_mixed_separators_are_not_dates() {
        let inferencer = TypeInferencer::new().unwrap();
        let data = vec![
            row(&[("fecha", CellValue::Text("01/02-2026".into()))]),
            row(&[("fecha", CellValue::Text("15/03/202".into()))]),
        ];
        let types = inferencer.infer(&["fecha".into()], &data).unwrap();
        assert_eq!(types, vec![ColumnType::String]);
    }

    #[test]
    fn test_empty_column_is_string() {
        let inferencer = TypeInferencer::new().unwrap();
        let data = vec![row(&[("vacia", CellValue::Null)])];
        let types = inferencer.infer(&["vacia".into()], &data).unwrap();
        assert_eq!(types, vec![ColumnType::String]);
    }

    #[test]
    fn test_stats_worked_example() {
        // ["1.500,00", "2.000,50"] parsed upstream
        let data = vec![
            row(&[("monto", CellValue::Number(1500.0))]),
            row(&[("monto", CellValue::Number(2000.5))]),
        ];
        let stats = StatsCalculator
            .calculate(&["monto".into()], &[ColumnType::Number], &data)
            .unwrap();

        let monto = &stats.numeric_stats["monto"];
        assert_eq!(monto.sum, 3500.5);
        assert_eq!(monto.max, 2000.5);
        assert_eq!(monto.min, 1500.0);
        assert_eq!(monto.avg, 1750.25);
        assert_eq!(monto.count, 2);
        assert_eq!(stats.row_count, 2);
    }

    #[test]
    fn test_stats_skip_stray_text_and_nulls() {
        let data = vec![
            row(&[("edad", CellValue::Integer(25))]),
            row(&[("edad", CellValue::Text("s/d".into()))]),
            row(&[("edad", CellValue::Null)]),
            row(&[("edad", CellValue::Integer(30))]),
        ];
        let stats = StatsCalculator
            .calculate(&["edad".into()], &[ColumnType::Number], &data)
            .unwrap();

        let edad = &stats.numeric_stats["edad"];
        assert_eq!(edad.count, 2);
        assert_eq!(edad.sum, 55.0);
        assert_eq!(edad.avg, 27.5);
        assert_eq!(stats.row_count, 4);
    }

    #[test]
    fn test_column_without_numbers_is_omitted() {
        let data = vec![row(&[("vacia", CellValue::Null)])];
        let stats = StatsCalculator
            .calculate(&["vacia".into()], &[ColumnType::Number], &data)
            .unwrap();
        assert!(stats.numeric_stats.is_empty());
        assert_eq!(stats.row_count, 1);
    }
}
