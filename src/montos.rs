//! Monetary-amount scanning over extracted document text.
//!
//! This is a collaborator of the table engine, not part of it: callers run
//! it over the placeholder-bearing text that `extract` returns and persist
//! the resulting index alongside the structured tables.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionResult;

/// Characters kept around a match when looking for its legal context
const CONTEXT_WINDOW: usize = 200;

/// Quotations longer than this are cut at a word boundary
const MAX_QUOTE_CHARS: usize = 150;

/// One peso amount found in a document, with its legal context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontoMatch {
    pub monto: f64,
    pub moneda: String,
    pub norma_tipo: String,
    pub norma_numero: String,
    pub articulo: String,
    pub cita: String,
    pub position: usize,
}

/// Norm-type markers checked in order against the match window
const NORMA_MARKERS: &[(&str, &str)] = &[
    ("Ordenanza", r"(?i)ORDENANZA\s+N[º°]?\s*(\d+\S*)"),
    ("Decreto", r"(?i)DECRETO\s+N[º°]?\s*(\d+\S*)"),
    ("Resolución", r"(?i)RESOLUCI[ÓO]N\s+N[º°]?\s*(\d+\S*)"),
    ("Disposición", r"(?i)DISPOSICI[ÓO]N\s+N[º°]?\s*(\d+\S*)"),
];

/// Scans plain text for Argentine peso amounts ("$ 155.162,86")
pub struct MontoScanner {
    amount: Regex,
    normas: Vec<(&'static str, Regex)>,
    articulo: Regex,
}

impl MontoScanner {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            amount: Regex::new(r"\$\s*(\d{1,3}(?:\.\d{3})*(?:,\d+)?|\d+)")?,
            normas: NORMA_MARKERS
                .iter()
                .map(|(tipo, pattern)| Regex::new(pattern).map(|regex| (*tipo, regex)))
                .collect::<Result<Vec<_>, _>>()?,
            articulo: Regex::new(r"(?i)ART[ÍI]CULO\s+N?[º°]?\s*(\d+[A-Za-z]?)")?,
        })
    }

    /// All peso amounts in `text`, in document order. Never fails.
    pub fn scan(&self, text: &str) -> Vec<MontoMatch> {
        let mut matches = Vec::new();

        for caps in self.amount.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(monto) = parse_amount(number.as_str()) else {
                continue;
            };

            let window = char_window(text, whole.start(), whole.end(), CONTEXT_WINDOW);
            let (norma_tipo, norma_numero) = self.norma_info(window);

            matches.push(MontoMatch {
                monto,
                moneda: "ARS".to_string(),
                norma_tipo,
                norma_numero,
                articulo: self.articulo_number(window),
                cita: quotation(window),
                position: text[..whole.start()].chars().count(),
            });
        }

        matches
    }

    /// Norm type and number near the amount, defaulting to ("Norma", "S/N")
    fn norma_info(&self, window: &str) -> (String, String) {
        for (tipo, pattern) in &self.normas {
            if let Some(number) = pattern.captures(window).and_then(|caps| caps.get(1)) {
                return (tipo.to_string(), number.as_str().to_string());
            }
        }
        ("Norma".to_string(), "S/N".to_string())
    }

    fn articulo_number(&self, window: &str) -> String {
        self.articulo
            .captures(window)
            .and_then(|caps| caps.get(1))
            .map(|number| number.as_str().to_string())
            .unwrap_or_else(|| "S/N".to_string())
    }
}

/// 1.234.567,89 → 1234567.89
fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace('.', "").replace(',', ".").parse().ok()
}

/// Slice of `text` spanning `radius` chars on each side of the match,
/// aligned to char boundaries
fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let begin = text[..start]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let stop = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[begin..stop]
}

/// The sentence of the window that carries the amount, whitespace collapsed
/// and cut at a word boundary when too long
fn quotation(window: &str) -> String {
    for sentence in window.split(['.', '\n']) {
        if sentence.contains('$') || sentence.to_uppercase().contains("PESOS") {
            let cleaned = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
            return truncate_words(&cleaned, MAX_QUOTE_CHARS);
        }
    }

    let cleaned = window.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_words(&cleaned, 100)
}

fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit - 3).collect();
    let cut = cut.rsplit_once(' ').map(|(head, _)| head).unwrap_or(&cut);
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> MontoScanner {
        MontoScanner::new().unwrap()
    }

    #[test]
    fn test_scan_argentine_amount() {
        let text = "ORDENANZA Nº 4521. ARTÍCULO 2º: Fíjase la tasa en $ 155.162,86 por período.";
        let matches = scanner().scan(text);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.monto, 155162.86);
        assert_eq!(m.moneda, "ARS");
        assert_eq!(m.norma_tipo, "Ordenanza");
        assert_eq!(m.norma_numero, "4521.");
        assert_eq!(m.articulo, "2");
        assert!(m.cita.contains("$ 155"));
    }

    #[test]
    fn test_scan_without_norma_markers() {
        let matches = scanner().scan("Importe total: $1500 por mes.");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].monto, 1500.0);
        assert_eq!(matches[0].norma_tipo, "Norma");
        assert_eq!(matches[0].norma_numero, "S/N");
        assert_eq!(matches[0].articulo, "S/N");
    }

    #[test]
    fn test_scan_multiple_positions_increase() {
        let text = "Primer pago de $ 100,50 y luego un saldo de $ 2.000.";
        let matches = scanner().scan(text);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].monto, 100.5);
        assert_eq!(matches[1].monto, 2000.0);
        assert!(matches[0].position < matches[1].position);
    }

    #[test]
    fn test_text_without_amounts() {
        assert!(scanner().scan("Sin montos por aquí.").is_empty());
    }
}
