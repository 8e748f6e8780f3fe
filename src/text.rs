use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::error::ExtractionResult;

/// Concatenated trimmed text of one element, nested markup flattened
pub fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .concat()
}

/// Char offset of the first occurrence of `token` in `text`
pub fn char_offset_of(text: &str, token: &str) -> Option<usize> {
    text.find(token)
        .map(|byte| text[..byte].chars().count())
}

/// Renders a parsed document to plain text: trimmed text nodes joined by
/// newlines, script/style/noscript subtrees dropped
pub struct TextRenderer {
    blank_runs: Regex,
}

impl TextRenderer {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            blank_runs: Regex::new(r"\n{3,}")?,
        })
    }

    /// Plain text of the whole document
    pub fn render(&self, document: &Html) -> String {
        self.render_with_placeholders(document, &HashMap::new())
    }

    /// Plain text with each node in `placeholders` replaced by its token;
    /// the token stands in for the node's entire subtree
    pub fn render_with_placeholders(
        &self,
        document: &Html,
        placeholders: &HashMap<NodeId, String>,
    ) -> String {
        let mut pieces = Vec::new();
        collect_text(document.tree.root(), placeholders, &mut pieces);

        let text = pieces.join("\n");
        self.blank_runs
            .replace_all(&text, "\n\n")
            .trim()
            .to_string()
    }
}

fn collect_text(
    node: NodeRef<Node>,
    placeholders: &HashMap<NodeId, String>,
    out: &mut Vec<String>,
) {
    if let Some(token) = placeholders.get(&node.id()) {
        out.push(token.clone());
        return;
    }

    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            return;
        }
        Node::Element(element) => {
            if matches!(element.name(), "script" | "style" | "noscript") {
                return;
            }
        }
        Node::Document | Node::Fragment => {}
        _ => return,
    }

    for child in node.children() {
        collect_text(child, placeholders, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_drops_scripts_and_styles() {
        let document = Html::parse_document(
            "<html><head><style>p { color: red; }</style></head>
             <body><p>Visible</p><script>var x = 1;</script></body></html>",
        );
        let text = TextRenderer::new().unwrap().render(&document);
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_render_joins_blocks_with_newlines() {
        let document =
            Html::parse_document("<html><body><p>Uno</p><p>Dos</p></body></html>");
        let text = TextRenderer::new().unwrap().render(&document);
        assert_eq!(text, "Uno\nDos");
    }

    #[test]
    fn test_placeholder_substitution() {
        let document = Html::parse_document(
            "<html><body><p>Antes</p><table><tr><td>celda</td></tr></table>
             <p>Después</p></body></html>",
        );
        let selector = scraper::Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();

        let mut placeholders = HashMap::new();
        placeholders.insert(table.id(), "[TABLE_1]".to_string());

        let renderer = TextRenderer::new().unwrap();
        let text = renderer.render_with_placeholders(&document, &placeholders);
        assert_eq!(text, "Antes\n[TABLE_1]\nDespués");
        assert!(!text.contains("celda"));
        assert_eq!(char_offset_of(&text, "[TABLE_1]"), Some(6));
    }

    #[test]
    fn test_char_offset_counts_chars_not_bytes() {
        let text = "Año\n[TABLE_1]";
        assert_eq!(char_offset_of(text, "[TABLE_1]"), Some(4));
    }
}
