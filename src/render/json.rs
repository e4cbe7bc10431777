//! JSON rendering of the element model.

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse a document previously written by [`to_json`].
pub fn from_json(json: &str) -> Result<Document> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Element, Page};

    fn sample() -> Document {
        let mut doc = Document::new("report");
        doc.add_page(Page::with_elements(
            0,
            vec![
                Element::text(BBox::new(10.0, 10.0, 200.0, 22.0), "Hello", 12.0, "Helvetica")
                    .unwrap(),
                Element::image(BBox::new(10.0, 40.0, 110.0, 90.0), "image_1_1.jpeg").unwrap(),
            ],
        ));
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"type\": \"text\""));
        assert!(json.contains("\"type\": \"image\""));
        assert!(json.contains("image_1_1.jpeg"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"bbox\":[10.0,10.0,200.0,22.0]"));
    }

    #[test]
    fn test_json_parses_back() {
        let doc = sample();
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert_eq!(from_json(&json).unwrap(), doc);
        assert!(from_json("{").is_err());
    }
}
