//! Reconstructed content elements.

use serde::{Deserialize, Serialize};

use super::BBox;
use crate::error::{Error, Result};

/// Kind of a reconstructed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Vector,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Text => write!(f, "text"),
            ElementKind::Image => write!(f, "image"),
            ElementKind::Vector => write!(f, "vector"),
        }
    }
}

/// A unit of reconstructed content on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// A merged line of text
    Text(TextElement),
    /// A raster image saved as a JPEG asset
    Image(AssetElement),
    /// A vector drawing saved as an SVG asset
    Vector(AssetElement),
}

/// Text content with the font metrics of its first run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub bbox: BBox,
    pub content: String,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextElement {
    /// Append another run, separated by a single space.
    ///
    /// Font metadata is left untouched: the first run decides it.
    pub fn append(&mut self, text: &str) {
        self.content.push(' ');
        self.content.push_str(text);
    }
}

/// Reference to an asset file persisted next to the HTML output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetElement {
    pub bbox: BBox,
    /// File name relative to the output folder
    pub filename: String,
}

impl Element {
    /// Create a text element.
    ///
    /// Fails with [`Error::MalformedElement`] on a degenerate bbox or empty text.
    pub fn text(
        bbox: BBox,
        content: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Result<Self> {
        let content = content.into();
        validate(ElementKind::Text, &bbox, &content)?;
        Ok(Element::Text(TextElement {
            bbox,
            content,
            font_size,
            font_name: font_name.into(),
        }))
    }

    /// Create an image element pointing at a saved asset.
    pub fn image(bbox: BBox, filename: impl Into<String>) -> Result<Self> {
        let filename = filename.into();
        validate(ElementKind::Image, &bbox, &filename)?;
        Ok(Element::Image(AssetElement { bbox, filename }))
    }

    /// Create a vector element pointing at a saved asset.
    pub fn vector(bbox: BBox, filename: impl Into<String>) -> Result<Self> {
        let filename = filename.into();
        validate(ElementKind::Vector, &bbox, &filename)?;
        Ok(Element::Vector(AssetElement { bbox, filename }))
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Text(_) => ElementKind::Text,
            Element::Image(_) => ElementKind::Image,
            Element::Vector(_) => ElementKind::Vector,
        }
    }

    pub fn bbox(&self) -> &BBox {
        match self {
            Element::Text(t) => &t.bbox,
            Element::Image(a) | Element::Vector(a) => &a.bbox,
        }
    }

    /// Text payload for text elements, asset file name otherwise.
    pub fn content(&self) -> &str {
        match self {
            Element::Text(t) => &t.content,
            Element::Image(a) | Element::Vector(a) => &a.filename,
        }
    }

    /// Top edge, the reading-order key.
    pub fn y0(&self) -> f32 {
        self.bbox().y0
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Element::Text(_))
    }
}

fn validate(kind: ElementKind, bbox: &BBox, content: &str) -> Result<()> {
    if !bbox.is_well_formed() {
        return Err(Error::MalformedElement(format!(
            "{} element has degenerate bbox {:?}",
            kind,
            bbox.to_array()
        )));
    }
    if content.is_empty() {
        return Err(Error::MalformedElement(format!(
            "{} element has empty content",
            kind
        )));
    }
    Ok(())
}
