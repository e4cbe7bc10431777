//! Conversion statistics.

use serde::{Deserialize, Serialize};

use crate::model::{Document, Element};

/// Statistics collected for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Total number of pages processed
    pub page_count: u32,

    /// Number of text elements
    pub text_count: u32,

    /// Number of image assets written
    pub image_count: u32,

    /// Number of vector assets written
    pub vector_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics over a whole document.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self::new();
        for page in &doc.pages {
            stats.add_page();
            for element in &page.elements {
                stats.add_element(element);
            }
        }
        stats
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Count one element by kind.
    pub fn add_element(&mut self, element: &Element) {
        match element {
            Element::Text(text) => {
                self.text_count += 1;
                self.count_text(&text.content);
            }
            Element::Image(_) => self.image_count += 1,
            Element::Vector(_) => self.vector_count += 1,
        }
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Total number of elements.
    pub fn element_count(&self) -> u32 {
        self.text_count + self.image_count + self.vector_count
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.page_count += other.page_count;
        self.text_count += other.text_count;
        self.image_count += other.image_count;
        self.vector_count += other.vector_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
