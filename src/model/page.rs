//! Page-level types.

use super::{Element, ElementKind};
use serde::{Deserialize, Serialize};

/// The elements of one page, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-indexed)
    pub index: usize,

    /// Elements sorted by their top edge
    pub elements: Vec<Element>,
}

impl Page {
    /// Create an empty page.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            elements: Vec::new(),
        }
    }

    /// Create a page from already ordered elements.
    pub fn with_elements(index: usize, elements: Vec<Element>) -> Self {
        Self { index, elements }
    }

    /// Page number as rendered (1-indexed).
    pub fn number(&self) -> u32 {
        self.index as u32 + 1
    }

    /// Check if the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements on the page.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of elements of a given kind.
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind() == kind).count()
    }

    /// Check the reading-order invariant (non-decreasing `y0`).
    pub fn is_reading_ordered(&self) -> bool {
        self.elements.windows(2).all(|w| w[0].y0() <= w[1].y0())
    }

    /// Text content of the page, one element per line.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| e.as_text().map(|t| t.content.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
