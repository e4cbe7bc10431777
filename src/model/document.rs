//! Document-level types.

use super::{ElementKind, Page};
use serde::{Deserialize, Serialize};

/// A reconstructed document: pages in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Base name of the source (file stem for files)
    pub name: String,

    /// Pages in source order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number() == page_num)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of elements across pages.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(Page::element_count).sum()
    }

    /// Total number of elements of one kind across pages.
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.pages.iter().map(|p| p.count_kind(kind)).sum()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(Page::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
