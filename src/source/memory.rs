//! In-memory document source.
//!
//! Useful for producers that already hold positioned primitives (and for
//! tests): pages are assembled with [`MemoryPage`] and images live in a
//! table keyed by object number.

use std::collections::HashMap;

use super::{
    DocumentSource, Drawing, RawBlock, RawImage, RawImageRef, RawLine, RawPage, RawSpan,
    ResourceRef,
};
use crate::error::{Error, Result};
use crate::model::BBox;

/// A page under construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    blocks: Vec<RawBlock>,
    images: Vec<RawImageRef>,
    unreadable: Option<String>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose content cannot be loaded.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            unreadable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Add a block as-is.
    pub fn block(mut self, block: RawBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Add a text block with a single line made of `spans`.
    pub fn text_line(mut self, bbox: BBox, spans: Vec<RawSpan>) -> Self {
        let number = self.blocks.len() as u32;
        let line = RawLine { bbox, spans };
        self.blocks.push(RawBlock::text(number, bbox, vec![line]));
        self
    }

    /// Add a text block containing a single span.
    pub fn text(self, bbox: BBox, text: &str, font_size: f32, font_name: &str) -> Self {
        self.text_line(bbox, vec![RawSpan::new(text, font_size, font_name)])
    }

    /// Add a vector block.
    pub fn vector(mut self, bbox: BBox, drawing: Drawing) -> Self {
        let number = self.blocks.len() as u32;
        self.blocks.push(RawBlock::vector(number, bbox, drawing));
        self
    }

    /// Place an image on the page.
    pub fn image(mut self, reference: ResourceRef, bbox: BBox) -> Self {
        self.images.push(RawImageRef { reference, bbox });
        self
    }
}

/// A [`DocumentSource`] backed by in-memory pages.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<MemoryPage>,
    images: HashMap<u32, RawImage>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page.
    pub fn page(mut self, page: MemoryPage) -> Self {
        self.pages.push(page);
        self
    }

    /// Register image bytes under an object number.
    pub fn with_image(mut self, number: u32, image: RawImage) -> Self {
        self.images.insert(number, image);
        self
    }
}

impl DocumentSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<RawPage> {
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| Error::InvalidPageRange(format!("page index {} out of range", index)))?;

        if let Some(ref reason) = page.unreadable {
            return Err(Error::PdfParse(reason.clone()));
        }

        Ok(RawPage {
            blocks: page.blocks.clone(),
            images: page.images.clone(),
        })
    }

    fn resolve_image(&self, page: usize, reference: &ResourceRef) -> Result<RawImage> {
        let invalid = || Error::InvalidResourceReference {
            page: page as u32 + 1,
            reference: reference.to_string(),
        };

        match reference {
            ResourceRef::Object { number, .. } => {
                self.images.get(number).cloned().ok_or_else(invalid)
            }
            ResourceRef::Unresolved(_) => Err(invalid()),
        }
    }
}
