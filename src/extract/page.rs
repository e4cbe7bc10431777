//! Per-page extraction.

use super::{AssetWriter, ExtractOptions, TextRunMerger};
use crate::error::Result;
use crate::logging::SharedLogger;
use crate::model::{BBox, Element, Page};
use crate::source::{DocumentSource, Drawing, RawBlockContent, RawImageRef};

/// Turns one page of a source into a reading-ordered [`Page`].
pub struct PageExtractor {
    options: ExtractOptions,
    merger: TextRunMerger,
    logger: SharedLogger,
}

impl PageExtractor {
    pub fn new(options: ExtractOptions, logger: SharedLogger) -> Self {
        let merger = TextRunMerger::new(options.y_tolerance, logger.clone());
        Self {
            options,
            merger,
            logger,
        }
    }

    /// Extract page `index` (0-based), writing its assets through `assets`.
    pub fn extract<S: DocumentSource + ?Sized>(
        &self,
        source: &S,
        index: usize,
        assets: &AssetWriter,
    ) -> Result<Page> {
        let raw = source.load_page(index)?;
        let page_number = index as u32 + 1;
        let mut elements = Vec::new();

        for block in &raw.blocks {
            match &block.content {
                RawBlockContent::Text(lines) => {
                    self.merger.merge_block(&mut elements, &block.bbox, lines);
                }
                RawBlockContent::Vector(drawing) => {
                    if !self.options.extract_vectors {
                        continue;
                    }
                    if let Some(element) = self.materialize_vector(
                        page_number,
                        block.number,
                        &block.bbox,
                        drawing,
                        assets,
                    )? {
                        elements.push(element);
                    }
                }
            }
        }

        if self.options.extract_images {
            for (i, image) in raw.images.iter().enumerate() {
                match self.materialize_image(source, index, i + 1, image, assets) {
                    Ok(Some(element)) => elements.push(element),
                    Ok(None) => {}
                    Err(e) if self.options.error_mode.tolerates(&e) => {
                        self.logger.warn(&format!(
                            "page {}: skipping image {}: {}",
                            page_number, image.reference, e
                        ));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        sort_reading_order(&mut elements);
        Ok(Page::with_elements(index, elements))
    }

    fn materialize_image<S: DocumentSource + ?Sized>(
        &self,
        source: &S,
        index: usize,
        image_index: usize,
        image: &RawImageRef,
        assets: &AssetWriter,
    ) -> Result<Option<Element>> {
        // Resolve first so a bad reference fails even when the placement is unusable
        let raw = source.resolve_image(index, &image.reference)?;

        if !image.bbox.is_well_formed() {
            self.logger.debug(&format!(
                "page {}: skipping image {} with malformed placement",
                index + 1,
                image.reference
            ));
            return Ok(None);
        }

        let filename = assets.write_image(index as u32 + 1, image_index, &raw)?;
        Element::image(image.bbox, filename).map(Some)
    }

    fn materialize_vector(
        &self,
        page_number: u32,
        block_number: u32,
        bbox: &BBox,
        drawing: &Drawing,
        assets: &AssetWriter,
    ) -> Result<Option<Element>> {
        self.logger.warn(&format!(
            "page {}: vector block {} exported as SVG; SVG output is not verified and may not match the page",
            page_number, block_number
        ));

        if !bbox.is_well_formed() {
            self.logger.debug(&format!(
                "page {}: skipping vector block {} with malformed bbox",
                page_number, block_number
            ));
            return Ok(None);
        }

        let filename = assets.write_vector(page_number, block_number, bbox, drawing)?;
        Element::vector(*bbox, filename).map(Some)
    }
}

/// Stable sort by top edge; ties keep their insertion order.
pub fn sort_reading_order(elements: &mut [Element]) {
    elements.sort_by(|a, b| a.y0().total_cmp(&b.y0()));
}
