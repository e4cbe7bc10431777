//! Document-level extraction.

use super::{AssetWriter, ExtractOptions, PageExtractor};
use crate::error::Result;
use crate::logging::SharedLogger;
use crate::model::{Document, Page};
use crate::source::DocumentSource;

/// Extracts every selected page of a source, in ascending order.
pub struct DocumentExtractor {
    options: ExtractOptions,
    pages: PageExtractor,
    logger: SharedLogger,
}

impl DocumentExtractor {
    pub fn new(options: ExtractOptions, logger: SharedLogger) -> Self {
        let pages = PageExtractor::new(options.clone(), logger.clone());
        Self {
            options,
            pages,
            logger,
        }
    }

    /// Extract the document named `name` from `source`.
    ///
    /// Pages outside the selection are skipped; extracted pages keep their
    /// original number. No partial document is returned on failure.
    pub fn extract<S: DocumentSource + ?Sized>(
        &self,
        source: &S,
        name: &str,
        assets: &AssetWriter,
    ) -> Result<Document> {
        let mut doc = Document::new(name);
        let total = source.page_count();

        for index in 0..total {
            let number = index as u32 + 1;
            if !self.options.pages.includes(number) {
                continue;
            }

            let page = match self.pages.extract(source, index, assets) {
                Ok(page) => page,
                Err(e) if self.options.error_mode.tolerates(&e) => {
                    self.logger
                        .warn(&format!("page {}: content skipped: {}", number, e));
                    Page::new(index)
                }
                Err(e) => return Err(e),
            };

            self.logger.debug(&format!(
                "page {}/{}: {} elements",
                number,
                total,
                page.element_count()
            ));
            doc.add_page(page);
        }

        self.logger.info(&format!(
            "extracted {} of {} pages from {}",
            doc.page_count(),
            total,
            name
        ));
        Ok(doc)
    }
}
