//! # relayout
//!
//! Page layout reconstruction for PDF documents.
//!
//! This library reads the positioned content of each page (text runs, raster
//! images, vector drawings), merges text fragments that belong to one visual
//! line, orders everything top to bottom and writes a single HTML document
//! with JPEG and SVG assets next to it.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> relayout::Result<()> {
//!     // Writes out/report/report.html plus image_*.jpeg and vector_*.svg
//!     let result = relayout::convert_file("report.pdf", "out")?;
//!     println!("{} pages", result.stats.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`source`]: the [`DocumentSource`] adapter and its lopdf-backed
//!   [`PdfSource`]
//! - [`extract`]: text-run merging, asset materialization, reading order
//! - [`render`]: HTML synthesis, SVG serialization, JSON export
//! - [`convert`]: the end-to-end [`Converter`]
//!
//! Components log through an injected [`logging::Logger`]; nothing in the
//! library touches process-wide state.

pub mod convert;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use convert::{ConvertOptions, ConvertResult, Converter};
pub use error::{Error, Result};
pub use extract::{DocumentExtractor, ErrorMode, ExtractOptions, PageExtractor, PageSelection};
pub use logging::{LogFacade, Logger, NullLogger, RecordingLogger, SharedLogger};
pub use model::{AssetElement, BBox, Document, Element, ElementKind, Page, TextElement};
pub use render::{ConversionStats, HtmlRenderer, JsonFormat, RenderOptions};
pub use source::{DocumentSource, MemoryPage, MemorySource, PdfSource};

use std::path::Path;

/// Convert a PDF file into `output_root/{file stem}/` with default options.
///
/// # Example
///
/// ```no_run
/// let result = relayout::convert_file("slides.pdf", "out").unwrap();
/// assert!(result.html_path.ends_with("slides/slides.html"));
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_root: Q,
) -> Result<ConvertResult> {
    Converter::default().convert_file(input, output_root)
}

/// Extract the element model of a PDF file, writing its assets to `asset_dir`.
///
/// No HTML is produced.
///
/// # Example
///
/// ```no_run
/// let doc = relayout::extract_file("slides.pdf", "assets").unwrap();
/// println!("{}", doc.plain_text());
/// ```
pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(path: P, asset_dir: Q) -> Result<Document> {
    let path = path.as_ref();
    let source = PdfSource::open(path)?;
    let asset_dir = asset_dir.as_ref();
    std::fs::create_dir_all(asset_dir)?;

    let logger = LogFacade::shared();
    let assets = extract::AssetWriter::new(asset_dir, logger.clone());
    DocumentExtractor::new(ExtractOptions::default(), logger).extract(
        &source,
        &convert::base_name(path),
        &assets,
    )
}

/// Builder for converting documents.
///
/// # Example
///
/// ```no_run
/// use relayout::Relayout;
///
/// let result = Relayout::new()
///     .with_tolerance(3.0)
///     .lenient()
///     .with_vectors(false)
///     .with_json(true)
///     .convert("document.pdf", "out")?;
/// # Ok::<(), relayout::Error>(())
/// ```
pub struct Relayout {
    options: ConvertOptions,
    logger: Option<SharedLogger>,
}

impl Relayout {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            logger: None,
        }
    }

    /// Set the vertical merge tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.options.extract = self.options.extract.with_tolerance(tolerance);
        self
    }

    /// Enable lenient mode (skip undecodable images and pages).
    pub fn lenient(mut self) -> Self {
        self.options.extract = self.options.extract.lenient();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.extract = self.options.extract.with_pages(pages);
        self
    }

    /// Enable or disable image export.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.options.extract = self.options.extract.with_images(extract);
        self
    }

    /// Enable or disable vector export.
    pub fn with_vectors(mut self, extract: bool) -> Self {
        self.options.extract = self.options.extract.with_vectors(extract);
        self
    }

    /// Set the CSS font family of text elements.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.options.render = self.options.render.with_font_family(family);
        self
    }

    /// Also write the element model as JSON.
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.options = self.options.with_json(enabled);
        self
    }

    /// Use a custom logger.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    fn converter(self) -> Converter {
        let converter = Converter::new(self.options);
        match self.logger {
            Some(logger) => converter.with_logger(logger),
            None => converter,
        }
    }

    /// Convert a PDF file into `output_root/{file stem}/`.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        self,
        input: P,
        output_root: Q,
    ) -> Result<ConvertResult> {
        self.converter().convert_file(input, output_root)
    }

    /// Convert any source into `output_dir`.
    pub fn convert_source<S: DocumentSource + ?Sized, P: AsRef<Path>>(
        self,
        source: &S,
        name: &str,
        output_dir: P,
    ) -> Result<ConvertResult> {
        self.converter().convert_source(source, name, output_dir)
    }
}

impl Default for Relayout {
    fn default() -> Self {
        Self::new()
    }
}
