//! End-to-end conversion: source → element model → HTML and assets.
//!
//! # Example
//!
//! ```no_run
//! use relayout::convert::{ConvertOptions, Converter};
//!
//! fn main() -> relayout::Result<()> {
//!     let converter = Converter::new(ConvertOptions::new().with_json(true));
//!     let result = converter.convert_file("report.pdf", "out")?;
//!     println!("{}", result.html_path.display());
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::extract::{AssetWriter, DocumentExtractor, ExtractOptions};
use crate::logging::{LogFacade, SharedLogger};
use crate::model::Document;
use crate::render::{to_json, ConversionStats, HtmlRenderer, JsonFormat, RenderOptions};
use crate::source::{DocumentSource, PdfSource};

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Extraction options
    pub extract: ExtractOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// JSON export of the element model, if any
    pub json: Option<JsonFormat>,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Also write `{name}.json` (pretty-printed) next to the HTML.
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled.then_some(JsonFormat::Pretty);
        self
    }

    /// Set the JSON export format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json = Some(format);
        self
    }
}

/// Result of a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Folder holding the HTML and its assets
    pub output_dir: PathBuf,

    /// Path of the written HTML file
    pub html_path: PathBuf,

    /// Path of the JSON export, when enabled
    pub json_path: Option<PathBuf>,

    /// The extracted element model
    pub document: Document,

    /// Conversion statistics
    pub stats: ConversionStats,
}

/// Runs the full pipeline for one document at a time.
pub struct Converter {
    options: ConvertOptions,
    logger: SharedLogger,
}

impl Converter {
    /// Create a converter logging through the `log` facade.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            logger: LogFacade::shared(),
        }
    }

    /// Use a different logger.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a PDF file into `output_root/{file stem}/`.
    ///
    /// The source is opened before anything is created on disk, so a file
    /// that cannot be opened leaves no output behind.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output_root: Q,
    ) -> Result<ConvertResult> {
        let input = input.as_ref();
        let source = PdfSource::open(input)?;
        let name = base_name(input);
        let output_dir = output_root.as_ref().join(&name);

        self.logger.debug(&format!(
            "opened {} (PDF {}, {} pages)",
            input.display(),
            source.version(),
            source.page_count()
        ));
        self.convert_source(&source, &name, output_dir)
    }

    /// Convert any source into `output_dir`, naming the HTML `{name}.html`.
    pub fn convert_source<S: DocumentSource + ?Sized, P: AsRef<Path>>(
        &self,
        source: &S,
        name: &str,
        output_dir: P,
    ) -> Result<ConvertResult> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let assets = AssetWriter::new(output_dir, self.logger.clone());
        let extractor = DocumentExtractor::new(self.options.extract.clone(), self.logger.clone());
        let document = extractor.extract(source, name, &assets)?;

        self.write_outputs(document, output_dir)
    }

    fn write_outputs(&self, document: Document, output_dir: &Path) -> Result<ConvertResult> {
        let html_path = output_dir.join(format!("{}.html", document.name));
        HtmlRenderer::new(self.options.render.clone()).write(&document, &html_path)?;

        let json_path = match self.options.json {
            Some(format) => {
                let path = output_dir.join(format!("{}.json", document.name));
                fs::write(&path, to_json(&document, format)?)?;
                Some(path)
            }
            None => None,
        };

        let stats = ConversionStats::from_document(&document);
        self.logger.info(&format!(
            "wrote {} ({} pages, {} text, {} images, {} vectors)",
            html_path.display(),
            stats.page_count,
            stats.text_count,
            stats.image_count,
            stats.vector_count
        ));

        Ok(ConvertResult {
            output_dir: output_dir.to_path_buf(),
            html_path,
            json_path,
            document,
            stats,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

/// Base name of a source path (its file stem).
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}
