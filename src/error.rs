//! Error types for the relayout library.

use std::io;
use thiserror::Error;

/// Result type alias for relayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the source or writing assets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document cannot be opened or parsed.
    #[error("Cannot open document: {0}")]
    DocumentOpen(String),

    /// An embedded resource reference does not resolve to a raster resource.
    #[error("Invalid resource reference {reference} on page {page}")]
    InvalidResourceReference {
        /// Page number (1-indexed)
        page: u32,
        /// The offending reference as reported by the source
        reference: String,
    },

    /// An element would be built with a degenerate bbox or empty content.
    #[error("Malformed element: {0}")]
    MalformedElement(String),

    /// Error interpreting PDF objects or content streams.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// An embedded image could not be decoded.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// An embedded image uses an encoding or color space that cannot be
    /// converted. Always skipped with a warning.
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// An image asset could not be encoded or written.
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid page selection string or page index.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),
}

impl Error {
    /// Whether lenient extraction may skip the failing item and continue.
    ///
    /// Structural errors such as [`Error::InvalidResourceReference`] are
    /// never recoverable. See [`Error::is_skippable`] for errors skipped in
    /// every mode.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ImageDecode(_)
                | Error::PdfParse(_)
                | Error::MalformedElement(_)
                | Error::UnsupportedImage(_)
        )
    }

    /// Whether the failing item is skipped even in strict mode.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Error::UnsupportedImage(_))
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                Error::ImageDecode(err.to_string())
            }
            _ => Error::ImageEncode(err.to_string()),
        }
    }
}
