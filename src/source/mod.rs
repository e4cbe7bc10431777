//! Source abstraction layer.
//!
//! Provides a trait-based interface to the raw per-page primitives a
//! paginated document exposes (text blocks, vector drawings, embedded
//! raster images), isolating the concrete parsing library from merging,
//! ordering and rendering.

mod interpreter;
mod memory;
mod pdf;

pub use memory::{MemoryPage, MemorySource};
pub use pdf::PdfSource;

use crate::error::Result;
use crate::model::BBox;

/// Abstract interface for paginated structured content.
pub trait DocumentSource {
    /// Number of pages in the source.
    fn page_count(&self) -> usize;

    /// Load the raw primitives of one page (0-indexed).
    fn load_page(&self, index: usize) -> Result<RawPage>;

    /// Resolve an image reference of this source to its bytes.
    ///
    /// A reference that does not designate a raster resource fails with
    /// [`Error::InvalidResourceReference`](crate::Error::InvalidResourceReference).
    fn resolve_image(&self, page: usize, reference: &ResourceRef) -> Result<RawImage>;
}

/// Raw primitives of one page.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    /// Blocks in content order
    pub blocks: Vec<RawBlock>,
    /// Embedded raster images in resource order
    pub images: Vec<RawImageRef>,
}

/// A block as reported by the source, tagged text or vector.
#[derive(Debug, Clone)]
pub struct RawBlock {
    /// Block number within its page
    pub number: u32,
    pub bbox: BBox,
    pub content: RawBlockContent,
}

#[derive(Debug, Clone)]
pub enum RawBlockContent {
    Text(Vec<RawLine>),
    Vector(Drawing),
}

impl RawBlock {
    /// Create a text block.
    pub fn text(number: u32, bbox: BBox, lines: Vec<RawLine>) -> Self {
        Self {
            number,
            bbox,
            content: RawBlockContent::Text(lines),
        }
    }

    /// Create a vector block.
    pub fn vector(number: u32, bbox: BBox, drawing: Drawing) -> Self {
        Self {
            number,
            bbox,
            content: RawBlockContent::Vector(drawing),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, RawBlockContent::Text(_))
    }
}

/// A line of spans within a text block.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub bbox: BBox,
    pub spans: Vec<RawSpan>,
}

/// The smallest styled text unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpan {
    /// Decoded text; `None` when the source could not produce any
    pub text: Option<String>,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl RawSpan {
    pub fn new(text: impl Into<String>, font_size: f32, font_name: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            font_size,
            font_name: font_name.into(),
        }
    }
}

/// Placement of an embedded raster image.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImageRef {
    pub reference: ResourceRef,
    /// Placement rectangle on the page (not the pixel size)
    pub bbox: BBox,
}

/// Identifier of an embedded resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    /// An indirect object `(number, generation)`
    Object { number: u32, generation: u16 },
    /// A reference the source saw but could not turn into an identifier
    Unresolved(String),
}

impl ResourceRef {
    pub fn object(number: u32) -> Self {
        ResourceRef::Object {
            number,
            generation: 0,
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceRef::Object { number, generation } => write!(f, "{} {} R", number, generation),
            ResourceRef::Unresolved(name) => write!(f, "/{}", name),
        }
    }
}

/// Image bytes handed out by a source.
#[derive(Debug, Clone)]
pub enum RawImage {
    /// A self-describing encoded image (JPEG, PNG, TIFF, ...)
    Encoded(Vec<u8>),
    /// Uncompressed samples, row-major, rows padded to whole bytes
    Samples {
        width: u32,
        height: u32,
        color: ColorModel,
        bits_per_component: u8,
        data: Vec<u8>,
    },
}

/// Color model of a raw sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorModel {
    pub fn components(&self) -> usize {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }
}

/// A point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One segment of a drawn path, in page space.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Close,
}

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// How a path is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub stroke: Option<Rgb>,
    pub fill: Option<Rgb>,
    pub line_width: f32,
    pub even_odd: bool,
}

/// A painted path.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPath {
    pub segments: Vec<PathSegment>,
    pub paint: Paint,
}

/// A group of painted paths forming one vector block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub paths: Vec<DrawPath>,
}

impl Drawing {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Bounding box of every path point, if any.
    pub fn bounds(&self) -> Option<BBox> {
        let mut bbox: Option<BBox> = None;
        let points = self.paths.iter().flat_map(|p| p.segments.iter()).flat_map(|s| match s {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => vec![*p],
            PathSegment::CurveTo(a, b, c) => vec![*a, *b, *c],
            PathSegment::Close => vec![],
        });
        for p in points {
            match bbox.as_mut() {
                Some(b) => b.include_point(p.x, p.y),
                None => bbox = Some(BBox::new(p.x, p.y, p.x, p.y)),
            }
        }
        bbox
    }
}
