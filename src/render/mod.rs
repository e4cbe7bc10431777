//! Rendering module for converting documents to output formats.

mod html;
mod json;
mod options;
mod stats;
pub mod svg;

pub use html::{escape_html, to_html, write_html, HtmlRenderer};
pub use json::{from_json, to_json, JsonFormat};
pub use options::{RenderOptions, DEFAULT_FONT_FAMILY};
pub use stats::ConversionStats;
