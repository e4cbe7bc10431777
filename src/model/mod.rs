//! Element model for reconstructed page content.
//!
//! This module defines the intermediate representation that bridges page
//! extraction and HTML synthesis. Content of every kind (text, raster
//! images, vector drawings) is normalized into [`Element`]s positioned by a
//! [`BBox`] in top-left page space.

mod bbox;
mod document;
mod element;
mod page;

pub use bbox::BBox;
pub use document::Document;
pub use element::{AssetElement, Element, ElementKind, TextElement};
pub use page::Page;
