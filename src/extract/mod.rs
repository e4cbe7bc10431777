//! Element extraction: text-run merging, asset materialization and
//! reading-order sorting on top of a [`DocumentSource`](crate::source::DocumentSource).

mod assets;
mod document;
mod merge;
mod options;
mod page;

pub use assets::{to_rgb, AssetWriter};
pub use document::DocumentExtractor;
pub use merge::TextRunMerger;
pub use options::{ErrorMode, ExtractOptions, PageSelection, DEFAULT_Y_TOLERANCE};
pub use page::{sort_reading_order, PageExtractor};
