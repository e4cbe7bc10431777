//! Extraction options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Default vertical tolerance for merging text runs into one line.
pub const DEFAULT_Y_TOLERANCE: f32 = 2.0;

/// Options for extracting elements from a document source.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum `y0` distance (inclusive) between runs of one line
    pub y_tolerance: f32,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to materialize embedded raster images
    pub extract_images: bool,

    /// Whether to materialize vector drawings
    pub extract_vectors: bool,

    /// Page selection (which pages to extract)
    pub pages: PageSelection,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merge tolerance. Negative or non-finite values are ignored.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        if tolerance.is_finite() && tolerance >= 0.0 {
            self.y_tolerance = tolerance;
        }
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip undecodable content).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable image materialization.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable vector materialization.
    pub fn with_vectors(mut self, extract: bool) -> Self {
        self.extract_vectors = extract;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            y_tolerance: DEFAULT_Y_TOLERANCE,
            error_mode: ErrorMode::Strict,
            extract_images: true,
            extract_vectors: true,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip recoverable errors and continue
    Lenient,
}

impl ErrorMode {
    /// Whether `err` may be skipped under this mode.
    pub fn tolerates(&self, err: &Error) -> bool {
        err.is_skippable() || (*self == ErrorMode::Lenient && err.is_recoverable())
    }
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Extract all pages
    #[default]
    All,
    /// Extract a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Extract specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Extract several ranges (inclusive, 1-indexed), sorted and disjoint
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = parse_bounds(s, start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges
        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => parse_bounds(part, start, end)?,
                None => {
                    let p = parse_page(part)?;
                    (p, p)
                }
            };
            ranges.push(start..=end);
        }

        Ok(PageSelection::Ranges(coalesce(ranges)))
    }
}

/// Sort ranges and merge the ones that overlap or touch.
fn coalesce(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_by_key(|r| *r.start());

    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

fn parse_page(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err(Error::InvalidPageRange(
            "page numbers start at 1".to_string(),
        )),
        Ok(p) => Ok(p),
        Err(_) => Err(Error::InvalidPageRange(format!(
            "invalid page number: {:?}",
            s.trim()
        ))),
    }
}

fn parse_bounds(part: &str, start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_page(start)?;
    let end = parse_page(end)?;
    if start > end {
        return Err(Error::InvalidPageRange(format!(
            "range {:?} is reversed",
            part
        )));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .lenient()
            .with_tolerance(3.5)
            .with_images(false)
            .with_pages(PageSelection::Range(2..=4));

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.y_tolerance, 3.5);
        assert!(!options.extract_images);
        assert!(options.extract_vectors);
        assert!(options.pages.includes(3));
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.y_tolerance, DEFAULT_Y_TOLERANCE);
        assert!(options.extract_images);
    }

    #[test]
    fn test_invalid_tolerance_ignored() {
        let options = ExtractOptions::new().with_tolerance(-1.0);
        assert_eq!(options.y_tolerance, DEFAULT_Y_TOLERANCE);
        let options = ExtractOptions::new().with_tolerance(f32::NAN);
        assert_eq!(options.y_tolerance, DEFAULT_Y_TOLERANCE);
    }

    #[test]
    fn test_error_mode_tolerates() {
        let decode = Error::ImageDecode("bad".into());
        let reference = Error::InvalidResourceReference {
            page: 1,
            reference: "/Im1".into(),
        };
        assert!(!ErrorMode::Strict.tolerates(&decode));
        assert!(ErrorMode::Lenient.tolerates(&decode));
        assert!(!ErrorMode::Lenient.tolerates(&reference));

        let unsupported = Error::UnsupportedImage("JPEG 2000".into());
        assert!(ErrorMode::Strict.tolerates(&unsupported));
        assert!(ErrorMode::Lenient.tolerates(&unsupported));
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-3").unwrap(),
            PageSelection::Range(1..=3)
        );
        assert_eq!(
            PageSelection::parse("5, 1,3-4").unwrap(),
            PageSelection::Ranges(vec![1..=1, 3..=5])
        );
        assert_eq!(
            PageSelection::parse("2-6,4-8,10").unwrap(),
            PageSelection::Ranges(vec![2..=8, 10..=10])
        );
    }

    #[test]
    fn test_page_selection_huge_range_in_list() {
        let selection = PageSelection::parse("1,1-4000000000").unwrap();
        assert_eq!(selection, PageSelection::Ranges(vec![1..=4_000_000_000]));
        assert!(selection.includes(3_999_999_999));
        assert!(!selection.includes(4_000_000_001));
    }

    #[test]
    fn test_page_selection_parse_errors() {
        assert!(PageSelection::parse("0").is_err());
        assert!(PageSelection::parse("4-2").is_err());
        assert!(PageSelection::parse("a,b").is_err());
        assert!(matches!(
            PageSelection::parse("x-3").unwrap_err(),
            Error::InvalidPageRange(_)
        ));
    }
}
