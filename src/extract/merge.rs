//! Text-run merging.
//!
//! Runs whose anchor `y0` lies within the tolerance of an existing text
//! element on the same page are appended to that element; anything else
//! starts a new element.

use crate::logging::SharedLogger;
use crate::model::{BBox, Element};
use crate::source::{RawLine, RawSpan};

/// Groups text runs of one page into text elements.
pub struct TextRunMerger {
    tolerance: f32,
    logger: SharedLogger,
}

impl TextRunMerger {
    pub fn new(tolerance: f32, logger: SharedLogger) -> Self {
        Self { tolerance, logger }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Merge every span of a text block, anchored on the block's bbox.
    pub fn merge_block(&self, elements: &mut Vec<Element>, block_bbox: &BBox, lines: &[RawLine]) {
        for span in lines.iter().flat_map(|line| line.spans.iter()) {
            self.merge_span(elements, block_bbox, span);
        }
    }

    /// Merge a single run into the page's elements.
    ///
    /// The first text element whose `y0` is within tolerance wins and keeps
    /// its own font metadata.
    pub fn merge_span(&self, elements: &mut Vec<Element>, anchor: &BBox, span: &RawSpan) {
        let text = match span.text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => {
                self.logger.debug("skipping text run without content");
                return;
            }
        };

        if !anchor.is_well_formed() {
            self.logger
                .debug(&format!("skipping text run {:?}: malformed bbox", text));
            return;
        }

        let existing = elements
            .iter_mut()
            .filter_map(Element::as_text_mut)
            .find(|t| (t.bbox.y0 - anchor.y0).abs() <= self.tolerance);

        if let Some(target) = existing {
            target.append(text);
            return;
        }

        match Element::text(*anchor, text, span.font_size, span.font_name.as_str()) {
            Ok(element) => elements.push(element),
            Err(e) => self.logger.debug(&format!("skipping text run: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Level, RecordingLogger};
    use std::sync::Arc;

    fn merger() -> TextRunMerger {
        TextRunMerger::new(2.0, Arc::new(RecordingLogger::new()))
    }

    fn at(y0: f32) -> BBox {
        BBox::new(0.0, y0, 100.0, y0 + 12.0)
    }

    fn contents(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(Element::content).collect()
    }

    #[test]
    fn test_runs_on_same_line_merge() {
        let m = merger();
        let mut elements = Vec::new();
        m.merge_span(&mut elements, &at(100.0), &RawSpan::new("Hello", 12.0, "Helvetica"));
        m.merge_span(&mut elements, &at(100.5), &RawSpan::new("World", 12.0, "Helvetica"));

        assert_eq!(contents(&elements), vec!["Hello World"]);
    }

    #[test]
    fn test_distant_runs_stay_separate() {
        let m = merger();
        let mut elements = Vec::new();
        m.merge_span(&mut elements, &at(100.0), &RawSpan::new("Hello", 12.0, "Helvetica"));
        m.merge_span(&mut elements, &at(200.0), &RawSpan::new("World", 12.0, "Helvetica"));

        assert_eq!(contents(&elements), vec!["Hello", "World"]);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let m = merger();
        let mut elements = Vec::new();
        m.merge_span(&mut elements, &at(100.0), &RawSpan::new("a", 12.0, "F"));
        m.merge_span(&mut elements, &at(102.0), &RawSpan::new("b", 12.0, "F"));
        m.merge_span(&mut elements, &at(102.5), &RawSpan::new("c", 12.0, "F"));

        assert_eq!(contents(&elements), vec!["a b", "c"]);
    }

    #[test]
    fn test_first_match_wins_and_font_is_sticky() {
        let m = merger();
        let mut elements = Vec::new();
        m.merge_span(&mut elements, &at(100.0), &RawSpan::new("Title", 18.0, "Helvetica-Bold"));
        m.merge_span(&mut elements, &at(103.0), &RawSpan::new("Other", 10.0, "Times"));
        // Within tolerance of both; the first element wins
        m.merge_span(&mut elements, &at(101.5), &RawSpan::new("tail", 9.0, "Courier"));

        assert_eq!(contents(&elements), vec!["Title tail", "Other"]);
        let first = elements[0].as_text().unwrap();
        assert_eq!(first.font_size, 18.0);
        assert_eq!(first.font_name, "Helvetica-Bold");
    }

    #[test]
    fn test_block_spans_share_anchor() {
        let m = merger();
        let mut elements = Vec::new();
        let lines = vec![
            RawLine {
                bbox: at(50.0),
                spans: vec![RawSpan::new("one", 12.0, "F"), RawSpan::new("two", 12.0, "F")],
            },
            RawLine {
                bbox: at(80.0),
                spans: vec![RawSpan::new("three", 12.0, "F")],
            },
        ];
        m.merge_block(&mut elements, &BBox::new(0.0, 50.0, 100.0, 92.0), &lines);

        assert_eq!(contents(&elements), vec!["one two three"]);
    }

    #[test]
    fn test_empty_and_malformed_runs_are_skipped() {
        let logger = Arc::new(RecordingLogger::new());
        let m = TextRunMerger::new(2.0, logger.clone());
        let mut elements = Vec::new();

        let missing = RawSpan {
            text: None,
            font_size: 12.0,
            font_name: "F".into(),
        };
        m.merge_span(&mut elements, &at(10.0), &missing);
        m.merge_span(&mut elements, &at(10.0), &RawSpan::new("", 12.0, "F"));
        m.merge_span(
            &mut elements,
            &BBox::new(10.0, 10.0, 5.0, 20.0),
            &RawSpan::new("bad", 12.0, "F"),
        );

        assert!(elements.is_empty());
        assert_eq!(logger.count(Level::Debug), 3);
        assert_eq!(logger.count(Level::Warn), 0);
    }

    #[test]
    fn test_non_text_elements_are_not_merge_targets() {
        let m = merger();
        let mut elements = vec![Element::image(at(100.0), "image_1_1.jpeg").unwrap()];
        m.merge_span(&mut elements, &at(100.0), &RawSpan::new("caption", 12.0, "F"));

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].content(), "caption");
    }
}
