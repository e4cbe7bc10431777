//! Integration tests for converting real PDF files.

mod common;

use std::fs;
use std::sync::Arc;

use common::{place, rule, text, PdfBuilder};
use relayout::logging::Level;
use relayout::{
    DocumentSource, ElementKind, Error, NullLogger, PageSelection, PdfSource, RecordingLogger,
    Relayout,
};
use tempfile::TempDir;

fn relayout() -> Relayout {
    Relayout::new().with_logger(Arc::new(NullLogger))
}

fn write_pdf(dir: &TempDir, name: &str, bytes: Vec<u8>) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_convert_text_image_and_vector() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let image = builder.add_stream(common::jpeg_image());

    let mut ops = text(72, 700, 12, "Quarterly report");
    ops.extend(place("Im1", 10, 732, 100, 50));
    ops.extend(rule(72, 540, 400));
    builder.page(ops, &[("Im1", image)]);
    let input = write_pdf(&dir, "report.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();

    assert_eq!(result.output_dir, dir.path().join("report"));
    assert!(result.html_path.ends_with("report/report.html"));
    assert!(result.output_dir.join("image_1_1.jpeg").exists());

    let page = &result.document.pages[0];
    assert_eq!(page.count_kind(ElementKind::Text), 1);
    assert_eq!(page.count_kind(ElementKind::Image), 1);
    assert_eq!(page.count_kind(ElementKind::Vector), 1);
    assert!(page.is_reading_ordered());

    // The image sits at the top of the page
    let first = &page.elements[0];
    assert_eq!(first.kind(), ElementKind::Image);
    assert_eq!(first.bbox().to_array(), [10.0, 10.0, 110.0, 60.0]);

    let vector = page
        .elements
        .iter()
        .find(|e| e.kind() == ElementKind::Vector)
        .unwrap();
    assert!(result.output_dir.join(vector.content()).exists());

    let html = fs::read_to_string(&result.html_path).unwrap();
    assert!(html.contains("Quarterly report"));
    assert!(html.contains("<img src=\"image_1_1.jpeg\""));
    assert!(html.contains(&format!("<img src=\"{}\"", vector.content())));
}

#[test]
fn test_text_position_follows_page_space() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    builder.page(text(72, 700, 12, "Title"), &[]);
    let input = write_pdf(&dir, "title.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();
    let element = &result.document.pages[0].elements[0];
    let text = element.as_text().unwrap();

    assert_eq!(text.content, "Title");
    assert_eq!(text.font_size, 12.0);
    assert_eq!(text.font_name, "Helvetica");
    // Baseline at 792 - 700 = 92, ascent 0.8 em
    assert!(approx(element.bbox().y0, 82.4));
    assert!(approx(element.bbox().x0, 72.0));
}

#[test]
fn test_same_baseline_runs_merge() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let mut ops = text(72, 700, 12, "Name:");
    ops.extend(text(300, 700, 12, "Value"));
    ops.extend(text(72, 600, 12, "Footer"));
    builder.page(ops, &[]);
    let input = write_pdf(&dir, "form.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();
    let contents: Vec<&str> = result.document.pages[0]
        .elements
        .iter()
        .map(|e| e.content())
        .collect();
    assert_eq!(contents, vec!["Name: Value", "Footer"]);
}

#[test]
fn test_compressed_content_streams() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new().compressed();
    builder.page(text(72, 700, 12, "Compressed"), &[]);
    let input = write_pdf(&dir, "packed.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();
    assert_eq!(result.document.pages[0].elements[0].content(), "Compressed");
}

#[test]
fn test_form_xobject_content_is_extracted() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let form = builder.add_form(
        text(0, 0, 12, "Inside form"),
        Some([1.0, 0.0, 0.0, 1.0, 100.0, 600.0]),
    );
    builder.page(place("Fm1", 0, 0, 1, 1), &[("Fm1", form)]);
    let input = write_pdf(&dir, "form.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();
    let page = &result.document.pages[0];

    assert_eq!(page.count_kind(ElementKind::Image), 0);
    let element = &page.elements[0];
    assert_eq!(element.content(), "Inside form");
    assert!(approx(element.bbox().x0, 100.0));
    assert!(approx(element.bbox().y0, 182.4));
}

#[test]
fn test_cmyk_image_is_written_as_jpeg() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let image = builder.add_stream(common::cmyk_image());
    builder.page(place("Im0", 100, 100, 20, 20), &[("Im0", image)]);
    let input = write_pdf(&dir, "cmyk.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();
    let path = result.output_dir.join("image_1_1.jpeg");
    let decoded = image::open(path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2, 2));
}

#[test]
fn test_palette_image_converts_in_strict_mode() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let image = builder.add_stream(common::palette_image());
    builder.page(place("Im0", 100, 100, 20, 10), &[("Im0", image)]);
    let input = write_pdf(&dir, "palette.pdf", builder.build());

    let result = relayout().convert(&input, dir.path()).unwrap();
    assert!(result.html_path.exists());

    let decoded = image::open(result.output_dir.join("image_1_1.jpeg"))
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded.dimensions(), (2, 1));
    let left = decoded.get_pixel(0, 0).0;
    let right = decoded.get_pixel(1, 0).0;
    // JPEG is lossy; check the dominant channel
    assert!(left[0] > 150 && left[2] < 100);
    assert!(right[2] > 150 && right[0] < 100);
}

#[test]
fn test_jpeg2000_image_is_skipped_with_warning() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let image = builder.add_stream(common::jpx_image());
    let mut ops = text(72, 700, 12, "Caption");
    ops.extend(place("Im0", 10, 600, 50, 50));
    builder.page(ops, &[("Im0", image)]);
    let input = write_pdf(&dir, "jpx.pdf", builder.build());

    let logger = Arc::new(RecordingLogger::new());
    let result = Relayout::new()
        .with_logger(logger.clone())
        .convert(&input, dir.path())
        .unwrap();

    assert!(result.html_path.exists());
    let page = &result.document.pages[0];
    assert_eq!(page.count_kind(ElementKind::Image), 0);
    assert_eq!(page.count_kind(ElementKind::Text), 1);
    assert!(!result.output_dir.join("image_1_1.jpeg").exists());

    let warnings = logger.messages(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("JPEG 2000"));
}

#[test]
fn test_missing_xobject_fails_with_page_number() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    builder.page(text(72, 700, 12, "Fine"), &[]);
    builder.page(place("Missing", 10, 10, 50, 50), &[]);
    let input = write_pdf(&dir, "broken.pdf", builder.build());

    let err = relayout().lenient().convert(&input, dir.path()).unwrap_err();

    assert!(matches!(err, Error::InvalidResourceReference { page: 2, .. }));
    assert!(!dir.path().join("broken").join("broken.html").exists());
}

#[test]
fn test_page_selection_keeps_page_numbers() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    builder.page(text(72, 700, 12, "one"), &[]);
    builder.page(text(72, 700, 12, "two"), &[]);
    builder.page(text(72, 700, 12, "three"), &[]);
    let input = write_pdf(&dir, "three.pdf", builder.build());

    let result = relayout()
        .with_pages(PageSelection::parse("2").unwrap())
        .convert(&input, dir.path())
        .unwrap();

    assert_eq!(result.document.page_count(), 1);
    assert_eq!(result.document.pages[0].number(), 2);

    let html = fs::read_to_string(&result.html_path).unwrap();
    assert!(html.contains("id=\"page_2\""));
    assert!(!html.contains("id=\"page_1\""));
}

#[test]
fn test_pdf_source_reports_pages() {
    let mut builder = PdfBuilder::new();
    builder.page(text(72, 700, 12, "a"), &[]);
    builder.page(rule(0, 100, 100), &[]);

    let source = PdfSource::from_bytes(&builder.build()).unwrap();
    assert_eq!(source.page_count(), 2);
    assert_eq!(source.version(), "1.5");

    let first = source.load_page(0).unwrap();
    assert_eq!(first.blocks.len(), 1);
    assert!(first.blocks[0].is_text());

    let second = source.load_page(1).unwrap();
    assert_eq!(second.blocks.len(), 1);
    assert!(!second.blocks[0].is_text());
}

#[test]
fn test_garbage_file_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(&dir, "garbage.pdf", b"this is not a pdf".to_vec());

    let err = relayout().convert(&input, dir.path()).unwrap_err();

    assert!(matches!(err, Error::DocumentOpen(_)));
    assert!(!dir.path().join("garbage").exists());
}

#[test]
fn test_output_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let mut builder = PdfBuilder::new();
    let mut ops = text(72, 700, 12, "Stable");
    ops.extend(rule(72, 540, 400));
    builder.page(ops, &[]);
    let input = write_pdf(&dir, "stable.pdf", builder.build());

    let first = relayout().convert(&input, dir.path()).unwrap();
    let html_first = fs::read(&first.html_path).unwrap();
    let svg = first.output_dir.join("vector_1_1.svg");
    let svg_first = fs::read(&svg).unwrap();

    let second = relayout().convert(&input, dir.path()).unwrap();
    assert_eq!(html_first, fs::read(&second.html_path).unwrap());
    assert_eq!(svg_first, fs::read(&svg).unwrap());
}
