//! Content stream interpretation for PDF pages.
//!
//! Walks the operators of a page (and of the form XObjects it draws) while
//! tracking the graphics and text state, and turns them into the raw
//! primitives of [`RawPage`]: text blocks made of lines of spans, vector
//! blocks made of painted paths, and image placements.

use std::collections::{BTreeMap, HashSet};
use std::mem;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, Stream};

use super::{
    DrawPath, Drawing, Paint, PathSegment, Point, RawBlock, RawImageRef, RawLine, RawPage,
    RawSpan, ResourceRef, Rgb,
};
use crate::error::Result;
use crate::model::BBox;

/// Form XObjects nested deeper than this are not drawn.
const MAX_FORM_DEPTH: usize = 8;

/// `TJ` adjustments beyond this many thousandths of an em read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Spans whose baselines differ by at most this much share a line.
const BASELINE_EPSILON: f32 = 1.0;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// A 2D affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub(crate) fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    fn from_operands(values: &[f32]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    /// `self × other`: apply `self` first, then `other`.
    pub(crate) fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub(crate) fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Length of the transformed vertical unit vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Maps user space (bottom-left origin) to page space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageSpace {
    left: f32,
    top: f32,
}

impl PageSpace {
    /// Build from a MediaBox `[x0 y0 x1 y1]`.
    pub(crate) fn from_media_box(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            left: x0.min(x1),
            top: y0.max(y1),
        }
    }

    fn to_page(self, x: f32, y: f32) -> Point {
        Point::new(x - self.left, self.top - y)
    }
}

impl Default for PageSpace {
    fn default() -> Self {
        // US Letter
        Self::from_media_box(0.0, 0.0, 612.0, 792.0)
    }
}

/// Fonts and XObjects visible to a content stream.
#[derive(Default)]
pub(crate) struct Resources<'a> {
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    xobjects: Option<&'a Dictionary>,
}

impl<'a> Resources<'a> {
    pub(crate) fn from_dict(doc: &'a LopdfDocument, dict: Option<&'a Dictionary>) -> Self {
        let Some(dict) = dict else {
            return Self::default();
        };

        let mut fonts = BTreeMap::new();
        if let Some(font_dict) = dict.get(b"Font").ok().and_then(|o| as_dict(doc, o)) {
            for (name, obj) in font_dict.iter() {
                if let Some(font) = as_dict(doc, obj) {
                    fonts.insert(name.clone(), font);
                }
            }
        }

        let xobjects = dict.get(b"XObject").ok().and_then(|o| as_dict(doc, o));

        Self { fonts, xobjects }
    }

    fn base_font(&self, key: &[u8]) -> String {
        self.fonts
            .get(key)
            .and_then(|f| f.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string())
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: Rgb,
    stroke: Rgb,
    line_width: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: Rgb::BLACK,
            stroke: Rgb::BLACK,
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    tm: Matrix,
    tlm: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
    }
}

struct LineBuilder {
    baseline: f32,
    bbox: BBox,
    spans: Vec<RawSpan>,
}

/// Collects the spans of one `BT … ET` text object.
#[derive(Default)]
struct TextObjectBuilder {
    lines: Vec<LineBuilder>,
}

impl TextObjectBuilder {
    fn push(&mut self, baseline: f32, bbox: BBox, span: RawSpan) {
        if let Some(line) = self.lines.last_mut() {
            if (line.baseline - baseline).abs() <= BASELINE_EPSILON {
                line.bbox = line.bbox.union(&bbox);
                line.spans.push(span);
                return;
            }
        }
        self.lines.push(LineBuilder {
            baseline,
            bbox,
            spans: vec![span],
        });
    }

    fn build(self) -> Option<(BBox, Vec<RawLine>)> {
        let bbox = self
            .lines
            .iter()
            .map(|l| l.bbox)
            .reduce(|acc, b| acc.union(&b))?;
        let lines = self
            .lines
            .into_iter()
            .map(|l| RawLine {
                bbox: l.bbox,
                spans: l.spans,
            })
            .collect();
        Some((bbox, lines))
    }
}

/// Turns page content streams into [`RawPage`] primitives.
pub(crate) struct Interpreter<'a> {
    doc: &'a LopdfDocument,
    space: PageSpace,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text: TextState,
    text_object: Option<TextObjectBuilder>,
    path: Vec<PathSegment>,
    current_point: Option<Point>,
    drawing: Drawing,
    blocks: Vec<RawBlock>,
    images: Vec<RawImageRef>,
    seen_images: HashSet<ResourceRef>,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(doc: &'a LopdfDocument, space: PageSpace) -> Self {
        Self {
            doc,
            space,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text: TextState::default(),
            text_object: None,
            path: Vec::new(),
            current_point: None,
            drawing: Drawing::default(),
            blocks: Vec::new(),
            images: Vec::new(),
            seen_images: HashSet::new(),
        }
    }

    /// Interpret one content stream with the given resources.
    pub(crate) fn run(&mut self, data: &[u8], resources: &Resources<'a>, depth: usize) -> Result<()> {
        let content = Content::decode(data)?;
        for op in &content.operations {
            self.apply(op, resources, depth)?;
        }
        Ok(())
    }

    /// Flush pending blocks and return the page primitives.
    pub(crate) fn finish(mut self) -> RawPage {
        self.end_text_object();
        self.flush_drawing();
        RawPage {
            blocks: self.blocks,
            images: self.images,
        }
    }

    fn apply(&mut self, op: &Operation, res: &Resources<'a>, depth: usize) -> Result<()> {
        let nums = numbers(&op.operands);

        match op.operator.as_str() {
            // Graphics state
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(&nums) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            }
            "w" => {
                if let Some(&w) = nums.first() {
                    self.state.line_width = w;
                }
            }

            // Colors
            "g" => self.state.fill = color_from(&nums).unwrap_or(self.state.fill),
            "G" => self.state.stroke = color_from(&nums).unwrap_or(self.state.stroke),
            "rg" | "k" | "sc" | "scn" => {
                self.state.fill = color_from(&nums).unwrap_or(self.state.fill)
            }
            "RG" | "K" | "SC" | "SCN" => {
                self.state.stroke = color_from(&nums).unwrap_or(self.state.stroke)
            }

            // Text objects
            "BT" => {
                self.flush_drawing();
                self.text.tm = Matrix::IDENTITY;
                self.text.tlm = Matrix::IDENTITY;
                self.text_object = Some(TextObjectBuilder::default());
            }
            "ET" => self.end_text_object(),
            "Tf" => {
                if let Some(Object::Name(key)) = op.operands.first() {
                    self.text.font_name = res.base_font(key);
                    self.text.font_key = key.clone();
                }
                if let Some(size) = op.operands.get(1).and_then(get_number) {
                    self.text.font_size = size;
                }
            }
            "TL" => {
                if let Some(&leading) = nums.first() {
                    self.text.leading = leading;
                }
            }
            "Td" => {
                if let [tx, ty] = nums[..] {
                    self.text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let [tx, ty] = nums[..] {
                    self.text.leading = -ty;
                    self.text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(&nums) {
                    self.text.tm = m;
                    self.text.tlm = m;
                }
            }
            "T*" => self.text.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    let text = self.decode(res, bytes);
                    self.show_text(text, 0.0);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    self.show_array(res, items);
                }
            }
            "'" => {
                self.text.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    let text = self.decode(res, bytes);
                    self.show_text(text, 0.0);
                }
            }
            "\"" => {
                self.text.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    let text = self.decode(res, bytes);
                    self.show_text(text, 0.0);
                }
            }

            // Path construction
            "m" => {
                if let [x, y] = nums[..] {
                    let p = self.user_to_page(x, y);
                    self.path.push(PathSegment::MoveTo(p));
                    self.current_point = Some(p);
                }
            }
            "l" => {
                if let [x, y] = nums[..] {
                    let p = self.user_to_page(x, y);
                    self.path.push(PathSegment::LineTo(p));
                    self.current_point = Some(p);
                }
            }
            "c" => {
                if let [x1, y1, x2, y2, x3, y3] = nums[..] {
                    let p1 = self.user_to_page(x1, y1);
                    let p2 = self.user_to_page(x2, y2);
                    let p3 = self.user_to_page(x3, y3);
                    self.path.push(PathSegment::CurveTo(p1, p2, p3));
                    self.current_point = Some(p3);
                }
            }
            "v" => {
                if let [x2, y2, x3, y3] = nums[..] {
                    let p2 = self.user_to_page(x2, y2);
                    let p3 = self.user_to_page(x3, y3);
                    let p1 = self.current_point.unwrap_or(p2);
                    self.path.push(PathSegment::CurveTo(p1, p2, p3));
                    self.current_point = Some(p3);
                }
            }
            "y" => {
                if let [x1, y1, x3, y3] = nums[..] {
                    let p1 = self.user_to_page(x1, y1);
                    let p3 = self.user_to_page(x3, y3);
                    self.path.push(PathSegment::CurveTo(p1, p3, p3));
                    self.current_point = Some(p3);
                }
            }
            "re" => {
                if let [x, y, w, h] = nums[..] {
                    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
                    for (i, (cx, cy)) in corners.into_iter().enumerate() {
                        let p = self.user_to_page(cx, cy);
                        self.path.push(if i == 0 {
                            PathSegment::MoveTo(p)
                        } else {
                            PathSegment::LineTo(p)
                        });
                    }
                    self.path.push(PathSegment::Close);
                    self.current_point = Some(self.user_to_page(x, y));
                }
            }
            "h" => self.path.push(PathSegment::Close),

            // Path painting
            "S" => self.paint(true, false, false),
            "s" => {
                self.path.push(PathSegment::Close);
                self.paint(true, false, false);
            }
            "f" | "F" => self.paint(false, true, false),
            "f*" => self.paint(false, true, true),
            "B" => self.paint(true, true, false),
            "B*" => self.paint(true, true, true),
            "b" => {
                self.path.push(PathSegment::Close);
                self.paint(true, true, false);
            }
            "b*" => {
                self.path.push(PathSegment::Close);
                self.paint(true, true, true);
            }
            "n" => {
                self.path.clear();
                self.current_point = None;
            }

            // External objects
            "Do" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    self.draw_xobject(name, res, depth)?;
                }
            }

            _ => {}
        }

        Ok(())
    }

    fn user_to_page(&self, x: f32, y: f32) -> Point {
        let (ux, uy) = self.state.ctm.apply(x, y);
        self.space.to_page(ux, uy)
    }

    fn decode(&self, res: &Resources<'a>, bytes: &[u8]) -> String {
        if let Some(font) = res.fonts.get(&self.text.font_key) {
            if let Ok(enc) = font.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Show a `TJ` array: strings interleaved with positioning adjustments.
    fn show_array(&mut self, res: &Resources<'a>, items: &[Object]) {
        let mut combined = String::new();
        let mut adjustment_advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(res, bytes)),
                other => {
                    let Some(n) = get_number(other) else {
                        continue;
                    };
                    // Negative values move the pen to the right
                    let adjustment = -n;
                    adjustment_advance += adjustment / 1000.0 * self.text.font_size;

                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                    {
                        if let Some(c) = combined.chars().last() {
                            if !is_spaceless_script_char(c) {
                                combined.push(' ');
                            }
                        }
                    }
                }
            }
        }

        self.show_text(combined, adjustment_advance);
    }

    /// Record a span at the current text position and advance past it.
    fn show_text(&mut self, text: String, extra_advance: f32) {
        let width = text.chars().count() as f32 * self.text.font_size * AVG_GLYPH_WIDTH;

        if !text.trim().is_empty() {
            let trm = self.text.tm.multiply(&self.state.ctm);
            let (ox, oy) = trm.apply(0.0, 0.0);
            let (ex, ey) = trm.apply(width, 0.0);
            let origin = self.space.to_page(ox, oy);
            let end = self.space.to_page(ex, ey);
            let size = self.text.font_size * trm.vertical_scale();

            let baseline = origin.y;
            let bbox = BBox::new(
                origin.x.min(end.x),
                baseline - size * 0.8,
                origin.x.max(end.x),
                baseline + size * 0.2,
            );
            let span = RawSpan {
                text: Some(text),
                font_size: size,
                font_name: self.text.font_name.clone(),
            };

            self.text_object
                .get_or_insert_with(TextObjectBuilder::default)
                .push(baseline, bbox, span);
        }

        self.text.advance(width + extra_advance);
    }

    fn end_text_object(&mut self) {
        if let Some(builder) = self.text_object.take() {
            if let Some((bbox, lines)) = builder.build() {
                let number = self.blocks.len() as u32;
                self.blocks.push(RawBlock::text(number, bbox, lines));
            }
        }
    }

    fn paint(&mut self, stroke: bool, fill: bool, even_odd: bool) {
        let segments = mem::take(&mut self.path);
        self.current_point = None;
        if segments.is_empty() {
            return;
        }

        let paint = Paint {
            stroke: stroke.then_some(self.state.stroke),
            fill: fill.then_some(self.state.fill),
            line_width: self.state.line_width * self.state.ctm.vertical_scale(),
            even_odd,
        };
        self.drawing.paths.push(DrawPath { segments, paint });
    }

    fn flush_drawing(&mut self) {
        if self.drawing.is_empty() {
            return;
        }
        let drawing = mem::take(&mut self.drawing);
        if let Some(bbox) = drawing.bounds() {
            let number = self.blocks.len() as u32;
            self.blocks.push(RawBlock::vector(number, bbox, drawing));
        }
    }

    fn draw_xobject(&mut self, name: &[u8], res: &Resources<'a>, depth: usize) -> Result<()> {
        let doc = self.doc;
        let unresolved = || ResourceRef::Unresolved(String::from_utf8_lossy(name).to_string());

        let id = match res.xobjects.and_then(|x| x.get(name).ok()) {
            Some(Object::Reference(id)) => *id,
            _ => {
                self.place_image(unresolved());
                return Ok(());
            }
        };

        let reference = ResourceRef::Object {
            number: id.0,
            generation: id.1,
        };

        match doc.get_object(id) {
            Ok(Object::Stream(stream)) if subtype(stream) == Some("Form") => {
                self.draw_form(stream, res, depth)
            }
            // Anything else is an image; resolving it validates the reference.
            _ => {
                self.place_image(reference);
                Ok(())
            }
        }
    }

    fn draw_form(&mut self, stream: &'a Stream, parent: &Resources<'a>, depth: usize) -> Result<()> {
        if depth >= MAX_FORM_DEPTH {
            return Ok(());
        }

        let doc = self.doc;
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let own = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| as_dict(doc, o));
        let form_resources;
        let resources = match own {
            Some(dict) => {
                form_resources = Resources::from_dict(doc, Some(dict));
                &form_resources
            }
            None => parent,
        };

        let saved = self.state.clone();
        if let Some(m) = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().filter_map(get_number).collect::<Vec<_>>())
            .and_then(|v| Matrix::from_operands(&v))
        {
            self.state.ctm = m.multiply(&self.state.ctm);
        }

        let result = self.run(&data, resources, depth + 1);
        self.state = saved;
        result
    }

    fn place_image(&mut self, reference: ResourceRef) {
        self.flush_drawing();
        if !self.seen_images.insert(reference.clone()) {
            return;
        }

        let mut bbox: Option<BBox> = None;
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            let p = self.user_to_page(x, y);
            match bbox.as_mut() {
                Some(b) => b.include_point(p.x, p.y),
                None => bbox = Some(BBox::new(p.x, p.y, p.x, p.y)),
            }
        }

        if let Some(bbox) = bbox {
            self.images.push(RawImageRef { reference, bbox });
        }
    }
}

/// Dereference an object to a dictionary (inline or indirect).
pub(crate) fn as_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

fn subtype(stream: &Stream) -> Option<&str> {
    stream
        .dict
        .get(b"Subtype")
        .ok()
        .and_then(|s| s.as_name_str().ok())
}

/// Helper to extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn numbers(operands: &[Object]) -> Vec<f32> {
    operands.iter().filter_map(get_number).collect()
}

/// Interpret 1 (gray), 3 (RGB) or 4 (CMYK) color components.
fn color_from(values: &[f32]) -> Option<Rgb> {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    match *values {
        [g] => Some(Rgb(channel(g), channel(g), channel(g))),
        [r, g, b] => Some(Rgb(channel(r), channel(g), channel(b))),
        [c, m, y, k] => Some(Rgb(
            channel((1.0 - c) * (1.0 - k)),
            channel((1.0 - m) * (1.0 - k)),
            channel((1.0 - y) * (1.0 - k)),
        )),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
