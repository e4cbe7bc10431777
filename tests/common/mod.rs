//! Shared fixtures: small PDFs generated with lopdf's writer.

#![allow(dead_code)]

use std::io::Cursor;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Builds a letter-sized PDF page by page.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
    compress: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
            compress: false,
        }
    }

    /// Flate-compress every stream on build.
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    pub fn add_stream(&mut self, stream: Stream) -> ObjectId {
        self.doc.add_object(stream)
    }

    /// A form XObject drawing `ops` in its own coordinate space.
    pub fn add_form(&mut self, ops: Vec<Operation>, matrix: Option<[f32; 6]>) -> ObjectId {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => self.font_id } },
        };
        if let Some(m) = matrix {
            dict.set(
                "Matrix",
                m.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            );
        }
        let content = Content { operations: ops }.encode().unwrap();
        self.doc.add_object(Stream::new(dict, content))
    }

    /// Append a page drawing `ops`, with `xobjects` as `(name, id)` pairs.
    pub fn page(&mut self, ops: Vec<Operation>, xobjects: &[(&str, ObjectId)]) -> &mut Self {
        let mut xobject_dict = Dictionary::new();
        for (name, id) in xobjects {
            xobject_dict.set(*name, *id);
        }

        let content = Content { operations: ops }.encode().unwrap();
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => self.font_id },
                "XObject" => xobject_dict,
            },
        });
        self.kids.push(page_id.into());
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        if self.compress {
            self.doc.compress();
        }

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).unwrap();
        buf
    }
}

/// `BT /F1 size Tf x y Td (text) Tj ET`
pub fn text(x: i64, y: i64, size: i64, content: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(content)]),
        Operation::new("ET", vec![]),
    ]
}

/// `q w 0 0 h x y cm /name Do Q`, placing an XObject at a user-space rect.
pub fn place(name: &str, x: i64, y: i64, w: i64, h: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec![name.into()]),
        Operation::new("Q", vec![]),
    ]
}

/// A stroked horizontal line.
pub fn rule(x0: i64, x1: i64, y: i64) -> Vec<Operation> {
    vec![
        Operation::new("RG", vec![1.into(), 0.into(), 0.into()]),
        Operation::new("m", vec![x0.into(), y.into()]),
        Operation::new("l", vec![x1.into(), y.into()]),
        Operation::new("S", vec![]),
    ]
}

/// A 4x4 JPEG image XObject.
pub fn jpeg_image() -> Stream {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Jpeg(90))
        .unwrap();

    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 4,
            "Height" => 4,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        bytes,
    )
}

/// A 2x2 CMYK image XObject with raw samples.
pub fn cmyk_image() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceCMYK",
            "BitsPerComponent" => 8,
        },
        vec![
            255, 0, 0, 0, 0, 255, 0, 0, //
            0, 0, 255, 0, 0, 0, 0, 255,
        ],
    )
}

/// A 2x1 palette image: red then blue.
pub fn palette_image() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 1,
            "ColorSpace" => vec![
                "Indexed".into(),
                "DeviceRGB".into(),
                1.into(),
                Object::String(
                    vec![0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF],
                    lopdf::StringFormat::Hexadecimal,
                ),
            ],
            "BitsPerComponent" => 8,
        },
        vec![0, 1],
    )
}

/// A JPEG 2000 image XObject (the payload is never decoded).
pub fn jpx_image() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 4,
            "Height" => 4,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "JPXDecode",
        },
        vec![0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20],
    )
}

/// Extract, per page container, the sequence of child tags (`p` or `img`).
pub fn page_children(html: &str) -> Vec<Vec<&'static str>> {
    html.split("<div class=\"page\" id=\"page_")
        .skip(1)
        .map(|page| {
            let body = page.split("</div>").next().unwrap_or("");
            let mut tags = Vec::new();
            let mut rest = body;
            while let Some(pos) = rest.find('<') {
                rest = &rest[pos + 1..];
                if rest.starts_with("p ") {
                    tags.push("p");
                } else if rest.starts_with("img ") {
                    tags.push("img");
                }
            }
            tags
        })
        .collect()
}
