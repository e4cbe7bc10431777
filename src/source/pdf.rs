//! PDF document source backed by lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::interpreter::{as_dict, get_number, Interpreter, PageSpace, Resources};
use super::{ColorModel, DocumentSource, RawImage, RawPage, ResourceRef};
use crate::error::{Error, Result};

/// PDF magic bytes.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers tolerate leading garbage before the header up to this offset.
const HEADER_SEARCH_LIMIT: usize = 1024;

/// Guards against cyclic `Parent` chains.
const MAX_TREE_DEPTH: usize = 32;

/// A [`DocumentSource`] reading a PDF file.
pub struct PdfSource {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::DocumentOpen(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&data)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let window = &data[..data.len().min(HEADER_SEARCH_LIMIT)];
        if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            return Err(Error::DocumentOpen("missing %PDF- header".to_string()));
        }

        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::DocumentOpen("document is encrypted".to_string()),
            other => Error::DocumentOpen(other.to_string()),
        })?;

        if doc.is_encrypted() {
            return Err(Error::DocumentOpen("document is encrypted".to_string()));
        }

        let pages = doc.get_pages().into_values().collect();
        Ok(Self { doc, pages })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or_else(|| {
            Error::InvalidPageRange(format!(
                "page index {} out of range (document has {} pages)",
                index,
                self.pages.len()
            ))
        })
    }

    /// Look up a page attribute, walking up the page tree when absent.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn page_space(&self, page_id: ObjectId) -> PageSpace {
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| self.deref(o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .filter_map(|o| get_number(self.deref(o)))
                    .collect::<Vec<_>>()
            });

        match media_box.as_deref() {
            Some(&[x0, y0, x1, y1]) => PageSpace::from_media_box(x0, y0, x1, y1),
            _ => PageSpace::default(),
        }
    }

    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        self.inherited(page_id, b"Resources")
            .and_then(|o| as_dict(&self.doc, o))
    }

    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        // A page without content is blank
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    let data = s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
        content
    }

    fn deref<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Map an image color space to a supported color model.
    fn color_model(&self, obj: &Object) -> Option<ColorModel> {
        match self.deref(obj) {
            Object::Name(name) => match name.as_slice() {
                b"DeviceGray" | b"G" | b"CalGray" => Some(ColorModel::Gray),
                b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(ColorModel::Rgb),
                b"DeviceCMYK" | b"CMYK" => Some(ColorModel::Cmyk),
                _ => None,
            },
            Object::Array(arr) => {
                let family = arr.first()?.as_name().ok()?;
                match family {
                    b"ICCBased" => {
                        let Object::Stream(icc) = self.deref(arr.get(1)?) else {
                            return None;
                        };
                        match icc.dict.get(b"N").ok()?.as_i64().ok()? {
                            1 => Some(ColorModel::Gray),
                            3 => Some(ColorModel::Rgb),
                            4 => Some(ColorModel::Cmyk),
                            _ => None,
                        }
                    }
                    b"CalGray" => Some(ColorModel::Gray),
                    b"CalRGB" => Some(ColorModel::Rgb),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Map an image color space, including palette and tint spaces.
    fn image_color(&self, obj: &Object) -> Option<ImageColor> {
        if let Some(model) = self.color_model(obj) {
            return Some(ImageColor::Direct(model));
        }

        let Object::Array(arr) = self.deref(obj) else {
            return None;
        };
        match arr.first()?.as_name().ok()? {
            b"Indexed" | b"I" => {
                let base = self.color_model(arr.get(1)?)?;
                let hival = self.deref(arr.get(2)?).as_i64().ok()?.clamp(0, 255) as usize;
                let lookup = match self.deref(arr.get(3)?) {
                    Object::String(bytes, _) => bytes.clone(),
                    Object::Stream(s) => s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone()),
                    _ => return None,
                };
                Some(ImageColor::Indexed {
                    base,
                    hival,
                    lookup,
                })
            }
            b"Separation" => Some(ImageColor::Tint { colorants: 1 }),
            b"DeviceN" => match self.deref(arr.get(1)?) {
                Object::Array(names) if !names.is_empty() => Some(ImageColor::Tint {
                    colorants: names.len(),
                }),
                _ => None,
            },
            b"Lab" => Some(ImageColor::Lab),
            _ => None,
        }
    }
}

impl DocumentSource for PdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<RawPage> {
        let page_id = self.page_id(index)?;
        let content = self.page_content(page_id)?;
        let resources = Resources::from_dict(&self.doc, self.page_resources(page_id));

        let mut interpreter = Interpreter::new(&self.doc, self.page_space(page_id));
        interpreter.run(&content, &resources, 0)?;
        Ok(interpreter.finish())
    }

    fn resolve_image(&self, page: usize, reference: &ResourceRef) -> Result<RawImage> {
        let invalid = || Error::InvalidResourceReference {
            page: page as u32 + 1,
            reference: reference.to_string(),
        };

        let id = match reference {
            ResourceRef::Object { number, generation } => (*number, *generation),
            ResourceRef::Unresolved(_) => return Err(invalid()),
        };

        let stream = match self.doc.get_object(id) {
            Ok(Object::Stream(stream)) => stream,
            _ => return Err(invalid()),
        };
        let dict = &stream.dict;

        match dict.get(b"Subtype").and_then(|s| s.as_name_str()) {
            Ok("Image") => {}
            _ => return Err(invalid()),
        }

        let filters: Vec<String> = match dict.get(b"Filter").map(|f| self.deref(f)) {
            Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
            Ok(Object::Array(arr)) => arr
                .iter()
                .filter_map(|o| o.as_name_str().ok())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };

        match filters.last().map(String::as_str) {
            Some("JPXDecode") => {
                return Err(Error::UnsupportedImage(format!(
                    "{}: JPEG 2000 images cannot be decoded",
                    reference
                )));
            }
            Some("DCTDecode") => {
                if filters.len() > 1 {
                    return Err(Error::ImageDecode(format!(
                        "{}: unsupported filter chain {:?}",
                        reference, filters
                    )));
                }
                // JPEG data can be used directly
                return Ok(RawImage::Encoded(stream.content.clone()));
            }
            _ => {}
        }

        let number = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| self.deref(o).as_i64().ok())
        };

        let width = number(b"Width").filter(|w| *w > 0).ok_or_else(|| {
            Error::ImageDecode(format!("{}: missing or invalid /Width", reference))
        })? as u32;
        let height = number(b"Height").filter(|h| *h > 0).ok_or_else(|| {
            Error::ImageDecode(format!("{}: missing or invalid /Height", reference))
        })? as u32;

        let is_mask = matches!(
            dict.get(b"ImageMask").map(|o| self.deref(o)),
            Ok(Object::Boolean(true))
        );

        let color = if is_mask {
            ImageColor::Direct(ColorModel::Gray)
        } else {
            dict.get(b"ColorSpace")
                .ok()
                .and_then(|cs| self.image_color(cs))
                .ok_or_else(|| {
                    Error::UnsupportedImage(format!("{}: unsupported color space", reference))
                })?
        };
        let bits_per_component = if is_mask {
            1
        } else {
            number(b"BitsPerComponent").unwrap_or(8) as u8
        };

        let data = if filters.is_empty() {
            stream.content.clone()
        } else {
            stream
                .decompressed_content()
                .map_err(|e| Error::ImageDecode(format!("{}: {}", reference, e)))?
        };

        let (color, bits_per_component, data) =
            color.normalize(width, height, bits_per_component, data)?;

        Ok(RawImage::Samples {
            width,
            height,
            color,
            bits_per_component,
            data,
        })
    }
}

/// How the samples of an image map to a [`ColorModel`].
#[derive(Debug, Clone, PartialEq)]
enum ImageColor {
    Direct(ColorModel),
    /// Palette of `hival + 1` entries in `base`.
    Indexed {
        base: ColorModel,
        hival: usize,
        lookup: Vec<u8>,
    },
    /// Separation and DeviceN tints, rendered as ink coverage on white.
    Tint { colorants: usize },
    /// CIE L*a*b*, reduced to its lightness.
    Lab,
}

impl ImageColor {
    /// Rewrite non-device samples as 8-bit samples of a device model.
    fn normalize(
        self,
        width: u32,
        height: u32,
        bits: u8,
        data: Vec<u8>,
    ) -> Result<(ColorModel, u8, Vec<u8>)> {
        let max = if bits == 16 {
            u16::MAX as u32
        } else {
            (1u32 << bits.min(8)) - 1
        };

        match self {
            ImageColor::Direct(model) => Ok((model, bits, data)),
            ImageColor::Indexed {
                base,
                hival,
                lookup,
            } => {
                let components = base.components();
                let indices = read_samples(&data, width, height, 1, bits)?;
                let mut out = Vec::with_capacity(indices.len() * components);
                for index in indices {
                    let start = (index as usize).min(hival) * components;
                    for c in 0..components {
                        out.push(lookup.get(start + c).copied().unwrap_or(0));
                    }
                }
                Ok((base, 8, out))
            }
            ImageColor::Tint { colorants } => {
                let tints = read_samples(&data, width, height, colorants, bits)?;
                let out = tints
                    .chunks_exact(colorants)
                    .map(|px| {
                        let ink: u32 = px.iter().map(|&t| t as u32 * 255 / max).sum();
                        255 - (ink / colorants as u32).min(255) as u8
                    })
                    .collect();
                Ok((ColorModel::Gray, 8, out))
            }
            ImageColor::Lab => {
                let samples = read_samples(&data, width, height, 3, bits)?;
                let out = samples
                    .chunks_exact(3)
                    .map(|px| (px[0] as u32 * 255 / max) as u8)
                    .collect();
                Ok((ColorModel::Gray, 8, out))
            }
        }
    }
}

/// Read row-padded samples as raw component values.
fn read_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bits: u8,
) -> Result<Vec<u16>> {
    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::ImageDecode(format!(
            "unsupported bits per component: {}",
            bits
        )));
    }

    let bits = bits as usize;
    let per_row = width as usize * components;
    let row_bytes = (per_row * bits).div_ceil(8);
    let rows = height as usize;
    if data.len() < row_bytes * rows {
        return Err(Error::ImageDecode(format!(
            "expected {} bytes of samples, found {}",
            row_bytes * rows,
            data.len()
        )));
    }

    let mut out = Vec::with_capacity(per_row * rows);
    for row in data.chunks_exact(row_bytes).take(rows) {
        for i in 0..per_row {
            let value = match bits {
                8 => row[i] as u16,
                16 => u16::from_be_bytes([row[2 * i], row[2 * i + 1]]),
                _ => {
                    let bit = i * bits;
                    let shift = 8 - bits - (bit % 8);
                    ((row[bit / 8] >> shift) & ((1u8 << bits) - 1)) as u16
                }
            };
            out.push(value);
        }
    }
    Ok(out)
}
