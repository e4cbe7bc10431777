//! Asset persistence: JPEG images and SVG drawings.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};
use crate::logging::SharedLogger;
use crate::model::BBox;
use crate::render::svg;
use crate::source::{ColorModel, Drawing, RawImage};

/// Writes the asset files of one conversion into its output folder.
pub struct AssetWriter {
    dir: PathBuf,
    logger: SharedLogger,
}

impl AssetWriter {
    pub fn new(dir: impl Into<PathBuf>, logger: SharedLogger) -> Self {
        Self {
            dir: dir.into(),
            logger,
        }
    }

    /// Output folder the assets are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the `index`-th image of page `page` (both 1-based).
    pub fn image_filename(page: u32, index: usize) -> String {
        format!("image_{}_{}.jpeg", page, index)
    }

    /// File name of the drawing in block `block` of page `page` (1-based).
    pub fn vector_filename(page: u32, block: u32) -> String {
        format!("vector_{}_{}.svg", page, block)
    }

    /// Decode, normalize to RGB and save an image as JPEG.
    ///
    /// Returns the file name relative to the output folder.
    pub fn write_image(&self, page: u32, index: usize, image: &RawImage) -> Result<String> {
        let rgb = to_rgb(image)?;
        let filename = Self::image_filename(page, index);
        let path = self.dir.join(&filename);

        rgb.save_with_format(&path, ImageFormat::Jpeg)?;
        self.logger.debug(&format!(
            "wrote {} ({}x{})",
            path.display(),
            rgb.width(),
            rgb.height()
        ));
        Ok(filename)
    }

    /// Serialize a drawing as SVG.
    ///
    /// Returns the file name relative to the output folder.
    pub fn write_vector(
        &self,
        page: u32,
        block: u32,
        bbox: &BBox,
        drawing: &Drawing,
    ) -> Result<String> {
        let filename = Self::vector_filename(page, block);
        let path = self.dir.join(&filename);

        fs::write(&path, svg::render_drawing(bbox, drawing))?;
        self.logger.debug(&format!("wrote {}", path.display()));
        Ok(filename)
    }
}

/// Decode any supported image into 8-bit RGB.
pub fn to_rgb(image: &RawImage) -> Result<RgbImage> {
    match image {
        RawImage::Encoded(bytes) => Ok(image::load_from_memory(bytes)?.to_rgb8()),
        RawImage::Samples {
            width,
            height,
            color,
            bits_per_component,
            data,
        } => {
            let (width, height) = (*width, *height);
            if width == 0 || height == 0 {
                return Err(Error::ImageDecode(format!(
                    "empty image ({}x{})",
                    width, height
                )));
            }

            let samples = expand_samples(data, width, height, color.components(), *bits_per_component)?;
            let short = || Error::ImageDecode("sample buffer does not match image size".to_string());

            let dynamic = match color {
                ColorModel::Gray => GrayImage::from_raw(width, height, samples)
                    .map(DynamicImage::ImageLuma8)
                    .ok_or_else(short)?,
                ColorModel::Rgb => RgbImage::from_raw(width, height, samples)
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(short)?,
                ColorModel::Cmyk => RgbImage::from_raw(width, height, cmyk_to_rgb(&samples))
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(short)?,
            };
            Ok(dynamic.to_rgb8())
        }
    }
}

/// Unpack row-padded samples of any supported depth to one byte each.
fn expand_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bits: u8,
) -> Result<Vec<u8>> {
    let per_row = width as usize * components;
    let count = per_row * height as usize;

    match bits {
        8 => {
            if data.len() < count {
                return Err(Error::ImageDecode(format!(
                    "expected {} bytes of samples, found {}",
                    count,
                    data.len()
                )));
            }
            Ok(data[..count].to_vec())
        }
        16 => {
            if data.len() < count * 2 {
                return Err(Error::ImageDecode(format!(
                    "expected {} bytes of samples, found {}",
                    count * 2,
                    data.len()
                )));
            }
            // Keep the high byte
            Ok(data.chunks_exact(2).take(count).map(|c| c[0]).collect())
        }
        1 | 2 | 4 => {
            let bits = bits as usize;
            let row_bytes = (per_row * bits).div_ceil(8);
            if data.len() < row_bytes * height as usize {
                return Err(Error::ImageDecode(format!(
                    "expected {} bytes of samples, found {}",
                    row_bytes * height as usize,
                    data.len()
                )));
            }

            let max = (1u16 << bits) - 1;
            let mask = max as u8;
            let mut out = Vec::with_capacity(count);
            for row in data.chunks_exact(row_bytes).take(height as usize) {
                for i in 0..per_row {
                    let bit = i * bits;
                    let shift = 8 - bits - (bit % 8);
                    let value = (row[bit / 8] >> shift) & mask;
                    out.push((value as u16 * 255 / max) as u8);
                }
            }
            Ok(out)
        }
        other => Err(Error::ImageDecode(format!(
            "unsupported bits per component: {}",
            other
        ))),
    }
}

/// Convert CMYK bytes to RGB.
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for chunk in cmyk.chunks_exact(4) {
        let c = f32::from(chunk[0]) / 255.0;
        let m = f32::from(chunk[1]) / 255.0;
        let y = f32::from(chunk[2]) / 255.0;
        let k = f32::from(chunk[3]) / 255.0;

        rgb.push((255.0 * (1.0 - c) * (1.0 - k)).round() as u8);
        rgb.push((255.0 * (1.0 - m) * (1.0 - k)).round() as u8);
        rgb.push((255.0 * (1.0 - y) * (1.0 - k)).round() as u8);
    }
    rgb
}
