use anyhow::Context;
use glam::Vec2;
use image::RgbaImage;
use image::imageops::FilterType;

use crate::error::{RuntimeError, RuntimeResult};

// ── DataFormat ───────────────────────────────────────────────────────────────

/// Encoding of a costume's image payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataFormat {
    Svg,
    Png,
    Jpeg,
    /// Any other raster format tag; decoding is left to format sniffing.
    Other(String),
}

impl DataFormat {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "svg" => Self::Svg,
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Svg)
    }
}

// ── Costume ──────────────────────────────────────────────────────────────────

/// One appearance of a target. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct Costume {
    pub name: String,
    pub data: Vec<u8>,
    pub data_format: DataFormat,
    /// Integer scale divisor for raster art (2 for Scratch's double-resolution bitmaps).
    pub bitmap_resolution: u32,
    /// Pivot in costume pixel space.
    pub rotation_center: Vec2,
}

impl Costume {
    pub fn new(name: &str, data: Vec<u8>, data_format: DataFormat) -> Self {
        Self {
            name: name.to_string(),
            data,
            data_format,
            bitmap_resolution: 1,
            rotation_center: Vec2::ZERO,
        }
    }

    pub fn with_rotation_center(mut self, x: f32, y: f32) -> Self {
        self.rotation_center = Vec2::new(x, y);
        self
    }

    pub fn with_bitmap_resolution(mut self, resolution: u32) -> Self {
        self.bitmap_resolution = resolution.max(1);
        self
    }
}

// ── Decoding ─────────────────────────────────────────────────────────────────

/// Turns a costume payload into a displayable image.
///
/// Implementations must apply `bitmap_resolution` to raster art so the result
/// is in stage pixels.
pub trait CostumeDecoder {
    fn decode(&self, costume: &Costume) -> RuntimeResult<RgbaImage>;
}

/// Default decoder: raster formats through `image`, SVG through `resvg`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageDecoder;

impl CostumeDecoder for ImageDecoder {
    fn decode(&self, costume: &Costume) -> RuntimeResult<RgbaImage> {
        let decoded = if costume.data_format.is_vector() {
            rasterize_svg(&costume.data)
        } else {
            decode_raster(&costume.data, costume.bitmap_resolution)
        };
        decoded.map_err(|e| RuntimeError::decode(format!("costume '{}': {e:#}", costume.name)))
    }
}

/// Decode raster bytes and shrink by the integer `resolution` divisor.
pub fn decode_raster(bytes: &[u8], resolution: u32) -> anyhow::Result<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let resolution = resolution.max(1);
    if resolution == 1 {
        return Ok(img);
    }
    let (w, h) = img.dimensions();
    let (nw, nh) = ((w / resolution).max(1), (h / resolution).max(1));
    Ok(image::imageops::resize(&img, nw, nh, FilterType::Triangle))
}

/// Parse SVG bytes and rasterize them at their natural size.
pub fn rasterize_svg(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .context("allocate svg pixmap")?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut straight = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        straight.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(size.width(), size.height(), straight)
        .context("svg pixmap has unexpected size")
}
