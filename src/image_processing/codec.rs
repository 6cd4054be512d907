//! Pixel decoding and encoding.
//!
//! The driver only sees the [`ImageCodec`] trait; [`ImageRsCodec`] is the
//! production implementation on top of the `image` crate, with HEIC handled by
//! `libheif-rs` when the `heic` feature is enabled.

use anyhow::{Context, Result};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, ImageReader};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use super::format::OutputFormat;
use super::resize::resize_exact;

/// Largest edge an ICO directory entry can describe
pub const MAX_ICO_DIMENSION: u32 = 256;

/// Options forwarded to the encoder
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Frame sizes written into ICO containers; ignored by other formats
    pub ico_sizes: Vec<(u32, u32)>,
    /// Quality for lossy formats (JPEG, HEIC), 1-100
    pub quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ico_sizes: vec![(MAX_ICO_DIMENSION, MAX_ICO_DIMENSION)],
            quality: 75,
        }
    }
}

pub trait ImageCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage>;

    fn encode(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: OutputFormat,
        options: &EncodeOptions,
    ) -> Result<()>;

    /// Decode `input` and re-encode it to `output`
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        options: &EncodeOptions,
    ) -> Result<()> {
        let image = self.decode(input)?;
        self.encode(&image, output, format, options)
    }
}

/// Codec backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRsCodec;

impl ImageCodec for ImageRsCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        if is_heif_file(path)? {
            return heif::decode(path);
        }

        let reader = ImageReader::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to detect image format: {}", path.display()))?;

        reader
            .decode()
            .with_context(|| format!("Failed to decode image: {}", path.display()))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: OutputFormat,
        options: &EncodeOptions,
    ) -> Result<()> {
        let prepared = normalize_for_format(image, format);

        match format {
            OutputFormat::Heic => heif::encode(&prepared, path, options.quality),
            OutputFormat::Ico => {
                let frames = build_ico_frames(&prepared, &options.ico_sizes)?;
                write_file(path, |writer| {
                    IcoEncoder::new(writer)
                        .encode_images(&frames)
                        .context("Failed to encode ICO")
                })
            }
            OutputFormat::Jpeg => write_file(path, |writer| {
                let encoder = JpegEncoder::new_with_quality(writer, options.quality);
                prepared
                    .write_with_encoder(encoder)
                    .context("Failed to encode JPEG")
            }),
            OutputFormat::Png => write_file(path, |writer| {
                prepared
                    .write_to(writer, ImageFormat::Png)
                    .context("Failed to encode PNG")
            }),
            OutputFormat::Webp => write_file(path, |writer| {
                prepared
                    .write_to(writer, ImageFormat::WebP)
                    .context("Failed to encode WEBP")
            }),
        }
    }
}

/// Flatten to RGB for every format except ICO, which keeps its alpha channel
pub fn normalize_for_format(image: &DynamicImage, format: OutputFormat) -> DynamicImage {
    if format.normalizes_to_rgb() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageRgba8(image.to_rgba8())
    }
}

fn build_ico_frames(image: &DynamicImage, sizes: &[(u32, u32)]) -> Result<Vec<IcoFrame<'static>>> {
    if sizes.is_empty() {
        anyhow::bail!("No ICO sizes configured");
    }

    let rgba = image.to_rgba8();
    let mut frames = Vec::with_capacity(sizes.len());

    for &(width, height) in sizes {
        if width == 0 || height == 0 || width > MAX_ICO_DIMENSION || height > MAX_ICO_DIMENSION {
            anyhow::bail!(
                "Invalid ICO size {}x{}: each side must be between 1 and {}",
                width,
                height,
                MAX_ICO_DIMENSION
            );
        }

        let resized = resize_exact(&rgba, width, height)
            .with_context(|| format!("Failed to resize icon to {}x{}", width, height))?;
        let frame = IcoFrame::as_png(resized.as_raw(), width, height, ExtendedColorType::Rgba8)
            .with_context(|| format!("Failed to build {}x{} icon frame", width, height))?;
        frames.push(frame);
    }

    Ok(frames)
}

fn write_file<F>(path: &Path, encode: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let result = encode(&mut writer).and_then(|_| {
        writer
            .flush()
            .with_context(|| format!("Failed to write output file: {}", path.display()))
    });
    drop(writer);

    // A failed encode must not leave a truncated file behind
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

/// ISO-BMFF major brands written by HEIF/HEIC encoders
const HEIF_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

/// Sniff the leading `ftyp` box; the file name plays no part
fn is_heif_file(path: &Path) -> Result<bool> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;

    let mut header = [0u8; 12];
    let mut filled = 0;
    while filled < header.len() {
        let n = file
            .read(&mut header[filled..])
            .with_context(|| format!("Failed to read image header: {}", path.display()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(is_heif_header(&header[..filled]))
}

fn is_heif_header(header: &[u8]) -> bool {
    header.len() >= 12
        && &header[4..8] == b"ftyp"
        && HEIF_BRANDS.iter().any(|brand| &header[8..12] == brand.as_slice())
}

#[cfg(feature = "heic")]
mod heif {
    use anyhow::{Context, Result};
    use image::{DynamicImage, RgbImage};
    use libheif_rs::{
        Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif,
        RgbChroma,
    };
    use std::path::Path;

    pub fn decode(path: &Path) -> Result<DynamicImage> {
        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_file(path.to_string_lossy().as_ref())
            .with_context(|| format!("Failed to read HEIC: {}", path.display()))?;
        let handle = ctx
            .primary_image_handle()
            .context("Failed to get primary HEIC image")?;

        let width = handle.width();
        let height = handle.height();
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .context("Failed to decode HEIC")?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| anyhow::anyhow!("No RGB plane found in HEIC image"))?;

        let row_bytes = width as usize * 3;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }

        RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| anyhow::anyhow!("Failed to create RGB image from HEIC data"))
    }

    pub fn encode(image: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut heif_image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgb))
            .context("Failed to allocate HEIC image")?;
        heif_image
            .create_plane(Channel::Interleaved, width, height, 8)
            .context("Failed to allocate HEIC plane")?;

        {
            let planes = heif_image.planes_mut();
            let plane = planes
                .interleaved
                .ok_or_else(|| anyhow::anyhow!("No interleaved plane in HEIC image"))?;
            let stride = plane.stride;
            let row_bytes = width as usize * 3;
            for (y, row) in rgb.as_raw().chunks_exact(row_bytes).enumerate() {
                let start = y * stride;
                plane.data[start..start + row_bytes].copy_from_slice(row);
            }
        }

        let lib_heif = LibHeif::new();
        let mut ctx = HeifContext::new().context("Failed to create HEIC context")?;
        let mut encoder = lib_heif
            .encoder_for_format(CompressionFormat::Hevc)
            .context("No HEVC encoder available in libheif")?;
        encoder
            .set_quality(EncoderQuality::Lossy(quality))
            .context("Failed to set HEIC quality")?;
        ctx.encode_image(&heif_image, &mut encoder, None)
            .context("Failed to encode HEIC")?;
        ctx.write_to_file(path.to_string_lossy().as_ref())
            .with_context(|| format!("Failed to write HEIC: {}", path.display()))
    }
}

#[cfg(not(feature = "heic"))]
mod heif {
    use anyhow::Result;
    use image::DynamicImage;
    use std::path::Path;

    const DISABLED: &str = "HEIC support is not available. Rebuild with --features heic to enable it";

    pub fn decode(path: &Path) -> Result<DynamicImage> {
        anyhow::bail!("Cannot decode {}: {}", path.display(), DISABLED)
    }

    pub fn encode(_image: &DynamicImage, path: &Path, _quality: u8) -> Result<()> {
        anyhow::bail!("Cannot encode {}: {}", path.display(), DISABLED)
    }
}
