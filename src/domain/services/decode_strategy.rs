//! Decode strategy chain
//!
//! Turns possibly-malformed image bytes into a bounded, opaque, re-encoded
//! JPEG. Strategies run in a fixed order, strictest first, and every
//! failure is recorded before moving on. The attempt log is part of the
//! outcome so callers can explain what went wrong.

use crate::core::{DecodeConfig, DecodeError};
use crate::domain::entities::{
    AttemptFailure, DecodeMethod, DecodeOutcome, DecodedImage, Dimensions, ImageKind,
};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, ImageReader, Rgb, RgbImage};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// JPEG start-of-scan marker
const JPEG_SOS: &[u8] = &[0xFF, 0xDA];

/// Result of one successful strategy, before chain bookkeeping
#[derive(Debug)]
struct Normalized {
    encoded: Bytes,
    original: Dimensions,
    final_dims: Dimensions,
    pre_scaled: bool,
    untouched: bool,
}

type Strategy = fn(&Path, &DecodeConfig) -> Result<Normalized, DecodeError>;

const STRATEGIES: [(DecodeMethod, Strategy); 3] = [
    (DecodeMethod::Standard, decode_standard),
    (DecodeMethod::Robust, decode_robust),
    (DecodeMethod::Force, decode_force),
];

#[derive(Debug, Clone, Default)]
pub struct DecodeStrategyChain {
    config: DecodeConfig,
}

impl DecodeStrategyChain {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Tries each strategy in order until one succeeds
    pub fn run(&self, path: &Path) -> DecodeOutcome {
        let mut failures = Vec::new();

        for (index, (method, strategy)) in STRATEGIES.iter().enumerate() {
            let attempt = index + 1;

            match strategy(path, &self.config) {
                Ok(normalized) => {
                    tracing::debug!(
                        "Decoded {} with {} strategy on attempt {} ({}x{} -> {}x{})",
                        path.display(),
                        method,
                        attempt,
                        normalized.original.0,
                        normalized.original.1,
                        normalized.final_dims.0,
                        normalized.final_dims.1
                    );

                    return DecodeOutcome::Success(DecodedImage {
                        encoded: normalized.encoded,
                        original_dimensions: normalized.original,
                        final_dimensions: normalized.final_dims,
                        method: *method,
                        attempts_tried: attempt,
                        pre_scaled: normalized.pre_scaled,
                        untouched: normalized.untouched,
                        failures,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        "{} strategy failed for {}: {}",
                        method,
                        path.display(),
                        e
                    );
                    failures.push(AttemptFailure {
                        attempt,
                        method: *method,
                        reason: e.to_string(),
                    });
                }
            }
        }

        DecodeOutcome::Exhausted(failures)
    }
}

/// Normal open with alpha compositing and aspect-preserving resize.
/// Refuses streams whose end marker is missing.
fn decode_standard(path: &Path, config: &DecodeConfig) -> Result<Normalized, DecodeError> {
    let data = fs::read(path)?;
    let format = image::guess_format(&data).map_err(|_| DecodeError::UnknownFormat)?;

    if let Some(kind) = ImageKind::from_codec(format) {
        if !is_complete(&data, kind) {
            return Err(DecodeError::IncompleteStream { format: kind.name() });
        }
    }

    let img = image::load_from_memory_with_format(&data, format)?;
    let original = img.dimensions();
    let source_color = img.color();

    let (img, pre_scaled) = prescale(img, config);
    let img = if exceeds(img.dimensions(), config.max_dimension) {
        img.resize(config.max_dimension, config.max_dimension, FilterType::Lanczos3)
    } else {
        img
    };
    let final_dims = img.dimensions();

    if format == ImageFormat::Jpeg && source_color == ColorType::Rgb8 && final_dims == original {
        return Ok(Normalized {
            encoded: Bytes::from(data),
            original,
            final_dims,
            pre_scaled,
            untouched: true,
        });
    }

    let rgb = flatten_onto_white(&img);
    Ok(Normalized {
        encoded: encode_jpeg(&rgb, config.quality)?,
        original,
        final_dims,
        pre_scaled,
        untouched: false,
    })
}

/// Eager decode after patching a missing trailer; plain color
/// conversion and a direct resize to the bounding box.
fn decode_robust(path: &Path, config: &DecodeConfig) -> Result<Normalized, DecodeError> {
    let mut data = fs::read(path)?;
    let format = image::guess_format(&data).map_err(|_| DecodeError::UnknownFormat)?;

    if let Some(kind) = ImageKind::from_codec(format) {
        if !is_complete(&data, kind) {
            if let Some(trailer) = kind.trailer() {
                tracing::debug!("Appending missing {} trailer to {}", kind, path.display());
                data.extend_from_slice(trailer);
            }
        }
    }

    let img = ImageReader::with_format(Cursor::new(&data), format).decode()?;
    let original = img.dimensions();

    let (img, pre_scaled) = prescale(img, config);
    let img = if exceeds(img.dimensions(), config.max_dimension) {
        img.resize_exact(config.max_dimension, config.max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    Ok(Normalized {
        encoded: encode_jpeg(&rgb, config.robust_quality())?,
        original,
        final_dims: rgb.dimensions(),
        pre_scaled,
        untouched: false,
    })
}

/// Last resort: decode from an isolated scratch copy and fall back to a
/// blank canvas when pixel data cannot be recovered. Fails only when
/// not even the header is readable.
fn decode_force(path: &Path, config: &DecodeConfig) -> Result<Normalized, DecodeError> {
    let data = fs::read(path)?;

    let mut scratch = tempfile::Builder::new()
        .prefix("pictriage-force-")
        .tempfile()?;
    scratch.write_all(&data)?;
    scratch.flush()?;

    let open = || -> Result<_, DecodeError> {
        Ok(ImageReader::open(scratch.path())?.with_guessed_format()?)
    };

    let original = open()?
        .into_dimensions()
        .map_err(|e| DecodeError::Unreadable(e.to_string()))?;
    if original.0 == 0 || original.1 == 0 {
        return Err(DecodeError::Unreadable(format!(
            "reported dimensions {}x{}",
            original.0, original.1
        )));
    }

    let target = if exceeds(original, config.max_dimension) {
        (config.max_dimension, config.max_dimension)
    } else {
        original
    };

    let rgb = match open()?.decode() {
        Ok(img) => {
            let rgb = img.to_rgb8();
            if target == original {
                rgb
            } else {
                imageops::resize(&rgb, target.0, target.1, FilterType::Nearest)
            }
        }
        Err(e) => {
            tracing::warn!(
                "Pixel data of {} unrecoverable ({}), substituting blank canvas",
                path.display(),
                e
            );
            // A blank canvas resized is still blank; allocate at target size.
            RgbImage::from_pixel(target.0, target.1, WHITE)
        }
    };

    Ok(Normalized {
        encoded: encode_jpeg(&rgb, config.force_quality)?,
        original,
        final_dims: rgb.dimensions(),
        pre_scaled: false,
        untouched: false,
    })
}

fn exceeds(dims: Dimensions, bound: u32) -> bool {
    dims.0 > bound || dims.1 > bound
}

/// First stage of the two-stage downscale for very large sources
fn prescale(img: DynamicImage, config: &DecodeConfig) -> (DynamicImage, bool) {
    if exceeds(img.dimensions(), config.prescale_threshold) {
        let bound = config.prescale_bound;
        (img.resize(bound, bound, FilterType::Lanczos3), true)
    } else {
        (img, false)
    }
}

/// Whether the stream carries its end marker where the codec expects it.
/// Bytes appended after the marker (maker notes, padding) are allowed.
fn is_complete(data: &[u8], kind: ImageKind) -> bool {
    let Some(trailer) = kind.trailer() else {
        return true;
    };

    match kind {
        // Scan data stuffs every 0xFF, so the real EOI is the first one after the last SOS
        ImageKind::Jpeg => rfind(data, JPEG_SOS)
            .is_some_and(|sos| find(&data[sos..], trailer).is_some()),
        _ => rfind(data, trailer).is_some(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Composites transparent images onto white instead of dropping alpha.
/// Palette images arrive already expanded to RGB(A) by the codec.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Bytes, DecodeError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(image)
        .map_err(|e| DecodeError::Encode(e.to_string()))?;
    Ok(Bytes::from(buffer))
}
