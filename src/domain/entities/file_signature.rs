//! File signature entity
//!
//! Magic bytes that identify the image formats accepted for analysis,
//! looked up by file extension before any decode attempt.

use std::fmt;
use std::path::Path;

const JPEG_SIGNATURES: &[&[u8]] = &[&[0xFF, 0xD8, 0xFF]];
const PNG_SIGNATURES: &[&[u8]] = &[&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]];
const GIF_SIGNATURES: &[&[u8]] = &[b"GIF87a", b"GIF89a"];
const BMP_SIGNATURES: &[&[u8]] = &[b"BM"];
const WEBP_SIGNATURES: &[&[u8]] = &[b"RIFF"];
const TIFF_SIGNATURES: &[&[u8]] = &[b"II*\0", b"MM\0*"];

const JPEG_TRAILER: &[u8] = &[0xFF, 0xD9];
/// Complete IEND chunk: zero length, type, CRC
const PNG_TRAILER: &[u8] = &[
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Image formats accepted at the upload boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
    Tiff,
}

impl ImageKind {
    pub const ALL: [ImageKind; 6] = [
        ImageKind::Jpeg,
        ImageKind::Png,
        ImageKind::Gif,
        ImageKind::Bmp,
        ImageKind::WebP,
        ImageKind::Tiff,
    ];

    /// Maps a file extension (with or without the leading dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            "bmp" => Some(ImageKind::Bmp),
            "webp" => Some(ImageKind::WebP),
            "tiff" | "tif" => Some(ImageKind::Tiff),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Maps the format sniffed by the codec back onto our table
    pub fn from_codec(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::Gif => Some(ImageKind::Gif),
            image::ImageFormat::Bmp => Some(ImageKind::Bmp),
            image::ImageFormat::WebP => Some(ImageKind::WebP),
            image::ImageFormat::Tiff => Some(ImageKind::Tiff),
            _ => None,
        }
    }

    /// Every header accepted for this format
    pub const fn signatures(&self) -> &'static [&'static [u8]] {
        match self {
            ImageKind::Jpeg => JPEG_SIGNATURES,
            ImageKind::Png => PNG_SIGNATURES,
            ImageKind::Gif => GIF_SIGNATURES,
            ImageKind::Bmp => BMP_SIGNATURES,
            ImageKind::WebP => WEBP_SIGNATURES,
            ImageKind::Tiff => TIFF_SIGNATURES,
        }
    }

    /// End-of-stream marker, for formats that define one
    pub const fn trailer(&self) -> Option<&'static [u8]> {
        match self {
            ImageKind::Jpeg => Some(JPEG_TRAILER),
            ImageKind::Png => Some(PNG_TRAILER),
            _ => None,
        }
    }

    pub fn matches_header(&self, header: &[u8]) -> bool {
        self.signatures().iter().any(|sig| header.starts_with(sig))
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::WebP => "webp",
            ImageKind::Tiff => "tiff",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::Gif => "GIF",
            ImageKind::Bmp => "BMP",
            ImageKind::WebP => "WebP",
            ImageKind::Tiff => "TIFF",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether the path carries one of the accepted image extensions
pub fn is_supported_extension(path: &Path) -> bool {
    ImageKind::from_path(path).is_some()
}
