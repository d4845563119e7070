//! Shared test fixtures
//!
//! Images are generated with the `image` crate so every fixture is a
//! real, decodable file unless a test deliberately breaks it.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use parking_lot::Mutex;
use pictriage::core::InferenceError;
use pictriage::domain::entities::EngineAvailability;
use pictriage::domain::repositories::{EngineRequest, InferenceEngine, RawPayload};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 90)
        .encode_image(&img)
        .unwrap();
    buffer
}

/// Half-transparent PNG; always needs compositing, never passes through
pub fn png_rgba_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 30, 30, (x % 256) as u8]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// A JPEG cut off mid-stream: valid header, no end marker
pub fn truncated_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = jpeg_bytes(width, height);
    data.truncate(data.len() / 2);
    data
}

/// A PNG cut off halfway through its image data
pub fn truncated_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = png_rgba_bytes(width, height);
    data.truncate(data.len() / 2);
    data
}

/// A PNG missing its final IEND chunk
pub fn png_without_iend(width: u32, height: u32) -> Vec<u8> {
    let mut data = png_rgba_bytes(width, height);
    data.truncate(data.len() - 12);
    data
}

/// A complete JPEG followed by vendor bytes after the end marker
pub fn jpeg_with_trailer(width: u32, height: u32) -> Vec<u8> {
    let mut data = jpeg_bytes(width, height);
    data.extend_from_slice(b"SEFHtrailing-metadata");
    data
}

pub fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Files in `dir` created by the ephemeral store
pub fn staged_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("pictriage-"))
        })
        .collect()
}

pub fn analysis_reply() -> Value {
    json!({
        "image_type": "landscape",
        "description": "a quiet lake at dawn",
        "keywords": ["lake", "dawn", "mist", "reflection", "calm"]
    })
}

pub enum Reply {
    Payload(Value),
    Fail(InferenceError),
}

/// Scriptable engine that records every path it was handed
pub struct StubEngine {
    id: &'static str,
    available: AtomicBool,
    reply: Mutex<Reply>,
    delay: Duration,
    calls: AtomicUsize,
    /// (path, existed when analyze was called)
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl StubEngine {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            available: AtomicBool::new(true),
            reply: Mutex::new(Reply::Payload(analysis_reply())),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn down(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    pub fn replying(self, reply: Value) -> Self {
        *self.reply.lock() = Reply::Payload(reply);
        self
    }

    pub fn failing(self, error: InferenceError) -> Self {
        *self.reply.lock() = Reply::Fail(error);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().clone()
    }
}

impl InferenceEngine for StubEngine {
    fn id(&self) -> &str {
        self.id
    }

    fn analyze(&self, request: &EngineRequest) -> Result<RawPayload, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .push((request.image_path.clone(), request.image_path.exists()));

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        match &*self.reply.lock() {
            Reply::Payload(value) => Ok(value.as_object().cloned().unwrap_or_default()),
            Reply::Fail(error) => Err(error.clone()),
        }
    }

    fn check_availability(&self) -> EngineAvailability {
        if self.available.load(Ordering::SeqCst) {
            EngineAvailability::available(self.id)
        } else {
            EngineAvailability::unavailable(self.id, "stub is down")
        }
    }
}
