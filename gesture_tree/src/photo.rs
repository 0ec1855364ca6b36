//! Photo sources: decoded image files and generated placeholder cards.
//!
//! The scene only needs an aspect ratio and a small thumbnail to paint, so
//! that's all a [`PhotoImage`] keeps.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use tracing::{info, warn};

/// Longest thumbnail edge, in pixels.
pub const THUMB_MAX: u32 = 48;

/// Decoded photo content.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoImage {
    pub label:        String,
    /// Width / height of the original image.
    pub aspect_ratio: f32,
    pub thumb_w:      usize,
    pub thumb_h:      usize,
    /// Row-major `0xAARRGGBB`.
    pub pixels:       Vec<u32>,
}

impl PhotoImage {
    /// Decode an image file.
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("decoding photo {}", path.display()))?;
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_image(label, &img))
    }

    pub fn from_image(label: impl Into<String>, img: &DynamicImage) -> Self {
        let (w, h) = img.dimensions();
        let aspect_ratio = if h == 0 { 1.0 } else { w as f32 / h as f32 };
        let thumb = img.thumbnail(THUMB_MAX, THUMB_MAX).to_rgb8();
        let pixels = thumb
            .pixels()
            .map(|p| 0xFF000000 | ((p.0[0] as u32) << 16) | ((p.0[1] as u32) << 8) | p.0[2] as u32)
            .collect();
        PhotoImage {
            label: label.into(),
            aspect_ratio,
            thumb_w: thumb.width() as usize,
            thumb_h: thumb.height() as usize,
            pixels,
        }
    }

    /// A colored card with a light border.  Successive indices step around
    /// the hue wheel by the golden ratio so neighbours stay distinct.
    pub fn placeholder(index: usize) -> Self {
        const W: usize = 24;
        const H: usize = 30;
        let hue = (index as f32 * 0.618_034 * 360.0) % 360.0;
        let fill = hsv_to_argb(hue, 0.55, 0.85);
        let border = 0xFFF4F0E6;
        let pixels = (0..W * H)
            .map(|i| {
                let (x, y) = (i % W, i / W);
                if x < 2 || y < 2 || x >= W - 2 || y >= H - 5 { border } else { fill }
            })
            .collect();
        PhotoImage {
            label: format!("card {}", index + 1),
            aspect_ratio: W as f32 / H as f32,
            thumb_w: W,
            thumb_h: H,
            pixels,
        }
    }

    /// Thumbnail pixel at normalised `(u, v)`, clamped to the edges.
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        if self.pixels.is_empty() {
            return 0xFF808080;
        }
        let x = ((u.clamp(0.0, 1.0) * self.thumb_w as f32) as usize).min(self.thumb_w - 1);
        let y = ((v.clamp(0.0, 1.0) * self.thumb_h as f32) as usize).min(self.thumb_h - 1);
        self.pixels[y * self.thumb_w + x]
    }
}

/// Load every decodable image in `dir`, in file-name order.  Files that fail
/// to decode are skipped with a warning.
pub fn load_dir(dir: &Path) -> Result<Vec<PhotoImage>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("listing photo directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut photos = Vec::with_capacity(paths.len());
    for path in paths {
        match PhotoImage::load(&path) {
            Ok(photo) => photos.push(photo),
            Err(e)    => warn!("skipping {}: {:#}", path.display(), e),
        }
    }
    info!("loaded {} photos from {}", photos.len(), dir.display());
    Ok(photos)
}

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
pub(crate) fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
