//! Static layout generation.
//!
//! [`Layout::generate`] runs once per change of photo-set size.  Ornaments
//! are drawn from a seeded stream of their own, so regenerating after a photo
//! is added or removed yields the same ornaments; photo slots are re-spaced
//! along the spiral for the new count.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::error::{LayoutError, Result};
use crate::palette::{OrnamentStyle, Rgb, Shape};

/// π(3 − √5): successive ornaments step by this angle around the trunk.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Mixed into the seed so photo slots draw from a separate stream.
const PHOTO_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

// ════════════════════════════════════════════════════════════════════════════
// LayoutConfig
// ════════════════════════════════════════════════════════════════════════════

/// Geometry of both layouts.  All distances are in scene units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub ornament_count:  usize,
    pub tree_height:     f32,
    /// Cone radius at the base, before the constant offset.
    pub base_radius:     f32,
    pub radius_offset:   f32,
    /// `(1 − h)^exponent`; below 1.0 gives a fuller base than a straight cone.
    pub taper_exponent:  f32,
    /// Chance an ornament hugs the surface instead of filling the interior.
    pub surface_probability: f32,
    pub surface_scale:   (f32, f32),
    pub interior_scale:  (f32, f32),
    /// Radius of the ornament scatter sphere.
    pub scatter_radius:  f32,

    /// Photos occupy this fraction of the tree height, centered.
    pub photo_height_fraction: f32,
    pub photo_turns:       f32,
    pub photo_base_radius: f32,
    pub photo_radius_offset: f32,
    /// Half-extents of the photo scatter box.
    pub photo_scatter_extent: [f32; 3],

    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            ornament_count:       320,
            tree_height:          14.0,
            base_radius:          5.5,
            radius_offset:        0.15,
            taper_exponent:       0.9,
            surface_probability:  0.75,
            surface_scale:        (0.9, 1.15),
            interior_scale:       (0.0, 0.8),
            scatter_radius:       15.0,
            photo_height_fraction: 0.7,
            photo_turns:          8.0,
            photo_base_radius:    6.2,
            photo_radius_offset:  0.6,
            photo_scatter_extent: [12.0, 8.0, 8.0],
            seed:                 0x7EE5,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &'static str, v: f32) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(LayoutError::InvalidParameter { name, reason: format!("must be > 0, got {}", v) })
            }
        }
        fn range(name: &'static str, (lo, hi): (f32, f32)) -> Result<()> {
            if lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo < hi {
                Ok(())
            } else {
                Err(LayoutError::InvalidParameter { name, reason: format!("need 0 <= min < max, got ({}, {})", lo, hi) })
            }
        }

        if self.ornament_count == 0 {
            return Err(LayoutError::InvalidParameter {
                name: "ornament_count",
                reason: "must be at least 1".into(),
            });
        }
        positive("tree_height", self.tree_height)?;
        positive("base_radius", self.base_radius)?;
        positive("taper_exponent", self.taper_exponent)?;
        positive("scatter_radius", self.scatter_radius)?;
        positive("photo_height_fraction", self.photo_height_fraction)?;
        positive("photo_turns", self.photo_turns)?;
        positive("photo_base_radius", self.photo_base_radius)?;
        for (axis, e) in self.photo_scatter_extent.iter().enumerate() {
            positive(["photo_scatter_extent.x", "photo_scatter_extent.y", "photo_scatter_extent.z"][axis], *e)?;
        }
        if !(0.0..=1.0).contains(&self.surface_probability) {
            return Err(LayoutError::InvalidParameter {
                name: "surface_probability",
                reason: format!("must be within [0, 1], got {}", self.surface_probability),
            });
        }
        if !(self.radius_offset.is_finite() && self.radius_offset >= 0.0) {
            return Err(LayoutError::InvalidParameter {
                name: "radius_offset",
                reason: format!("must be >= 0, got {}", self.radius_offset),
            });
        }
        range("surface_scale", self.surface_scale)?;
        range("interior_scale", self.interior_scale)?;
        Ok(())
    }

    /// Cone radius at normalised height `h ∈ [0, 1]` (0 = base, 1 = tip).
    pub fn tree_radius(&self, h: f32) -> f32 {
        let h = h.clamp(0.0, 1.0);
        self.base_radius * (1.0 - h).powf(self.taper_exponent) + self.radius_offset
    }

    /// Normalised height of world-space `y` within the tree.
    pub fn normalized_height(&self, y: f32) -> f32 {
        (y + self.tree_height / 2.0) / self.tree_height
    }

    /// Largest horizontal distance from the trunk an ornament at `y` may sit.
    pub fn max_tree_radius(&self, y: f32) -> f32 {
        self.tree_radius(self.normalized_height(y)) * self.surface_scale.1
    }

    /// Height of the tree tip, where the star rests.
    pub fn tree_top(&self) -> f32 { self.tree_height / 2.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Entities
// ════════════════════════════════════════════════════════════════════════════

/// A decorative ornament.  Immutable once generated.
#[derive(Clone, Debug, PartialEq)]
pub struct OrnamentEntity {
    pub id:               u32,
    pub shape:            Shape,
    pub tree_position:    Vec3,
    pub scatter_position: Vec3,
    pub color:            Rgb,
    pub scale:            f32,
}

/// The two layout positions and base orientation assigned to a photo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotoSlot {
    pub tree_position:    Vec3,
    pub scatter_position: Vec3,
    /// Euler XYZ, radians.  In the tree the photo faces away from the trunk.
    pub rotation:         Vec3,
}

/// Every precomputed position for one ornament set and one photo count.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub ornaments:   Vec<OrnamentEntity>,
    pub photo_slots: Vec<PhotoSlot>,
}

impl Layout {
    /// Generate with the default [`OrnamentStyle::festive`] palette.
    pub fn generate(cfg: &LayoutConfig, photo_count: usize) -> Result<Layout> {
        let style = OrnamentStyle::festive()?;
        Layout::generate_with_style(cfg, &style, photo_count)
    }

    pub fn generate_with_style(
        cfg: &LayoutConfig,
        style: &OrnamentStyle,
        photo_count: usize,
    ) -> Result<Layout> {
        cfg.validate()?;
        Ok(Layout {
            ornaments:   ornaments(cfg, style),
            photo_slots: photo_slots(cfg, photo_count),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Ornaments
// ════════════════════════════════════════════════════════════════════════════

fn ornaments(cfg: &LayoutConfig, style: &OrnamentStyle) -> Vec<OrnamentEntity> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let n = cfg.ornament_count;

    (0..n)
        .map(|i| {
            let tree_position = tree_point(cfg, i, n, &mut rng);
            let (shape, color, scale) = style.draw(&mut rng);
            let scatter_position = sphere_point(cfg.scatter_radius, &mut rng);
            OrnamentEntity {
                id: i as u32,
                shape,
                tree_position,
                scatter_position,
                color,
                scale,
            }
        })
        .collect()
}

/// Golden-angle spiral inside the tapered cone.
fn tree_point<R: Rng + ?Sized>(cfg: &LayoutConfig, i: usize, n: usize, rng: &mut R) -> Vec3 {
    let t = i as f32 / n as f32;
    let y = t * cfg.tree_height - cfg.tree_height / 2.0;
    let radius = cfg.tree_radius(t);

    // Mostly on the surface, the rest filling the interior.
    let (lo, hi) = if rng.gen_bool(cfg.surface_probability as f64) {
        cfg.surface_scale
    } else {
        cfg.interior_scale
    };
    let r = radius * rng.gen_range(lo..hi);
    let theta = i as f32 * GOLDEN_ANGLE;

    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Uniform point inside a sphere.  The cube root keeps density even with
/// radius; `acos` keeps it even toward the poles.
fn sphere_point<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let r = radius * rng.gen::<f32>().cbrt();
    let azimuth = rng.gen::<f32>() * TAU;
    let polar = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        r * polar.sin() * azimuth.cos(),
        r * polar.cos(),
        r * polar.sin() * azimuth.sin(),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Photos
// ════════════════════════════════════════════════════════════════════════════

fn photo_slots(cfg: &LayoutConfig, n: usize) -> Vec<PhotoSlot> {
    let mut rng = StdRng::seed_from_u64(cfg.seed ^ PHOTO_STREAM);
    let span = cfg.tree_height * cfg.photo_height_fraction;
    let [ex, ey, ez] = cfg.photo_scatter_extent;

    (0..n)
        .map(|i| {
            let t = (i as f32 + 0.5) / n as f32;
            let y = (t - 0.5) * span;
            let h = cfg.normalized_height(y).clamp(0.0, 1.0);
            let r = cfg.photo_base_radius * (1.0 - h) + cfg.photo_radius_offset;
            let theta = t * cfg.photo_turns * TAU;

            let tilt = rng.gen_range(-0.15..0.15);
            let scatter_position = Vec3::new(
                rng.gen_range(-ex..ex),
                rng.gen_range(-ey..ey),
                rng.gen_range(-ez..ez),
            );

            PhotoSlot {
                tree_position: Vec3::new(r * theta.cos(), y, r * theta.sin()),
                scatter_position,
                rotation: Vec3::new(tilt, PI / 2.0 - theta, 0.0),
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
