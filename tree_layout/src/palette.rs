//! Ornament shapes, colors, and the weighted-categorical tables they are
//! drawn from.
//!
//! Every random style decision goes through a single [`WeightedTable`], so
//! the distribution lives in one auditable table instead of scattered
//! threshold literals.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{LayoutError, Result};

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// An opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED:     Rgb = Rgb::hex(0xD42426);
    pub const GOLD:    Rgb = Rgb::hex(0xFFD700);
    pub const SILVER:  Rgb = Rgb::hex(0xC0C8D0);
    pub const EMERALD: Rgb = Rgb::hex(0x1B8A4A);
    pub const SNOW:    Rgb = Rgb::hex(0xF4F7FF);

    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Rgb {
        Rgb {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >>  8) & 0xFF) as u8,
            b: ( rgb        & 0xFF) as u8,
        }
    }

    /// Packed `0xAARRGGBB` with full alpha, the framebuffer format.
    pub fn argb(self) -> u32 {
        0xFF000000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Shape
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of ornament shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    Cube,
    Candy,
    Ring,
    Diamond,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Sphere, Shape::Cube, Shape::Candy, Shape::Ring, Shape::Diamond,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Sphere  => "sphere",
            Shape::Cube    => "cube",
            Shape::Candy   => "candy",
            Shape::Ring    => "ring",
            Shape::Diamond => "diamond",
        }
    }

    /// Rare shapes are always drawn in the accent color.
    pub fn uses_accent(self) -> bool {
        matches!(self, Shape::Ring | Shape::Diamond)
    }

    /// Uniform scale range `[min, max)` for this shape.
    pub fn scale_range(self) -> (f32, f32) {
        match self {
            Shape::Sphere  => (0.18, 0.34),
            Shape::Cube    => (0.16, 0.28),
            Shape::Candy   => (0.20, 0.32),
            Shape::Ring    => (0.20, 0.30),
            Shape::Diamond => (0.22, 0.34),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// WeightedTable
// ════════════════════════════════════════════════════════════════════════════

/// An explicit `{item → weight}` table with a single sampling routine.
///
/// Weights need not sum to one; they are normalised on construction.
#[derive(Clone, Debug)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f32)>,
    total:   f32,
    index:   WeightedIndex<f32>,
}

impl<T> WeightedTable<T> {
    /// Build a table, rejecting empty tables, negative or non-finite weights,
    /// and tables whose weights sum to zero.
    pub fn new(entries: Vec<(T, f32)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(LayoutError::InvalidWeights("table is empty".into()));
        }
        if let Some((i, (_, w))) = entries
            .iter()
            .enumerate()
            .find(|(_, (_, w))| !w.is_finite() || *w < 0.0)
        {
            return Err(LayoutError::InvalidWeights(format!("entry {} has weight {}", i, w)));
        }
        let total: f32 = entries.iter().map(|(_, w)| *w).sum();
        if total <= 0.0 {
            return Err(LayoutError::InvalidWeights("weights sum to zero".into()));
        }
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w))
            .map_err(|e| LayoutError::InvalidWeights(e.to_string()))?;
        Ok(WeightedTable { entries, total, index })
    }

    /// Draw one item.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.entries[self.index.sample(rng)].0
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn entries(&self) -> &[(T, f32)] { &self.entries }
}

impl<T: PartialEq> WeightedTable<T> {
    /// Normalised probability of `item`; 0.0 when absent.
    pub fn probability(&self, item: &T) -> f32 {
        self.entries
            .iter()
            .filter(|(t, _)| t == item)
            .map(|(_, w)| *w)
            .sum::<f32>()
            / self.total
    }
}

// ════════════════════════════════════════════════════════════════════════════
// OrnamentStyle
// ════════════════════════════════════════════════════════════════════════════

/// Shape and color tables used when decorating the tree.
#[derive(Clone, Debug)]
pub struct OrnamentStyle {
    pub shapes: WeightedTable<Shape>,
    pub colors: WeightedTable<Rgb>,
    /// Forced color for shapes where [`Shape::uses_accent`] holds.
    pub accent: Rgb,
}

impl OrnamentStyle {
    /// The default red/gold palette.
    pub fn festive() -> Result<Self> {
        let shapes = WeightedTable::new(vec![
            (Shape::Sphere,  45.0),
            (Shape::Cube,    20.0),
            (Shape::Candy,   15.0),
            (Shape::Ring,    10.0),
            (Shape::Diamond, 10.0),
        ])?;
        let colors = WeightedTable::new(vec![
            (Rgb::RED,     30.0),
            (Rgb::GOLD,    25.0),
            (Rgb::SILVER,  20.0),
            (Rgb::EMERALD, 15.0),
            (Rgb::SNOW,    10.0),
        ])?;
        Ok(OrnamentStyle { shapes, colors, accent: Rgb::GOLD })
    }

    /// Draw a shape, then a color and scale consistent with it.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (Shape, Rgb, f32) {
        let shape = *self.shapes.sample(rng);
        let color = if shape.uses_accent() {
            self.accent
        } else {
            *self.colors.sample(rng)
        };
        let (lo, hi) = shape.scale_range();
        (shape, color, rng.gen_range(lo..hi))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rgb_hex_and_argb() {
        let c = Rgb::hex(0x123456);
        assert_eq!((c.r, c.g, c.b), (0x12, 0x34, 0x56));
        assert_eq!(c.argb(), 0xFF123456);
    }

    #[test]
    fn table_rejects_empty() {
        let t: Result<WeightedTable<u8>> = WeightedTable::new(vec![]);
        assert!(matches!(t, Err(LayoutError::InvalidWeights(_))));
    }

    #[test]
    fn table_rejects_negative_and_nan() {
        assert!(WeightedTable::new(vec![('a', 1.0), ('b', -0.5)]).is_err());
        assert!(WeightedTable::new(vec![('a', f32::NAN)]).is_err());
        assert!(WeightedTable::new(vec![('a', 0.0), ('b', 0.0)]).is_err());
    }

    #[test]
    fn table_probabilities_are_normalised() {
        let t = WeightedTable::new(vec![('a', 3.0), ('b', 1.0)]).unwrap();
        assert_relative_eq!(t.probability(&'a'), 0.75);
        assert_relative_eq!(t.probability(&'b'), 0.25);
        assert_eq!(t.probability(&'z'), 0.0);
    }

    #[test]
    fn zero_weight_entry_never_drawn() {
        let t = WeightedTable::new(vec![('a', 1.0), ('b', 0.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert_eq!(*t.sample(&mut rng), 'a');
        }
    }

    #[test]
    fn sampling_follows_weights() {
        let t = WeightedTable::new(vec![('a', 9.0), ('b', 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 10_000;
        let hits = (0..n).filter(|_| *t.sample(&mut rng) == 'a').count();
        let frac = hits as f32 / n as f32;
        assert!((0.87..0.93).contains(&frac), "observed {}", frac);
    }

    #[test]
    fn accent_shapes_use_accent_color() {
        let style = OrnamentStyle::festive().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..2_000 {
            let (shape, color, scale) = style.draw(&mut rng);
            if shape.uses_accent() {
                assert_eq!(color, style.accent);
            }
            let (lo, hi) = shape.scale_range();
            assert!(scale >= lo && scale < hi);
        }
    }

    #[test]
    fn festive_shape_table_sums_to_one() {
        let style = OrnamentStyle::festive().unwrap();
        let sum: f32 = Shape::ALL.iter().map(|s| style.shapes.probability(s)).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    }
}
