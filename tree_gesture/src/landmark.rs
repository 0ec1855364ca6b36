//! Hand landmarks in normalised image coordinates.
//!
//! Indices follow the 21-point hand model: 0 is the wrist, then four points
//! per digit from base to tip.  `y` grows downward.

use glam::Vec2;
use serde::Deserialize;

use crate::error::{GestureError, Result};

pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices used by the classifier.
pub mod index {
    pub const WRIST:      usize = 0;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP:   usize = 14;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_TIP:  usize = 20;
}

/// One landmark.  `z` is carried through but not used for classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A complete set of 21 landmarks for one hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        HandLandmarks { points }
    }

    /// Take the first 21 points of a detector frame.  Extra points are ignored.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        if points.len() < LANDMARK_COUNT {
            return Err(GestureError::TooFewLandmarks {
                got:  points.len(),
                need: LANDMARK_COUNT,
            });
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        out.copy_from_slice(&points[..LANDMARK_COUNT]);
        if let Some(index) = out.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(GestureError::NonFinite { index });
        }
        Ok(HandLandmarks { points: out })
    }

    pub fn get(&self, i: usize) -> &Landmark {
        &self.points[i]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Landmark; LANDMARK_COUNT] {
        &mut self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_short_frames() {
        let pts = vec![Landmark::new(0.5, 0.5); 20];
        assert_eq!(
            HandLandmarks::from_slice(&pts),
            Err(GestureError::TooFewLandmarks { got: 20, need: 21 })
        );
    }

    #[test]
    fn from_slice_ignores_extra_points() {
        let mut pts = vec![Landmark::new(0.1, 0.2); 23];
        pts[22] = Landmark::new(9.0, 9.0);
        let hand = HandLandmarks::from_slice(&pts).unwrap();
        assert_eq!(hand.points().len(), LANDMARK_COUNT);
        assert_eq!(*hand.get(20), Landmark::new(0.1, 0.2));
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut pts = vec![Landmark::new(0.5, 0.5); 21];
        pts[7].y = f32::NAN;
        assert_eq!(HandLandmarks::from_slice(&pts), Err(GestureError::NonFinite { index: 7 }));
    }

    #[test]
    fn landmark_z_defaults_when_missing() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(lm, Landmark::new(0.25, 0.75));
    }
}
