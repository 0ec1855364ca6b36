//! Landmark → gesture classification.
//!
//! Stateless: every frame is classified on its own, with no smoothing or
//! debouncing.  A frame without a hand is reported as
//! [`GestureSample::no_hand`].

use glam::Vec2;

use crate::landmark::{index, HandLandmarks};

/// Thumb-tip to index-tip distance (normalised units) below which the hand
/// is pinching.
pub const PINCH_THRESHOLD: f32 = 0.05;

// ── Gesture types ──────────────────────────────────────────

/// Recognized gesture labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    /// No hand, or a hand pose with no meaning.
    #[default]
    None,
    /// All four fingers curled.
    Fist,
    /// Three adjacent fingers extended.
    Open,
    /// Thumb and index fingertips touching.
    Pinch,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None  => "none",
            Self::Fist  => "fist",
            Self::Open  => "open",
            Self::Pinch => "pinch",
        }
    }
}

/// One classified detection frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    pub gesture: Gesture,
    /// Mirrored palm position, x in `[-2, 2]`, y in `[-1, 1]`.
    pub hand: Vec2,
}

impl GestureSample {
    pub fn new(gesture: Gesture, hand: Vec2) -> Self {
        GestureSample { gesture, hand }
    }

    /// Reported when the detector sees no hand.
    pub fn no_hand() -> Self {
        GestureSample { gesture: Gesture::None, hand: Vec2::ZERO }
    }
}

// ── Classification ─────────────────────────────────────────

/// Which of index / middle / ring / pinky are extended.
fn open_fingers(hand: &HandLandmarks) -> [bool; 4] {
    let open = |tip: usize, pip: usize| hand.get(tip).y < hand.get(pip).y;
    [
        open(index::INDEX_TIP,  index::INDEX_PIP),
        open(index::MIDDLE_TIP, index::MIDDLE_PIP),
        open(index::RING_TIP,   index::RING_PIP),
        open(index::PINKY_TIP,  index::PINKY_PIP),
    ]
}

/// Distance between thumb tip and index tip.
pub fn pinch_distance(hand: &HandLandmarks) -> f32 {
    hand.get(index::THUMB_TIP).xy().distance(hand.get(index::INDEX_TIP).xy())
}

/// Palm center (midpoint of wrist and middle MCP), mirrored for a
/// camera-facing user and rescaled to the interaction range.
pub fn hand_position(hand: &HandLandmarks) -> Vec2 {
    let palm = (hand.get(index::WRIST).xy() + hand.get(index::MIDDLE_MCP).xy()) * 0.5;
    Vec2::new((0.5 - palm.x) * 4.0, (0.5 - palm.y) * 2.0)
}

/// Label a hand.  First match wins: fist, pinch, open, none.
pub fn classify_gesture(hand: &HandLandmarks) -> Gesture {
    let [index, middle, ring, pinky] = open_fingers(hand);

    if !(index || middle || ring || pinky) {
        Gesture::Fist
    } else if pinch_distance(hand) < PINCH_THRESHOLD {
        Gesture::Pinch
    } else if (index && middle && ring) || (middle && ring && pinky) {
        Gesture::Open
    } else {
        Gesture::None
    }
}

/// Full classification of one detection frame.
pub fn classify(hand: &HandLandmarks) -> GestureSample {
    GestureSample::new(classify_gesture(hand), hand_position(hand))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
