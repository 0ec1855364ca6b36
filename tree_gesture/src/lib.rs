//! # tree_gesture
//!
//! Turns hand landmarks into display-state changes.
//!
//! Both stages are pure functions, testable without a camera or renderer:
//!
//! 1. [`classify`] — 21 landmarks → [`GestureSample`] (label + hand position).
//! 2. [`Display::next`] — (display, gesture, photo count) → display.
//!
//! ## Gesture → Display mapping
//!
//! | Gesture | From | To | Focus index |
//! |---|---|---|---|
//! | Fist  | any          | Tree    | cleared |
//! | Open  | Tree / Focus | Scatter | cleared |
//! | Pinch | Scatter      | Focus   | `None → 0`, `i → (i + 1) mod n` |
//! | other | any          | unchanged | unchanged |

pub mod classifier;
pub mod display;
pub mod error;
pub mod landmark;

pub use classifier::{classify, Gesture, GestureSample, PINCH_THRESHOLD};
pub use display::{Display, DisplayState};
pub use error::{GestureError, Result};
pub use landmark::{HandLandmarks, Landmark, LANDMARK_COUNT};
