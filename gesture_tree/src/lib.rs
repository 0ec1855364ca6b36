//! # gesture_tree
//!
//! Hand-gesture controller for a procedural ornament tree hung with photos,
//! with a software-rendered 3D view.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Fist | Gather everything into the tree (star rests on top, tree turns slowly) |
//! | Open hand | Scatter ornaments and photos; hand position steers the camera |
//! | Pinch (while scattered or focused) | Bring the next photo forward and enlarge it |
//! | No hand | Nothing changes |
//!
//! ## Visualization
//!
//! Ornaments and photo cards glide between two precomputed layouts (tree and
//! scatter) with exponential damping.  A focused photo moves in front of the
//! camera inside an amber border; the others are pushed back.
//!
//! ## Input
//!
//! * (default) — **Simulation mode**: keyboard shortcuts drive all gestures.
//! * `--landmarks <file|->` or `--detector <cmd>` — JSON-lines hand landmarks
//!   from an external detector.  If the feed is missing or ends, the app
//!   keeps running on the keyboard.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Gesture |
//! |---|---|
//! | `F` | Fist |
//! | `O` | Open hand |
//! | `P` | Pinch |
//! | arrows / hold | Move the simulated hand |
//! | `N` | Add a placeholder photo |
//! | `Delete` | Remove the focused photo |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod config;
pub mod gallery;
pub mod gesture;
pub mod photo;
pub mod scene;
pub mod visualizer;
