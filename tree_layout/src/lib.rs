//! # tree_layout
//!
//! Procedural layouts for the ornament / photo tree.
//!
//! Every entity carries two precomputed positions:
//!
//! | Layout | Ornaments | Photos |
//! |---|---|---|
//! | **Tree** | golden-angle spiral inside a tapered cone, 75% near the surface | 8-turn spiral, radius shrinking with height |
//! | **Scatter** | uniform inside a sphere (cube-root radius, `acos` polar angle) | uniform inside a box |
//!
//! Positions never change once generated; only the *target* chosen each
//! frame changes.  [`damping`] moves live transforms toward that target with
//! frame-rate independent exponential decay.
//!
//! ## Quick start
//!
//! ```rust
//! use tree_layout::{Layout, LayoutConfig};
//!
//! let cfg = LayoutConfig::default();
//! let layout = Layout::generate(&cfg, 3).unwrap();
//! assert_eq!(layout.ornaments.len(), cfg.ornament_count);
//! assert_eq!(layout.photo_slots.len(), 3);
//! ```

pub mod damping;
pub mod error;
pub mod layout;
pub mod palette;

pub use damping::{damp, damp_angle, damp_vec3, wrap_angle, DampRates, Transform};
pub use error::{LayoutError, Result};
pub use layout::{Layout, LayoutConfig, OrnamentEntity, PhotoSlot};
pub use palette::{OrnamentStyle, Rgb, Shape, WeightedTable};
