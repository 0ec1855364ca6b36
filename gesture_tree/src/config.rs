//! Application configuration.
//!
//! Everything has a default; a TOML file may override any subset, and the
//! command line overrides the file.
//!
//! ```toml
//! [layout]
//! ornament_count = 400
//! seed = 7
//!
//! [animation]
//! group_spin = 0.2
//!
//! [input]
//! photos = "~/Pictures/holiday"
//! landmarks = "-"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use tree_layout::{DampRates, LayoutConfig};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout:    LayoutConfig,
    pub animation: AnimationConfig,
    pub window:    WindowConfig,
    pub input:     InputConfig,
}

impl AppConfig {
    /// Read a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(text)?;
        cfg.layout.validate()?;
        Ok(cfg)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AnimationConfig
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame animation tuning.  Times in seconds, angles in radians.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub ornament_damping: DampRates,
    pub photo_damping:    DampRates,
    pub camera_smooth:    f32,
    pub star_smooth:      f32,

    /// Ornament self-rotation while gathered, rad/s.
    pub ornament_spin: f32,
    /// Whole-tree auto rotation while gathered, rad/s.
    pub group_spin:    f32,
    pub star_spin:     f32,

    pub tree_camera:    [f32; 3],
    pub scatter_camera: [f32; 3],
    pub focus_camera:   [f32; 3],

    /// Look-around range in Scatter: pitch and yaw per unit of hand offset.
    pub look_pitch: f32,
    pub look_yaw:   f32,

    /// Where the focused photo rests, and how large it gets.
    pub focus_position: [f32; 3],
    pub focus_scale:    f32,
    /// Non-focused photos retreat to `scatter * push_scale + (0, 0, push_depth)`.
    pub push_scale: f32,
    pub push_depth: f32,

    /// Star height above the tree tip when gathered, and when raised away.
    pub star_rest:  f32,
    pub star_raise: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            ornament_damping: DampRates { position: 0.45, scale: 0.3, rotation: 0.3 },
            photo_damping:    DampRates { position: 0.35, scale: 0.25, rotation: 0.25 },
            camera_smooth:    0.6,
            star_smooth:      0.5,
            ornament_spin:    0.6,
            group_spin:       0.1,
            star_spin:        0.8,
            tree_camera:      [0.0, 2.0, 24.0],
            scatter_camera:   [0.0, 0.0, 26.0],
            focus_camera:     [0.0, 0.0, 20.0],
            look_pitch:       0.25,
            look_yaw:         0.35,
            focus_position:   [0.0, 0.0, 14.0],
            focus_scale:      3.0,
            push_scale:       1.6,
            push_depth:       -12.0,
            star_rest:        0.8,
            star_raise:       8.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// WindowConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:   usize,
    pub height:  usize,
    /// Vertical field of view, degrees.
    pub fov_deg: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 960, height: 720, fov_deg: 50.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InputConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where photos and hand landmarks come from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory of images to place on the tree at startup.
    pub photos: Option<PathBuf>,
    /// Colored placeholder cards added when no photo directory is given.
    pub placeholders: usize,
    /// JSON-lines landmark file, or `-` for stdin.
    pub landmarks: Option<String>,
    /// Detector command whose stdout is the landmark feed.
    pub detector: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig { photos: None, placeholders: 6, landmarks: None, detector: None }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = AppConfig::from_toml(
            "[layout]\nornament_count = 12\nseed = 3\n\n[animation.photo_damping]\nposition = 1.5\n",
        ).unwrap();
        assert_eq!(cfg.layout.ornament_count, 12);
        assert_eq!(cfg.layout.seed, 3);
        assert_eq!(cfg.layout.tree_height, LayoutConfig::default().tree_height);
        assert_eq!(cfg.animation.photo_damping.position, 1.5);
        assert_eq!(cfg.animation.photo_damping.scale, AnimationConfig::default().photo_damping.scale);
        assert_eq!(cfg.window, WindowConfig::default());
    }

    #[test]
    fn invalid_layout_is_rejected() {
        assert!(AppConfig::from_toml("[layout]\nornament_count = 0\n").is_err());
    }

    #[test]
    fn input_paths_parse() {
        let cfg = AppConfig::from_toml("[input]\nphotos = \"pics\"\nlandmarks = \"-\"\n").unwrap();
        assert_eq!(cfg.input.photos, Some(PathBuf::from("pics")));
        assert_eq!(cfg.input.landmarks.as_deref(), Some("-"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/definitely/not/here.toml"));
    }
}
