//! Per-frame animation of the scene.
//!
//! `Scene` holds the live transform of every ornament and photo, the star,
//! the tree's auto-rotation, and the camera rig.  Each [`Scene::update`]
//! picks targets from the gallery's display state and damps toward them;
//! the precomputed layout positions themselves never move.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

use tree_gesture::DisplayState;
use tree_layout::{damp, damp_angle, damp_vec3, wrap_angle, Transform};

use crate::config::AnimationConfig;
use crate::gallery::{Gallery, PhotoId};

// ════════════════════════════════════════════════════════════════════════════
// CameraRig
// ════════════════════════════════════════════════════════════════════════════

/// Camera orbiting the origin, plus a look-around offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    /// Look-around offset from the origin-facing direction, radians.
    pub pitch:    f32,
    pub yaw:      f32,
}

impl CameraRig {
    pub fn at(position: Vec3) -> Self {
        CameraRig { position, pitch: 0.0, yaw: 0.0 }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let base = (-self.position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = base.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        Quat::from_rotation_y(self.yaw) * Quat::from_axis_angle(right, self.pitch) * base
    }

    /// World → view transform (right-handed, looking down −Z).
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Star
// ════════════════════════════════════════════════════════════════════════════

/// The spinning star above the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub height: f32,
    pub spin:   f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene {
    cfg:       AnimationConfig,
    tree_top:  f32,
    revision:  Option<u64>,

    ornaments: Vec<Transform>,
    photos:    Vec<(PhotoId, Transform)>,

    /// Yaw of the whole ornament/photo group.
    group_rotation: f32,
    star:      Star,
    camera:    CameraRig,
}

impl Scene {
    pub fn new(cfg: AnimationConfig, gallery: &Gallery) -> Self {
        let tree_top = gallery.config().tree_top();
        let mut scene = Scene {
            star: Star { height: tree_top + cfg.star_rest, spin: 0.0 },
            camera: CameraRig::at(Vec3::from(cfg.tree_camera)),
            cfg,
            tree_top,
            revision: None,
            ornaments: Vec::new(),
            photos: Vec::new(),
            group_rotation: 0.0,
        };
        scene.sync(gallery);
        scene
    }

    /// Match the entity lists to the gallery after photos come or go.
    /// Surviving photos keep their live transform; new ones grow in from
    /// their scatter position.
    fn sync(&mut self, gallery: &Gallery) {
        if self.revision == Some(gallery.revision()) {
            return;
        }
        self.revision = Some(gallery.revision());

        if self.ornaments.len() != gallery.ornaments().len() {
            self.ornaments = gallery
                .ornaments()
                .iter()
                .map(|o| Transform::at(o.tree_position).with_scale(o.scale))
                .collect();
        }

        let mut live: HashMap<PhotoId, Transform> = self.photos.drain(..).collect();
        self.photos = gallery
            .photos()
            .iter()
            .map(|p| {
                let t = live
                    .remove(&p.id)
                    .unwrap_or_else(|| Transform::at(p.slot.scatter_position).with_scale(0.0));
                (p.id, t)
            })
            .collect();
    }

    /// Advance one frame of `dt` seconds.
    pub fn update(&mut self, gallery: &Gallery, dt: f32) {
        self.sync(gallery);
        let dt = dt.max(0.0);
        let display = gallery.display();
        let state = display.state();
        let cfg = &self.cfg;

        // ── group auto-rotation ───────────────────────────────────────────
        self.group_rotation = match state {
            DisplayState::Tree => wrap_angle(self.group_rotation + cfg.group_spin * dt),
            _ => damp_angle(self.group_rotation, 0.0, cfg.camera_smooth, dt),
        };

        // ── camera ────────────────────────────────────────────────────────
        let (cam_target, look) = match state {
            DisplayState::Tree    => (cfg.tree_camera, (0.0, 0.0)),
            DisplayState::Scatter => {
                let hand = gallery.hand();
                (cfg.scatter_camera, (hand.y * cfg.look_pitch, hand.x * cfg.look_yaw))
            }
            DisplayState::Focus   => (cfg.focus_camera, (0.0, 0.0)),
        };
        self.camera.position = damp_vec3(self.camera.position, Vec3::from(cam_target), cfg.camera_smooth, dt);
        self.camera.pitch = damp(self.camera.pitch, look.0, cfg.camera_smooth, dt);
        self.camera.yaw   = damp(self.camera.yaw,   look.1, cfg.camera_smooth, dt);

        // ── ornaments ─────────────────────────────────────────────────────
        for (live, o) in self.ornaments.iter_mut().zip(gallery.ornaments()) {
            let position = match state {
                DisplayState::Tree => o.tree_position,
                _                  => o.scatter_position,
            };
            let target = Transform { position, scale: o.scale, rotation: live.rotation };
            live.damp_toward(&target, &cfg.ornament_damping, dt);
            if state == DisplayState::Tree {
                let spin = cfg.ornament_spin * dt;
                live.rotation.x = wrap_angle(live.rotation.x + spin * 0.5);
                live.rotation.y = wrap_angle(live.rotation.y + spin);
            }
        }

        // ── photos ────────────────────────────────────────────────────────
        let eye = self.camera.position;
        for (i, ((_, live), p)) in self.photos.iter_mut().zip(gallery.photos()).enumerate() {
            let target = match state {
                DisplayState::Tree => Transform {
                    position: p.slot.tree_position,
                    scale:    1.0,
                    rotation: p.slot.rotation,
                },
                DisplayState::Scatter => Transform {
                    position: p.slot.scatter_position,
                    scale:    1.0,
                    rotation: facing(p.slot.scatter_position, eye),
                },
                DisplayState::Focus if display.focus() == Some(i) => Transform {
                    position: Vec3::from(cfg.focus_position),
                    scale:    cfg.focus_scale,
                    rotation: Vec3::ZERO,
                },
                DisplayState::Focus => {
                    let position = p.slot.scatter_position * cfg.push_scale
                        + Vec3::new(0.0, 0.0, cfg.push_depth);
                    Transform { position, scale: 1.0, rotation: facing(position, eye) }
                }
            };
            live.damp_toward(&target, &cfg.photo_damping, dt);
        }

        // ── star ──────────────────────────────────────────────────────────
        let star_target = match state {
            DisplayState::Tree => self.tree_top + cfg.star_rest,
            _                  => self.tree_top + cfg.star_raise,
        };
        self.star.height = damp(self.star.height, star_target, cfg.star_smooth, dt);
        self.star.spin = wrap_angle(self.star.spin + cfg.star_spin * dt);
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn ornaments(&self) -> &[Transform] { &self.ornaments }
    pub fn photos(&self) -> &[(PhotoId, Transform)] { &self.photos }
    pub fn star(&self) -> &Star { &self.star }
    pub fn camera(&self) -> &CameraRig { &self.camera }
    pub fn group_rotation(&self) -> f32 { self.group_rotation }

    /// Entity-local position → world position (applies the group rotation).
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.group_rotation) * local
    }
}

/// Euler rotation (Y then X) turning a card's +Z normal at `from` toward `eye`.
pub fn facing(from: Vec3, eye: Vec3) -> Vec3 {
    let d = eye - from;
    let horizontal = (d.x * d.x + d.z * d.z).sqrt();
    Vec3::new(-d.y.atan2(horizontal), d.x.atan2(d.z), 0.0)
}

/// Unit normal of a card with Euler rotation `r` (Y, then X, then Z).
pub fn card_normal(r: Vec3) -> Vec3 {
    Quat::from_euler(glam::EulerRot::YXZ, r.y, r.x, r.z) * Vec3::Z
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::PhotoImage;
    use approx::assert_relative_eq;
    use glam::Vec2;
    use tree_gesture::{Gesture, GestureSample};
    use tree_layout::LayoutConfig;

    const DT: f32 = 1.0 / 60.0;

    fn setup(photos: usize) -> (Gallery, Scene) {
        let mut g = Gallery::new(LayoutConfig { ornament_count: 30, ..LayoutConfig::default() }).unwrap();
        for i in 0..photos {
            g.add(PhotoImage::placeholder(i)).unwrap();
        }
        let s = Scene::new(AnimationConfig::default(), &g);
        (g, s)
    }

    fn run(scene: &mut Scene, g: &Gallery, seconds: f32) {
        for _ in 0..(seconds / DT) as usize {
            scene.update(g, DT);
        }
    }

    fn gesture(g: &mut Gallery, gesture: Gesture) {
        g.apply(GestureSample::new(gesture, Vec2::ZERO));
    }

    #[test]
    fn tree_state_gathers_ornaments() {
        let (g, mut s) = setup(0);
        run(&mut s, &g, 10.0);
        for (live, o) in s.ornaments().iter().zip(g.ornaments()) {
            assert!(live.position.distance(o.tree_position) < 1e-3);
            assert_relative_eq!(live.scale, o.scale, epsilon = 1e-4);
        }
    }

    #[test]
    fn scatter_state_disperses_everything() {
        let (mut g, mut s) = setup(3);
        gesture(&mut g, Gesture::Open);
        run(&mut s, &g, 10.0);
        for (live, o) in s.ornaments().iter().zip(g.ornaments()) {
            assert!(live.position.distance(o.scatter_position) < 1e-3);
        }
        for ((_, live), p) in s.photos().iter().zip(g.photos()) {
            assert!(live.position.distance(p.slot.scatter_position) < 1e-3);
            // Photos turn toward the camera.
            let to_eye = (s.camera().position - live.position).normalize();
            assert!(card_normal(live.rotation).dot(to_eye) > 0.99);
        }
    }

    #[test]
    fn focus_enlarges_one_photo_and_pushes_others_back() {
        let (mut g, mut s) = setup(3);
        gesture(&mut g, Gesture::Open);
        gesture(&mut g, Gesture::Pinch);
        run(&mut s, &g, 10.0);
        let cfg = AnimationConfig::default();

        let (_, focused) = s.photos()[0];
        assert!(focused.position.distance(Vec3::from(cfg.focus_position)) < 1e-3);
        assert_relative_eq!(focused.scale, cfg.focus_scale, epsilon = 1e-3);

        for ((_, live), p) in s.photos().iter().zip(g.photos()).skip(1) {
            let pushed = p.slot.scatter_position * cfg.push_scale + Vec3::new(0.0, 0.0, cfg.push_depth);
            assert!(live.position.distance(pushed) < 1e-3);
        }
        assert!(s.camera().position.distance(Vec3::from(cfg.focus_camera)) < 1e-3);
    }

    #[test]
    fn damping_is_idempotent_at_target() {
        let (mut g, mut s) = setup(2);
        gesture(&mut g, Gesture::Open);
        let targets: Vec<Vec3> = g.ornaments().iter().map(|o| o.scatter_position).collect();
        for (live, t) in s.ornaments.iter_mut().zip(&targets) {
            live.position = *t;
        }
        for _ in 0..10 {
            s.update(&g, DT);
        }
        for (live, t) in s.ornaments().iter().zip(&targets) {
            assert_eq!(live.position, *t);
        }
    }

    #[test]
    fn state_change_mid_flight_is_continuous() {
        let (mut g, mut s) = setup(1);
        gesture(&mut g, Gesture::Open);
        run(&mut s, &g, 0.2);
        let before = s.ornaments()[5].position;
        gesture(&mut g, Gesture::Fist);
        s.update(&g, 0.0);
        assert_eq!(s.ornaments()[5].position, before);
    }

    #[test]
    fn star_rests_on_tree_and_lifts_away() {
        let (mut g, mut s) = setup(0);
        let cfg = AnimationConfig::default();
        let top = g.config().tree_top();
        run(&mut s, &g, 5.0);
        assert_relative_eq!(s.star().height, top + cfg.star_rest, epsilon = 1e-3);
        gesture(&mut g, Gesture::Open);
        run(&mut s, &g, 10.0);
        assert_relative_eq!(s.star().height, top + cfg.star_raise, epsilon = 1e-3);
    }

    #[test]
    fn tree_auto_rotates_only_when_gathered() {
        let (mut g, mut s) = setup(0);
        run(&mut s, &g, 1.0);
        assert!(s.group_rotation() > 0.05);
        gesture(&mut g, Gesture::Open);
        run(&mut s, &g, 15.0);
        assert!(s.group_rotation().abs() < 1e-3);
    }

    #[test]
    fn hand_steers_camera_in_scatter() {
        let (mut g, mut s) = setup(0);
        g.apply(GestureSample::new(Gesture::Open, Vec2::new(2.0, -1.0)));
        run(&mut s, &g, 10.0);
        let cfg = AnimationConfig::default();
        assert_relative_eq!(s.camera().yaw, 2.0 * cfg.look_yaw, epsilon = 1e-3);
        assert_relative_eq!(s.camera().pitch, -cfg.look_pitch, epsilon = 1e-3);

        gesture(&mut g, Gesture::Fist);
        run(&mut s, &g, 10.0);
        assert!(s.camera().yaw.abs() < 1e-3);
    }

    #[test]
    fn new_photos_grow_in_and_survivors_keep_transform() {
        let (mut g, mut s) = setup(2);
        run(&mut s, &g, 1.0);
        let kept_id = g.photos()[1].id;
        let kept = s.photos()[1].1;

        let first = g.photos()[0].id;
        g.remove(first).unwrap();
        let added = g.add(PhotoImage::placeholder(7)).unwrap();
        s.update(&g, 0.0);

        assert_eq!(s.photos().len(), 2);
        assert_eq!(s.photos()[0], (kept_id, kept));
        let (id, fresh) = s.photos()[1];
        assert_eq!(id, added);
        assert_eq!(fresh.scale, 0.0);
        assert_eq!(fresh.position, g.photos()[1].slot.scatter_position);
    }

    #[test]
    fn camera_forward_points_at_origin_without_offset() {
        let cam = CameraRig::at(Vec3::new(0.0, 2.0, 24.0));
        let expected = (-cam.position).normalize();
        assert!(cam.forward().dot(expected) > 0.9999);
        let origin_in_view = cam.view().transform_point3(Vec3::ZERO);
        assert!(origin_in_view.x.abs() < 1e-4 && origin_in_view.y.abs() < 1e-4);
        assert!(origin_in_view.z < 0.0);
    }

    #[test]
    fn facing_points_normal_at_eye() {
        let from = Vec3::new(3.0, -2.0, 1.0);
        let eye = Vec3::new(-1.0, 4.0, 20.0);
        let n = card_normal(facing(from, eye));
        assert!(n.dot((eye - from).normalize()) > 0.9999);
    }
}
