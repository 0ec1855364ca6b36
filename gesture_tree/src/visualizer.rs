//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          ✶                               │
//! │                   ·  ○  ◆  ■  ·                          │
//! │                ·  ▢  ○  ·  ▢  ○  ·     (depth-sorted     │
//! │             ○  ·  ■  ◆  ·  ○  ▢  ·      ornaments and    │
//! │          ·  ▢  ○  ·  ■  ·  ◆  ○  ·  ·   photo cards)     │
//! │                                                          │
//! │  status bar                                              │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is projected through the scene's camera rig and painted far
//! to near; there is no depth buffer.

use std::cmp::Ordering;
use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use glam::{Mat4, Quat, Vec3};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use tree_layout::{Rgb, Shape};

use crate::config::WindowConfig;
use crate::gallery::Gallery;
use crate::gesture::SimKey;
use crate::photo::PhotoImage;
use crate::scene::{card_normal, Scene};

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:     u32 = 0xFF0B1020;
const TEXT_BG:      u32 = 0xFF0F3460;
const FOCUS_BORDER: u32 = 0xFFFFB020;  // amber
const CARD_FRAME:   u32 = 0xFFF4F7FF;
const CARD_BACK:    u32 = 0xFF2A2F45;
const STAR_COLOR:   u32 = 0xFFFFE680;
const STATUS_H:     usize = 40;

/// World-space height of a photo card at scale 1.
const CARD_HEIGHT: f32 = 1.0;
/// World-space radius of an ornament at scale 1.
const ORNAMENT_RADIUS: f32 = 0.18;
/// World-space outer radius of the star.
const STAR_RADIUS: f32 = 0.7;

const NEAR: f32 = 0.1;
const FAR:  f32 = 200.0;

// ════════════════════════════════════════════════════════════════════════════
// Projector
// ════════════════════════════════════════════════════════════════════════════

/// A world point mapped to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x:     f32,
    pub y:     f32,
    /// Distance in front of the camera.
    pub depth: f32,
    /// Screen pixels per world unit at this depth.
    pub ppu:   f32,
}

/// Perspective projection for one frame.
pub struct Projector {
    view_proj: Mat4,
    width:     f32,
    height:    f32,
    focal:     f32,
}

impl Projector {
    pub fn new(view: Mat4, fov_deg: f32, width: usize, height: usize) -> Self {
        let fov = fov_deg.clamp(10.0, 150.0).to_radians();
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let proj = Mat4::perspective_rh(fov, w / h, NEAR, FAR);
        Projector {
            view_proj: proj * view,
            width: w,
            height: h,
            focal: (h * 0.5) / (fov * 0.5).tan(),
        }
    }

    /// `None` when the point is behind the camera or beyond the far plane.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= NEAR || clip.w >= FAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Projected {
            x:     (ndc.x + 1.0) * 0.5 * self.width,
            y:     (1.0 - ndc.y) * 0.5 * self.height,
            depth: clip.w,
            ppu:   self.focal / clip.w,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — framebuffer plus drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BG_COLOR; width * height] }
    }

    pub fn clear(&mut self) {
        self.buf.fill(BG_COLOR);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let (x0, y0) = (x.max(0), y.max(0));
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            for col in x0..x1 {
                self.buf[row as usize * self.width + col as usize] = color;
            }
        }
    }

    fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        if w <= 0 || h <= 0 { return; }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            let half = (((r * r - dy * dy) as f32).sqrt()) as i32;
            for dx in -half..=half {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    fn draw_ring(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        let inner = (r - (r / 3).max(1)) * (r - (r / 3).max(1));
        for dy in -r..=r {
            for dx in -r..=r {
                let d = dx * dx + dy * dy;
                if d <= r * r && d >= inner {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn fill_diamond(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            let dx = r - dy.abs();
            for x in -dx..=dx {
                self.set_pixel(cx + x, cy + dy, color);
            }
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font — 3×5 characters, each pixel drawn `px`×`px`.
    fn draw_label(&mut self, text: &str, x: i32, y: i32, px: i32, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * px, y + row as i32 * px, px, px, color);
                    }
                }
            }
            cx += 4 * px; // 3 wide + 1 gap
            if cx + 4 * px > self.width as i32 { break; }
        }
    }

    /// Photo thumbnail stretched over a rect.
    fn draw_image(&mut self, img: &PhotoImage, x: i32, y: i32, w: i32, h: i32, fade: f32) {
        if w <= 0 || h <= 0 { return; }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            let v = (row - y) as f32 / h as f32;
            for col in x0..x1 {
                let u = (col - x) as f32 / w as f32;
                let c = blend(img.sample(u, v), BG_COLOR, fade);
                self.buf[row as usize * self.width + col as usize] = c;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene drawing
// ════════════════════════════════════════════════════════════════════════════

enum DrawItem<'a> {
    Ornament { at: Projected, shape: Shape, color: Rgb, scale: f32 },
    Photo    { at: Projected, image: &'a PhotoImage, scale: f32, front: bool, focused: bool },
    Star     { at: Projected, spin: f32 },
}

impl DrawItem<'_> {
    fn depth(&self) -> f32 {
        match self {
            DrawItem::Ornament { at, .. } | DrawItem::Photo { at, .. } | DrawItem::Star { at, .. } => at.depth,
        }
    }
}

/// Fraction of the way a colour fades into the background at `depth`.
fn fog(depth: f32) -> f32 {
    ((depth - 12.0) / 50.0).clamp(0.0, 0.6)
}

/// Paint one frame of the scene plus the status bar and key legend.
pub fn draw_scene(canvas: &mut Canvas, fov_deg: f32, scene: &Scene, gallery: &Gallery, status: &str) {
    canvas.clear();
    let camera = scene.camera();
    let projector = Projector::new(camera.view(), fov_deg, canvas.width, canvas.height);
    let group = Quat::from_rotation_y(scene.group_rotation());

    let mut items: Vec<DrawItem> = Vec::with_capacity(scene.ornaments().len() + scene.photos().len() + 1);

    for (live, o) in scene.ornaments().iter().zip(gallery.ornaments()) {
        if let Some(at) = projector.project(scene.to_world(live.position)) {
            items.push(DrawItem::Ornament { at, shape: o.shape, color: o.color, scale: live.scale });
        }
    }

    let focus = gallery.display().focus();
    for (i, ((_, live), p)) in scene.photos().iter().zip(gallery.photos()).enumerate() {
        let world = scene.to_world(live.position);
        if let Some(at) = projector.project(world) {
            let normal = group * card_normal(live.rotation);
            let front = normal.dot(camera.position - world) >= 0.0;
            items.push(DrawItem::Photo { at, image: &p.image, scale: live.scale, front, focused: focus == Some(i) });
        }
    }

    let star = scene.star();
    if let Some(at) = projector.project(Vec3::new(0.0, star.height, 0.0)) {
        items.push(DrawItem::Star { at, spin: star.spin });
    }

    // Painter's algorithm: far first.
    items.sort_by(|a, b| b.depth().partial_cmp(&a.depth()).unwrap_or(Ordering::Equal));

    for item in &items {
        match *item {
            DrawItem::Ornament { at, shape, color, scale } => draw_ornament(canvas, at, shape, color, scale),
            DrawItem::Photo { at, image, scale, front, focused } => draw_card(canvas, at, image, scale, front, focused),
            DrawItem::Star { at, spin } => draw_star(canvas, at, spin),
        }
    }

    // ── status bar ────────────────────────────────────────────────────────
    let (w, h) = (canvas.width as i32, canvas.height as i32);
    let bar_y = h - STATUS_H as i32;
    canvas.fill_rect(0, bar_y, w, STATUS_H as i32, TEXT_BG);
    canvas.draw_label(status, 10, bar_y + 6, 2, 0xFFEEEEEE);
    canvas.draw_label(
        "F=fist  O=open  P=pinch  arrows=hand  N=new photo  Del=remove  Q=quit",
        10, h - 10, 1, 0xFF888888,
    );
}

fn draw_ornament(canvas: &mut Canvas, at: Projected, shape: Shape, color: Rgb, scale: f32) {
    let r = (ORNAMENT_RADIUS * scale * at.ppu).round().max(1.0) as i32;
    let c = blend(color.argb(), BG_COLOR, fog(at.depth));
    let (x, y) = (at.x as i32, at.y as i32);
    match shape {
        Shape::Sphere  => canvas.fill_circle(x, y, r, c),
        Shape::Cube    => canvas.fill_rect(x - r, y - r, 2 * r, 2 * r, c),
        Shape::Candy   => {
            // Red/white stripes.
            let white = blend(Rgb::SNOW.argb(), BG_COLOR, fog(at.depth));
            let stripe = (r / 2).max(1);
            for i in 0..(2 * r / stripe).max(1) {
                let col = if i % 2 == 0 { c } else { white };
                canvas.fill_rect(x - r / 2, y - r + i * stripe, r.max(1), stripe, col);
            }
        }
        Shape::Ring    => canvas.draw_ring(x, y, r, c),
        Shape::Diamond => canvas.fill_diamond(x, y, r, c),
    }
}

fn draw_card(canvas: &mut Canvas, at: Projected, image: &PhotoImage, scale: f32, front: bool, focused: bool) {
    let h = (CARD_HEIGHT * scale * at.ppu).round() as i32;
    let w = (h as f32 * image.aspect_ratio).round() as i32;
    if h < 2 || w < 2 { return; }
    let (x, y) = (at.x as i32 - w / 2, at.y as i32 - h / 2);
    let fade = if focused { 0.0 } else { fog(at.depth) };

    // White frame, picture inset.
    let frame = (h / 14).max(1);
    canvas.fill_rect(x, y, w, h, blend(CARD_FRAME, BG_COLOR, fade));
    if front {
        canvas.draw_image(image, x + frame, y + frame, w - 2 * frame, h - 2 * frame, fade);
    } else {
        canvas.fill_rect(x + frame, y + frame, w - 2 * frame, h - 2 * frame, blend(CARD_BACK, BG_COLOR, fade));
    }
    if focused {
        for i in 1..=3 {
            canvas.draw_border(x - i, y - i, w + 2 * i, h + 2 * i, FOCUS_BORDER);
        }
    }
}

fn draw_star(canvas: &mut Canvas, at: Projected, spin: f32) {
    let r = (STAR_RADIUS * at.ppu).max(3.0);
    let (cx, cy) = (at.x as i32, at.y as i32);
    for k in 0..5 {
        let a = spin + k as f32 * std::f32::consts::TAU / 5.0;
        let (tx, ty) = (cx + (a.sin() * r) as i32, cy - (a.cos() * r) as i32);
        canvas.draw_line(cx, cy, tx, ty, STAR_COLOR);
        canvas.draw_line(cx + 1, cy, tx + 1, ty, STAR_COLOR);
    }
    canvas.fill_diamond(cx, cy, (r * 0.3) as i32, 0xFFFFFFFF);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    fov_deg: f32,
    sim_tx:  Sender<SimKey>,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig, sim_tx: Sender<SimKey>) -> Result<Self> {
        let mut window = Window::new(
            "Gesture Tree",
            cfg.width, cfg.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("opening window: {}", e))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(cfg.width, cfg.height),
            fov_deg: cfg.fov_deg,
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard inputs and translate to SimKey events.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Keys that repeat while held
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimKey::Quit);
            return false;
        }

        let mut keys = Vec::new();
        if one_shot(Key::F) { keys.push(SimKey::Fist); }
        if one_shot(Key::O) { keys.push(SimKey::Open); }
        if one_shot(Key::P) { keys.push(SimKey::Pinch); }
        if one_shot(Key::N) { keys.push(SimKey::AddPhoto); }
        if one_shot(Key::Delete) || one_shot(Key::Backspace) { keys.push(SimKey::RemoveFocused); }
        if held(Key::Left)  { keys.push(SimKey::HandLeft); }
        if held(Key::Right) { keys.push(SimKey::HandRight); }
        if held(Key::Up)    { keys.push(SimKey::HandUp); }
        if held(Key::Down)  { keys.push(SimKey::HandDown); }

        for key in keys {
            let _ = self.sim_tx.send(key);
        }
        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene, gallery: &Gallery, status: &str) {
        draw_scene(&mut self.canvas, self.fov_deg, scene, gallery, status);
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)
            .ok();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
