//! Top-level application state machine.
//!
//! `AppState` owns the `Gallery` (photos, layout, display state) and the
//! animated `Scene`.  It processes `GestureEvent`s and drives the
//! visualizer each frame.

use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::{AppConfig, InputConfig};
use crate::gallery::Gallery;
use crate::gesture::{spawn_gesture_source, GestureEvent, LandmarkFeedSource, SimGestureSource, SimKey};
use crate::photo::{load_dir, PhotoImage};
use crate::scene::Scene;
use crate::visualizer::Visualizer;

/// Longest frame step fed to the animation; a stalled frame resumes smoothly
/// instead of jumping.
const MAX_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Detector status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// No detector configured; keyboard only.
    Keyboard,
    /// Landmark frames are (or may be) arriving.
    Live,
    /// The detector went away; keyboard only from here on.
    Lost,
}

impl FeedStatus {
    fn as_str(self) -> &'static str {
        match self {
            FeedStatus::Keyboard => "keyboard",
            FeedStatus::Live     => "detector",
            FeedStatus::Lost     => "keyboard (detector lost)",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    gallery: Gallery,
    scene:   Scene,
    feed:    FeedStatus,
    /// Next index handed to `PhotoImage::placeholder`.
    next_placeholder: usize,
    quit:    bool,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, images: Vec<PhotoImage>, detector: bool) -> Result<Self> {
        let mut gallery = Gallery::new(cfg.layout.clone())?;
        let next_placeholder = images.len();
        for image in images {
            gallery.add(image)?;
        }
        let scene = Scene::new(cfg.animation.clone(), &gallery);
        let mut app = AppState {
            gallery,
            scene,
            feed: if detector { FeedStatus::Live } else { FeedStatus::Keyboard },
            next_placeholder,
            quit: false,
            status: String::new(),
        };
        app.refresh_status();
        Ok(app)
    }

    // ── process one GestureEvent ─────────────────────────────────────────

    pub fn handle_event(&mut self, event: GestureEvent) -> Result<()> {
        match event {
            GestureEvent::Sample(sample) => self.gallery.apply(sample),

            GestureEvent::AddPhoto => {
                let image = PhotoImage::placeholder(self.next_placeholder);
                self.next_placeholder += 1;
                self.gallery.add(image)?;
            }

            GestureEvent::RemoveFocused => {
                if self.gallery.remove_focused()?.is_none() {
                    info!("nothing focused to remove");
                }
            }

            GestureEvent::DetectorLost(reason) => {
                if self.feed == FeedStatus::Live {
                    warn!("hand detector unavailable ({}); continuing with keyboard controls", reason);
                    self.feed = FeedStatus::Lost;
                }
            }

            GestureEvent::Quit => self.quit = true,
        }
        self.refresh_status();
        Ok(())
    }

    /// Advance animation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.scene.update(&self.gallery, dt.clamp(0.0, MAX_DT));
    }

    fn refresh_status(&mut self) {
        self.status = format!(
            "{}   photos: {}   input: {}",
            self.gallery.display().describe(),
            self.gallery.photos().len(),
            self.feed.as_str(),
        );
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn gallery(&self) -> &Gallery { &self.gallery }
    pub fn scene(&self) -> &Scene { &self.scene }
    pub fn feed(&self) -> FeedStatus { self.feed }
    pub fn should_quit(&self) -> bool { self.quit }
}

/// Photos to start with: the configured directory, or placeholder cards
/// when there is none (or it holds nothing decodable).
pub fn startup_photos(input: &InputConfig) -> Result<Vec<PhotoImage>> {
    if let Some(dir) = &input.photos {
        let photos = load_dir(dir)?;
        if !photos.is_empty() {
            return Ok(photos);
        }
        warn!("no usable images in {}; using placeholders", dir.display());
    }
    Ok((0..input.placeholders).map(PhotoImage::placeholder).collect())
}

// ════════════════════════════════════════════════════════════════════════════
// Main run loop
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Gesture channel: keyboard sim always, detector feed if configured ─
    let (tx, gesture_rx) = mpsc::channel::<GestureEvent>();
    let (sim_tx, sim_rx) = mpsc::channel::<SimKey>();
    spawn_gesture_source(SimGestureSource { rx: sim_rx }, tx.clone());

    let feed = match (&cfg.input.detector, &cfg.input.landmarks) {
        (Some(cmd), _)     => Some(LandmarkFeedSource::from_command(cmd)),
        (None, Some(path)) => Some(LandmarkFeedSource::from_arg(path)),
        (None, None)       => None,
    };
    let detector = feed.is_some();
    if let Some(feed) = feed {
        spawn_gesture_source(feed, tx.clone());
    }
    drop(tx);

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(&cfg.window, sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let images = startup_photos(&cfg.input)?;
    let mut app = AppState::new(&cfg, images, detector)?;
    info!("{}", app.status);

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut last = Instant::now();
    while vis.is_open() {
        // 1. Poll window input → translate to SimKey
        if !vis.poll_input() { break; }

        // 2. Drain gesture events
        loop {
            match gesture_rx.try_recv() {
                Ok(evt) => app.handle_event(evt)?,
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if app.should_quit() { break; }

        // 3. Per-frame animation
        let now = Instant::now();
        app.tick(now.duration_since(last).as_secs_f32());
        last = now;

        // 4. Render
        vis.render(app.scene(), app.gallery(), &app.status);
    }

    info!("bye");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
