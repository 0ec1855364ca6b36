//! The photo collection, its layout, and the display state that refers to it.
//!
//! `Gallery` is the single owner of everything a focus index can point at.
//! Removing a photo and fixing up the focus happen in the same call, so the
//! index never dangles.

use anyhow::Result;
use glam::{Vec2, Vec3};
use tracing::{debug, info};

use tree_gesture::{Display, GestureSample};
use tree_layout::{Layout, LayoutConfig, OrnamentEntity, PhotoSlot};

use crate::photo::PhotoImage;

/// Stable identity of a photo for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub u64);

/// A photo placed in the layout.
#[derive(Clone, Debug)]
pub struct PhotoEntity {
    pub id:    PhotoId,
    pub image: PhotoImage,
    pub slot:  PhotoSlot,
}

pub struct Gallery {
    cfg:      LayoutConfig,
    layout:   Layout,
    photos:   Vec<PhotoEntity>,
    display:  Display,
    hand:     Vec2,
    next_id:  u64,
    /// Bumped whenever the layout is regenerated.
    revision: u64,
}

impl Gallery {
    pub fn new(cfg: LayoutConfig) -> Result<Self> {
        let layout = Layout::generate(&cfg, 0)?;
        Ok(Gallery {
            cfg,
            layout,
            photos:   Vec::new(),
            display:  Display::new(),
            hand:     Vec2::ZERO,
            next_id:  0,
            revision: 0,
        })
    }

    // ── photo collection ──────────────────────────────────────────────────

    pub fn add(&mut self, image: PhotoImage) -> Result<PhotoId> {
        let id = PhotoId(self.next_id);
        self.next_id += 1;
        info!("added photo {:?} \"{}\"", id, image.label);
        self.photos.push(PhotoEntity { id, image, slot: placeholder_slot() });
        self.relayout()?;
        Ok(id)
    }

    /// Remove a photo.  Unknown or already-removed ids are a no-op and
    /// return `Ok(false)`.
    pub fn remove(&mut self, id: PhotoId) -> Result<bool> {
        let Some(index) = self.photos.iter().position(|p| p.id == id) else {
            debug!("remove {:?}: no such photo", id);
            return Ok(false);
        };
        let removed = self.photos.remove(index);
        self.display = self.display.photo_removed(index, self.photos.len());
        info!("removed photo {:?} \"{}\"", id, removed.image.label);
        self.relayout()?;
        Ok(true)
    }

    /// Remove whichever photo is focused, if any.
    pub fn remove_focused(&mut self) -> Result<Option<PhotoId>> {
        let Some(id) = self.focused().map(|p| p.id) else {
            return Ok(None);
        };
        self.remove(id)?;
        Ok(Some(id))
    }

    /// Regenerate positions for the current photo count.  Ornaments come
    /// out identical; photo slots are re-spaced.
    fn relayout(&mut self) -> Result<()> {
        self.layout = Layout::generate(&self.cfg, self.photos.len())?;
        for (photo, slot) in self.photos.iter_mut().zip(&self.layout.photo_slots) {
            photo.slot = *slot;
        }
        self.revision += 1;
        Ok(())
    }

    // ── gestures ──────────────────────────────────────────────────────────

    /// Feed one classified detection frame through the state machine.
    pub fn apply(&mut self, sample: GestureSample) {
        self.display = self.display.next(sample.gesture, self.photos.len());
        self.hand = sample.hand;
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn display(&self)   -> Display               { self.display }
    pub fn hand(&self)      -> Vec2                  { self.hand }
    pub fn photos(&self)    -> &[PhotoEntity]        { &self.photos }
    pub fn ornaments(&self) -> &[OrnamentEntity]     { &self.layout.ornaments }
    pub fn config(&self)    -> &LayoutConfig         { &self.cfg }
    pub fn revision(&self)  -> u64                   { self.revision }

    pub fn focused(&self) -> Option<&PhotoEntity> {
        self.display.focus().and_then(|i| self.photos.get(i))
    }
}

fn placeholder_slot() -> PhotoSlot {
    PhotoSlot {
        tree_position:    Vec3::ZERO,
        scatter_position: Vec3::ZERO,
        rotation:         Vec3::ZERO,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
