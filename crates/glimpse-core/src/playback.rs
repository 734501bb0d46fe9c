//! Single-active-clip playback coordination for the result grid.
//!
//! Each rendered result registers a media handle together with the clip
//! window declared by its search result. The coordinator owns the one rule
//! the grid must never break: at most one handle is playing at any instant,
//! and the previous handle is always paused before the next one starts.

use std::collections::HashMap;

use crate::error::{GlimpseError, Result};
use crate::model::SearchResult;

/// The playable span of a result within its underlying media.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub start: f64,
    pub end: Option<f64>,
}

impl ClipWindow {
    /// Derive the window from a result. `startTime` defaults to 0; an
    /// `endTime` without a `startTime`, or an inverted span, is rejected.
    pub fn from_result(result: &SearchResult) -> Result<Self> {
        match (result.start_time, result.end_time) {
            (None, Some(_)) => Err(GlimpseError::Validation(format!(
                "result '{}' declares an end time without a start time",
                result.id
            ))),
            (Some(start), Some(end)) if start > end => Err(GlimpseError::Validation(format!(
                "result '{}' has an inverted clip window ({start} > {end})",
                result.id
            ))),
            (start, end) => Ok(Self {
                start: start.unwrap_or(0.0),
                end,
            }),
        }
    }
}

/// Abstraction over a playable media element. Implemented by the UI layer;
/// mocked in tests.
pub trait MediaHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Current playback position in seconds.
    fn position(&self) -> f64;
    fn seek(&mut self, seconds: f64);
}

struct Slot<H> {
    handle: H,
    window: ClipWindow,
}

/// Registry of result id → media handle, plus the single currently-active id.
pub struct PlaybackCoordinator<H: MediaHandle> {
    slots: HashMap<String, Slot<H>>,
    active: Option<String>,
}

impl<H: MediaHandle> Default for PlaybackCoordinator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MediaHandle> PlaybackCoordinator<H> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            active: None,
        }
    }

    /// Id of the clip currently in the playing state, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Register a handle for a rendered result. Fails when the result's
    /// clip window violates the start/end invariant.
    pub fn register(&mut self, result: &SearchResult, handle: H) -> Result<()> {
        let window = ClipWindow::from_result(result)?;
        self.slots.insert(result.id.clone(), Slot { handle, window });
        Ok(())
    }

    /// Remove a slot when its result leaves the rendered set. A playing
    /// slot is paused before removal; nothing may keep playing unmanaged.
    pub fn deregister(&mut self, id: &str) {
        if let Some(mut slot) = self.slots.remove(id) {
            if !slot.handle.is_paused() {
                slot.handle.pause();
            }
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
    }

    /// User activation of a result. For the active clip this toggles
    /// play/pause in place. For any other clip the currently playing handle
    /// is paused first, then the new handle is seeked to its window start
    /// and played. Returns `false` for unknown ids.
    pub fn activate(&mut self, id: &str) -> bool {
        if !self.slots.contains_key(id) {
            return false;
        }

        if self.active.as_deref() == Some(id) {
            if let Some(slot) = self.slots.get_mut(id) {
                if slot.handle.is_paused() {
                    slot.handle.play();
                } else {
                    slot.handle.pause();
                }
            }
            return true;
        }

        // Pause before play, never the other way around.
        if let Some(previous) = self.active.take() {
            if let Some(slot) = self.slots.get_mut(&previous) {
                if !slot.handle.is_paused() {
                    slot.handle.pause();
                }
            }
        }

        if let Some(slot) = self.slots.get_mut(id) {
            slot.handle.seek(slot.window.start);
            slot.handle.play();
            self.active = Some(id.to_string());
        }
        true
    }

    /// Position update for one clip. Passing the window's end pauses the
    /// handle and rewinds it to the window start: the clip is over even
    /// though the underlying media is not.
    pub fn tick(&mut self, id: &str) {
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };
        let Some(end) = slot.window.end else {
            return;
        };
        if slot.handle.position() > end {
            slot.handle.pause();
            slot.handle.seek(slot.window.start);
            if self.active.as_deref() == Some(id) {
                self.active = None;
            }
        }
    }

    /// Teardown: pause everything still playing and drop all slots.
    pub fn shutdown(&mut self) {
        for slot in self.slots.values_mut() {
            if !slot.handle.is_paused() {
                slot.handle.pause();
            }
        }
        self.slots.clear();
        self.active = None;
    }

    /// Number of handles currently in the playing state. The coordinator's
    /// invariant keeps this at 0 or 1.
    pub fn playing_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| !slot.handle.is_paused())
            .count()
    }
}
