//! Frame animation scheduler.
//!
//! [`FrameAnimations`] owns the dense [`AnimationTable`] of active instances and
//! the [`InstanceIndex`] that addresses it. Bindings register and unregister
//! instances by [`InstanceId`]; the host calls [`FrameAnimations::tick`] once
//! per frame to advance every playing instance and redraw the ones whose frame
//! changed.
//!
//! # Frame ordering
//!
//! Hosts must call `tick` exactly once per frame, after every
//! register/unregister/state change for that frame has been applied, and
//! before the render targets are read for presentation. In the ECS this is
//! [`frame_animation_system`](crate::systems::frameanimation::frame_animation_system)
//! running after
//! [`sync_frame_animators`](crate::systems::frameanimation::sync_frame_animators).
//!
//! # Other threads
//!
//! The scheduler is not shared across threads while ticking. Code running on
//! other threads sends [`FrameAnimationCommand`]s through
//! [`FrameAnimations::command_sender`]; they are applied at the start of the
//! next tick.

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, trace, warn};

use crate::components::sprite::{RenderTarget, SpriteRenderer};
use crate::error::{AnimationError, Result};
use crate::resources::animationtable::{
    AnimationRow, AnimationState, AnimationTable, CullingType, DEFAULT_CHUNK_SIZE,
};
use crate::resources::clipstore::{ClipList, FrameClip};
use crate::resources::instanceindex::{InstanceId, InstanceIndex};
use crate::systems::wrapmode::{self, Playhead};

/// Structural change queued from outside the tick loop.
#[derive(Debug, Clone)]
pub enum FrameAnimationCommand<R> {
    Register {
        id: InstanceId,
        culling_type: CullingType,
        ignore_scaled_time: bool,
        renderer: R,
        clips: Option<ClipList>,
    },
    Unregister {
        id: InstanceId,
    },
}

/// Counters for one call to [`FrameAnimations::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Rows that ran their wrap-mode step.
    pub advanced: usize,
    /// Rows that were stopped or paused.
    pub skipped_inactive: usize,
    /// Playing rows skipped because their render target was not visible.
    pub skipped_culled: usize,
    /// Playing rows without a usable clip.
    pub malformed: usize,
    /// Sprite writes issued to render targets.
    pub redraws: usize,
}

#[derive(Resource)]
pub struct FrameAnimations<R = SpriteRenderer> {
    table: AnimationTable<R>,
    index: InstanceIndex,
    tx_cmd: Sender<FrameAnimationCommand<R>>,
    rx_cmd: Receiver<FrameAnimationCommand<R>>,
}

impl<R: RenderTarget> Default for FrameAnimations<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RenderTarget> FrameAnimations<R> {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        let (tx_cmd, rx_cmd) = unbounded();
        let table = AnimationTable::with_chunk_size(chunk_size);
        let index = InstanceIndex::with_capacity(table.chunk_size());
        Self {
            table,
            index,
            tx_cmd,
            rx_cmd,
        }
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Reserved rows in the instance table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn chunk_size(&self) -> usize {
        self.table.chunk_size()
    }

    /// Registered ids, in no particular order.
    pub fn ids(&self) -> &[InstanceId] {
        self.table.ids()
    }

    pub fn exists(&self, id: InstanceId) -> bool {
        self.index.contains(id)
    }

    /// Add a stopped instance at frame 0 of its first clip.
    ///
    /// Returns false, changing nothing, if `id` is already registered.
    pub fn register(
        &mut self,
        id: InstanceId,
        culling_type: CullingType,
        ignore_scaled_time: bool,
        renderer: R,
        clips: Option<ClipList>,
    ) -> bool {
        let row = AnimationRow::new(id, culling_type, ignore_scaled_time, renderer, clips);
        match self.insert_row(row) {
            Ok(row) => {
                debug!("Registered frame animation {} at row {}", id, row);
                true
            }
            Err(e) => {
                warn!("Frame animation register rejected: {}", e);
                false
            }
        }
    }

    fn insert_row(&mut self, row: AnimationRow<R>) -> Result<usize> {
        let id = row.id;
        if self.index.contains(id) {
            return Err(AnimationError::AlreadyRegistered(id));
        }
        let row = self.table.push(row);
        self.index.insert(id, row);
        Ok(row)
    }

    /// Remove an instance. Returns false, changing nothing, if `id` is not
    /// registered.
    pub fn unregister(&mut self, id: InstanceId) -> bool {
        match self.remove_row(id) {
            Ok(()) => {
                debug!(
                    "Unregistered frame animation {} ({} left, capacity {})",
                    id,
                    self.table.len(),
                    self.table.capacity()
                );
                true
            }
            Err(e) => {
                warn!("Frame animation unregister rejected: {}", e);
                false
            }
        }
    }

    fn remove_row(&mut self, id: InstanceId) -> Result<()> {
        let row = self
            .index
            .remove(id)
            .ok_or(AnimationError::NotRegistered(id))?;
        if let Some(moved) = self.table.swap_remove(row) {
            self.index.relocate(moved, row);
        }
        Ok(())
    }

    /// Drop every instance and release all but one chunk of storage.
    pub fn clear(&mut self) {
        let chunk_size = self.table.chunk_size();
        self.table = AnimationTable::with_chunk_size(chunk_size);
        self.index = InstanceIndex::with_capacity(chunk_size);
    }

    fn row(&self, id: InstanceId) -> Result<usize> {
        self.index.get(id).ok_or(AnimationError::NotRegistered(id))
    }

    /// Active clip of `row`, if the clip list exists and the index is in range.
    fn active_clip(&self, row: usize) -> Option<&FrameClip> {
        self.table.clips[row]
            .as_ref()
            .and_then(|clips| clips.get(self.table.clip_indices[row]))
            .map(|clip| &**clip)
    }

    // ==================== GETTERS ====================

    pub fn state(&self, id: InstanceId) -> Result<AnimationState> {
        Ok(self.table.states[self.row(id)?])
    }

    pub fn culling_type(&self, id: InstanceId) -> Result<CullingType> {
        Ok(self.table.culling_types[self.row(id)?])
    }

    pub fn is_ignoring_scaled_time(&self, id: InstanceId) -> Result<bool> {
        Ok(self.table.ignore_scaled_times[self.row(id)?])
    }

    /// Ping-pong direction flag.
    pub fn is_backward(&self, id: InstanceId) -> Result<bool> {
        Ok(self.table.backwards[self.row(id)?])
    }

    pub fn frame_index(&self, id: InstanceId) -> Result<usize> {
        Ok(self.table.frame_indices[self.row(id)?])
    }

    pub fn clip_index(&self, id: InstanceId) -> Result<usize> {
        Ok(self.table.clip_indices[self.row(id)?])
    }

    pub fn elapsed_time(&self, id: InstanceId) -> Result<f32> {
        Ok(self.table.elapsed_times[self.row(id)?])
    }

    pub fn renderer(&self, id: InstanceId) -> Result<&R> {
        Ok(&self.table.renderers[self.row(id)?])
    }

    pub fn clips(&self, id: InstanceId) -> Result<Option<&ClipList>> {
        Ok(self.table.clips[self.row(id)?].as_ref())
    }

    // ==================== SETTERS ====================
    // Setters never redraw the render target.

    pub fn set_state(&mut self, id: InstanceId, state: AnimationState) -> Result<()> {
        let row = self.row(id)?;
        self.table.states[row] = state;
        Ok(())
    }

    pub fn set_culling_type(&mut self, id: InstanceId, culling_type: CullingType) -> Result<()> {
        let row = self.row(id)?;
        self.table.culling_types[row] = culling_type;
        Ok(())
    }

    pub fn set_ignore_scaled_time(&mut self, id: InstanceId, ignore: bool) -> Result<()> {
        let row = self.row(id)?;
        self.table.ignore_scaled_times[row] = ignore;
        Ok(())
    }

    /// Set the shown frame. It must exist in the active clip.
    pub fn set_frame_index(&mut self, id: InstanceId, frame_index: usize) -> Result<()> {
        let row = self.row(id)?;
        let clip = self
            .active_clip(row)
            .ok_or(AnimationError::MalformedInstance(id))?;
        if frame_index >= clip.frame_count() {
            return Err(AnimationError::InvalidArgument(format!(
                "frame index {} out of range for clip '{}' with {} frames",
                frame_index,
                clip.name(),
                clip.frame_count()
            )));
        }
        self.table.frame_indices[row] = frame_index;
        Ok(())
    }

    /// Select the active clip. It must exist in the clip list.
    pub fn set_clip_index(&mut self, id: InstanceId, clip_index: usize) -> Result<()> {
        let row = self.row(id)?;
        let clips = self.table.clips[row]
            .as_ref()
            .ok_or(AnimationError::MalformedInstance(id))?;
        if clip_index >= clips.len() {
            return Err(AnimationError::InvalidArgument(format!(
                "clip index {} out of range for {} clips",
                clip_index,
                clips.len()
            )));
        }
        self.table.clip_indices[row] = clip_index;
        Ok(())
    }

    pub fn set_elapsed_time(&mut self, id: InstanceId, elapsed_time: f32) -> Result<()> {
        let row = self.row(id)?;
        if !(elapsed_time.is_finite() && elapsed_time >= 0.0) {
            return Err(AnimationError::InvalidArgument(format!(
                "elapsed time must be a non-negative number, got {elapsed_time}"
            )));
        }
        self.table.elapsed_times[row] = elapsed_time;
        Ok(())
    }

    pub fn set_renderer(&mut self, id: InstanceId, renderer: R) -> Result<()> {
        let row = self.row(id)?;
        self.table.renderers[row] = renderer;
        Ok(())
    }

    /// Replace the clip list. The clip index is left as is; if it no longer
    /// fits, ticks skip the instance until it is fixed.
    pub fn set_clips(&mut self, id: InstanceId, clips: Option<ClipList>) -> Result<()> {
        let row = self.row(id)?;
        self.table.clips[row] = clips;
        Ok(())
    }

    // ==================== PLAYHEAD ====================

    /// Move the playhead back to the start: frame 0, no elapsed time, moving
    /// forward. Works even when the active clip is empty or missing.
    pub fn rewind(&mut self, id: InstanceId) -> Result<()> {
        let row = self.row(id)?;
        self.table.frame_indices[row] = 0;
        self.table.elapsed_times[row] = 0.0;
        self.table.backwards[row] = false;
        Ok(())
    }

    /// Jump to the start of `frame_index` in the active clip and draw it
    /// through the instance's render target.
    pub fn seek(&mut self, id: InstanceId, frame_index: usize) -> Result<()> {
        let row = self.row(id)?;
        let clip = self
            .active_clip(row)
            .ok_or(AnimationError::MalformedInstance(id))?;
        if frame_index >= clip.frame_count() {
            return Err(AnimationError::InvalidArgument(format!(
                "frame index {} out of range for clip '{}' with {} frames",
                frame_index,
                clip.name(),
                clip.frame_count()
            )));
        }
        let elapsed_time = frame_index as f32 * clip.frame_duration();
        let sprite = clip.sprite(frame_index).cloned();
        self.table.frame_indices[row] = frame_index;
        self.table.elapsed_times[row] = elapsed_time;
        self.table.renderers[row].set_sprite(sprite.as_ref());
        Ok(())
    }

    // ==================== DEFERRED COMMANDS ====================

    /// Sender for structural changes made outside the tick loop.
    pub fn command_sender(&self) -> Sender<FrameAnimationCommand<R>> {
        self.tx_cmd.clone()
    }

    /// Apply every queued command. Returns how many were accepted.
    pub fn apply_pending_commands(&mut self) -> usize {
        let pending: Vec<FrameAnimationCommand<R>> = self.rx_cmd.try_iter().collect();
        let mut accepted = 0;
        for cmd in pending {
            let ok = match cmd {
                FrameAnimationCommand::Register {
                    id,
                    culling_type,
                    ignore_scaled_time,
                    renderer,
                    clips,
                } => self.register(id, culling_type, ignore_scaled_time, renderer, clips),
                FrameAnimationCommand::Unregister { id } => self.unregister(id),
            };
            if ok {
                accepted += 1;
            }
        }
        accepted
    }

    // ==================== TICK ====================

    /// Advance every playing instance by one host frame.
    ///
    /// Each instance uses `dt_unscaled` if it ignores time scale, otherwise
    /// `dt_scaled`. Rows that are not playing, are culled, or have no usable
    /// clip are left untouched; a bad row never stops the others.
    pub fn tick(&mut self, dt_unscaled: f32, dt_scaled: f32) -> TickStats {
        self.apply_pending_commands();

        let mut stats = TickStats::default();
        let table = &mut self.table;
        for row in 0..table.len() {
            if table.states[row] != AnimationState::Playing {
                stats.skipped_inactive += 1;
                continue;
            }
            let Some(clip) = table.clips[row]
                .as_ref()
                .and_then(|clips| clips.get(table.clip_indices[row]))
            else {
                trace!("Skipping {}: no clip at index {}", table.ids[row], table.clip_indices[row]);
                stats.malformed += 1;
                continue;
            };
            if clip.frame_count() == 0 {
                trace!("Skipping {}: clip '{}' has no frames", table.ids[row], clip.name());
                stats.malformed += 1;
                continue;
            }
            if table.culling_types[row] == CullingType::BasedOnRenderers
                && !table.renderers[row].is_visible()
            {
                stats.skipped_culled += 1;
                continue;
            }

            let dt = if table.ignore_scaled_times[row] {
                dt_unscaled
            } else {
                dt_scaled
            };
            let mut head = Playhead {
                state: table.states[row],
                frame_index: table.frame_indices[row],
                elapsed_time: table.elapsed_times[row],
                backward: table.backwards[row],
            };
            let redraw = wrapmode::advance(&mut head, clip, dt);
            table.states[row] = head.state;
            table.frame_indices[row] = head.frame_index;
            table.elapsed_times[row] = head.elapsed_time;
            table.backwards[row] = head.backward;

            if let Some(frame) = redraw {
                table.renderers[row].set_sprite(clip.sprite(frame));
                stats.redraws += 1;
            }
            stats.advanced += 1;
        }
        stats
    }
}
