//! Per-entity binding to the frame animation scheduler.
//!
//! A [`FrameAnimator`] describes what an entity wants to animate: the render
//! target, its clips and how it should be scheduled. While the component is
//! present the entity is registered with
//! [`FrameAnimations`]; see
//! [`sync_frame_animators`](crate::systems::frameanimation::sync_frame_animators).
//!
//! Playback commands (`play`, `pause`, `stop`, `seek`, ...) translate into
//! scheduler setters. They all return `false` instead of failing when the
//! animator is not registered or an index is out of range.

use bevy_ecs::prelude::Component;
use log::debug;

use crate::components::sprite::SpriteRenderer;
use crate::resources::animationtable::{AnimationState, CullingType};
use crate::resources::clipstore::ClipList;
use crate::resources::frameanimations::FrameAnimations;
use crate::resources::instanceindex::InstanceId;

#[derive(Component, Clone, Debug)]
pub struct FrameAnimator {
    pub renderer: SpriteRenderer,
    pub clips: ClipList,
    /// Start the first clip as soon as the animator is registered.
    pub play_automatically: bool,
    pub ignore_scaled_time: bool,
    pub culling_type: CullingType,
    id: Option<InstanceId>,
}

impl FrameAnimator {
    pub fn new(renderer: SpriteRenderer, clips: ClipList) -> Self {
        Self {
            renderer,
            clips,
            play_automatically: true,
            ignore_scaled_time: false,
            culling_type: CullingType::AlwaysAnimate,
            id: None,
        }
    }

    pub fn with_play_automatically(mut self, play: bool) -> Self {
        self.play_automatically = play;
        self
    }

    pub fn with_ignore_scaled_time(mut self, ignore: bool) -> Self {
        self.ignore_scaled_time = ignore;
        self
    }

    pub fn with_culling_type(mut self, culling_type: CullingType) -> Self {
        self.culling_type = culling_type;
        self
    }

    /// Id assigned by the last [`enable`](Self::enable), if any.
    pub fn id(&self) -> Option<InstanceId> {
        self.id
    }

    fn registered(&self, anims: &FrameAnimations) -> Option<InstanceId> {
        self.id.filter(|id| anims.exists(*id))
    }

    /// Register with the scheduler under `id`.
    pub fn enable(&mut self, id: InstanceId, anims: &mut FrameAnimations) -> bool {
        self.id = Some(id);
        anims.register(
            id,
            self.culling_type,
            self.ignore_scaled_time,
            self.renderer.clone(),
            Some(self.clips.clone()),
        )
    }

    pub fn disable(&self, anims: &mut FrameAnimations) -> bool {
        match self.id {
            Some(id) => anims.unregister(id),
            None => false,
        }
    }

    /// Push the component's current settings into the scheduler, after the
    /// component has been edited in place.
    pub fn refresh(&self, anims: &mut FrameAnimations) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        anims
            .set_renderer(id, self.renderer.clone())
            .and_then(|_| anims.set_clips(id, Some(self.clips.clone())))
            .and_then(|_| anims.set_ignore_scaled_time(id, self.ignore_scaled_time))
            .and_then(|_| anims.set_culling_type(id, self.culling_type))
            .is_ok()
    }

    // ==================== PLAYBACK ====================

    /// Resume the current clip from where it is.
    pub fn play(&self, anims: &mut FrameAnimations) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        anims.set_state(id, AnimationState::Playing).is_ok()
    }

    /// Start clip `clip_index` from its first frame.
    ///
    /// Clips without frames cannot be played; refusing leaves the instance
    /// untouched.
    pub fn play_clip(&self, anims: &mut FrameAnimations, clip_index: usize) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        let playable = match anims.clips(id) {
            Ok(Some(clips)) => clips
                .get(clip_index)
                .is_some_and(|clip| clip.frame_count() > 0),
            _ => false,
        };
        if !playable {
            return false;
        }
        let ok = anims
            .set_clip_index(id, clip_index)
            .and_then(|_| anims.rewind(id))
            .and_then(|_| anims.set_state(id, AnimationState::Playing))
            .is_ok();
        if ok {
            debug!("{} playing clip {}", id, clip_index);
        }
        ok
    }

    /// Start the first clip named `name`.
    pub fn play_named(&self, anims: &mut FrameAnimations, name: &str) -> bool {
        match self.clips.iter().position(|clip| clip.name() == name) {
            Some(index) => self.play_clip(anims, index),
            None => false,
        }
    }

    /// Switch clip and stop.
    pub fn set_clip_index(&self, anims: &mut FrameAnimations, clip_index: usize) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        if clip_index >= self.clips.len() || anims.set_clip_index(id, clip_index).is_err() {
            return false;
        }
        self.stop(anims)
    }

    pub fn pause(&self, anims: &mut FrameAnimations) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        anims.set_state(id, AnimationState::Paused).is_ok()
    }

    /// Stop and rewind to the start of the current clip. Does not redraw.
    pub fn stop(&self, anims: &mut FrameAnimations) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        anims
            .rewind(id)
            .and_then(|_| anims.set_state(id, AnimationState::Stopped))
            .is_ok()
    }

    /// Jump to `frame_index` of the current clip and draw it immediately
    /// through the renderer the scheduler holds for this instance.
    ///
    /// Elapsed time moves to the start of that frame, so playback continues
    /// from there.
    pub fn seek(&self, anims: &mut FrameAnimations, frame_index: usize) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        anims.seek(id, frame_index).is_ok()
    }

    pub fn set_ignore_scaled_time(&mut self, anims: &mut FrameAnimations, ignore: bool) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        self.ignore_scaled_time = ignore;
        anims.set_ignore_scaled_time(id, ignore).is_ok()
    }

    pub fn set_culling_type(
        &mut self,
        anims: &mut FrameAnimations,
        culling_type: CullingType,
    ) -> bool {
        let Some(id) = self.registered(anims) else {
            return false;
        };
        self.culling_type = culling_type;
        anims.set_culling_type(id, culling_type).is_ok()
    }

    // ==================== QUERIES ====================

    pub fn state(&self, anims: &FrameAnimations) -> Option<AnimationState> {
        anims.state(self.id?).ok()
    }

    pub fn frame_index(&self, anims: &FrameAnimations) -> Option<usize> {
        anims.frame_index(self.id?).ok()
    }

    pub fn clip_index(&self, anims: &FrameAnimations) -> Option<usize> {
        anims.clip_index(self.id?).ok()
    }

    pub fn culling_type(&self, anims: &FrameAnimations) -> Option<CullingType> {
        anims.culling_type(self.id?).ok()
    }

    pub fn is_ignoring_scaled_time(&self, anims: &FrameAnimations) -> Option<bool> {
        anims.is_ignoring_scaled_time(self.id?).ok()
    }
}
