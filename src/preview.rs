//! Single-clip looping player for editing tools.
//!
//! Tools that preview a clip outside the game loop feed [`LoopClipPlayer`]
//! their own frame deltas. Playback always loops, using the same time wrap as
//! the scheduler's [`WrapMode::Loop`](crate::resources::clipstore::WrapMode)
//! step, whatever the clip's own wrap mode is.

use std::sync::Arc;

use crate::resources::clipstore::{FrameClip, SpriteKey};
use crate::systems::wrapmode::{loop_elapsed, loop_frame};

#[derive(Debug, Clone)]
pub struct LoopClipPlayer {
    clip: Arc<FrameClip>,
    elapsed_time: f32,
    current_frame_index: usize,
    playing: bool,
}

impl LoopClipPlayer {
    pub fn new(clip: Arc<FrameClip>) -> Self {
        Self {
            clip,
            elapsed_time: 0.0,
            current_frame_index: 0,
            playing: false,
        }
    }

    pub fn clip(&self) -> &FrameClip {
        &self.clip
    }

    /// Swap the previewed clip and stop.
    pub fn set_clip(&mut self, clip: Arc<FrameClip>) {
        self.clip = clip;
        self.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    pub fn current_sprite(&self) -> Option<&SpriteKey> {
        self.clip.sprite(self.current_frame_index)
    }

    /// Rewind to `frame_index` (wrapped into the clip) and start playing.
    pub fn play(&mut self, frame_index: usize) {
        self.rewind(frame_index);
        self.playing = true;
    }

    /// Jump to the start of `frame_index`, wrapped into the clip.
    pub fn rewind(&mut self, frame_index: usize) {
        let count = self.clip.frame_count();
        self.current_frame_index = if count == 0 { 0 } else { frame_index % count };
        self.elapsed_time = self.current_frame_index as f32 * self.clip.frame_duration();
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.current_frame_index = 0;
        self.elapsed_time = 0.0;
    }

    /// Advance by `dt` seconds of editor time.
    pub fn update_frame(&mut self, dt: f32) {
        if !self.playing || self.clip.frame_count() == 0 {
            return;
        }
        self.elapsed_time = loop_elapsed(self.elapsed_time, dt, &self.clip);
        self.current_frame_index = loop_frame(self.elapsed_time, &self.clip);
    }
}
