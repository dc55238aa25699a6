//! Frame clip assets and their registry.
//!
//! A [`FrameClip`] is an authored, immutable description of a flipbook
//! animation: an ordered list of sprite keys played at a fixed frame rate
//! under one [`WrapMode`]. Clips are shared between instances through
//! [`ClipList`]s and are never mutated by the scheduler during a tick.
//!
//! The [`ClipStore`] resource keeps clips by name so hosts can load them once
//! (usually from JSON) and hand the same `Arc` to many animators.
//!
//! # JSON format
//!
//! ```json
//! [
//!   { "name": "walk", "frame_rate": 12.0, "wrap_mode": "Loop",
//!     "frames": ["walk_0", "walk_1", null, "walk_3"] }
//! ]
//! ```

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};

/// Key of a sprite image, as understood by the render target.
pub type SpriteKey = Arc<str>;

/// Ordered clips bound to one animation instance.
pub type ClipList = Arc<[Arc<FrameClip>]>;

/// Playback policy applied when a clip reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Same as [`WrapMode::Once`].
    #[default]
    Default,
    /// Play to the end, then stop and rewind to the first frame.
    Once,
    /// Play to the end, then pause on the last drawn frame.
    ClampForever,
    /// Restart from the first frame after the last one.
    Loop,
    /// Bounce back and forth between the first and last frames.
    PingPong,
}

/// Immutable flipbook clip: frame rate, wrap mode and frame sprites.
///
/// `frame_rate` is always finite and strictly positive; every constructor
/// and setter checks it so the scheduler never has to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameClipDef")]
pub struct FrameClip {
    name: String,
    frame_rate: f32,
    wrap_mode: WrapMode,
    frames: Vec<Option<SpriteKey>>,
}

#[derive(Deserialize)]
struct FrameClipDef {
    #[serde(default)]
    name: String,
    frame_rate: f32,
    #[serde(default)]
    wrap_mode: WrapMode,
    #[serde(default)]
    frames: Vec<Option<SpriteKey>>,
}

impl TryFrom<FrameClipDef> for FrameClip {
    type Error = AnimationError;

    fn try_from(def: FrameClipDef) -> Result<Self> {
        FrameClip::new(def.name, def.frame_rate, def.wrap_mode, def.frames)
    }
}

fn check_frame_rate(frame_rate: f32) -> Result<()> {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        Ok(())
    } else {
        Err(AnimationError::InvalidArgument(format!(
            "frame rate must be positive, got {frame_rate}"
        )))
    }
}

impl FrameClip {
    pub fn new(
        name: impl Into<String>,
        frame_rate: f32,
        wrap_mode: WrapMode,
        frames: Vec<Option<SpriteKey>>,
    ) -> Result<Self> {
        check_frame_rate(frame_rate)?;
        Ok(Self {
            name: name.into(),
            frame_rate,
            wrap_mode,
            frames,
        })
    }

    /// Convenience constructor where every frame has a sprite.
    pub fn from_keys<I, S>(
        name: impl Into<String>,
        frame_rate: f32,
        wrap_mode: WrapMode,
        keys: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SpriteKey>,
    {
        let frames = keys.into_iter().map(|k| Some(k.into())).collect();
        Self::new(name, frame_rate, wrap_mode, frames)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn frames(&self) -> &[Option<SpriteKey>] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Seconds each frame stays on screen.
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Seconds for one full pass over every frame.
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_duration()
    }

    /// Sprite at `index`, or `None` for an empty slot or out of range index.
    pub fn sprite(&self, index: usize) -> Option<&SpriteKey> {
        self.frames.get(index).and_then(Option::as_ref)
    }

    pub fn set_frame_rate(&mut self, frame_rate: f32) -> Result<()> {
        check_frame_rate(frame_rate)?;
        self.frame_rate = frame_rate;
        Ok(())
    }

    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.wrap_mode = wrap_mode;
    }

    pub fn set_frames(&mut self, frames: Vec<Option<SpriteKey>>) {
        self.frames = frames;
    }
}

/// Build a [`ClipList`] from owned clips.
pub fn clip_list(clips: impl IntoIterator<Item = FrameClip>) -> ClipList {
    clips.into_iter().map(Arc::new).collect()
}

/// Central registry of reusable clips keyed by name.
#[derive(Resource, Default, Debug)]
pub struct ClipStore {
    clips: FxHashMap<String, Arc<FrameClip>>,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a clip under its own name, returning the clip it replaced.
    pub fn insert(&mut self, clip: FrameClip) -> Option<Arc<FrameClip>> {
        self.clips.insert(clip.name.clone(), Arc::new(clip))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FrameClip>> {
        self.clips.get(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Names of all stored clips, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a list of clip names into a [`ClipList`], in the given order.
    pub fn clip_list(&self, names: &[&str]) -> Result<ClipList> {
        names
            .iter()
            .map(|name| {
                self.clips.get(*name).cloned().ok_or_else(|| {
                    AnimationError::InvalidArgument(format!("unknown clip '{name}'"))
                })
            })
            .collect()
    }

    /// Parse a JSON array of clips and add them to the store.
    ///
    /// Returns the number of clips loaded. Nothing is inserted if any clip is
    /// invalid.
    pub fn load_from_json_str(&mut self, json: &str) -> Result<usize> {
        let clips: Vec<FrameClip> = serde_json::from_str(json)?;
        let count = clips.len();
        for clip in clips {
            self.insert(clip);
        }
        Ok(count)
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let count = self.load_from_json_str(&json)?;
        info!("Loaded {} clips from {}", count, path.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive_frame_rate() {
        for rate in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = FrameClip::new("bad", rate, WrapMode::Loop, vec![]);
            assert!(
                matches!(result, Err(AnimationError::InvalidArgument(_))),
                "rate {rate} should be rejected"
            );
        }
    }

    #[test]
    fn test_set_frame_rate_keeps_old_value_on_error() {
        let mut clip = FrameClip::from_keys("c", 10.0, WrapMode::Once, ["a"]).unwrap();
        assert!(clip.set_frame_rate(0.0).is_err());
        assert_eq!(clip.frame_rate(), 10.0);
        clip.set_frame_rate(4.0).unwrap();
        assert_eq!(clip.frame_rate(), 4.0);
    }

    #[test]
    fn test_duration_and_frame_duration() {
        let clip = FrameClip::from_keys("c", 4.0, WrapMode::Loop, ["a", "b", "c"]).unwrap();
        assert_eq!(clip.frame_duration(), 0.25);
        assert_eq!(clip.duration(), 0.75);
        assert_eq!(clip.frame_count(), 3);
    }

    #[test]
    fn test_sprite_handles_empty_slots() {
        let clip = FrameClip::new(
            "c",
            1.0,
            WrapMode::Loop,
            vec![Some("a".into()), None],
        )
        .unwrap();
        assert_eq!(clip.sprite(0).map(|s| &**s), Some("a"));
        assert!(clip.sprite(1).is_none());
        assert!(clip.sprite(2).is_none());
    }

    #[test]
    fn test_json_load_with_null_frames_and_default_wrap() {
        let mut store = ClipStore::new();
        let json = r#"[
            {"name": "walk", "frame_rate": 12.0, "wrap_mode": "Loop", "frames": ["w0", null, "w2"]},
            {"name": "idle", "frame_rate": 2.0, "frames": ["i0"]}
        ]"#;
        assert_eq!(store.load_from_json_str(json).unwrap(), 2);
        let walk = store.get("walk").unwrap();
        assert_eq!(walk.wrap_mode(), WrapMode::Loop);
        assert_eq!(walk.frame_count(), 3);
        assert!(walk.sprite(1).is_none());
        assert_eq!(store.get("idle").unwrap().wrap_mode(), WrapMode::Default);
        assert_eq!(store.names(), vec!["idle", "walk"]);
    }

    #[test]
    fn test_json_rejects_zero_frame_rate() {
        let mut store = ClipStore::new();
        let json = r#"[{"name": "bad", "frame_rate": 0.0, "frames": []}]"#;
        assert!(store.load_from_json_str(json).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clip_list_preserves_order_and_rejects_unknown() {
        let mut store = ClipStore::new();
        store.insert(FrameClip::from_keys("a", 1.0, WrapMode::Once, ["x"]).unwrap());
        store.insert(FrameClip::from_keys("b", 1.0, WrapMode::Once, ["y"]).unwrap());
        let list = store.clip_list(&["b", "a"]).unwrap();
        assert_eq!(list[0].name(), "b");
        assert_eq!(list[1].name(), "a");
        assert!(Arc::ptr_eq(&list[1], store.get("a").unwrap()));
        assert!(matches!(
            store.clip_list(&["a", "missing"]),
            Err(AnimationError::InvalidArgument(_))
        ));
    }
}
