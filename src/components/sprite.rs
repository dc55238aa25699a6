//! Render targets written by the frame animation scheduler.
//!
//! The scheduler only needs two things from whatever draws an instance: is it
//! visible this frame, and which sprite should it show. [`RenderTarget`]
//! captures that. [`SpriteRenderer`] is the engine's own implementation, a
//! cloneable handle to a host-owned [`SpriteSurface`]; the scheduler keeps one
//! clone per instance and the presentation side reads the same surface.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bevy_ecs::prelude::Component;

use crate::resources::clipstore::SpriteKey;

/// Something the scheduler can draw frames into.
pub trait RenderTarget {
    /// Whether the target will be presented this frame. Instances culled
    /// with [`CullingType::BasedOnRenderers`](crate::resources::animationtable::CullingType)
    /// do not advance while this is false.
    fn is_visible(&self) -> bool;

    /// Show `sprite`. `None` is an empty frame slot in the clip.
    fn set_sprite(&mut self, sprite: Option<&SpriteKey>);
}

/// Host-side state of one drawable sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSurface {
    pub sprite: Option<SpriteKey>,
    pub visible: bool,
    /// Number of times a sprite has been written.
    pub writes: u64,
}

impl Default for SpriteSurface {
    fn default() -> Self {
        Self {
            sprite: None,
            visible: true,
            writes: 0,
        }
    }
}

/// Shared handle to a [`SpriteSurface`].
///
/// Clones point at the same surface.
#[derive(Component, Debug, Clone, Default)]
pub struct SpriteRenderer {
    surface: Arc<RwLock<SpriteSurface>>,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visible(visible: bool) -> Self {
        let renderer = Self::new();
        renderer.set_visible(visible);
        renderer
    }

    fn read(&self) -> RwLockReadGuard<'_, SpriteSurface> {
        self.surface.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SpriteSurface> {
        self.surface.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_visible(&self, visible: bool) {
        self.write().visible = visible;
    }

    /// Currently shown sprite key.
    pub fn sprite(&self) -> Option<SpriteKey> {
        self.read().sprite.clone()
    }

    pub fn writes(&self) -> u64 {
        self.read().writes
    }

    /// Copy of the whole surface.
    pub fn snapshot(&self) -> SpriteSurface {
        self.read().clone()
    }

    /// Whether both handles refer to the same surface.
    pub fn same_surface(&self, other: &SpriteRenderer) -> bool {
        Arc::ptr_eq(&self.surface, &other.surface)
    }
}

impl RenderTarget for SpriteRenderer {
    fn is_visible(&self) -> bool {
        self.read().visible
    }

    fn set_sprite(&mut self, sprite: Option<&SpriteKey>) {
        let mut surface = self.write();
        surface.sprite = sprite.cloned();
        surface.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_surface() {
        let renderer = SpriteRenderer::new();
        let mut handle = renderer.clone();
        let key: SpriteKey = "hero_0".into();
        handle.set_sprite(Some(&key));
        assert_eq!(renderer.sprite().as_deref(), Some("hero_0"));
        assert_eq!(renderer.writes(), 1);
        assert!(renderer.same_surface(&handle));
        assert!(!renderer.same_surface(&SpriteRenderer::new()));
    }

    #[test]
    fn test_visibility_toggles() {
        let renderer = SpriteRenderer::with_visible(false);
        assert!(!renderer.is_visible());
        renderer.set_visible(true);
        assert!(renderer.is_visible());
    }

    #[test]
    fn test_empty_slot_clears_sprite() {
        let mut renderer = SpriteRenderer::new();
        let key: SpriteKey = "a".into();
        renderer.set_sprite(Some(&key));
        renderer.set_sprite(None);
        assert!(renderer.sprite().is_none());
        assert_eq!(renderer.snapshot().writes, 2);
    }
}
