//! Flipbook sprite animation library.
//!
//! Drives frame-by-frame sprite animations for many instances from a single
//! per-frame tick. Exposes the ECS components, resources and systems for
//! embedding in a bevy_ecs host loop, plus a tooling preview player.

pub mod components;
pub mod error;
pub mod preview;
pub mod resources;
pub mod systems;
