//! ECS components for entities.
//!
//! Submodules overview:
//! - [`frameanimator`] – per-entity binding and playback commands for the scheduler
//! - [`sprite`] – render target trait and the shared sprite surface handle

pub mod frameanimator;
pub mod sprite;
