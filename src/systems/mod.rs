//! Engine systems.
//!
//! Submodules overview
//! - [`animationconfig`] – apply runtime configuration changes
//! - [`frameanimation`] – register animators and tick the scheduler
//! - [`time`] – update simulation time and deltas
//! - [`wrapmode`] – per-instance playback steps for each wrap mode

pub mod animationconfig;
pub mod frameanimation;
pub mod time;
pub mod wrapmode;
