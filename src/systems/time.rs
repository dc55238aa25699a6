//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, before the schedule runs.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Record the unscaled frame delta `dt` and derive the scaled delta from
/// the current `time_scale`.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt * wt.time_scale;
    wt.unscaled_delta = dt;
    wt.delta = scaled_dt;
    wt.elapsed += scaled_dt;
    wt.frame_count += 1;
}
