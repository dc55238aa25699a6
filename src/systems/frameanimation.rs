//! Frame animation systems.
//!
//! - [`sync_frame_animators`] registers entities that gained a
//!   [`FrameAnimator`] and unregisters the ones that lost it (or were
//!   despawned).
//! - [`frame_animation_system`] ticks the [`FrameAnimations`] scheduler with
//!   the frame's unscaled and scaled deltas.
//!
//! # Ordering
//!
//! `frame_animation_system` must run after `sync_frame_animators` and after
//! every system that issues playback commands, and before anything that
//! presents the sprites. See [`add_frame_animation_systems`].

use bevy_ecs::prelude::*;
use log::trace;

use crate::components::frameanimator::FrameAnimator;
use crate::resources::frameanimations::FrameAnimations;
use crate::resources::instanceindex::InstanceId;
use crate::resources::worldtime::WorldTime;

/// Keep the scheduler's registrations in step with [`FrameAnimator`] components.
///
/// Removals are processed before additions so a recycled entity slot can
/// register again in the same frame.
pub fn sync_frame_animators(
    mut added: Query<(Entity, &mut FrameAnimator), Added<FrameAnimator>>,
    mut removed: RemovedComponents<FrameAnimator>,
    mut anims: ResMut<FrameAnimations>,
) {
    for entity in removed.read() {
        anims.unregister(InstanceId::from(entity));
    }
    for (entity, mut animator) in added.iter_mut() {
        if animator.enable(InstanceId::from(entity), &mut anims) && animator.play_automatically
        {
            animator.play_clip(&mut anims, 0);
        }
    }
}

/// Advance all frame animations by one frame.
pub fn frame_animation_system(mut anims: ResMut<FrameAnimations>, time: Res<WorldTime>) {
    let stats = anims.tick(time.unscaled_delta, time.delta);
    trace!(
        "Frame animations: {} advanced, {} redrawn, {} culled, {} malformed",
        stats.advanced, stats.redraws, stats.skipped_culled, stats.malformed
    );
}

/// Add both systems to `schedule` in the required order.
pub fn add_frame_animation_systems(schedule: &mut Schedule) {
    schedule.add_systems((sync_frame_animators, frame_animation_system).chain());
}
