//! Animation configuration change detection system.
//!
//! Applies [`AnimationConfig`] edits made while running. The chunk size only
//! takes effect when the scheduler is created, so only the time scale is
//! applied here.

use bevy_ecs::prelude::*;
use log::info;

use crate::resources::animationconfig::AnimationConfig;
use crate::resources::worldtime::WorldTime;

/// Copy a changed `time_scale` into [`WorldTime`].
pub fn apply_animation_config(
    maybe_config: Option<Res<AnimationConfig>>,
    mut world_time: ResMut<WorldTime>,
) {
    let Some(config) = maybe_config else {
        return;
    };
    if config.is_changed() && world_time.time_scale != config.time_scale {
        info!(
            "Time scale {} -> {}",
            world_time.time_scale, config.time_scale
        );
        world_time.time_scale = config.time_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_scale_follows_config() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let mut config = AnimationConfig::new();
        config.time_scale = 0.25;
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_animation_config);
        schedule.run(&mut world);
        assert_eq!(world.resource::<WorldTime>().time_scale, 0.25);

        world.resource_mut::<AnimationConfig>().time_scale = 2.0;
        schedule.run(&mut world);
        assert_eq!(world.resource::<WorldTime>().time_scale, 2.0);
    }

    #[test]
    fn test_no_config_is_a_no_op() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(3.0));
        let mut schedule = Schedule::default();
        schedule.add_systems(apply_animation_config);
        schedule.run(&mut world);
        assert_eq!(world.resource::<WorldTime>().time_scale, 3.0);
    }
}
