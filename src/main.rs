//! Flipbook headless demo.
//!
//! Runs the frame animation scheduler inside a bevy_ecs host loop without a
//! window, to exercise registration churn, culling and every wrap mode.
//!
//! # Main Loop
//!
//! 1. Load `config.ini` and the clip assets (JSON)
//! 2. Spawn entities with a [`FrameAnimator`] and [`SpriteRenderer`]
//! 3. Each frame:
//!    - randomly hide/show renderers and despawn/respawn animators
//!    - update [`WorldTime`]
//!    - run the schedule (config changes, animator sync, animation tick)
//! 4. Log a summary of the final playback states
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --instances 500 --frames 1200
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use flipbook::components::frameanimator::FrameAnimator;
use flipbook::components::sprite::SpriteRenderer;
use flipbook::error;
use flipbook::resources::animationconfig::AnimationConfig;
use flipbook::resources::animationtable::{AnimationState, CullingType};
use flipbook::resources::clipstore::{ClipList, ClipStore};
use flipbook::resources::frameanimations::FrameAnimations;
use flipbook::resources::worldtime::WorldTime;
use flipbook::systems::animationconfig::apply_animation_config;
use flipbook::systems::frameanimation::{add_frame_animation_systems, frame_animation_system};
use flipbook::systems::time::update_world_time;
use std::path::PathBuf;

const DEMO_CLIPS: &str = include_str!("../assets/clips/demo.json");

/// Flipbook animation host loop
#[derive(Parser)]
#[command(version, about = "Headless frame animation host loop.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// JSON clip file. Defaults to the built-in demo clips.
    #[arg(long, value_name = "PATH")]
    clips: Option<PathBuf>,

    /// Animated entities alive at any time.
    #[arg(long, default_value_t = 200)]
    instances: usize,

    /// Host frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seed for the random churn.
    #[arg(long)]
    seed: Option<u64>,
}

/// Clip list for one entity, rotated so clip 0 (auto-played) varies.
fn rotated_clips(store: &ClipStore, names: &[&str], start: usize) -> error::Result<ClipList> {
    let rotated: Vec<&str> = names
        .iter()
        .cycle()
        .skip(start % names.len())
        .take(names.len())
        .copied()
        .collect();
    store.clip_list(&rotated)
}

fn spawn_animator(world: &mut World, clips: ClipList, rng: &mut fastrand::Rng) -> Entity {
    let renderer = SpriteRenderer::new();
    let culling = if rng.bool() {
        CullingType::BasedOnRenderers
    } else {
        CullingType::AlwaysAnimate
    };
    let animator = FrameAnimator::new(renderer.clone(), clips)
        .with_culling_type(culling)
        .with_ignore_scaled_time(rng.u8(..10) == 0);
    world.spawn((renderer, animator)).id()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AnimationConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("Using default config: {}", e);
    }

    let mut store = ClipStore::new();
    let loaded = match &cli.clips {
        Some(path) => store.load_from_file(path),
        None => store.load_from_json_str(DEMO_CLIPS),
    };
    if let Err(e) = loaded {
        log::error!("Failed to load clips: {}", e);
        std::process::exit(1);
    }
    if store.is_empty() {
        log::error!("No clips to play");
        std::process::exit(1);
    }
    let names = store.names();
    log::info!("Clips: {}", names.join(", "));

    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(FrameAnimations::<SpriteRenderer>::with_chunk_size(
        config.chunk_size,
    ));

    let mut entities = Vec::with_capacity(cli.instances);
    for i in 0..cli.instances {
        match rotated_clips(&store, &names, i) {
            Ok(clips) => entities.push(spawn_animator(&mut world, clips, &mut rng)),
            Err(e) => {
                log::error!("Failed to build clip list: {}", e);
                std::process::exit(1);
            }
        }
    }

    let dt = config.frame_delta();
    world.insert_resource(config);

    let mut update = Schedule::default();
    update.add_systems(apply_animation_config.before(frame_animation_system));
    add_frame_animation_systems(&mut update);

    // --------------- Main loop ---------------
    for frame in 0..cli.frames {
        if !entities.is_empty() {
            // Toggle visibility so culled instances freeze and resume.
            let pick = entities[rng.usize(..entities.len())];
            if let Some(animator) = world.get::<FrameAnimator>(pick) {
                let renderer = &animator.renderer;
                renderer.set_visible(!renderer.snapshot().visible);
            }

            // Replace an entity now and then to exercise swap-remove.
            if rng.u8(..4) == 0 {
                let slot = rng.usize(..entities.len());
                world.despawn(entities[slot]);
                if let Ok(clips) = rotated_clips(&store, &names, rng.usize(..names.len())) {
                    entities[slot] = spawn_animator(&mut world, clips, &mut rng);
                }
            }
        }

        update_world_time(&mut world, dt);
        update.run(&mut world);
        world.clear_trackers();

        if frame % 120 == 0 {
            let anims = world.resource::<FrameAnimations>();
            log::debug!(
                "frame {}: {} instances, capacity {}",
                frame,
                anims.len(),
                anims.capacity()
            );
        }
    }

    // --------------- Summary ---------------
    let anims = world.resource::<FrameAnimations>();
    let (mut playing, mut paused, mut stopped) = (0, 0, 0);
    for id in anims.ids() {
        match anims.state(*id) {
            Ok(AnimationState::Playing) => playing += 1,
            Ok(AnimationState::Paused) => paused += 1,
            Ok(AnimationState::Stopped) => stopped += 1,
            Err(e) => log::warn!("{}", e),
        }
    }
    let writes: u64 = entities
        .iter()
        .filter_map(|e| world.get::<SpriteRenderer>(*e))
        .map(SpriteRenderer::writes)
        .sum();
    log::info!(
        "{} frames simulated: {} instances ({} playing, {} paused, {} stopped), capacity {}, {} sprite writes",
        cli.frames,
        anims.len(),
        playing,
        paused,
        stopped,
        anims.capacity(),
        writes
    );
}
