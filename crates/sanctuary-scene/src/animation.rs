//! Binds the selected clip to the model's animation player

use bevy::animation::RepeatAnimation;
use bevy::ecs::entity::EntityHashSet;
use bevy::prelude::*;
use sanctuary_core::LoopPolicy;
use tracing::debug;

use crate::{find_ancestor_with, FrameSet};

/// Playback chosen for a model, waiting for its animation player to appear
#[derive(Component, Debug, Clone)]
pub struct ModelAnimation {
    pub graph: Handle<AnimationGraph>,
    pub node: AnimationNodeIndex,
    pub rate: f32,
    pub loop_policy: LoopPolicy,
}

/// Set on a model once its player is driving the clip
#[derive(Component)]
pub struct AnimationDriver {
    pub player: Entity,
}

pub struct AnimationDriverPlugin;

impl Plugin for AnimationDriverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            bind_animation_driver.in_set(FrameSet::Loads),
        );
    }
}

pub fn repeat_for(policy: LoopPolicy) -> RepeatAnimation {
    match policy {
        LoopPolicy::Once => RepeatAnimation::Never,
        LoopPolicy::Forever => RepeatAnimation::Forever,
        // The player finishes once its completion count reaches n
        LoopPolicy::Count(n) => RepeatAnimation::Count(n.max(1)),
    }
}

fn bind_animation_driver(
    mut commands: Commands,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
    parents: Query<&ChildOf>,
    animations: Query<&ModelAnimation>,
    drivers: Query<(), With<AnimationDriver>>,
) {
    // Drivers inserted this frame are still queued as commands
    let mut bound = EntityHashSet::default();
    for (player_entity, mut player) in &mut players {
        let Some(model) = find_ancestor_with(player_entity, &parents, &animations) else {
            continue;
        };
        // One driver per model
        if drivers.contains(model) || !bound.insert(model) {
            continue;
        }
        let Ok(animation) = animations.get(model) else {
            continue;
        };

        player
            .play(animation.node)
            .set_speed(animation.rate)
            .set_repeat(repeat_for(animation.loop_policy));
        commands
            .entity(player_entity)
            .insert(AnimationGraphHandle(animation.graph.clone()));
        commands.entity(model).insert(AnimationDriver {
            player: player_entity,
        });
        debug!(rate = animation.rate, "Animation playback started");
    }
}
