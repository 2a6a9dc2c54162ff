//! Sanctuary Scene - Bevy plugins that bootstrap the scene
//!
//! Activation runs once in `Startup`, in a fixed order: scene root,
//! environment load, model load, camera, controls, renderer settings, resize
//! handler. The Bevy main loop is the render loop from then on; every frame
//! set after teardown is gated on the scene lifecycle being active.

pub mod animation;
pub mod camera;
pub mod environment;
pub mod lifecycle;
pub mod model;
pub mod resize;
pub mod skybox;

use bevy::prelude::*;
use sanctuary_core::{Diagnostics, SceneConfig};

pub use camera::{OrbitController, SceneCamera};
pub use environment::{EnvironmentState, HdrEnvironment, HdrEnvironmentLoader};
pub use lifecycle::{scene_active, SceneLifecycle, TeardownSignal};
pub use model::{LoadedModel, ModelState};
pub use resize::ResizeListener;
pub use skybox::GroundedSkyboxDome;

/// Scene configuration shared by every system
#[derive(Resource, Debug, Clone, Deref)]
pub struct SceneSettings(pub SceneConfig);

/// Non-fatal failures collected while the scene populates
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct SceneDiagnostics(pub Diagnostics);

/// Root that owns the skybox, the model, and the camera
#[derive(Component)]
pub struct StageRoot;

/// Activation steps, run in declaration order
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationSet {
    Root,
    Environment,
    Model,
    Camera,
    Controls,
    Renderer,
    Resize,
    Activate,
}

/// Per-frame work, run in declaration order
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Teardown,
    Resize,
    Loads,
    Controls,
}

/// Plugin that mounts the whole scene
pub struct SanctuaryScenePlugin {
    pub config: SceneConfig,
    pub teardown: TeardownSignal,
}

impl SanctuaryScenePlugin {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            teardown: TeardownSignal::default(),
        }
    }

    pub fn with_teardown(mut self, teardown: TeardownSignal) -> Self {
        self.teardown = teardown;
        self
    }
}

impl Plugin for SanctuaryScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SceneSettings(self.config.clone()))
            .insert_resource(self.teardown.clone())
            .init_resource::<SceneDiagnostics>()
            .configure_sets(
                Startup,
                (
                    ActivationSet::Root,
                    ActivationSet::Environment,
                    ActivationSet::Model,
                    ActivationSet::Camera,
                    ActivationSet::Controls,
                    ActivationSet::Renderer,
                    ActivationSet::Resize,
                    ActivationSet::Activate,
                )
                    .chain(),
            )
            .add_systems(Startup, spawn_stage_root.in_set(ActivationSet::Root))
            .add_plugins(frame_sets)
            .add_plugins(lifecycle::LifecyclePlugin)
            .add_plugins(environment::EnvironmentPlugin)
            .add_plugins(model::ModelPlugin)
            .add_plugins(animation::AnimationDriverPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(resize::ResizePlugin);
    }
}

/// Order the per-frame sets. Everything after teardown needs an active scene,
/// so late asset loads and input never reach a deactivated scene.
pub(crate) fn frame_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            FrameSet::Teardown,
            FrameSet::Resize,
            FrameSet::Loads,
            FrameSet::Controls,
        )
            .chain(),
    );
    for set in [FrameSet::Resize, FrameSet::Loads, FrameSet::Controls] {
        app.configure_sets(Update, set.run_if(scene_active));
    }
}

fn spawn_stage_root(mut commands: Commands) {
    commands.spawn((
        StageRoot,
        Transform::default(),
        Visibility::default(),
        Name::new("Stage"),
    ));
}

/// Nearest entity at or above `entity` that has a `T`
pub(crate) fn find_ancestor_with<T: Component>(
    entity: Entity,
    parents: &Query<&ChildOf>,
    candidates: &Query<&T>,
) -> Option<Entity> {
    let mut current = entity;
    loop {
        if candidates.contains(current) {
            return Some(current);
        }
        current = parents.get(current).ok()?.parent();
    }
}
