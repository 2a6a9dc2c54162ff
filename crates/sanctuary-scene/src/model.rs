//! Animated character model loading

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use sanctuary_core::{FailureKind, PlaybackPlan};
use tracing::info;

use crate::animation::ModelAnimation;
use crate::{find_ancestor_with, ActivationSet, FrameSet, SceneDiagnostics, SceneSettings, StageRoot};

/// Marker for the spawned model tree
#[derive(Component)]
pub struct LoadedModel;

/// Shadow flags applied to every mesh under a model
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowFlags {
    pub cast: bool,
    pub receive: bool,
}

/// Model load in flight
#[derive(Resource, Debug)]
pub struct PendingModel {
    pub handle: Handle<Gltf>,
    pub path: String,
}

/// Where the model load stands
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    #[default]
    Loading,
    Spawned(Entity),
    Failed,
}

pub struct ModelPlugin;

impl Plugin for ModelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelState>()
            .add_systems(Startup, request_model.in_set(ActivationSet::Model))
            .add_systems(
                Update,
                (
                    finish_model.run_if(resource_exists::<PendingModel>),
                    apply_shadow_flags,
                )
                    .chain()
                    .in_set(FrameSet::Loads),
            );
    }
}

fn request_model(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<SceneSettings>) {
    let path = settings.model.path.clone();
    info!(path = %path, "Loading model");
    let handle = asset_server.load(path.clone());
    commands.insert_resource(PendingModel { handle, path });
}

/// A loaded model's scene and clips
pub(crate) struct ModelSource<'a> {
    pub path: &'a str,
    pub scene: Handle<Scene>,
    pub clips: &'a [Handle<AnimationClip>],
}

#[allow(clippy::too_many_arguments)]
fn finish_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SceneSettings>,
    pending: Res<PendingModel>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut state: ResMut<ModelState>,
    mut diagnostics: ResMut<SceneDiagnostics>,
    roots: Query<Entity, With<StageRoot>>,
) {
    let Some(gltf) = gltfs.get(&pending.handle) else {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(pending.handle.id()) {
            diagnostics.report(FailureKind::ModelLoad, &pending.path, err);
            *state = ModelState::Failed;
            commands.remove_resource::<PendingModel>();
        }
        return;
    };
    commands.remove_resource::<PendingModel>();

    let Some(scene) = gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()) else {
        diagnostics.report(FailureKind::ModelLoad, &pending.path, "asset has no scene");
        *state = ModelState::Failed;
        return;
    };

    let source = ModelSource {
        path: &pending.path,
        scene,
        clips: &gltf.animations,
    };
    let model = spawn_model(
        &mut commands,
        &mut graphs,
        &mut diagnostics,
        &settings,
        source,
        roots.single().ok(),
    );
    *state = ModelState::Spawned(model);
}

/// Spawn the model under `root` and attach the configured clip's playback
pub(crate) fn spawn_model(
    commands: &mut Commands,
    graphs: &mut Assets<AnimationGraph>,
    diagnostics: &mut SceneDiagnostics,
    settings: &SceneSettings,
    source: ModelSource,
    root: Option<Entity>,
) -> Entity {
    let config = &settings.model;
    let mut model = commands.spawn((
        SceneRoot(source.scene),
        Transform::from_scale(Vec3::splat(config.scale)),
        LoadedModel,
        ShadowFlags {
            cast: config.cast_shadows,
            receive: config.receive_shadows,
        },
        Name::new("Model"),
    ));
    if let Some(root) = root {
        model.insert(ChildOf(root));
    }

    match PlaybackPlan::select(source.clips, &settings.animation) {
        Ok(plan) => {
            let (graph, node) = AnimationGraph::from_clip(plan.clip);
            model.insert(ModelAnimation {
                graph: graphs.add(graph),
                node,
                rate: plan.rate,
                loop_policy: plan.loop_policy,
            });
            info!(clip = plan.clip_index, rate = plan.rate, "Model animation selected");
        }
        Err(e) => diagnostics.report(FailureKind::Animation, source.path, e),
    }

    info!(path = %source.path, scale = config.scale, "Model added to scene");
    model.id()
}

/// Set shadow flags on meshes as the model's scene instantiates
fn apply_shadow_flags(
    mut commands: Commands,
    meshes: Query<Entity, Added<Mesh3d>>,
    parents: Query<&ChildOf>,
    flags: Query<&ShadowFlags>,
) {
    for mesh in &meshes {
        let Some(owner) = find_ancestor_with(mesh, &parents, &flags) else {
            continue;
        };
        let Ok(owner_flags) = flags.get(owner) else {
            continue;
        };
        let mut entity = commands.entity(mesh);
        if owner_flags.cast {
            entity.remove::<NotShadowCaster>();
        } else {
            entity.insert(NotShadowCaster);
        }
        if owner_flags.receive {
            entity.remove::<NotShadowReceiver>();
        } else {
            entity.insert(NotShadowReceiver);
        }
    }
}
