//! HDR environment loading and binding
//!
//! The equirect panorama is decoded by [`HdrEnvironmentLoader`] into two GPU
//! images: the panorama itself (textures the grounded dome) and a cubemap
//! projected from it. The cubemap is bound once and feeds both the camera
//! backdrop and image-based lighting.

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext, LoadState, RenderAssetUsages};
use bevy::core_pipeline::Skybox;
use bevy::light::EnvironmentMapLight;
use bevy::prelude::*;
use bevy::render::render_resource::{
    Extent3d, TextureDimension, TextureFormat, TextureViewDescriptor, TextureViewDimension,
};
use sanctuary_core::{EnvironmentError, EnvironmentSlots, EquirectImage, FailureKind, GroundedSkybox};
use thiserror::Error;
use tracing::{info, warn};

use crate::camera::SceneCamera;
use crate::skybox::spawn_dome;
use crate::{ActivationSet, FrameSet, SceneDiagnostics, SceneSettings, StageRoot};

const DEFAULT_FACE_SIZE: u32 = 512;

/// A decoded environment: the panorama and its cubemap projection
#[derive(Asset, TypePath, Debug)]
pub struct HdrEnvironment {
    pub equirect: Handle<Image>,
    pub cubemap: Handle<Image>,
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug)]
pub enum HdrLoadError {
    #[error("Failed to read environment map: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Asset loader for Radiance `.hdr` panoramas
#[derive(Debug, Clone, TypePath)]
pub struct HdrEnvironmentLoader {
    pub face_size: u32,
}

impl Default for HdrEnvironmentLoader {
    fn default() -> Self {
        Self {
            face_size: DEFAULT_FACE_SIZE,
        }
    }
}

impl AssetLoader for HdrEnvironmentLoader {
    type Asset = HdrEnvironment;
    type Settings = ();
    type Error = HdrLoadError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;

        let panorama = EquirectImage::decode_hdr(&bytes)?;
        let (equirect, cubemap) = environment_images(&panorama, self.face_size)?;

        Ok(HdrEnvironment {
            width: panorama.width(),
            height: panorama.height(),
            equirect: load_context.add_labeled_asset("equirect".to_string(), equirect),
            cubemap: load_context.add_labeled_asset("cubemap".to_string(), cubemap),
        })
    }

    fn extensions(&self) -> &[&str] {
        &["hdr"]
    }
}

/// GPU images for a panorama: the flat equirect and a six-layer cubemap
pub fn environment_images(
    panorama: &EquirectImage,
    face_size: u32,
) -> Result<(Image, Image), EnvironmentError> {
    let equirect = Image::new(
        Extent3d {
            width: panorama.width(),
            height: panorama.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        panorama.to_rgba16f(),
        TextureFormat::Rgba16Float,
        RenderAssetUsages::RENDER_WORLD,
    );

    let faces = panorama.to_cube_faces(face_size)?;
    let mut cubemap = Image::new(
        Extent3d {
            width: face_size,
            height: face_size,
            depth_or_array_layers: 6,
        },
        TextureDimension::D2,
        faces.to_rgba16f(),
        TextureFormat::Rgba16Float,
        RenderAssetUsages::RENDER_WORLD,
    );
    cubemap.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });

    Ok((equirect, cubemap))
}

/// Environment load in flight
#[derive(Resource, Debug)]
pub struct PendingEnvironment {
    pub handle: Handle<HdrEnvironment>,
    pub path: String,
}

/// Background and lighting slots of the scene
#[derive(Resource, Debug, Default)]
pub struct EnvironmentState {
    pub slots: EnvironmentSlots<Handle<Image>>,
}

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        let face_size = app
            .world()
            .get_resource::<SceneSettings>()
            .map(|settings| settings.environment.cubemap_face_size)
            .unwrap_or(DEFAULT_FACE_SIZE);

        app.init_asset::<HdrEnvironment>()
            .register_asset_loader(HdrEnvironmentLoader { face_size })
            .init_resource::<EnvironmentState>()
            .add_systems(Startup, request_environment.in_set(ActivationSet::Environment))
            .add_systems(
                Update,
                finish_environment
                    .in_set(FrameSet::Loads)
                    .run_if(resource_exists::<PendingEnvironment>),
            );
    }
}

fn request_environment(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SceneSettings>,
) {
    let path = settings.environment.path.clone();
    info!(path = %path, "Loading environment map");
    let handle = asset_server.load(path.clone());
    commands.insert_resource(PendingEnvironment { handle, path });
}

#[allow(clippy::too_many_arguments)]
fn finish_environment(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SceneSettings>,
    pending: Res<PendingEnvironment>,
    environments: Res<Assets<HdrEnvironment>>,
    mut state: ResMut<EnvironmentState>,
    mut diagnostics: ResMut<SceneDiagnostics>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cameras: Query<Entity, With<SceneCamera>>,
    roots: Query<Entity, With<StageRoot>>,
) {
    let Some(environment) = environments.get(&pending.handle) else {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(pending.handle.id()) {
            diagnostics.report(FailureKind::EnvironmentLoad, &pending.path, err);
            commands.remove_resource::<PendingEnvironment>();
        }
        return;
    };
    commands.remove_resource::<PendingEnvironment>();

    state.slots.bind(environment.cubemap.clone());
    let config = &settings.environment;
    for camera in &cameras {
        let mut entity = commands.entity(camera);
        if let Some(background) = state.slots.background() {
            entity.insert(Skybox {
                image: background.clone(),
                brightness: config.background_brightness,
                ..default()
            });
        }
        if let Some(lighting) = state.slots.environment() {
            entity.insert(EnvironmentMapLight {
                diffuse_map: lighting.clone(),
                specular_map: lighting.clone(),
                intensity: config.intensity,
                ..default()
            });
        }
    }

    let skybox_config = &settings.skybox;
    match GroundedSkybox::from_config(skybox_config) {
        Ok(skybox) => {
            spawn_dome(
                &mut commands,
                &mut meshes,
                &mut materials,
                &skybox,
                environment.equirect.clone(),
                roots.single().ok(),
                skybox_config.elevation,
            );
        }
        Err(e) => warn!(error = %e, "Grounded skybox skipped"),
    }

    info!(
        path = %pending.path,
        width = environment.width,
        height = environment.height,
        "Environment map bound"
    );
}
