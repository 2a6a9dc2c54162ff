//! Ground-projected skybox dome

use bevy::asset::RenderAssetUsages;
use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use sanctuary_core::GroundedSkybox;

/// Marker for the dome entity
#[derive(Component)]
pub struct GroundedSkyboxDome;

/// Upload-ready mesh for the dome
pub fn skybox_mesh(skybox: &GroundedSkybox) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, skybox.positions.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, skybox.normals.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, skybox.uvs.clone())
        .with_inserted_indices(Indices::U32(skybox.indices.clone()))
}

/// Unlit material that shows the panorama as-is
pub fn skybox_material(panorama: Handle<Image>) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(panorama),
        unlit: true,
        cull_mode: None,
        ..default()
    }
}

/// Spawn the dome under `root`, lifted by `elevation`
pub(crate) fn spawn_dome(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    skybox: &GroundedSkybox,
    panorama: Handle<Image>,
    root: Option<Entity>,
    elevation: f32,
) -> Entity {
    let mut dome = commands.spawn((
        Mesh3d(meshes.add(skybox_mesh(skybox))),
        MeshMaterial3d(materials.add(skybox_material(panorama))),
        Transform::from_xyz(0.0, elevation, 0.0),
        NotShadowCaster,
        NotShadowReceiver,
        GroundedSkyboxDome,
        Name::new("Grounded Skybox"),
    ));
    if let Some(root) = root {
        dome.insert(ChildOf(root));
    }
    dome.id()
}
