//! Scene camera, orbit controls, and renderer settings

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use sanctuary_core::{OrbitControls, Viewport};
use tracing::info;

use crate::{ActivationSet, FrameSet, SceneSettings, StageRoot};

/// Marker component for the scene camera
#[derive(Component)]
pub struct SceneCamera;

/// Orbit controls bound to a camera
#[derive(Component, Debug, Deref, DerefMut)]
pub struct OrbitController(pub OrbitControls);

/// Plugin for the camera and its controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera.in_set(ActivationSet::Camera))
            .add_systems(Startup, attach_controls.in_set(ActivationSet::Controls))
            .add_systems(Startup, configure_renderer.in_set(ActivationSet::Renderer))
            .add_systems(Update, update_orbit_controls.in_set(FrameSet::Controls));
    }
}

fn spawn_camera(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    roots: Query<Entity, With<StageRoot>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let camera = &settings.camera;
    let position = Vec3::from_array(camera.position);
    let target = Vec3::from_array(settings.controls.target);
    let aspect_ratio = windows
        .single()
        .map(|w| Viewport::new(w.width(), w.height(), w.scale_factor()).aspect())
        .unwrap_or(1.0);

    let mut entity = commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_radians(),
            aspect_ratio,
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(position).looking_at(target, Vec3::Y),
        SceneCamera,
        Name::new("Scene Camera"),
    ));
    if let Ok(root) = roots.single() {
        entity.insert(ChildOf(root));
    }
    info!(position = ?position, fov = camera.fov_degrees, "Camera created");
}

fn attach_controls(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    cameras: Query<(Entity, &Transform), With<SceneCamera>>,
) {
    for (entity, transform) in &cameras {
        let controls = OrbitControls::new(transform.translation, &settings.controls);
        commands.entity(entity).insert(OrbitController(controls));
    }
}

fn configure_renderer(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    cameras: Query<Entity, With<SceneCamera>>,
) {
    let renderer = &settings.renderer;
    let [r, g, b] = renderer.clear_color;
    commands.insert_resource(ClearColor(Color::linear_rgb(r, g, b)));

    let msaa = if renderer.antialias {
        Msaa::Sample4
    } else {
        Msaa::Off
    };
    for entity in &cameras {
        commands.entity(entity).insert(msaa);
    }
}

/// Feed pointer input into the controls and move the camera
fn update_orbit_controls(
    mut cameras: Query<(&mut Transform, &mut OrbitController, &Projection), With<SceneCamera>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }
    let scroll: f32 = mouse_wheel.read().map(|wheel| wheel.y).sum();

    let viewport_height = windows.single().map(|w| w.height()).unwrap_or(0.0);

    for (mut transform, mut controller, projection) in &mut cameras {
        let fov = match projection {
            Projection::Perspective(perspective) => perspective.fov,
            _ => continue,
        };

        if mouse_button.pressed(MouseButton::Left) {
            controller.rotate(total_motion, viewport_height);
        }
        if mouse_button.pressed(MouseButton::Right) || mouse_button.pressed(MouseButton::Middle) {
            controller.pan(total_motion, viewport_height, fov);
        }

        // One finger orbits, like a left drag
        if touch_input.iter().count() == 1 {
            for touch in touch_input.iter() {
                controller.rotate(touch.delta(), viewport_height);
            }
        }

        controller.zoom(scroll);

        transform.translation = controller.update();
        transform.look_at(controller.target(), Vec3::Y);
    }
}
