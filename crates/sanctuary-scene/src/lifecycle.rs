//! Scene activation and teardown

use bevy::prelude::*;
use sanctuary_core::Lifecycle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::camera::{OrbitController, SceneCamera};
use crate::resize::ResizeListener;
use crate::{ActivationSet, FrameSet};

/// Lifecycle of the mounted scene
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct SceneLifecycle(pub Lifecycle);

/// Cross-boundary unmount request.
///
/// Clones share one flag, so the host (a JS export, a test) can hold one end
/// while the app polls the other.
#[derive(Resource, Debug, Clone, Default)]
pub struct TeardownSignal(Arc<AtomicBool>);

impl TeardownSignal {
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Run condition for the frame sets that follow teardown
pub fn scene_active(lifecycle: Res<SceneLifecycle>) -> bool {
    lifecycle.is_active()
}

pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneLifecycle>()
            .add_systems(Startup, activate_scene.in_set(ActivationSet::Activate))
            .add_systems(Update, deactivate_on_request.in_set(FrameSet::Teardown));
    }
}

fn activate_scene(mut lifecycle: ResMut<SceneLifecycle>) {
    match lifecycle.activate() {
        Ok(()) => info!("Scene activated"),
        Err(e) => warn!(error = %e, "Scene activation skipped"),
    }
}

/// Release the resize handler, the controls, and the renderer once
pub(crate) fn deactivate_on_request(
    mut commands: Commands,
    signal: Res<TeardownSignal>,
    mut lifecycle: ResMut<SceneLifecycle>,
    mut listener: Option<ResMut<ResizeListener>>,
    cameras: Query<Entity, (With<SceneCamera>, With<OrbitController>)>,
    mut exit: MessageWriter<AppExit>,
) {
    if !signal.is_requested() {
        return;
    }
    let Some(mut release) = lifecycle.deactivate() else {
        return;
    };

    release.remove_resize_handler(|| {
        if let Some(listener) = listener.as_mut() {
            listener.handler.detach();
        }
    });
    release.release_controls(|| {
        for camera in &cameras {
            commands.entity(camera).remove::<OrbitController>();
        }
    });
    release.release_renderer(|| {
        exit.write(AppExit::Success);
    });

    let report = release.finish();
    info!(
        resize_handler_removed = report.resize_handler_removed,
        controls_released = report.controls_released,
        renderer_released = report.renderer_released,
        "Scene deactivated"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanctuary_core::{ControlsConfig, OrbitControls};
    use std::time::Duration;

    fn teardown_app(signal: TeardownSignal) -> App {
        let mut app = App::new();
        let mut lifecycle = SceneLifecycle::default();
        lifecycle.activate().unwrap();
        app.insert_resource(signal)
            .insert_resource(lifecycle)
            .insert_resource(ResizeListener::new(Duration::ZERO))
            .add_systems(Update, deactivate_on_request);
        app
    }

    #[test]
    fn test_teardown_signal_is_shared() {
        let host = TeardownSignal::default();
        let app_side = host.clone();
        assert!(!app_side.is_requested());
        host.request();
        assert!(app_side.is_requested());
    }

    #[test]
    fn test_unmount_releases_everything() {
        let signal = TeardownSignal::default();
        let mut app = teardown_app(signal.clone());
        let controls = OrbitControls::new(Vec3::new(4.0, 5.0, 4.0), &ControlsConfig::default());
        let camera = app
            .world_mut()
            .spawn((SceneCamera, OrbitController(controls)))
            .id();

        app.update();
        assert!(app.world().resource::<SceneLifecycle>().is_active());
        assert!(app.should_exit().is_none());

        signal.request();
        app.update();

        assert!(!app.world().resource::<SceneLifecycle>().is_active());
        assert!(!app.world().resource::<ResizeListener>().handler.is_attached());
        assert!(app.world().get::<OrbitController>(camera).is_none());
        assert_eq!(app.should_exit(), Some(AppExit::Success));

        // A second pass finds nothing left to release
        app.update();
        assert!(!app.world().resource::<SceneLifecycle>().is_active());
    }
}
