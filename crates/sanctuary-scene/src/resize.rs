//! Debounced viewport resize tracking
//!
//! Bevy's window backend resizes the surface, and its camera system refits the
//! projection aspect ratio to the render target every frame. The listener sits
//! beside that: it coalesces bursts of `WindowResized` messages, records the
//! settled viewport with its capped pixel ratio, and stops once the scene is
//! torn down.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use sanctuary_core::{ResizeHandler, Viewport};
use std::time::Duration;
use tracing::debug;

use crate::{ActivationSet, FrameSet, SceneSettings};

/// The resize handler owned by the scene
#[derive(Resource, Debug)]
pub struct ResizeListener {
    pub handler: ResizeHandler,
    /// Last settled viewport
    pub applied: Option<Viewport>,
}

impl ResizeListener {
    pub fn new(delay: Duration) -> Self {
        Self {
            handler: ResizeHandler::new(delay),
            applied: None,
        }
    }
}

pub struct ResizePlugin;

impl Plugin for ResizePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, attach_resize_listener.in_set(ActivationSet::Resize))
            .add_systems(
                Update,
                handle_window_resize
                    .in_set(FrameSet::Resize)
                    .run_if(resource_exists::<ResizeListener>),
            );
    }
}

/// Scale factor override that caps the pixel ratio at `max`.
///
/// Always `None` on wasm32: an override there leaves the canvas only partly
/// drawn, so the browser's device pixel ratio is used unchanged.
pub fn scale_factor_override(native: f32, max: f32) -> Option<f32> {
    if cfg!(target_arch = "wasm32") {
        return None;
    }
    (native > max).then_some(max)
}

fn attach_resize_listener(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    cap_pixel_ratio(windows, settings.renderer.max_pixel_ratio);

    let delay = Duration::from_millis(settings.renderer.resize_debounce_ms);
    commands.insert_resource(ResizeListener::new(delay));
    debug!(delay_ms = delay.as_millis() as u64, "Resize handler attached");
}

fn handle_window_resize(
    time: Res<Time>,
    settings: Res<SceneSettings>,
    mut listener: ResMut<ResizeListener>,
    mut resized: MessageReader<WindowResized>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let now = time.elapsed();
    let max_pixel_ratio = settings.renderer.max_pixel_ratio;

    // Record a burst that settled before this frame's messages arrive
    if let Some(viewport) = listener.handler.poll(now) {
        cap_pixel_ratio(windows.reborrow(), max_pixel_ratio);
        let (width, height) = viewport.physical_size(max_pixel_ratio);
        debug!(
            width,
            height,
            pixel_ratio = viewport.effective_pixel_ratio(max_pixel_ratio),
            "Viewport settled"
        );
        listener.applied = Some(viewport);
    }

    for event in resized.read() {
        let device_pixel_ratio = windows
            .get(event.window)
            .map(|w| w.resolution.base_scale_factor())
            .unwrap_or(1.0);
        let viewport = Viewport::new(event.width, event.height, device_pixel_ratio);
        listener.handler.on_resize(viewport, now);
    }
}

fn cap_pixel_ratio(mut windows: Query<&mut Window, With<PrimaryWindow>>, max: f32) {
    for mut window in &mut windows {
        let target = scale_factor_override(window.resolution.base_scale_factor(), max);
        if window.resolution.scale_factor_override() != target {
            window.resolution.set_scale_factor_override(target);
        }
    }
}
