//! Bevy application setup

use bevy::prelude::*;
use sanctuary_core::SceneConfig;
use sanctuary_scene::{SanctuaryScenePlugin, TeardownSignal};
use tracing::warn;

const CANVAS_SELECTOR: &str = "#sanctuary-canvas";

/// Scene settings bundled at build time
const SCENE_TOML: &str = include_str!("../scene.toml");

pub fn scene_config() -> SceneConfig {
    SceneConfig::from_toml(SCENE_TOML).unwrap_or_else(|e| {
        warn!(error = %e, "Bundled scene configuration rejected, using defaults");
        SceneConfig::default()
    })
}

/// Run the Bevy application
pub fn run(teardown: TeardownSignal) {
    let config = scene_config();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Sanctuary".to_string(),
                        canvas: Some(CANVAS_SELECTOR.to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // Assets are served next to the WASM bundle
                    file_path: "".to_string(),
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        .add_plugins(SanctuaryScenePlugin::new(config).with_teardown(teardown))
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_config_matches_scene_defaults() {
        let bundled = SceneConfig::from_toml(SCENE_TOML).unwrap();
        let defaults = SceneConfig::default();
        assert_eq!(bundled.environment.path, defaults.environment.path);
        assert_eq!(bundled.model.path, defaults.model.path);
        assert_eq!(bundled.animation.clip_index, 1);
        assert_eq!(bundled.skybox.radius, 15.0);
        assert_eq!(bundled.skybox.height, 70.0);
        assert!(!bundled.controls.enable_zoom);
    }
}
