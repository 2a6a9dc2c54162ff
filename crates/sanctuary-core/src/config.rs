//! Scene configuration
//!
//! Every tunable of the scene lives here: asset paths, skybox geometry,
//! model placement, animation playback, camera projection, orbit controls,
//! and renderer settings. Values load from TOML; missing sections fall back
//! to the defaults of the `sanctuary4k.hdr` / `digiDouble.glb` scene.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::animation::LoopPolicy;

/// Largest cubemap face edge accepted from config
pub const MAX_CUBEMAP_FACE_SIZE: u32 = 4096;
/// Largest skybox latitude segment count accepted from config
pub const MAX_SKYBOX_RESOLUTION: u32 = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read scene config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("{field} must be a finite number greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("{field} must not be empty")]
    EmptyPath { field: &'static str },
    #[error("animation.playback_rate must be finite and non-zero, got {0}")]
    InvalidPlaybackRate(f32),
    #[error("camera.fov_degrees must be inside (0, 180), got {0}")]
    InvalidFov(f32),
    #[error("camera.far ({far}) must be greater than camera.near ({near})")]
    InvalidClipRange { near: f32, far: f32 },
    #[error("controls.damping_factor must be inside (0, 1], got {0}")]
    InvalidDampingFactor(f32),
    #[error("controls.min_distance ({min}) exceeds controls.max_distance ({max})")]
    InvalidDistanceRange { min: f32, max: f32 },
    #[error("controls polar range [{min}, {max}] must be ordered and inside [0, pi]")]
    InvalidPolarRange { min: f32, max: f32 },
}

/// Complete scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub skybox: SkyboxConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
}

/// HDR panorama used as background and lighting environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Asset path of the equirectangular `.hdr` image
    #[serde(default = "default_environment_path")]
    pub path: String,
    /// Edge length in texels of each generated cubemap face
    #[serde(default = "default_cubemap_face_size")]
    pub cubemap_face_size: u32,
    /// Lighting intensity of the environment map
    #[serde(default = "default_environment_intensity")]
    pub intensity: f32,
    /// Brightness of the background drawn outside the skybox dome
    #[serde(default = "default_environment_intensity")]
    pub background_brightness: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            path: default_environment_path(),
            cubemap_face_size: default_cubemap_face_size(),
            intensity: default_environment_intensity(),
            background_brightness: default_environment_intensity(),
        }
    }
}

fn default_environment_path() -> String {
    "sanctuary4k.hdr".to_string()
}

fn default_cubemap_face_size() -> u32 {
    512
}

fn default_environment_intensity() -> f32 {
    1000.0
}

/// Ground-projected skybox dome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxConfig {
    /// Dome radius
    #[serde(default = "default_skybox_radius")]
    pub radius: f32,
    /// Height of the projection center above the virtual ground
    #[serde(default = "default_skybox_height")]
    pub height: f32,
    /// World-space y of the dome center
    #[serde(default = "default_skybox_elevation")]
    pub elevation: f32,
    /// Latitudinal segment count (longitude uses twice as many)
    #[serde(default = "default_skybox_resolution")]
    pub resolution: u32,
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            radius: default_skybox_radius(),
            height: default_skybox_height(),
            elevation: default_skybox_elevation(),
            resolution: default_skybox_resolution(),
        }
    }
}

fn default_skybox_radius() -> f32 {
    15.0
}

fn default_skybox_height() -> f32 {
    70.0
}

fn default_skybox_elevation() -> f32 {
    15.0
}

fn default_skybox_resolution() -> u32 {
    128
}

/// Animated character model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Asset path of the `.glb` file
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Uniform scale applied to the model root
    #[serde(default = "default_model_scale")]
    pub scale: f32,
    #[serde(default = "default_true")]
    pub cast_shadows: bool,
    #[serde(default = "default_true")]
    pub receive_shadows: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            scale: default_model_scale(),
            cast_shadows: true,
            receive_shadows: true,
        }
    }
}

fn default_model_path() -> String {
    "digiDouble.glb".to_string()
}

fn default_model_scale() -> f32 {
    3.0
}

fn default_true() -> bool {
    true
}

/// Clip selection and playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Index into the model's clip list
    #[serde(default = "default_clip_index")]
    pub clip_index: usize,
    /// Playback speed relative to real time
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f32,
    #[serde(default)]
    pub loop_policy: LoopPolicy,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            clip_index: default_clip_index(),
            playback_rate: default_playback_rate(),
            loop_policy: LoopPolicy::default(),
        }
    }
}

fn default_clip_index() -> usize {
    1
}

fn default_playback_rate() -> f32 {
    0.75
}

/// Perspective camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

fn default_camera_position() -> [f32; 3] {
    [4.0, 5.0, 4.0]
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

/// Damped orbit controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// Point the camera orbits around
    #[serde(default = "default_target")]
    pub target: [f32; 3],
    #[serde(default = "default_true")]
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update when damping
    #[serde(default = "default_damping_factor")]
    pub damping_factor: f32,
    #[serde(default)]
    pub enable_zoom: bool,
    #[serde(default = "default_true")]
    pub enable_rotate: bool,
    #[serde(default = "default_true")]
    pub enable_pan: bool,
    #[serde(default = "default_speed")]
    pub rotate_speed: f32,
    #[serde(default = "default_speed")]
    pub pan_speed: f32,
    #[serde(default = "default_speed")]
    pub zoom_speed: f32,
    #[serde(default)]
    pub min_distance: f32,
    /// Unbounded when absent
    #[serde(default)]
    pub max_distance: Option<f32>,
    /// Radians from the +Y axis
    #[serde(default)]
    pub min_polar_angle: f32,
    #[serde(default = "default_max_polar_angle")]
    pub max_polar_angle: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            enable_damping: true,
            damping_factor: default_damping_factor(),
            enable_zoom: false,
            enable_rotate: true,
            enable_pan: true,
            rotate_speed: default_speed(),
            pan_speed: default_speed(),
            zoom_speed: default_speed(),
            min_distance: 0.0,
            max_distance: None,
            min_polar_angle: 0.0,
            max_polar_angle: default_max_polar_angle(),
        }
    }
}

fn default_target() -> [f32; 3] {
    [0.0, 3.5, 0.0]
}

fn default_damping_factor() -> f32 {
    0.05
}

fn default_speed() -> f32 {
    1.0
}

fn default_max_polar_angle() -> f32 {
    PI
}

/// Output surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Multisample anti-aliasing
    #[serde(default = "default_true")]
    pub antialias: bool,
    /// Upper bound for the recorded pixel ratio. Natively it also caps the
    /// window scale factor.
    #[serde(default = "default_max_pixel_ratio")]
    pub max_pixel_ratio: f32,
    /// Quiet period before a burst of resize events settles into the recorded
    /// viewport. The surface and aspect ratio follow the window regardless.
    #[serde(default)]
    pub resize_debounce_ms: u64,
    /// Linear sRGB clear color shown before the environment arrives
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            max_pixel_ratio: default_max_pixel_ratio(),
            resize_debounce_ms: 0,
            clear_color: default_clear_color(),
        }
    }
}

fn default_max_pixel_ratio() -> f32 {
    2.0
}

fn default_clear_color() -> [f32; 3] {
    [0.05, 0.05, 0.05]
}

fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn ensure_at_most(field: &'static str, value: u32, max: u32) -> Result<(), ConfigError> {
    if value <= max {
        Ok(())
    } else {
        Err(ConfigError::TooLarge { field, value, max })
    }
}

fn ensure_path(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyPath { field })
    } else {
        Ok(())
    }
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            info!(path = %path.display(), "Loaded scene configuration");
            Ok(config)
        } else {
            info!(
                path = %path.display(),
                "Scene configuration not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Check every bound that would otherwise fail later inside the renderer
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_path("environment.path", &self.environment.path)?;
        if self.environment.cubemap_face_size == 0 {
            return Err(ConfigError::Zero {
                field: "environment.cubemap_face_size",
            });
        }
        ensure_at_most(
            "environment.cubemap_face_size",
            self.environment.cubemap_face_size,
            MAX_CUBEMAP_FACE_SIZE,
        )?;
        ensure_positive("environment.intensity", self.environment.intensity)?;
        ensure_positive(
            "environment.background_brightness",
            self.environment.background_brightness,
        )?;

        ensure_positive("skybox.radius", self.skybox.radius)?;
        ensure_positive("skybox.height", self.skybox.height)?;
        if !self.skybox.elevation.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "skybox.elevation",
                value: self.skybox.elevation,
            });
        }
        if self.skybox.resolution == 0 {
            return Err(ConfigError::Zero {
                field: "skybox.resolution",
            });
        }
        ensure_at_most(
            "skybox.resolution",
            self.skybox.resolution,
            MAX_SKYBOX_RESOLUTION,
        )?;

        ensure_path("model.path", &self.model.path)?;
        ensure_positive("model.scale", self.model.scale)?;

        let rate = self.animation.playback_rate;
        if !rate.is_finite() || rate == 0.0 {
            return Err(ConfigError::InvalidPlaybackRate(rate));
        }
        if self.animation.loop_policy == LoopPolicy::Count(0) {
            return Err(ConfigError::Zero {
                field: "animation.loop_policy.count",
            });
        }

        let fov = self.camera.fov_degrees;
        if !(fov.is_finite() && fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::InvalidFov(fov));
        }
        ensure_positive("camera.near", self.camera.near)?;
        if !(self.camera.far.is_finite() && self.camera.far > self.camera.near) {
            return Err(ConfigError::InvalidClipRange {
                near: self.camera.near,
                far: self.camera.far,
            });
        }

        let controls = &self.controls;
        let damping = controls.damping_factor;
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(ConfigError::InvalidDampingFactor(damping));
        }
        ensure_positive("controls.rotate_speed", controls.rotate_speed)?;
        ensure_positive("controls.pan_speed", controls.pan_speed)?;
        ensure_positive("controls.zoom_speed", controls.zoom_speed)?;
        if !(controls.min_distance.is_finite() && controls.min_distance >= 0.0) {
            return Err(ConfigError::InvalidDistanceRange {
                min: controls.min_distance,
                max: controls.max_distance.unwrap_or(f32::INFINITY),
            });
        }
        if let Some(max) = controls.max_distance {
            if !(controls.min_distance <= max) {
                return Err(ConfigError::InvalidDistanceRange {
                    min: controls.min_distance,
                    max,
                });
            }
        }
        let (min_polar, max_polar) = (controls.min_polar_angle, controls.max_polar_angle);
        if !(0.0 <= min_polar && min_polar <= max_polar && max_polar <= PI) {
            return Err(ConfigError::InvalidPolarRange {
                min: min_polar,
                max: max_polar,
            });
        }

        ensure_positive("renderer.max_pixel_ratio", self.renderer.max_pixel_ratio)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.environment.path, "sanctuary4k.hdr");
        assert_eq!(config.model.path, "digiDouble.glb");
        assert_eq!(config.model.scale, 3.0);
        assert_eq!(config.skybox.radius, 15.0);
        assert_eq!(config.skybox.height, 70.0);
        assert_eq!(config.skybox.elevation, 15.0);
        assert_eq!(config.animation.clip_index, 1);
        assert_eq!(config.animation.playback_rate, 0.75);
        assert_eq!(config.animation.loop_policy, LoopPolicy::Forever);
        assert_eq!(config.camera.position, [4.0, 5.0, 4.0]);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.controls.target, [0.0, 3.5, 0.0]);
        assert!(config.controls.enable_damping);
        assert!(!config.controls.enable_zoom);
        assert_eq!(config.renderer.max_pixel_ratio, 2.0);
        assert_eq!(config.renderer.resize_debounce_ms, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
[model]
scale = 2.5

[animation]
clip_index = 0
loop_policy = { count = 3 }
"#;
        let config = SceneConfig::from_toml(toml).unwrap();
        assert_eq!(config.model.scale, 2.5);
        assert_eq!(config.model.path, "digiDouble.glb");
        assert_eq!(config.animation.clip_index, 0);
        assert_eq!(config.animation.loop_policy, LoopPolicy::Count(3));
        assert_eq!(config.animation.playback_rate, 0.75);
        assert_eq!(config.skybox, SkyboxConfig::default());
    }

    #[test]
    fn test_loop_policy_strings() {
        let config = SceneConfig::from_toml("[animation]\nloop_policy = \"once\"\n").unwrap();
        assert_eq!(config.animation.loop_policy, LoopPolicy::Once);
        let config = SceneConfig::from_toml("[animation]\nloop_policy = \"forever\"\n").unwrap();
        assert_eq!(config.animation.loop_policy, LoopPolicy::Forever);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            ("[model]\nscale = 0.0\n", "model.scale"),
            ("[skybox]\nradius = -1.0\n", "skybox.radius"),
            ("[skybox]\nresolution = 0\n", "skybox.resolution"),
            ("[environment]\ncubemap_face_size = 0\n", "environment.cubemap_face_size"),
            ("[model]\npath = \"  \"\n", "model.path"),
        ];
        for (toml, field) in cases {
            let err = SceneConfig::from_toml(toml).unwrap_err();
            assert!(err.to_string().contains(field), "{toml} -> {err}");
        }

        let err = SceneConfig::from_toml("[animation]\nplayback_rate = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPlaybackRate(_)));

        let err = SceneConfig::from_toml("[animation]\nloop_policy = { count = 0 }\n").unwrap_err();
        assert!(matches!(err, ConfigError::Zero { .. }));

        let err = SceneConfig::from_toml("[camera]\nfov_degrees = 180.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFov(_)));

        let err = SceneConfig::from_toml("[camera]\nnear = 5.0\nfar = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClipRange { .. }));

        let err = SceneConfig::from_toml("[controls]\ndamping_factor = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDampingFactor(_)));

        let err = SceneConfig::from_toml("[controls]\nmin_distance = 4.0\nmax_distance = 2.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDistanceRange { .. }));

        let err = SceneConfig::from_toml("[controls]\nmin_polar_angle = 2.0\nmax_polar_angle = 1.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPolarRange { .. }));
    }

    #[test]
    fn test_rejects_oversized_textures_and_meshes() {
        let err = SceneConfig::from_toml("[environment]\ncubemap_face_size = 70000\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooLarge {
                field: "environment.cubemap_face_size",
                value: 70_000,
                max: MAX_CUBEMAP_FACE_SIZE,
            }
        ));

        let err = SceneConfig::from_toml("[skybox]\nresolution = 100000\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooLarge {
                field: "skybox.resolution",
                ..
            }
        ));

        let at_limit = format!("[environment]\ncubemap_face_size = {MAX_CUBEMAP_FACE_SIZE}\n");
        assert!(SceneConfig::from_toml(&at_limit).is_ok());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SceneConfig::from_toml("[model\nscale = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SceneConfig::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nposition = [1.0, 2.0, 3.0]").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.position, [1.0, 2.0, 3.0]);
        assert_eq!(config.camera.far, 100.0);
    }
}
