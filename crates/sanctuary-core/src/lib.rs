//! Sanctuary Core - Scene configuration, lifecycle, and math
//!
//! Engine-independent pieces of the Sanctuary scene:
//! - Validated scene configuration loaded from TOML
//! - Mount lifecycle with single-shot teardown
//! - Trailing-edge debounce and the resize handler built on it
//! - Damped orbit controls
//! - Ground-projected skybox geometry
//! - HDR panorama decoding and cubemap resampling
//! - Animation clip selection

pub mod animation;
pub mod config;
pub mod debounce;
pub mod diagnostics;
pub mod environment;
pub mod lifecycle;
pub mod orbit;
pub mod skybox;
pub mod viewport;

pub use animation::{AnimationError, LoopPolicy, PlaybackPlan};
pub use config::{
    AnimationConfig, CameraConfig, ConfigError, ControlsConfig, EnvironmentConfig, ModelConfig,
    RendererConfig, SceneConfig, SkyboxConfig,
};
pub use debounce::Debouncer;
pub use diagnostics::{Diagnostics, FailureKind, SceneFailure};
pub use environment::{CubeFace, CubeFaces, EnvironmentError, EnvironmentSlots, EquirectImage};
pub use lifecycle::{Lifecycle, LifecycleError, Phase, Release, ReleaseReport};
pub use orbit::OrbitControls;
pub use skybox::{GroundedSkybox, SkyboxError};
pub use viewport::{ResizeHandler, Viewport};
