//! Damped orbit camera controller
//!
//! The camera sits on a sphere around `target`. Pointer input accumulates
//! rotation and pan deltas; each [`OrbitControls::update`] applies a fraction
//! of the pending delta when damping is enabled, so motion eases out over
//! the following frames. Zoom can be disabled entirely, in which case scroll
//! input never changes the orbit radius.

use bevy_math::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::config::ControlsConfig;

/// Keeps the camera off the poles, where the up vector degenerates
const POLE_EPSILON: f32 = 1e-5;

/// Base scale for one scroll step
const ZOOM_STEP: f32 = 0.95;

/// Radius, polar angle from +Y, and azimuth around +Y
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,
    settings: ControlsConfig,
}

impl OrbitControls {
    pub fn new(position: Vec3, settings: &ControlsConfig) -> Self {
        let target = Vec3::from_array(settings.target);
        Self {
            target,
            spherical: Spherical::from_offset(position - target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            settings: settings.clone(),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn zoom_enabled(&self) -> bool {
        self.settings.enable_zoom
    }

    pub fn damping_enabled(&self) -> bool {
        self.settings.enable_damping
    }

    /// Drag by `delta` pixels; a full viewport height is one full turn
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.settings.enable_rotate || viewport_height <= 0.0 {
            return;
        }
        let speed = self.settings.rotate_speed;
        self.delta_theta -= TAU * delta.x / viewport_height * speed;
        self.delta_phi -= TAU * delta.y / viewport_height * speed;
    }

    /// Screen-space pan; `fov` is the vertical field of view in radians
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, fov: f32) {
        if !self.settings.enable_pan || viewport_height <= 0.0 {
            return;
        }
        let offset = self.spherical.to_offset();
        let target_distance = offset.length() * (fov / 2.0).tan();
        let (right, up) = camera_basis(offset);

        let speed = self.settings.pan_speed;
        let left = 2.0 * delta.x * target_distance / viewport_height * speed;
        let upward = 2.0 * delta.y * target_distance / viewport_height * speed;
        self.pan_offset += right * -left + up * upward;
    }

    /// Apply a scroll step. Positive values move toward the target.
    ///
    /// Returns false without touching any state when zoom is disabled.
    pub fn zoom(&mut self, scroll: f32) -> bool {
        if !self.settings.enable_zoom || scroll == 0.0 {
            return false;
        }
        let step = ZOOM_STEP.powf(self.settings.zoom_speed);
        if scroll > 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
        true
    }

    /// Advance one frame and return the new camera position
    pub fn update(&mut self) -> Vec3 {
        let damping = self.settings.enable_damping;
        let factor = if damping {
            self.settings.damping_factor
        } else {
            1.0
        };

        self.spherical.theta += self.delta_theta * factor;
        self.spherical.phi += self.delta_phi * factor;

        let min_phi = self.settings.min_polar_angle.max(POLE_EPSILON);
        let max_phi = self.settings.max_polar_angle.min(PI - POLE_EPSILON);
        self.spherical.phi = self.spherical.phi.clamp(min_phi, max_phi.max(min_phi));

        let max_distance = self.settings.max_distance.unwrap_or(f32::INFINITY);
        self.spherical.radius = (self.spherical.radius * self.scale)
            .clamp(self.settings.min_distance, max_distance.max(self.settings.min_distance));

        self.target += self.pan_offset * factor;

        if damping {
            let retain = 1.0 - factor;
            self.delta_theta *= retain;
            self.delta_phi *= retain;
            self.pan_offset *= retain;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        self.position()
    }

    /// Whether any damped motion is still pending
    pub fn is_settled(&self) -> bool {
        self.delta_theta.abs() < 1e-6
            && self.delta_phi.abs() < 1e-6
            && self.pan_offset.length_squared() < 1e-12
    }
}

/// Camera right and up vectors for a camera at `offset` looking at the origin
fn camera_basis(offset: Vec3) -> (Vec3, Vec3) {
    let forward = (-offset).normalize_or_zero();
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    let up = right.cross(forward);
    (right, up)
}
