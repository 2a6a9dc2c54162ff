//! Ground-projected skybox geometry
//!
//! A UV sphere viewed from the inside whose lower hemisphere is squashed
//! onto a flat floor `height` units below the projection center, with a
//! smooth blend between the floor and the dome. Texture coordinates follow
//! the equirectangular lookup in [`crate::environment`], so the dome and the
//! background agree on where each part of the panorama lands.

use bevy_math::Vec3;
use std::f32::consts::{PI, TAU};
use thiserror::Error;

use crate::config::SkyboxConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyboxError {
    #[error("Skybox {name} must be greater than zero, got {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

/// Triangle mesh of the dome, ready for upload
#[derive(Debug, Clone)]
pub struct GroundedSkybox {
    pub radius: f32,
    pub height: f32,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Unit direction for an equirect coordinate; inverse of the panorama lookup
pub fn direction_for_uv(u: f32, v: f32) -> Vec3 {
    let theta = (u - 0.5) * TAU;
    let phi = v * PI;
    Vec3::new(phi.sin() * theta.sin(), phi.cos(), -phi.sin() * theta.cos())
}

/// Pull a point of the lower hemisphere onto the floor at `-height`
pub fn ground_project(position: Vec3, height: f32) -> Vec3 {
    if position.y >= 0.0 {
        return position;
    }
    let y1 = -height * 3.0 / 2.0;
    let f = if position.y < y1 {
        -height / position.y
    } else {
        1.0 - position.y * position.y / (3.0 * y1 * y1)
    };
    position * f
}

impl GroundedSkybox {
    pub fn new(radius: f32, height: f32, resolution: u32) -> Result<Self, SkyboxError> {
        for (name, value) in [
            ("radius", radius),
            ("height", height),
            ("resolution", resolution as f32),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SkyboxError::InvalidParameter { name, value });
            }
        }

        let rows = resolution as usize;
        let columns = rows * 2;
        let vertex_count = (rows + 1) * (columns + 1);
        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        for iy in 0..=rows {
            let v = iy as f32 / rows as f32;
            for ix in 0..=columns {
                let u = ix as f32 / columns as f32;
                let direction = direction_for_uv(u, v);
                positions.push(ground_project(direction * radius, height).to_array());
                normals.push((-direction).to_array());
                uvs.push([u, v]);
            }
        }

        let stride = columns + 1;
        let index = |iy: usize, ix: usize| (iy * stride + ix) as u32;
        let mut indices = Vec::with_capacity(columns * rows.saturating_sub(1) * 6);
        for iy in 0..rows {
            for ix in 0..columns {
                let a = index(iy, ix);
                let b = index(iy + 1, ix);
                let c = index(iy, ix + 1);
                let d = index(iy + 1, ix + 1);
                // The first and last rows meet at a pole; skip the degenerate half.
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, c]);
                }
                if iy != rows - 1 {
                    indices.extend_from_slice(&[c, b, d]);
                }
            }
        }

        Ok(Self {
            radius,
            height,
            positions,
            normals,
            uvs,
            indices,
        })
    }

    pub fn from_config(config: &SkyboxConfig) -> Result<Self, SkyboxError> {
        Self::new(config.radius, config.height, config.resolution)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
