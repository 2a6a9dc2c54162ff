//! HDR environment map processing
//!
//! Decodes an equirectangular Radiance `.hdr` panorama, resamples it into the
//! six faces of a cubemap for background and image-based lighting, packs
//! texels as half floats for upload, and tracks which scene slots the
//! loaded map is bound to.

use bevy_math::Vec3;
use std::f32::consts::{PI, TAU};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Failed to decode HDR image: {0}")]
    DecodeError(#[from] image::ImageError),
    #[error("Environment map has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("Environment map expected {expected} RGB samples, got {actual}")]
    SampleCount { expected: usize, actual: usize },
    #[error("Cubemap face size must be at least 1")]
    ZeroFaceSize,
}

/// Largest finite half-float; brighter texels are clamped to it
const HALF_MAX: f32 = 65504.0;

/// Linear RGB panorama, row 0 at the zenith.
///
/// Samples stay in the decoder's flat buffer; a 4k panorama is large enough
/// that an extra per-texel copy matters in the browser.
#[derive(Debug, Clone)]
pub struct EquirectImage {
    width: u32,
    height: u32,
    rgb: Vec<f32>,
}

impl EquirectImage {
    pub fn new(width: u32, height: u32, rgb: Vec<f32>) -> Result<Self, EnvironmentError> {
        if width == 0 || height == 0 {
            return Err(EnvironmentError::Empty { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(EnvironmentError::SampleCount {
                expected,
                actual: rgb.len(),
            });
        }
        Ok(Self { width, height, rgb })
    }

    /// Decode a Radiance RGBE file
    pub fn decode_hdr(bytes: &[u8]) -> Result<Self, EnvironmentError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)?;
        let rgb = decoded.into_rgb32f();
        let (width, height) = rgb.dimensions();
        Self::new(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2], 1.0]
    }

    /// Bilinear lookup along a world direction.
    ///
    /// Wraps around the horizon and clamps at the poles.
    pub fn sample(&self, direction: Vec3) -> [f32; 4] {
        let (u, v) = equirect_uv(direction);
        let fx = u * self.width as f32 - 0.5;
        let fy = (v * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = fx.floor();
        let tx = fx - x0;
        let y0 = fy.floor();
        let ty = fy - y0;

        let width = self.width as i64;
        let wrap = |x: i64| x.rem_euclid(width) as u32;
        let x0 = x0 as i64;
        let (xa, xb) = (wrap(x0), wrap(x0 + 1));
        let ya = y0 as u32;
        let yb = (ya + 1).min(self.height - 1);

        let top = lerp4(self.texel(xa, ya), self.texel(xb, ya), tx);
        let bottom = lerp4(self.texel(xa, yb), self.texel(xb, yb), tx);
        lerp4(top, bottom, ty)
    }

    /// Resample into cubemap faces
    pub fn to_cube_faces(&self, face_size: u32) -> Result<CubeFaces, EnvironmentError> {
        if face_size == 0 {
            return Err(EnvironmentError::ZeroFaceSize);
        }
        let size = face_size as usize;
        let mut texels = Vec::with_capacity(size * size * 6);
        for face in CubeFace::ALL {
            for y in 0..face_size {
                for x in 0..face_size {
                    let s = 2.0 * (x as f32 + 0.5) / face_size as f32 - 1.0;
                    let t = 2.0 * (y as f32 + 0.5) / face_size as f32 - 1.0;
                    texels.push(self.sample(face.world_direction(s, t)));
                }
            }
        }
        Ok(CubeFaces { face_size, texels })
    }

    /// Half-float RGBA texels of the panorama itself
    pub fn to_rgba16f(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.rgb.len() / 3 * 8);
        for rgb in self.rgb.chunks_exact(3) {
            push_rgba16f(&mut bytes, [rgb[0], rgb[1], rgb[2], 1.0]);
        }
        bytes
    }
}

/// Equirect coordinates for a direction; u = 0.5 faces -Z, v = 0 is +Y
pub fn equirect_uv(direction: Vec3) -> (f32, f32) {
    let d = direction.normalize_or(Vec3::NEG_Z);
    let u = 0.5 + d.x.atan2(-d.z) / TAU;
    let v = d.y.clamp(-1.0, 1.0).acos() / PI;
    (u, v)
}

fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [0, 1, 2, 3].map(|i| a[i] + (b[i] - a[i]) * t)
}

/// Cubemap layers in upload order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Lookup vector of a face texel, `s` and `t` in [-1, 1], t down the face
    pub fn lookup_direction(self, s: f32, t: f32) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::new(1.0, -t, -s),
            CubeFace::NegativeX => Vec3::new(-1.0, -t, s),
            CubeFace::PositiveY => Vec3::new(s, 1.0, t),
            CubeFace::NegativeY => Vec3::new(s, -1.0, -t),
            CubeFace::PositiveZ => Vec3::new(s, -t, 1.0),
            CubeFace::NegativeZ => Vec3::new(-s, -t, -1.0),
        }
    }

    /// World direction shown by a face texel.
    ///
    /// The renderer samples cubemaps with z negated, so the face texel seen
    /// along world direction `d` is the one with lookup vector `(d.x, d.y, -d.z)`.
    pub fn world_direction(self, s: f32, t: f32) -> Vec3 {
        self.lookup_direction(s, t) * Vec3::new(1.0, 1.0, -1.0)
    }
}

/// Six square faces stored back to back
#[derive(Debug, Clone)]
pub struct CubeFaces {
    pub face_size: u32,
    pub texels: Vec<[f32; 4]>,
}

impl CubeFaces {
    /// Texels of one face; empty if `texels` does not hold it
    pub fn face(&self, face: CubeFace) -> &[[f32; 4]] {
        let size = self.face_size as usize;
        let len = size * size;
        let start = face as usize * len;
        self.texels.get(start..start + len).unwrap_or_default()
    }

    pub fn to_rgba16f(&self) -> Vec<u8> {
        encode_rgba16f(&self.texels)
    }
}

/// Pack linear texels as little-endian RGBA16F
pub fn encode_rgba16f(texels: &[[f32; 4]]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(texels.len() * 8);
    for texel in texels {
        push_rgba16f(&mut bytes, *texel);
    }
    bytes
}

fn push_rgba16f(bytes: &mut Vec<u8>, texel: [f32; 4]) {
    for channel in texel {
        let value = if channel.is_nan() {
            0.0
        } else {
            channel.clamp(-HALF_MAX, HALF_MAX)
        };
        bytes.extend_from_slice(&half::f16::from_f32(value).to_le_bytes());
    }
}

/// Scene slots fed by the environment map
#[derive(Debug, Clone)]
pub struct EnvironmentSlots<H> {
    background: Option<H>,
    environment: Option<H>,
}

impl<H> Default for EnvironmentSlots<H> {
    fn default() -> Self {
        Self {
            background: None,
            environment: None,
        }
    }
}

impl<H: Clone> EnvironmentSlots<H> {
    /// Use one map as both backdrop and lighting source
    pub fn bind(&mut self, map: H) {
        self.background = Some(map.clone());
        self.environment = Some(map);
    }

    pub fn background(&self) -> Option<&H> {
        self.background.as_ref()
    }

    pub fn environment(&self) -> Option<&H> {
        self.environment.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.background.is_some() && self.environment.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::hdr::HdrEncoder;
    use image::Rgb;

    /// 8x4 panorama whose red channel encodes the column and green the row
    fn gradient() -> EquirectImage {
        let (width, height) = (8, 4);
        let rgb = (0..height)
            .flat_map(|y| (0..width).flat_map(move |x| [x as f32, y as f32, 0.0]))
            .collect();
        EquirectImage::new(width, height, rgb).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_mismatched() {
        assert!(matches!(
            EquirectImage::new(0, 4, vec![]),
            Err(EnvironmentError::Empty { .. })
        ));
        assert!(matches!(
            EquirectImage::new(2, 2, vec![0.0; 9]),
            Err(EnvironmentError::SampleCount {
                expected: 12,
                actual: 9
            })
        ));
        assert!(matches!(
            gradient().to_cube_faces(0),
            Err(EnvironmentError::ZeroFaceSize)
        ));
    }

    #[test]
    fn test_decode_hdr_round_trip() {
        let (width, height) = (4usize, 2usize);
        let source: Vec<Rgb<f32>> = (0..width * height)
            .map(|i| Rgb([0.5 + i as f32, 1.0, 2.0]))
            .collect();
        let mut bytes = Vec::new();
        HdrEncoder::new(&mut bytes)
            .encode(&source, width, height)
            .unwrap();

        let image = EquirectImage::decode_hdr(&bytes).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        for (i, expected) in source.iter().enumerate() {
            let decoded = image.texel((i % width) as u32, (i / width) as u32);
            for channel in 0..3 {
                let want = expected.0[channel];
                assert!((decoded[channel] - want).abs() <= want * 0.02, "{decoded:?} vs {expected:?}");
            }
            assert_eq!(decoded[3], 1.0);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = EquirectImage::decode_hdr(b"not a radiance file").unwrap_err();
        assert!(matches!(err, EnvironmentError::DecodeError(_)));
    }

    #[test]
    fn test_uv_convention() {
        let (u, v) = equirect_uv(Vec3::NEG_Z);
        assert!((u - 0.5).abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
        let (_, v) = equirect_uv(Vec3::Y);
        assert!(v.abs() < 1e-6);
        let (u, _) = equirect_uv(Vec3::X);
        assert!((u - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_sample_wraps_horizontally() {
        let image = gradient();
        // At +Z the lookup straddles the seam and blends the last column (7)
        // with the first (0)
        let texel = image.sample(Vec3::new(-1e-4, 0.0, 1.0));
        assert!((texel[0] - 3.5).abs() < 0.01, "{texel:?}");
        // Zenith clamps to the first row
        assert_eq!(image.sample(Vec3::Y)[1], 0.0);
        assert_eq!(image.sample(Vec3::NEG_Y)[1], 3.0);
    }

    #[test]
    fn test_cube_faces_layout() {
        let image = gradient();
        let faces = image.to_cube_faces(4).unwrap();
        assert_eq!(faces.texels.len(), 6 * 16);
        assert_eq!(faces.to_rgba16f().len(), 6 * 16 * 8);

        // +Y looks at the zenith row, -Y at the nadir row
        assert!(faces.face(CubeFace::PositiveY).iter().all(|t| t[1] < 1.0));
        assert!(faces.face(CubeFace::NegativeY).iter().all(|t| t[1] > 2.0));
    }

    #[test]
    fn test_face_of_huge_layout_does_not_overflow() {
        let faces = CubeFaces {
            face_size: 70_000,
            texels: Vec::new(),
        };
        assert!(faces.face(CubeFace::NegativeZ).is_empty());
    }

    #[test]
    fn test_cube_lookup_flips_z() {
        // Center of the +Z layer shows world -Z, the middle of the panorama
        let d = CubeFace::PositiveZ.world_direction(0.0, 0.0);
        assert_eq!(d, Vec3::NEG_Z);
        let (u, _) = equirect_uv(d);
        assert!((u - 0.5).abs() < 1e-6);
        assert_eq!(CubeFace::PositiveX.world_direction(0.0, 0.0), Vec3::X);
    }

    #[test]
    fn test_rgba16f_encoding() {
        let bytes = encode_rgba16f(&[[1.0, 0.5, 1e9, f32::NAN]]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 0x3c00);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 0x3800);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 0x7bff);
        assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 0x0000);
    }

    #[test]
    fn test_slots_share_one_map() {
        let mut slots: EnvironmentSlots<u64> = EnvironmentSlots::default();
        assert!(!slots.is_bound());
        assert_eq!(slots.background(), None);
        slots.bind(42);
        assert!(slots.is_bound());
        assert_eq!(slots.background(), Some(&42));
        assert_eq!(slots.background(), slots.environment());
    }
}
