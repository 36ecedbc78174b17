use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::assets::{AssetServer, ImageSource, TextureSlot};
use crate::resources::texture::ColorSpace;
use crate::utils::SmoothDamp;

/// Glow color applied while the pointer is over a page.
pub const HOVER_EMISSIVE: Vec3 = Vec3::new(1.0, 0.647, 0.0);

pub const PAGE_WHITE: Vec4 = Vec4::ONE;
/// `#111`
pub const SPINE_COLOR: Vec4 = Vec4::new(0.067, 0.067, 0.067, 1.0);

/// Roughness of printed page faces without a roughness map.
const FACE_ROUGHNESS: f32 = 0.1;

/// Physically-based material of one page face.
///
/// Edge materials are plain colors. Front and back faces carry the page
/// image in `map`; until it resolves they render as [`PAGE_WHITE`].
#[derive(Debug)]
pub struct PageMaterial {
    pub uuid: Uuid,
    pub color: Vec4,
    pub roughness: f32,
    pub emissive: Vec3,
    pub emissive_intensity: SmoothDamp,
    pub map: TextureSlot,
    pub roughness_map: TextureSlot,
    version: u64,
}

impl PageMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            roughness: 1.0,
            emissive: Vec3::ZERO,
            emissive_intensity: SmoothDamp::new(0.0),
            map: TextureSlot::Empty,
            roughness_map: TextureSlot::Empty,
            version: 0,
        }
    }

    /// White edge around the text block.
    #[must_use]
    pub fn edge() -> Self {
        Self::new(PAGE_WHITE)
    }

    /// Dark spine edge.
    #[must_use]
    pub fn spine() -> Self {
        Self::new(SPINE_COLOR)
    }

    /// A printed face. Loading starts immediately; the roughness map, when
    /// present, replaces the flat face roughness.
    #[must_use]
    pub fn face(
        assets: &AssetServer,
        map: &ImageSource,
        roughness_map: Option<&ImageSource>,
    ) -> Self {
        let mut material = Self::new(PAGE_WHITE);
        material.emissive = HOVER_EMISSIVE;
        material.map = assets.load_texture(map, ColorSpace::Srgb);
        match roughness_map {
            Some(source) => {
                material.roughness_map = assets.load_texture(source, ColorSpace::Linear);
            }
            None => material.roughness = FACE_ROUGHNESS,
        }
        material
    }

    /// True until the face image is ready: still decoding, failed, or never requested.
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        !matches!(self.map, TextureSlot::Ready(_))
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Advances pending texture loads. Bumps the version when a map changes.
    pub fn poll_textures(&mut self, assets: &AssetServer) {
        let changed = self.map.poll(assets) | self.roughness_map.poll(assets);
        if changed {
            self.version = self.version.wrapping_add(1);
        }
    }

    /// Damps the hover glow toward `target`.
    pub fn update_emissive(&mut self, target: f32, smooth_time: f32, dt: f32) {
        if self.emissive_intensity.step(target, smooth_time, dt) {
            self.version = self.version.wrapping_add(1);
        }
    }
}

impl Default for PageMaterial {
    fn default() -> Self {
        Self::edge()
    }
}
