use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine3A, Vec3, Vec4};
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Component layout of one vertex attribute element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    Uint16x4,
}

impl VertexFormat {
    #[must_use]
    pub fn size(self) -> u64 {
        match self {
            Self::Float32x2 | Self::Uint16x4 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 => 16,
        }
    }
}

/// Attribute holds CPU-side vertex data and its layout metadata.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Raw bytes shared via Arc so cloned geometries stay cheap
    pub data: Arc<Vec<u8>>,

    /// Data version for change detection
    pub version: u64,

    pub format: VertexFormat,
    pub count: u32,
    pub stride: u64,
}

static NEXT_ATTR_VERSION: AtomicU64 = AtomicU64::new(1);

impl Attribute {
    /// Creates a planar (non-interleaved) attribute.
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        debug_assert_eq!(std::mem::size_of::<T>() as u64, format.size());
        Self {
            data: Arc::new(bytemuck::cast_slice(data).to_vec()),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
        }
    }

    pub fn read<T>(&self, i: u32) -> Option<T>
    where
        T: bytemuck::Pod,
    {
        let size = std::mem::size_of::<T>();
        let offset = (i as usize) * self.stride as usize;
        let bytes = self.data.get(offset..offset + size)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn read_vec3(&self, i: u32) -> Option<Vec3> {
        if self.format != VertexFormat::Float32x3 {
            return None;
        }
        self.read::<[f32; 3]>(i).map(Vec3::from_array)
    }

    pub fn read_vec4(&self, i: u32) -> Option<Vec4> {
        if self.format != VertexFormat::Float32x4 {
            return None;
        }
        self.read::<[f32; 4]>(i).map(Vec4::from_array)
    }

    /// Copies the whole attribute out as typed elements.
    #[must_use]
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Vec<T> {
        self.data
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);
        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self {
            min: new_min,
            max: new_max,
        }
    }
}

#[derive(Debug)]
pub struct Geometry {
    pub uuid: Uuid,
    attributes: FxHashMap<String, Attribute>,
    indices: Vec<u32>,
    groups: Vec<GeometryGroup>,
    bounding_box: Option<BoundingBox>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            attributes: FxHashMap::default(),
            indices: Vec::new(),
            groups: Vec::new(),
            bounding_box: None,
        }
    }

    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        self.attributes.insert(name.to_string(), attr);
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn set_indices(&mut self, indices: &[u32]) {
        self.indices = indices.to_vec();
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn add_group(&mut self, start: u32, count: u32, material_index: usize) {
        self.groups.push(GeometryGroup {
            start,
            count,
            material_index,
        });
    }

    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    /// Number of vertices, taken from the position attribute.
    pub fn vertex_count(&self) -> u32 {
        self.get_attribute("position").map_or(0, |a| a.count)
    }

    /// Moves every position by `offset` and refreshes the bounds.
    pub fn translate(&mut self, offset: Vec3) {
        let Some(position) = self.attributes.get("position") else {
            return;
        };
        let moved: Vec<[f32; 3]> = position
            .to_vec::<[f32; 3]>()
            .into_iter()
            .map(|p| (Vec3::from_array(p) + offset).to_array())
            .collect();
        self.set_attribute("position", Attribute::new_planar(&moved, VertexFormat::Float32x3));
        self.compute_bounding_volume();
    }

    pub fn compute_bounding_volume(&mut self) {
        let Some(position) = self.attributes.get("position") else {
            self.bounding_box = None;
            return;
        };
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in position.to_vec::<[f32; 3]>() {
            let p = Vec3::from_array(p);
            min = min.min(p);
            max = max.max(p);
        }
        self.bounding_box = (position.count > 0).then_some(BoundingBox { min, max });
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }
}
