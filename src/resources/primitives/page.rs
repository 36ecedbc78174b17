//! Skinned page template.
//!
//! A page is a thin box subdivided along its turn axis. Every vertex is
//! bound to the two joints framing its column, weighted by how far along
//! the column it sits, so the page bends smoothly instead of folding
//! rigidly at each joint.

use glam::Vec3;

use crate::resources::geometry::{Attribute, Geometry, VertexFormat};

/// Material group indices of the six box faces.
pub mod material_slot {
    /// Outer page edge (+x).
    pub const EDGE_OUTER: usize = 0;
    /// Spine edge (-x).
    pub const EDGE_SPINE: usize = 1;
    pub const EDGE_TOP: usize = 2;
    pub const EDGE_BOTTOM: usize = 3;
    /// Front face (+z).
    pub const FRONT: usize = 4;
    /// Back face (-z).
    pub const BACK: usize = 5;
    pub const COUNT: usize = 6;
}

/// Geometry and skin bindings shared by every page of a book.
///
/// Built once; pages hold it behind an `Arc` and only own their skeleton.
#[derive(Debug)]
pub struct PageTemplate {
    pub geometry: Geometry,
    pub skin_indices: Vec<[u16; 4]>,
    pub skin_weights: Vec<[f32; 4]>,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub segments: u32,
}

impl PageTemplate {
    #[inline]
    #[must_use]
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.segments as usize + 1
    }
}

/// Accumulates the six planes of a segmented box.
struct BoxBuilder {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    groups: Vec<(u32, u32, usize)>,
}

impl BoxBuilder {
    /// Emits one face. `axes` maps the plane's (u, v, w) onto (x, y, z)
    /// indices; `depth` carries the sign of the face normal.
    fn plane(
        &mut self,
        axes: [usize; 3],
        udir: f32,
        vdir: f32,
        size: (f32, f32, f32),
        grid: (u32, u32),
        material_index: usize,
    ) {
        let [u, v, w] = axes;
        let (width, height, depth) = size;
        let (grid_x, grid_y) = grid;

        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;
        let width_half = width / 2.0;
        let height_half = height / 2.0;
        let depth_half = depth / 2.0;

        let grid_x1 = grid_x + 1;
        let vertex_start = self.positions.len() as u32;
        let index_start = self.indices.len() as u32;

        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height_half;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width_half;

                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = depth_half;
                self.positions.push(position);

                let mut normal = [0.0; 3];
                normal[w] = if depth > 0.0 { 1.0 } else { -1.0 };
                self.normals.push(normal);

                self.uvs
                    .push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
            }
        }

        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = vertex_start + ix + grid_x1 * iy;
                let b = vertex_start + ix + grid_x1 * (iy + 1);
                let c = vertex_start + (ix + 1) + grid_x1 * (iy + 1);
                let d = vertex_start + (ix + 1) + grid_x1 * iy;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let count = self.indices.len() as u32 - index_start;
        self.groups.push((index_start, count, material_index));
    }
}

/// Builds the shared page template.
///
/// The box has `segments` columns along x, 2 rows along y and 1 along z, and
/// is shifted so the spine edge lies on x = 0. Callers validate that
/// `segments >= 1` and the dimensions are positive.
#[must_use]
pub fn build_page_template(width: f32, height: f32, depth: f32, segments: u32) -> PageTemplate {
    const HEIGHT_SEGMENTS: u32 = 2;
    const DEPTH_SEGMENTS: u32 = 1;

    let mut b = BoxBuilder {
        positions: Vec::new(),
        normals: Vec::new(),
        uvs: Vec::new(),
        indices: Vec::new(),
        groups: Vec::with_capacity(material_slot::COUNT),
    };

    // (u, v, w) axis order per face, matching the material slot order
    b.plane(
        [2, 1, 0],
        -1.0,
        -1.0,
        (depth, height, width),
        (DEPTH_SEGMENTS, HEIGHT_SEGMENTS),
        material_slot::EDGE_OUTER,
    );
    b.plane(
        [2, 1, 0],
        1.0,
        -1.0,
        (depth, height, -width),
        (DEPTH_SEGMENTS, HEIGHT_SEGMENTS),
        material_slot::EDGE_SPINE,
    );
    b.plane(
        [0, 2, 1],
        1.0,
        1.0,
        (width, depth, height),
        (segments, DEPTH_SEGMENTS),
        material_slot::EDGE_TOP,
    );
    b.plane(
        [0, 2, 1],
        1.0,
        -1.0,
        (width, depth, -height),
        (segments, DEPTH_SEGMENTS),
        material_slot::EDGE_BOTTOM,
    );
    b.plane(
        [0, 1, 2],
        1.0,
        -1.0,
        (width, height, depth),
        (segments, HEIGHT_SEGMENTS),
        material_slot::FRONT,
    );
    b.plane(
        [0, 1, 2],
        -1.0,
        -1.0,
        (width, height, -depth),
        (segments, HEIGHT_SEGMENTS),
        material_slot::BACK,
    );

    let mut geometry = Geometry::new();
    geometry.set_attribute(
        "position",
        Attribute::new_planar(&b.positions, VertexFormat::Float32x3),
    );
    geometry.set_attribute("normal", Attribute::new_planar(&b.normals, VertexFormat::Float32x3));
    geometry.set_attribute("uv", Attribute::new_planar(&b.uvs, VertexFormat::Float32x2));
    geometry.set_indices(&b.indices);
    for (start, count, material_index) in b.groups {
        geometry.add_group(start, count, material_index);
    }

    // Rotate around the spine, not the page center
    geometry.translate(Vec3::new(width / 2.0, 0.0, 0.0));

    let (skin_indices, skin_weights) = compute_skin_bindings(&geometry, width, segments);
    geometry.set_attribute(
        "skin_index",
        Attribute::new_planar(&skin_indices, VertexFormat::Uint16x4),
    );
    geometry.set_attribute(
        "skin_weight",
        Attribute::new_planar(&skin_weights, VertexFormat::Float32x4),
    );

    log::debug!(
        "Built page template: {} vertices, {} segments, {} joints",
        geometry.vertex_count(),
        segments,
        segments + 1
    );

    PageTemplate {
        geometry,
        skin_indices,
        skin_weights,
        width,
        height,
        depth,
        segments,
    }
}

/// Binds each vertex to the pair of joints framing its column.
fn compute_skin_bindings(
    geometry: &Geometry,
    width: f32,
    segments: u32,
) -> (Vec<[u16; 4]>, Vec<[f32; 4]>) {
    let segment_width = width / segments as f32;
    let last_segment = segments.saturating_sub(1) as f32;

    let positions: Vec<[f32; 3]> = geometry
        .get_attribute("position")
        .map(|a| a.to_vec())
        .unwrap_or_default();

    let mut indices = Vec::with_capacity(positions.len());
    let mut weights = Vec::with_capacity(positions.len());

    for [x, _, _] in positions {
        // The outer edge lands exactly on the last joint; keep it inside the
        // last column with full weight rather than binding a joint that does not exist.
        let segment = (x / segment_width).floor().clamp(0.0, last_segment);
        let weight = ((x - segment * segment_width) / segment_width).clamp(0.0, 1.0);

        let j = segment as u16;
        indices.push([j, j + 1, 0, 0]);
        weights.push([1.0 - weight, weight, 0.0, 0.0]);
    }

    (indices, weights)
}
