//! Core resource definitions.
//!
//! CPU-side data a renderer uploads, independent of any GPU backend:
//! - Geometry: vertex attributes, indices and material groups
//! - Image: decoded RGBA8 pixels
//! - Texture: an image plus its color space
//! - Material: per-face page material state
//! - Primitives: the skinned page template

pub mod geometry;
pub mod image;
pub mod material;
pub mod primitives;
pub mod texture;

pub use geometry::{Attribute, BoundingBox, Geometry, GeometryGroup, VertexFormat};
pub use image::Image;
pub use material::PageMaterial;
pub use primitives::{PageTemplate, build_page_template, material_slot};
pub use texture::{ColorSpace, Texture};
