//! Scene placement.
//!
//! - [`Transform`]: TRS component with cached matrices
//! - [`Skeleton`]: the joint chain skinning one page
//! - [`SceneComposer`]: book root and camera framing

pub mod composer;
pub mod skeleton;
pub mod transform;

pub use composer::{Breakpoint, SceneComposer, ViewportProfile};
pub use skeleton::Skeleton;
pub use transform::Transform;
