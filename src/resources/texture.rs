use uuid::Uuid;

use crate::resources::image::Image;

/// How sampled values should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Color artwork (page faces, covers).
    #[default]
    Srgb,
    /// Data maps (roughness).
    Linear,
}

/// A decoded image ready to be uploaded and sampled.
#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,
    pub image: Image,
    pub color_space: ColorSpace,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str, image: Image, color_space: ColorSpace) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            image,
            color_space,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
