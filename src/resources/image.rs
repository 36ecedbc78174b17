use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use uuid::Uuid;

// Global Image ID generator
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Edge length of the generated blank page image.
pub const BLANK_PAGE_SIZE: u32 = 64;

#[derive(Debug)]
pub struct ImageInner {
    pub id: u64,
    pub uuid: Uuid,
    label: Cow<'static, str>,

    pub width: u32,
    pub height: u32,

    /// Tightly packed RGBA8 pixels
    pub data: Vec<u8>,
}

impl ImageInner {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Decoded RGBA8 pixels, cheap to clone.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for Image {}
impl std::hash::Hash for Image {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Image {
    #[must_use]
    pub fn new(label: Option<&str>, width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self(Arc::new(ImageInner {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            uuid: Uuid::new_v4(),
            label: label.map_or(Cow::Borrowed("Unnamed Image"), |s| {
                Cow::Owned(s.to_string())
            }),
            width,
            height,
            data,
        }))
    }

    /// A square image filled with one color.
    #[must_use]
    pub fn solid(label: &str, size: u32, rgba: [u8; 4]) -> Self {
        let pixels = image::RgbaImage::from_pixel(size, size, image::Rgba(rgba));
        Self::new(Some(label), size, size, pixels.into_raw())
    }

    /// The solid white square used for blank pages.
    ///
    /// Generated on first use; every later call returns the same image.
    #[must_use]
    pub fn blank_page() -> Self {
        static BLANK: OnceLock<Image> = OnceLock::new();
        BLANK
            .get_or_init(|| Self::solid("BlankPage", BLANK_PAGE_SIZE, [255, 255, 255, 255]))
            .clone()
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y * self.width() + x) * 4) as usize;
        let p = self.0.data.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

// Deref for convenient read-only access to inner data
impl std::ops::Deref for Image {
    type Target = ImageInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
