#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod assets;
pub mod book;
pub mod errors;
pub mod flipbook;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod utils;

pub use assets::{AssetServer, ImageRef, ImageSource, TextureHandle, TextureRef, TextureSlot};
pub use book::{
    BookLayout, BookState, CoverMode, Face, Focus, Page, PageFace, PageRecord, SpreadSurfaces,
};
pub use errors::{FlipbookError, Result};
pub use flipbook::{FaceHit, Flipbook, FlipbookEvent, page_label};
pub use resources::{
    ColorSpace, Geometry, Image, PageMaterial, PageTemplate, Texture, build_page_template,
};
pub use scene::{Breakpoint, SceneComposer, Skeleton, Transform};
pub use settings::BookSettings;
pub use utils::{FrameTime, SmoothDamp, Timer};
