pub mod server;
pub mod source;
pub mod storage;

pub use server::{
    AssetServer, PendingTexture, TextureHandle, TextureRef, TextureSlot, TextureStorage,
};
pub use source::{BuiltinArt, ImageRef, ImageSource};
pub use storage::AssetStorage;
