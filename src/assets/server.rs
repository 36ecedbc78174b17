use slotmap::new_key_type;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::source::{ImageSource, decode_data_uri, is_data_uri};
use crate::assets::storage::AssetStorage;
use crate::errors::{FlipbookError, Result};
use crate::resources::image::Image;
use crate::resources::texture::{ColorSpace, Texture};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::OnceLock;
#[cfg(not(target_arch = "wasm32"))]
use tokio::runtime::Runtime;

#[cfg(not(target_arch = "wasm32"))]
fn get_asset_runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| match Runtime::new() {
            Ok(rt) => Some(rt),
            Err(e) => {
                log::error!("Failed to create asset loader runtime, decoding inline: {e}");
                None
            }
        })
        .as_ref()
}

// Strongly-typed handles
new_key_type! {
    pub struct TextureHandle;
}

pub type TextureStorage = AssetStorage<TextureHandle, Texture>;

/// One counted reference to a stored texture.
///
/// Dropping the last reference to a texture removes it from storage, so a
/// texture lives exactly as long as some page face shows it.
pub struct TextureRef {
    handle: TextureHandle,
    textures: Arc<TextureStorage>,
}

impl TextureRef {
    #[inline]
    #[must_use]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[must_use]
    pub fn texture(&self) -> Option<Arc<Texture>> {
        self.textures.get(self.handle)
    }
}

impl Clone for TextureRef {
    fn clone(&self) -> Self {
        self.textures.retain(self.handle);
        Self {
            handle: self.handle,
            textures: Arc::clone(&self.textures),
        }
    }
}

impl Drop for TextureRef {
    fn drop(&mut self) {
        if self.textures.release(self.handle) {
            log::trace!("Released texture {:?}", self.handle);
        }
    }
}

impl std::fmt::Debug for TextureRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TextureRef").field(&self.handle).finish()
    }
}

// ============================================================================
// Texture Slots
// ============================================================================

/// A texture whose decode is still running off-thread.
#[derive(Debug)]
pub struct PendingTexture {
    key: String,
    label: String,
    color_space: ColorSpace,
    receiver: flume::Receiver<Result<Image>>,
}

/// Load state of one material map.
///
/// Faces start `Pending` and keep rendering the placeholder material until
/// [`TextureSlot::poll`] observes the decoded image.
#[derive(Debug, Default)]
pub enum TextureSlot {
    /// No image requested.
    #[default]
    Empty,
    Pending(PendingTexture),
    Ready(TextureRef),
    /// The source could not be read or decoded; the placeholder stays.
    Failed,
}

impl TextureSlot {
    /// Returns the handle once the texture is usable.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<TextureHandle> {
        match self {
            Self::Ready(texture) => Some(texture.handle()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Checks a pending load without blocking. Returns `true` when the slot changed state.
    pub fn poll(&mut self, assets: &AssetServer) -> bool {
        let Self::Pending(pending) = self else {
            return false;
        };

        let next = match pending.receiver.try_recv() {
            Ok(Ok(image)) => {
                let texture = Texture::new(&pending.label, image, pending.color_space);
                Self::Ready(assets.store(&pending.key, texture))
            }
            Ok(Err(e)) => {
                log::warn!("Failed to load texture {}: {e}", pending.label);
                Self::Failed
            }
            Err(flume::TryRecvError::Empty) => return false,
            Err(flume::TryRecvError::Disconnected) => {
                log::warn!("{}", FlipbookError::LoaderDisconnected(pending.label.clone()));
                Self::Failed
            }
        };
        *self = next;
        true
    }
}

// ============================================================================
// Asset Server
// ============================================================================

/// Loads page artwork and owns the decoded textures.
///
/// Cheap to clone; clones share storage.
#[derive(Clone)]
pub struct AssetServer {
    pub textures: Arc<TextureStorage>,
    root: Arc<PathBuf>,
}

impl Default for AssetServer {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetServer {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            textures: Arc::new(AssetStorage::new()),
            root: Arc::new(root.as_ref().to_path_buf()),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts loading `source` and returns its slot.
    ///
    /// The blank page and anything already decoded resolve immediately;
    /// everything else is decoded in the background.
    pub fn load_texture(&self, source: &ImageSource, color_space: ColorSpace) -> TextureSlot {
        let key = source.cache_key();
        if let Some(handle) = self.textures.acquire_by_key(&key) {
            return TextureSlot::Ready(self.lease(handle));
        }

        if matches!(source, ImageSource::Blank) {
            let texture = Texture::new(&key, Image::blank_page(), color_space);
            return TextureSlot::Ready(self.store(&key, texture));
        }

        let label = source.label();
        let (sender, receiver) = flume::bounded(1);
        self.spawn_load(source.clone(), label.clone(), sender);

        log::debug!("Loading texture {label}");
        TextureSlot::Pending(PendingTexture {
            key,
            label,
            color_space,
            receiver,
        })
    }

    /// Loads `source` and blocks until it is decoded.
    pub fn load_texture_blocking(
        &self,
        source: &ImageSource,
        color_space: ColorSpace,
    ) -> Result<TextureRef> {
        match self.load_texture(source, color_space) {
            TextureSlot::Ready(texture) => Ok(texture),
            TextureSlot::Pending(pending) => {
                let image = pending
                    .receiver
                    .recv()
                    .map_err(|_| FlipbookError::LoaderDisconnected(pending.label.clone()))??;
                let texture = Texture::new(&pending.label, image, pending.color_space);
                Ok(self.store(&pending.key, texture))
            }
            TextureSlot::Empty | TextureSlot::Failed => {
                Err(FlipbookError::LoaderDisconnected(source.label()))
            }
        }
    }

    /// Stores `texture` under `key` (or joins the copy already there) and
    /// returns a reference to it.
    fn store(&self, key: &str, texture: Texture) -> TextureRef {
        let handle = self.textures.add_with_key(key, texture);
        self.lease(handle)
    }

    /// Wraps a handle whose reference has already been taken.
    fn lease(&self, handle: TextureHandle) -> TextureRef {
        TextureRef {
            handle,
            textures: Arc::clone(&self.textures),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_load(&self, source: ImageSource, label: String, sender: flume::Sender<Result<Image>>) {
        let root = Arc::clone(&self.root);
        let Some(runtime) = get_asset_runtime() else {
            let result = Self::read_bytes_sync(&root, &source)
                .and_then(|bytes| Self::decode_image_cpu(&bytes, &label));
            let _ = sender.send(result);
            return;
        };

        runtime.spawn(async move {
            let result = async {
                let bytes = Self::read_bytes(&root, &source).await?;
                tokio::task::spawn_blocking(move || Self::decode_image_cpu(&bytes, &label)).await?
            }
            .await;
            // The slot may have been dropped with its page
            let _ = sender.send(result);
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn_load(&self, source: ImageSource, label: String, sender: flume::Sender<Result<Image>>) {
        // WASM: no worker threads, decode on the calling thread
        let result = Self::read_bytes_sync(&self.root, &source)
            .and_then(|bytes| Self::decode_image_cpu(&bytes, &label));
        let _ = sender.send(result);
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    #[cfg(not(target_arch = "wasm32"))]
    async fn read_bytes(root: &Path, source: &ImageSource) -> Result<Vec<u8>> {
        match source {
            ImageSource::Payload(payload) if is_data_uri(payload) => decode_data_uri(payload),
            ImageSource::Payload(path) => Ok(tokio::fs::read(root.join(path)).await?),
            ImageSource::Builtin(art) => Ok(tokio::fs::read(root.join(art.path())).await?),
            ImageSource::Blank => Ok(Vec::new()),
        }
    }

    fn read_bytes_sync(root: &Path, source: &ImageSource) -> Result<Vec<u8>> {
        match source {
            ImageSource::Payload(payload) if is_data_uri(payload) => decode_data_uri(payload),
            ImageSource::Payload(path) => Ok(std::fs::read(root.join(path))?),
            ImageSource::Builtin(art) => Ok(std::fs::read(root.join(art.path()))?),
            ImageSource::Blank => Ok(Vec::new()),
        }
    }

    /// CPU image decoding logic.
    fn decode_image_cpu(bytes: &[u8], label: &str) -> Result<Image> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| FlipbookError::ImageDecodeError(format!("{label}: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Image::new(Some(label), width, height, rgba.into_raw()))
    }
}
