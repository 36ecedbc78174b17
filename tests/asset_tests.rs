//! Asset Tests
//!
//! Tests for:
//! - AssetStorage: add, get, key deduplication, removal, reference counts
//! - Thread safety: concurrent reads via RwLock
//! - ImageRef / ImageSource parsing and cache keys
//! - AssetServer: blank page, data URI decoding, failed loads, slot polling

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use slotmap::new_key_type;

use flipbook::assets::source::{BuiltinArt, ImageRef, ImageSource};
use flipbook::assets::storage::AssetStorage;
use flipbook::assets::{AssetServer, TextureSlot};
use flipbook::resources::{ColorSpace, Image};

new_key_type! { struct TestHandle; }

fn png_data_uri(w: u32, h: u32, rgba: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn wait_for(slot: &mut TextureSlot, server: &AssetServer) {
    for _ in 0..500 {
        slot.poll(server);
        if !slot.is_pending() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("texture never resolved");
}

// ============================================================================
// AssetStorage Basic CRUD
// ============================================================================

#[test]
fn storage_add_and_get() {
    let storage = AssetStorage::<TestHandle, String>::new();
    let handle = storage.add("hello".to_string());
    assert_eq!(&**storage.get(handle).unwrap(), "hello");
    assert_eq!(storage.len(), 1);
}

#[test]
fn storage_add_with_key_deduplicates() {
    let storage = AssetStorage::<TestHandle, String>::new();
    let a = storage.add_with_key("pages/1.png", "first".to_string());
    let b = storage.add_with_key("pages/1.png", "second".to_string());
    assert_eq!(a, b);
    assert_eq!(storage.len(), 1);
    assert_eq!(&**storage.get(a).unwrap(), "first");
    assert_eq!(storage.get_handle_by_key("pages/1.png"), Some(a));
}

#[test]
fn storage_remove_drops_key() {
    let storage = AssetStorage::<TestHandle, i32>::new();
    let h = storage.add_with_key("k", 7);
    assert_eq!(storage.remove(h).as_deref(), Some(&7));
    assert!(storage.get(h).is_none());
    assert!(storage.get_handle_by_key("k").is_none());
    assert!(storage.is_empty());
}

#[test]
fn storage_release_frees_on_last_reference() {
    let storage = AssetStorage::<TestHandle, i32>::new();
    let h = storage.add_with_key("k", 1);
    assert_eq!(storage.add_with_key("k", 2), h);
    assert_eq!(storage.acquire_by_key("k"), Some(h));
    assert_eq!(storage.ref_count(h), 3);

    assert!(!storage.release(h));
    assert!(!storage.release(h));
    assert_eq!(storage.get(h).as_deref(), Some(&1));

    assert!(storage.release(h));
    assert!(storage.is_empty());
    assert!(storage.acquire_by_key("k").is_none());
    assert!(!storage.release(h));
}

#[test]
fn storage_concurrent_reads() {
    let storage = Arc::new(AssetStorage::<TestHandle, i32>::new());
    let handles: Vec<_> = (0..16).map(|i| storage.add(i)).collect();
    let handles = Arc::new(handles);

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let storage = Arc::clone(&storage);
            let handles = Arc::clone(&handles);
            std::thread::spawn(move || {
                handles.iter().map(|h| *storage.get(*h).unwrap()).sum::<i32>()
            })
        })
        .collect();

    for t in threads {
        assert_eq!(t.join().unwrap(), (0..16).sum::<i32>());
    }
}

// ============================================================================
// Image Sources
// ============================================================================

#[test]
fn image_ref_display_truncates_payloads() {
    let long = ImageRef::content(png_data_uri(8, 8, [0, 0, 0, 255]));
    let shown = long.to_string();
    assert!(shown.starts_with("data:image/png;base64,"));
    assert!(shown.len() < long.as_str().len());
    assert_eq!(ImageRef::BookBack.to_string(), "book-back");
}

#[test]
fn data_uri_key_is_a_digest() {
    let uri = png_data_uri(32, 32, [1, 2, 3, 255]);
    let key = ImageSource::Payload(uri.clone()).cache_key();
    assert!(key.len() < 64);
    assert!(!key.contains("base64"));
    assert_eq!(key, ImageSource::Payload(uri).cache_key());
    assert_ne!(key, ImageSource::Payload(png_data_uri(32, 32, [3, 2, 1, 255])).cache_key());
}

#[test]
fn cache_keys_distinguish_sources() {
    let keys = [
        ImageSource::Blank.cache_key(),
        ImageSource::Builtin(BuiltinArt::BookCover).cache_key(),
        ImageSource::Builtin(BuiltinArt::CoverRoughness).cache_key(),
        ImageSource::Payload("a.png".into()).cache_key(),
    ];
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

// ============================================================================
// AssetServer
// ============================================================================

#[test]
fn blank_page_is_ready_and_shared() {
    let server = AssetServer::default();
    let a = server.load_texture(&ImageSource::Blank, ColorSpace::Srgb);
    let b = server.load_texture(&ImageSource::Blank, ColorSpace::Srgb);
    assert!(a.handle().is_some());
    assert_eq!(a.handle(), b.handle());

    let texture = server.textures.get(a.handle().unwrap()).unwrap();
    assert_eq!(texture.image, Image::blank_page());
}

#[test]
fn data_uri_decodes_in_background() {
    let server = AssetServer::default();
    let source = ImageSource::Payload(png_data_uri(3, 2, [10, 20, 30, 255]));
    let mut slot = server.load_texture(&source, ColorSpace::Srgb);
    wait_for(&mut slot, &server);

    let handle = slot.handle().expect("decoded");
    let texture = server.textures.get(handle).unwrap();
    assert_eq!((texture.width(), texture.height()), (3, 2));
    assert_eq!(texture.image.pixel(2, 1), Some([10, 20, 30, 255]));

    // Cached afterwards
    let again = server.load_texture(&source, ColorSpace::Srgb);
    assert_eq!(again.handle(), Some(handle));
}

#[test]
fn dropping_last_slot_frees_texture() {
    let server = AssetServer::default();
    let source = ImageSource::Payload(png_data_uri(2, 2, [9, 9, 9, 255]));
    let mut a = server.load_texture(&source, ColorSpace::Srgb);
    wait_for(&mut a, &server);
    let b = server.load_texture(&source, ColorSpace::Srgb);
    let handle = a.handle().unwrap();
    assert_eq!(server.textures.ref_count(handle), 2);

    drop(a);
    assert_eq!(server.textures.len(), 1);
    drop(b);
    assert!(server.textures.is_empty());

    // A cloned reference keeps the texture alive on its own
    let blank = server.load_texture_blocking(&ImageSource::Blank, ColorSpace::Srgb).unwrap();
    let copy = blank.clone();
    drop(blank);
    assert!(copy.texture().is_some());
    drop(copy);
    assert!(server.textures.is_empty());
}

#[test]
fn missing_file_fails_without_panicking() {
    let server = AssetServer::new("/nonexistent-asset-root");
    let mut slot = server.load_texture(
        &ImageSource::Builtin(BuiltinArt::BookCover),
        ColorSpace::Srgb,
    );
    wait_for(&mut slot, &server);
    assert!(matches!(slot, TextureSlot::Failed));
}

#[test]
fn corrupt_payload_reports_decode_error() {
    let server = AssetServer::default();
    let source = ImageSource::Payload("data:image/png;base64,aGVsbG8=".into());
    let err = server.load_texture_blocking(&source, ColorSpace::Srgb).unwrap_err();
    assert!(matches!(err, flipbook::FlipbookError::ImageDecodeError(_)));
}
