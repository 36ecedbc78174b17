//! Flipbook Integration Tests
//!
//! Tests for:
//! - Construction and settings validation
//! - Content and spread replacement, texture lifetime across relayouts
//! - Navigation and the PageTurned event stream
//! - Clicks, focus and hover through the facade
//! - Viewport changes during a settle
//! - Page labels

use std::io::Cursor;
use std::time::Duration;

use base64::Engine as _;

use flipbook::book::{CoverMode, Face, Focus, PageRecord};
use flipbook::scene::Breakpoint;
use flipbook::{BookSettings, FaceHit, Flipbook, FlipbookError, FlipbookEvent, ImageRef};

const FRAME: Duration = Duration::from_micros(16_667);

fn book_with(content: usize) -> Flipbook {
    let settings = BookSettings {
        page_segments: 10,
        asset_root: "/nonexistent-asset-root".to_string(),
        ..Default::default()
    };
    let mut book = Flipbook::new(settings).unwrap();
    let images: Vec<ImageRef> = (0..content)
        .map(|i| ImageRef::content(format!("p{i}.png")))
        .collect();
    book.set_content(&images, CoverMode::Default);
    book
}

fn run(book: &mut Flipbook, frames: usize) {
    for _ in 0..frames {
        book.advance(FRAME);
    }
}

fn png_page(shade: u8) -> ImageRef {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([shade, shade, shade, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    ImageRef::content(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

/// Runs frames until no face texture is still decoding.
fn run_until_loaded(book: &mut Flipbook) {
    for _ in 0..500 {
        book.advance(FRAME);
        let loading = book
            .pages()
            .iter()
            .flat_map(|p| p.materials().iter())
            .any(|m| m.map.is_pending() || m.roughness_map.is_pending());
        if !loading {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("textures never finished loading");
}

fn turns(events: &[FlipbookEvent]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            FlipbookEvent::PageTurned { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn invalid_settings_rejected() {
    let settings = BookSettings {
        page_width: -1.0,
        ..Default::default()
    };
    assert!(matches!(
        Flipbook::new(settings),
        Err(FlipbookError::InvalidSettings { field: "page_width", .. })
    ));
}

#[test]
fn empty_book_is_closed_and_inert() {
    let mut book = book_with(0);
    assert_eq!(book.total_spreads(), 0);
    assert!(book.pages().is_empty());
    assert!(book.is_book_closed());

    book.next_page();
    run(&mut book, 30);
    assert_eq!(book.displayed_page(), 0);
    assert!(book.drain_events().is_empty());
}

#[test]
fn template_is_shared_by_every_page() {
    let book = book_with(6);
    assert_eq!(book.pages().len(), 4);
    for page in book.pages() {
        assert!(std::sync::Arc::ptr_eq(page.template(), book.template()));
        assert_eq!(page.skeleton().joint_count(), 11);
    }
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn jump_emits_one_turn_per_step() {
    let mut book = book_with(10);
    assert_eq!(book.total_spreads(), 6);

    book.set_target_page(5);
    assert_eq!(book.displayed_page(), 1);
    run(&mut book, 60);

    assert_eq!(book.displayed_page(), 5);
    let events = book.drain_events();
    assert_eq!(turns(&events), vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
    assert!(book.drain_events().is_empty());
}

#[test]
fn next_and_previous_clamp() {
    let mut book = book_with(2);
    assert_eq!(book.total_spreads(), 2);
    for _ in 0..5 {
        book.next_page();
        run(&mut book, 30);
    }
    assert_eq!(book.displayed_page(), 2);
    assert!(book.is_book_closed());

    for _ in 0..5 {
        book.previous_page();
        run(&mut book, 30);
    }
    assert_eq!(book.displayed_page(), 0);
}

#[test]
fn retarget_to_displayed_page_is_silent() {
    let mut book = book_with(4);
    book.set_target_page(1);
    run(&mut book, 30);
    book.drain_events();

    let before: Vec<_> = book.pages().iter().map(|p| p.turned_at()).collect();
    book.set_target_page(1);
    run(&mut book, 5);
    assert!(book.drain_events().is_empty());
    let after: Vec<_> = book.pages().iter().map(|p| p.turned_at()).collect();
    assert_eq!(before, after);
}

#[test]
fn viewport_change_does_not_interrupt_settle() {
    let mut book = book_with(10);
    book.set_target_page(6);
    run(&mut book, 4);
    let mid = book.displayed_page();
    assert!(mid > 1 && mid < 6);

    book.set_viewport_width(400.0);
    book.set_viewport_breakpoint(Breakpoint::Medium);
    run(&mut book, 60);
    assert_eq!(book.displayed_page(), 6);
    assert_eq!(book.composer().breakpoint(), Breakpoint::Medium);
}

// ============================================================================
// Content Replacement
// ============================================================================

#[test]
fn shrinking_content_clamps_pages() {
    let mut book = book_with(10);
    book.set_target_page(5);
    run(&mut book, 60);

    book.set_content(&[ImageRef::content("only.png")], CoverMode::Default);
    assert_eq!(book.total_spreads(), 2);
    assert_eq!(book.displayed_page(), 2);
    assert_eq!(book.target_page(), 2);
    assert!(book.is_book_closed());
}

#[test]
fn relayout_mid_settle_still_reaches_target() {
    let mut book = book_with(20);
    book.set_target_page(9);
    run(&mut book, 1);
    assert!(book.displayed_page() < 9);

    let images: Vec<ImageRef> =
        (0..20).map(|i| ImageRef::content(format!("p{i}.png"))).collect();
    book.set_content(&images, CoverMode::FirstPage);
    run(&mut book, 600);
    assert_eq!(book.target_page(), 9);
    assert_eq!(book.displayed_page(), 9);
}

#[test]
fn replaced_pages_release_their_textures() {
    let mut book = book_with(0);
    let first: Vec<ImageRef> = (0..4).map(|i| png_page(10 + i)).collect();
    book.set_content(&first, CoverMode::Default);
    run_until_loaded(&mut book);
    assert_eq!(book.assets().textures.len(), 4);

    // Same images again: reused, not decoded twice
    book.set_content(&first, CoverMode::Default);
    run_until_loaded(&mut book);
    assert_eq!(book.assets().textures.len(), 4);

    let second: Vec<ImageRef> = (0..2).map(|i| png_page(100 + i)).collect();
    book.set_content(&second, CoverMode::Default);
    run_until_loaded(&mut book);
    assert_eq!(book.assets().textures.len(), 2);

    book.set_content(&[], CoverMode::Default);
    assert!(book.pages().is_empty());
    assert!(book.assets().textures.is_empty());
}

#[test]
fn set_spreads_applies_cover_mode() {
    let mut book = book_with(0);
    let records = vec![
        PageRecord::new(ImageRef::BookCover, "a.png"),
        PageRecord::new("b.png", "c.png"),
        PageRecord::new(ImageRef::BlankPage, ImageRef::BookBack),
    ];
    book.set_spreads(&records, CoverMode::FirstLastPage);
    // a and c move onto the covers, b remains
    assert_eq!(book.total_spreads(), 2);
    assert_eq!(book.layout().content().len(), 3);
    assert_eq!(
        book.layout().records(),
        &[
            PageRecord::new(ImageRef::BookCover, "b.png"),
            PageRecord::new(ImageRef::BlankPage, ImageRef::BookBack),
        ]
    );
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn click_turns_and_reports() {
    let mut book = book_with(4);
    book.click(FaceHit::new(0, Face::Front));
    let events = book.drain_events();
    assert_eq!(events[0], FlipbookEvent::Clicked(FaceHit::new(0, Face::Front)));
    assert_eq!(turns(&events), vec![(0, 1)]);
    assert_eq!(book.target_page(), 1);
}

#[test]
fn narrow_click_on_other_half_only_refocuses() {
    let mut book = book_with(4);
    book.set_viewport_breakpoint(Breakpoint::Narrow);
    book.set_target_page(2);
    run(&mut book, 30);
    book.drain_events();

    book.click(FaceHit::new(1, Face::Back));
    let events = book.drain_events();
    assert!(events.contains(&FlipbookEvent::FocusChanged(Focus::Left)));
    assert!(turns(&events).is_empty());
    assert_eq!(book.focus(), Focus::Left);
    assert_eq!(book.target_page(), 2);
}

#[test]
fn click_on_missing_spread_is_ignored() {
    let mut book = book_with(2);
    book.click(FaceHit::new(99, Face::Front));
    assert!(book.drain_events().is_empty());
}

#[test]
fn hover_tracks_single_page() {
    let mut book = book_with(4);
    book.set_hovered(Some(FaceHit::new(1, Face::Front)));
    book.set_hovered(Some(FaceHit::new(1, Face::Front)));
    assert!(book.pages()[1].is_hovered());
    assert!(!book.pages()[0].is_hovered());

    book.set_hovered(Some(FaceHit::new(42, Face::Back)));
    assert!(book.hovered().is_none());
    assert!(!book.pages()[1].is_hovered());

    let events = book.drain_events();
    assert_eq!(
        events.as_slice(),
        &[
            FlipbookEvent::Hovered(Some(FaceHit::new(1, Face::Front))),
            FlipbookEvent::Hovered(None),
        ]
    );
}

#[test]
fn set_focus_reports_changes_only() {
    let mut book = book_with(4);
    book.set_focus(Focus::Right);
    book.set_focus(Focus::Left);
    assert_eq!(book.drain_events().as_slice(), &[FlipbookEvent::FocusChanged(Focus::Left)]);
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn page_labels() {
    let book = book_with(4);
    assert_eq!(book.page_label(0), "Cover");
    assert_eq!(book.page_label(1), "Page 1");
    assert_eq!(book.page_label(2), "Page 2");
    assert_eq!(book.page_label(3), "Back Cover");
}
