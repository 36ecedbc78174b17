//! Drives a flipbook without a window: lays out a handful of generated pages,
//! jumps to the middle, clicks back one spread and logs every step.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_flip`.

use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgba, RgbaImage};

use flipbook::book::Face;
use flipbook::{BookSettings, CoverMode, FaceHit, Flipbook, FlipbookEvent, ImageRef};

const FRAME: Duration = Duration::from_micros(16_667);

/// A solid-colour PNG as a data URI.
fn swatch(r: u8, g: u8, b: u8) -> anyhow::Result<ImageRef> {
    let img = RgbaImage::from_pixel(16, 16, Rgba([r, g, b, 255]));
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(ImageRef::content(format!("data:image/png;base64,{}", STANDARD.encode(&png))))
}

fn run(book: &mut Flipbook, seconds: f32) {
    let frames = (seconds / FRAME.as_secs_f32()).ceil() as usize;
    for _ in 0..frames {
        book.advance(FRAME);
        for event in book.drain_events() {
            match event {
                FlipbookEvent::PageTurned { from, to } => {
                    log::info!(
                        "[{:>6.3}s] flip {} -> {}",
                        book.clock().elapsed.as_secs_f32(),
                        book.page_label(from),
                        book.page_label(to)
                    );
                }
                other => log::info!("{other:?}"),
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = BookSettings {
        page_segments: 20,
        ..Default::default()
    };
    let mut book = Flipbook::new(settings)?;

    let pages = (0..9u8)
        .map(|i| swatch(40 + i * 20, 120, 200 - i * 20))
        .collect::<anyhow::Result<Vec<_>>>()?;
    book.set_content(&pages, CoverMode::FirstLastPage);
    println!("{} spreads", book.total_spreads());

    book.set_viewport_width(1280.0);
    book.set_scroll_progress(1.0);
    run(&mut book, 0.5);

    book.set_target_page(book.total_spreads() / 2);
    run(&mut book, 1.5);

    let previous = book.displayed_page().saturating_sub(1);
    book.click(FaceHit::new(previous, Face::Back));
    run(&mut book, 1.0);

    let composer = book.composer();
    println!(
        "Showing {} | book at {:?} scale {:.2}, camera {:.2}",
        book.page_label(book.displayed_page()),
        composer.position(),
        composer.scale(),
        composer.camera_distance()
    );
    for page in book.pages() {
        let (bend, _) = page.joint_angles(0).unwrap_or_default();
        println!(
            "  spread {:>2}: opened={:<5} hinge={:>7.2}°",
            page.number(),
            page.is_opened(),
            bend.to_degrees()
        );
    }

    Ok(())
}
