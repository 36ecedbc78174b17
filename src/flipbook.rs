//! Flipbook Facade
//!
//! [`Flipbook`] is the one object a presentation shell talks to. It owns the
//! layout, the book state, every page and the scene composer, and is driven
//! by two kinds of calls:
//!
//! - **Inbound signals**: content, page selection, focus, hover, clicks,
//!   viewport and scroll. These mutate state and queue [`FlipbookEvent`]s.
//! - **Frame updates**: [`Flipbook::update`] runs the settle loop, then every
//!   page in spread order, then the composer.
//!
//! # Example
//!
//! ```rust,ignore
//! use flipbook::{BookSettings, CoverMode, Flipbook, ImageRef, Timer};
//!
//! let mut book = Flipbook::new(BookSettings::default())?;
//! book.set_content(&[ImageRef::content("pages/1.png")], CoverMode::Default);
//! book.set_target_page(1);
//!
//! let mut timer = Timer::new();
//! loop {
//!     book.update(timer.tick());
//!     for event in book.drain_events() {
//!         // play sounds, sync UI ...
//!     }
//!     // upload book.pages() / book.composer() and render
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::assets::{AssetServer, ImageRef};
use crate::book::{
    BookLayout, BookState, ClickOutcome, CoverMode, Face, Focus, Page, PageRecord, SettleStep,
    surface,
};
use crate::errors::Result;
use crate::resources::primitives::{PageTemplate, build_page_template};
use crate::scene::{Breakpoint, SceneComposer};
use crate::settings::BookSettings;
use crate::utils::FrameTime;

/// A pointer hit on one face of one spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceHit {
    pub spread: usize,
    pub face: Face,
}

impl FaceHit {
    #[must_use]
    pub fn new(spread: usize, face: Face) -> Self {
        Self { spread, face }
    }
}

/// Outbound notifications, drained by the shell after each call or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipbookEvent {
    /// The displayed page moved by one spread. Cue for the page-flip sound.
    PageTurned { from: usize, to: usize },
    FocusChanged(Focus),
    Hovered(Option<FaceHit>),
    Clicked(FaceHit),
}

impl From<SettleStep> for FlipbookEvent {
    fn from(step: SettleStep) -> Self {
        Self::PageTurned {
            from: step.from,
            to: step.to,
        }
    }
}

pub type FlipbookEvents = SmallVec<[FlipbookEvent; 8]>;

/// The interactive book.
pub struct Flipbook {
    settings: BookSettings,
    assets: AssetServer,
    template: Arc<PageTemplate>,

    layout: BookLayout,
    state: BookState,
    pages: Vec<Page>,
    composer: SceneComposer,

    hovered: Option<FaceHit>,
    /// Time of the latest frame; inbound signals are stamped with it
    clock: FrameTime,
    events: FlipbookEvents,
}

impl Flipbook {
    /// Creates an empty book. Fails only on invalid settings.
    pub fn new(settings: BookSettings) -> Result<Self> {
        let assets = AssetServer::new(&settings.asset_root);
        Self::with_assets(settings, assets)
    }

    /// Creates an empty book sharing an existing asset server.
    pub fn with_assets(settings: BookSettings, assets: AssetServer) -> Result<Self> {
        settings.validate()?;

        let template = Arc::new(build_page_template(
            settings.page_width,
            settings.page_height,
            settings.page_depth,
            settings.page_segments,
        ));
        let composer = SceneComposer::new(&settings, Breakpoint::default());

        Ok(Self {
            settings,
            assets,
            template,
            layout: BookLayout::default(),
            state: BookState::new(0),
            pages: Vec::new(),
            composer,
            hovered: None,
            clock: FrameTime::default(),
            events: FlipbookEvents::new(),
        })
    }

    // ========================================================================
    // Content
    // ========================================================================

    /// Lays out a flat list of content images.
    pub fn set_content(&mut self, images: &[ImageRef], cover_mode: CoverMode) {
        self.apply_layout(BookLayout::build(images, cover_mode));
    }

    /// Replaces the spreads. Content is recovered from `records` and laid out again.
    pub fn set_spreads(&mut self, records: &[PageRecord], cover_mode: CoverMode) {
        self.apply_layout(BookLayout::from_records(records, cover_mode));
    }

    fn apply_layout(&mut self, layout: BookLayout) {
        self.state.set_total_spreads(layout.len(), self.clock.elapsed);
        self.pages = surface::resolve_all(&layout)
            .into_iter()
            .enumerate()
            .map(|(number, surfaces)| {
                Page::new(number, surfaces, Arc::clone(&self.template), &self.state, &self.assets)
            })
            .collect();
        if self.hovered.take().is_some() {
            self.events.push(FlipbookEvent::Hovered(None));
        }

        log::debug!(
            "Book has {} spreads, displayed {} / target {}",
            self.pages.len(),
            self.state.displayed_page(),
            self.state.target_page()
        );
        self.layout = layout;
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Requests spread `index`, clamped to `[0, total_spreads]`.
    pub fn set_target_page(&mut self, index: usize) {
        let step = self.state.set_target_page(index, self.clock.elapsed);
        self.events.extend(step.map(FlipbookEvent::from));
    }

    pub fn next_page(&mut self) {
        self.set_target_page(self.state.target_page() + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_target_page(self.state.target_page().saturating_sub(1));
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if self.state.set_focus(focus) {
            self.events.push(FlipbookEvent::FocusChanged(focus));
        }
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn set_scroll_progress(&mut self, progress: f32) {
        self.composer.set_scroll_progress(progress);
    }

    /// Never interrupts a settle in progress.
    pub fn set_viewport_breakpoint(&mut self, breakpoint: Breakpoint) {
        self.composer.set_breakpoint(breakpoint);
    }

    pub fn set_viewport_width(&mut self, px: f32) {
        self.composer.set_viewport_width(px);
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Updates the hovered face. Hits on missing spreads count as no hover.
    pub fn set_hovered(&mut self, hit: Option<FaceHit>) {
        let hit = hit.filter(|h| h.spread < self.pages.len());
        if hit == self.hovered {
            return;
        }

        for page in &mut self.pages {
            page.set_hovered(hit.is_some_and(|h| h.spread == page.number()));
        }
        self.hovered = hit;
        self.events.push(FlipbookEvent::Hovered(hit));
    }

    pub fn click(&mut self, hit: FaceHit) {
        if hit.spread >= self.pages.len() {
            log::debug!("Ignoring click on missing spread {}", hit.spread);
            return;
        }

        let narrow = self.composer.breakpoint() == Breakpoint::Narrow;
        let focus_before = self.state.focus();
        let outcome = self.state.click(hit.spread, hit.face, narrow, self.clock.elapsed);

        self.events.push(FlipbookEvent::Clicked(hit));
        if self.state.focus() != focus_before {
            self.events.push(FlipbookEvent::FocusChanged(self.state.focus()));
        }
        if let ClickOutcome::Turn { step: Some(step), .. } = outcome {
            self.events.push(step.into());
        }
    }

    // ========================================================================
    // Frame Update
    // ========================================================================

    pub fn update(&mut self, frame: FrameTime) {
        self.clock = frame;

        let steps = self.state.tick(frame.elapsed);
        self.events.extend(steps.into_iter().map(FlipbookEvent::from));

        for page in &mut self.pages {
            page.update(&self.state, frame, &self.settings, &self.assets);
        }
        self.composer.update(&self.state, frame.dt_seconds());
    }

    /// Convenience for fixed-step drivers.
    pub fn advance(&mut self, delta: Duration) {
        self.update(self.clock.advance(delta));
    }

    // ========================================================================
    // Observers
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn displayed_page(&self) -> usize {
        self.state.displayed_page()
    }

    #[inline]
    #[must_use]
    pub fn target_page(&self) -> usize {
        self.state.target_page()
    }

    #[inline]
    #[must_use]
    pub fn focus(&self) -> Focus {
        self.state.focus()
    }

    #[inline]
    #[must_use]
    pub fn is_book_closed(&self) -> bool {
        self.state.is_book_closed()
    }

    #[inline]
    #[must_use]
    pub fn total_spreads(&self) -> usize {
        self.state.total_spreads()
    }

    #[inline]
    #[must_use]
    pub fn hovered(&self) -> Option<FaceHit> {
        self.hovered
    }

    /// Navigation label of page index `index` in `[0, total_spreads]`.
    #[must_use]
    pub fn page_label(&self, index: usize) -> String {
        page_label(index, self.total_spreads())
    }

    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[inline]
    #[must_use]
    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    #[inline]
    #[must_use]
    pub fn template(&self) -> &Arc<PageTemplate> {
        &self.template
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &BookLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &BookState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &BookSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn assets(&self) -> &AssetServer {
        &self.assets
    }

    #[inline]
    #[must_use]
    pub fn clock(&self) -> FrameTime {
        self.clock
    }

    /// Takes every event queued since the last call.
    pub fn drain_events(&mut self) -> FlipbookEvents {
        std::mem::take(&mut self.events)
    }
}

/// `"Cover"` for 0, `"Back Cover"` for the last index, `"Page n"` otherwise.
#[must_use]
pub fn page_label(index: usize, total_spreads: usize) -> String {
    if index == 0 {
        "Cover".to_string()
    } else if index == total_spreads {
        "Back Cover".to_string()
    } else {
        format!("Page {index}")
    }
}
