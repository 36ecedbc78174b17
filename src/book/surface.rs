//! Page Surface Resolver
//!
//! Decides, once per spread, what is printed on each face. Sentinels become
//! built-in art or the blank page, content becomes a loadable payload, and
//! the cover faces pick up the substituted content image when the cover
//! mode asks for it.

use crate::assets::{BuiltinArt, ImageRef, ImageSource};
use crate::book::layout::BookLayout;
use crate::book::state::Face;

/// Built-in cover artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverArt {
    Front,
    Back,
}

impl CoverArt {
    #[must_use]
    pub fn art(self) -> BuiltinArt {
        match self {
            Self::Front => BuiltinArt::BookCover,
            Self::Back => BuiltinArt::BookBack,
        }
    }
}

/// What one face of a spread shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageFace {
    Cover(CoverArt),
    Content(ImageSource),
    Blank,
}

impl PageFace {
    #[must_use]
    pub fn from_ref(image: &ImageRef) -> Self {
        match image {
            ImageRef::BookCover => Self::Cover(CoverArt::Front),
            ImageRef::BookBack => Self::Cover(CoverArt::Back),
            ImageRef::BlankPage => Self::Blank,
            ImageRef::Content(payload) => Self::Content(ImageSource::Payload(payload.clone())),
        }
    }

    /// The image to load for this face.
    #[must_use]
    pub fn source(&self) -> ImageSource {
        match self {
            Self::Cover(cover) => ImageSource::Builtin(cover.art()),
            Self::Content(source) => source.clone(),
            Self::Blank => ImageSource::Blank,
        }
    }
}

/// Resolved faces of one spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadSurfaces {
    pub front: PageFace,
    pub back: PageFace,
    /// Cover roughness map, set only on the two cover-bearing spreads.
    pub roughness_map: Option<ImageSource>,
    roughness_front: bool,
    roughness_back: bool,
}

impl SpreadSurfaces {
    #[must_use]
    pub fn face(&self, face: Face) -> &PageFace {
        match face {
            Face::Front => &self.front,
            Face::Back => &self.back,
        }
    }

    /// The roughness map applied to `face`, if any.
    #[must_use]
    pub fn roughness_for(&self, face: Face) -> Option<&ImageSource> {
        let applies = match face {
            Face::Front => self.roughness_front,
            Face::Back => self.roughness_back,
        };
        self.roughness_map.as_ref().filter(|_| applies)
    }
}

/// Index of the first content image.
#[must_use]
pub fn locate_first_content(content: &[ImageRef]) -> Option<usize> {
    content.iter().position(ImageRef::is_content)
}

/// Index of the last content image.
///
/// Sequences usually end on content or on a single trailing blank, so the
/// last two slots are checked first. The backward scan decides every other case.
#[must_use]
pub fn locate_last_content(content: &[ImageRef]) -> Option<usize> {
    let n = content.len();
    if n >= 1 && content[n - 1].is_content() {
        return Some(n - 1);
    }
    if n >= 2 && content[n - 2].is_content() {
        return Some(n - 2);
    }
    content.iter().rposition(ImageRef::is_content)
}

/// Resolves the faces of spread `spread` of `layout`.
#[must_use]
pub fn resolve(layout: &BookLayout, spread: usize) -> Option<SpreadSurfaces> {
    let record = layout.records().get(spread)?;
    let last = layout.len() - 1;
    let mode = layout.cover_mode();

    let mut front = PageFace::from_ref(&record.front);
    let mut back = PageFace::from_ref(&record.back);

    if spread == 0 && mode.consumes_first() && front == PageFace::Cover(CoverArt::Front) {
        front = cover_substitute(layout, layout.front_cover_index(), CoverArt::Front);
    }
    if spread == last && mode.consumes_last() && back == PageFace::Cover(CoverArt::Back) {
        back = cover_substitute(layout, layout.back_cover_index(), CoverArt::Back);
    }

    Some(SpreadSurfaces {
        front,
        back,
        roughness_map: (spread == 0 || spread == last)
            .then_some(ImageSource::Builtin(BuiltinArt::CoverRoughness)),
        roughness_front: spread == 0,
        roughness_back: spread == last,
    })
}

/// Resolves every spread of `layout` in order.
#[must_use]
pub fn resolve_all(layout: &BookLayout) -> Vec<SpreadSurfaces> {
    (0..layout.len()).filter_map(|spread| resolve(layout, spread)).collect()
}

fn cover_substitute(layout: &BookLayout, index: Option<usize>, fallback: CoverArt) -> PageFace {
    match index.and_then(|i| layout.content().get(i)) {
        Some(ImageRef::Content(payload)) => {
            PageFace::Content(ImageSource::Payload(payload.clone()))
        }
        _ => {
            log::warn!("Cover image for {fallback:?} not found, using built-in art");
            PageFace::Cover(fallback)
        }
    }
}
