//! Spread layout.
//!
//! Turns a flat list of content images into the ordered spreads of a book:
//!
//! ```text
//! faces:   [cover] c0 c1 c2 c3 [blank?] [back]
//! spreads: {cover, c0} {c1, c2} {c3, back}
//! ```
//!
//! Depending on the [`CoverMode`], the first and/or last content image is
//! printed on the cover instead of getting a face of its own.

use serde::{Deserialize, Serialize};

use crate::assets::ImageRef;
use crate::book::surface::{locate_first_content, locate_last_content};

/// Whether content images double as cover art.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverMode {
    /// Built-in front and back cover.
    #[default]
    Default,
    /// The first content image is the front cover.
    FirstPage,
    /// The first content image is the front cover, the last one the back cover.
    FirstLastPage,
}

impl CoverMode {
    #[inline]
    #[must_use]
    pub fn consumes_first(self) -> bool {
        matches!(self, Self::FirstPage | Self::FirstLastPage)
    }

    #[inline]
    #[must_use]
    pub fn consumes_last(self) -> bool {
        matches!(self, Self::FirstLastPage)
    }
}

/// One double-sided page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRecord {
    pub front: ImageRef,
    pub back: ImageRef,
}

impl PageRecord {
    pub fn new(front: impl Into<ImageRef>, back: impl Into<ImageRef>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// The spreads of a book plus the content they were built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookLayout {
    records: Vec<PageRecord>,
    content: Vec<ImageRef>,
    /// Mode actually applied. `FirstLastPage` degrades to `FirstPage` for
    /// fewer than two images so one image is never used twice.
    cover_mode: CoverMode,
    front_cover_index: Option<usize>,
    back_cover_index: Option<usize>,
}

impl BookLayout {
    /// Lays `content` out into spreads. Empty content yields an empty layout.
    #[must_use]
    pub fn build(content: &[ImageRef], cover_mode: CoverMode) -> Self {
        if content.is_empty() {
            log::debug!("Empty content, no spreads");
            return Self {
                cover_mode,
                ..Self::default()
            };
        }

        let mut mode = cover_mode;
        if mode == CoverMode::FirstLastPage && content.len() < 2 {
            log::debug!(
                "{} content image(s) cannot fill both covers, using first-page mode",
                content.len()
            );
            mode = CoverMode::FirstPage;
        }

        let front_cover_index = if mode.consumes_first() {
            let found = locate_first_content(content);
            if found.is_none() {
                log::warn!("No content image available for the front cover");
            }
            found
        } else {
            None
        };
        let back_cover_index = if mode.consumes_last() {
            locate_last_content(content).filter(|&i| Some(i) != front_cover_index)
        } else {
            None
        };

        let mut faces = Vec::with_capacity(content.len() + 3);
        faces.push(ImageRef::BookCover);
        faces.extend(
            content
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != front_cover_index && Some(*i) != back_cover_index)
                .map(|(_, image)| image.clone()),
        );
        if faces.len() % 2 == 0 {
            // [cover, ..., back] would be odd; pad before the back cover
            faces.push(ImageRef::BlankPage);
        }
        faces.push(ImageRef::BookBack);

        let mut faces = faces.into_iter();
        let mut records = Vec::with_capacity(faces.len() / 2);
        while let (Some(front), Some(back)) = (faces.next(), faces.next()) {
            records.push(PageRecord { front, back });
        }

        log::debug!(
            "Laid out {} content image(s) into {} spreads ({mode:?})",
            content.len(),
            records.len()
        );

        Self {
            records,
            content: content.to_vec(),
            cover_mode: mode,
            front_cover_index,
            back_cover_index,
        }
    }

    /// Rebuilds a layout from existing spreads.
    ///
    /// Content is recovered by dropping the cover sentinels and the padding
    /// blanks before the back cover, then laid out again under `cover_mode`.
    #[must_use]
    pub fn from_records(records: &[PageRecord], cover_mode: CoverMode) -> Self {
        let mut content: Vec<ImageRef> = records
            .iter()
            .flat_map(|r| [&r.front, &r.back])
            .filter(|image| !image.is_cover_sentinel())
            .cloned()
            .collect();
        while content.last() == Some(&ImageRef::BlankPage) {
            content.pop();
        }
        Self::build(&content, cover_mode)
    }

    #[inline]
    #[must_use]
    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    /// The full content sequence, including images used as cover art.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &[ImageRef] {
        &self.content
    }

    #[inline]
    #[must_use]
    pub fn cover_mode(&self) -> CoverMode {
        self.cover_mode
    }

    /// Index into [`content`](Self::content) of the image printed on the front cover.
    #[inline]
    #[must_use]
    pub fn front_cover_index(&self) -> Option<usize> {
        self.front_cover_index
    }

    #[inline]
    #[must_use]
    pub fn back_cover_index(&self) -> Option<usize> {
        self.back_cover_index
    }

    /// Number of spreads, covers included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Spreads between the two covers.
    #[inline]
    #[must_use]
    pub fn interior_spreads(&self) -> usize {
        self.records.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Vec<ImageRef> {
        (0..n).map(|i| ImageRef::content(format!("p{i}.png"))).collect()
    }

    #[test]
    fn default_four_images() {
        let layout = BookLayout::build(&images(4), CoverMode::Default);
        assert_eq!(
            layout.records(),
            &[
                PageRecord::new(ImageRef::BookCover, "p0.png"),
                PageRecord::new("p1.png", "p2.png"),
                PageRecord::new("p3.png", ImageRef::BookBack),
            ]
        );
    }

    #[test]
    fn odd_face_count_pads_blank() {
        let layout = BookLayout::build(&images(3), CoverMode::Default);
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.records()[2], PageRecord::new(ImageRef::BlankPage, ImageRef::BookBack));
    }

    #[test]
    fn single_image_first_last_degrades() {
        let layout = BookLayout::build(&images(1), CoverMode::FirstLastPage);
        assert_eq!(layout.cover_mode(), CoverMode::FirstPage);
        assert_eq!(layout.front_cover_index(), Some(0));
        assert_eq!(layout.back_cover_index(), None);
        assert_eq!(layout.len(), 1);
    }
}
