//! Book Module
//!
//! The page-turn core:
//!
//! - [`layout`]: content images -> ordered spreads
//! - [`surface`]: spreads -> concrete face images
//! - [`state`]: target/displayed page and the settle loop
//! - [`page`]: per-spread skeleton deformation

pub mod layout;
pub mod page;
pub mod state;
pub mod surface;

pub use layout::{BookLayout, CoverMode, PageRecord};
pub use page::Page;
pub use state::{BookState, ClickOutcome, Face, Focus, SettleStep};
pub use surface::{CoverArt, PageFace, SpreadSurfaces};
