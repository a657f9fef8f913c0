//! Document pipeline orchestration: fetch → tokenize → tree → layout.
//!
//! The rendering sink (window, canvas, terminal) is external: it consumes
//! [`layout::DisplayItem`]s plus a scroll offset and does its own culling.

mod page;

pub use net::{DataBodyWrap, LoadError};
pub use page::{Options, Page};
