//! Text normalization for CMS content.
//!
//! - [`strip_structural_markup`] removes `<html>`/`<body>` wrapper tags that
//!   editors paste into free-text fields.
//! - [`format_content`] renders the small markdown subset used by blog posts
//!   into an HTML fragment.
//! - [`text`] holds plain-text helpers (word counts, excerpts).

mod format;
mod strip;
pub mod text;

pub use format::format_content;
pub use strip::{NO_DESCRIPTION, strip_or_fallback, strip_structural_markup};
pub use text::{plain_excerpt, read_time_minutes, word_count};
