//! Blog posts from CMS page layouts.
//!
//! [`extract_blog_posts`] turns a fetched page payload into ordered
//! [`BlogPost`](tutorhub_shared::BlogPost) records, and [`find_post_by_slug`]
//! resolves article URLs against them, tolerating renamed titles.

mod extract;
mod matcher;
pub mod slug;

pub use extract::{extract_blog_posts, extract_blog_posts_default};
pub use matcher::{Adjacent, SlugMatch, adjacent_posts, find_post_by_slug, find_post_with_match};
pub use slug::{clean_title, slugify, strip_ordinal_prefix};
