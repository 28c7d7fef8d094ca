//! Resolve a requested slug to a post.
//!
//! Slugs come from editor-controlled titles that get renamed after links are
//! shared, so lookup runs a lenient cascade and returns the first plausible
//! hit rather than failing on the first mismatch.

use tracing::debug;

use tutorhub_shared::BlogPost;

use crate::slug::{leading_number, strip_slug_prefix};

/// Which step of the cascade produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugMatch {
    /// Case-insensitive equality.
    Exact,
    /// Equal once a leading `N-` ordinal is dropped.
    WithoutPrefix,
    /// One slug contains the other.
    Substring,
    /// The request's leading number matches a title, a source ordinal or an
    /// order number.
    Numeric,
}

/// Find the post a slug refers to, or `None` when nothing is plausible.
pub fn find_post_by_slug<'a>(posts: &'a [BlogPost], requested: &str) -> Option<&'a BlogPost> {
    let found = find_post_with_match(posts, requested);
    match &found {
        Some((post, kind)) => debug!(requested, slug = %post.slug, ?kind, "slug resolved"),
        None => debug!(requested, "no post matches slug"),
    }
    found.map(|(post, _)| post)
}

/// Like [`find_post_by_slug`], also reporting which cascade step matched.
pub fn find_post_with_match<'a>(
    posts: &'a [BlogPost],
    requested: &str,
) -> Option<(&'a BlogPost, SlugMatch)> {
    let wanted = requested.trim().trim_matches('/').to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    // 1. Exact
    if let Some(post) = posts.iter().find(|p| p.slug.to_lowercase() == wanted) {
        return Some((post, SlugMatch::Exact));
    }

    // 2. Ordinal prefix removed from the request
    if let Some(bare) = strip_slug_prefix(&wanted) {
        let hit = posts.iter().find(|p| {
            let candidate = p.slug.to_lowercase();
            candidate == bare || strip_slug_prefix(&candidate) == Some(bare)
        });
        if let Some(post) = hit {
            return Some((post, SlugMatch::WithoutPrefix));
        }
    }

    // 3. Substring in either direction
    let hit = posts.iter().find(|p| {
        let candidate = p.slug.to_lowercase();
        !candidate.is_empty() && (candidate.contains(&wanted) || wanted.contains(&candidate))
    });
    if let Some(post) = hit {
        return Some((post, SlugMatch::Substring));
    }

    // 4. Leading number against titles, source ordinals, then order numbers
    let number = leading_number(&wanted)?;
    if let Some(post) = posts.iter().find(|p| p.title.starts_with(number)) {
        return Some((post, SlugMatch::Numeric));
    }
    let n = number.parse::<u32>().ok()?;
    posts
        .iter()
        .find(|p| p.source_ordinal == Some(n))
        .or_else(|| posts.iter().find(|p| p.order_number == n))
        .map(|post| (post, SlugMatch::Numeric))
}

/// Neighbours of a post in display order, for previous/next navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjacent<'a> {
    pub previous: Option<&'a BlogPost>,
    pub next: Option<&'a BlogPost>,
}

/// Previous and next posts around the post with exactly `slug`.
///
/// `posts` is expected in ascending `order_number`, as
/// [`extract_blog_posts`](crate::extract_blog_posts) returns them.
pub fn adjacent_posts<'a>(posts: &'a [BlogPost], slug: &str) -> Adjacent<'a> {
    let Some(idx) = posts.iter().position(|p| p.slug == slug) else {
        return Adjacent::default();
    };

    Adjacent {
        previous: idx.checked_sub(1).and_then(|i| posts.get(i)),
        next: posts.get(idx + 1),
    }
}
