//! Blog post extraction from a CMS page payload.
//!
//! The CMS page stores articles as layout blocks. A block is an article when
//! it has a non-blank `title` plus an `intro` or a non-empty `services` list;
//! every other block kind is ignored.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};

use tutorhub_markdown::{
    NO_DESCRIPTION, format_content, plain_excerpt, read_time_minutes, strip_or_fallback,
    strip_structural_markup,
};
use tutorhub_shared::{BlogDefaults, BlogPost, Result, TutorHubError};

use crate::slug::{clean_title, slugify};

/// Extract ordered blog posts from a raw page payload.
///
/// Accepts either a page document with a `layout` array or a collection
/// envelope (`{ "docs": [page, ...] }`), in which case the first document is
/// used. Posts come back sorted by `order_number`, numbered `1..=N`.
///
/// # Errors
///
/// [`TutorHubError::InvalidContent`] when no `layout` array can be found.
#[instrument(skip_all)]
pub fn extract_blog_posts(payload: &Value, defaults: &BlogDefaults) -> Result<Vec<BlogPost>> {
    let document = unwrap_collection(payload)?;

    let layout = document
        .get("layout")
        .and_then(Value::as_array)
        .ok_or_else(|| TutorHubError::invalid_content("payload has no `layout` array"))?;

    let page_updated_at = document
        .get("updatedAt")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);

    let mut drafts: Vec<Draft> = Vec::new();
    for (index, value) in layout.iter().enumerate() {
        match ArticleBlock::from_value(value) {
            Some(block) => {
                let position = drafts.len() as u32 + 1;
                drafts.push(Draft::new(block, position));
            }
            None => {
                let block_type = value.get("blockType").and_then(Value::as_str).unwrap_or("?");
                trace!(index, block_type, "skipping non-article block");
            }
        }
    }

    // Explicit ordinals rank first-class; unnumbered posts rank by position.
    // Ties keep source order, then everything is renumbered 1..=N.
    drafts.sort_by_key(|d| d.block.ordinal.unwrap_or(d.position));

    let mut used_slugs: HashSet<String> = HashSet::new();
    let posts: Vec<BlogPost> = drafts
        .into_iter()
        .enumerate()
        .map(|(idx, draft)| {
            let order_number = idx as u32 + 1;
            let slug = unique_slug(&draft.block.title, order_number, &mut used_slugs);
            draft.into_post(order_number, slug, page_updated_at, defaults)
        })
        .collect();

    info!(
        layout_blocks = layout.len(),
        posts = posts.len(),
        "extracted blog posts"
    );

    Ok(posts)
}

/// [`extract_blog_posts`] with [`BlogDefaults::default`].
pub fn extract_blog_posts_default(payload: &Value) -> Result<Vec<BlogPost>> {
    extract_blog_posts(payload, &BlogDefaults::default())
}

// ---------------------------------------------------------------------------
// Payload shape
// ---------------------------------------------------------------------------

fn unwrap_collection(payload: &Value) -> Result<&Value> {
    if payload.get("layout").is_some() {
        return Ok(payload);
    }

    match payload.get("docs").and_then(Value::as_array) {
        Some(docs) => docs.first().ok_or_else(|| {
            TutorHubError::invalid_content("collection response contains no documents")
        }),
        None => Ok(payload),
    }
}

#[derive(Debug)]
struct ServiceEntry {
    title: Option<String>,
    description: Option<String>,
}

/// The fields of a layout block that matter for an article.
#[derive(Debug)]
struct ArticleBlock {
    id: Option<String>,
    ordinal: Option<u32>,
    title: String,
    intro: Option<String>,
    services: Vec<ServiceEntry>,
    updated_at: Option<DateTime<Utc>>,
}

impl ArticleBlock {
    fn from_value(value: &Value) -> Option<Self> {
        let raw_title = non_blank_str(value.get("title"))?;
        let intro = value.get("intro").and_then(Value::as_str).map(str::to_string);

        let services: Vec<ServiceEntry> = value
            .get("services")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| ServiceEntry {
                        title: non_blank_str(item.get("serviceTitle").or_else(|| item.get("title")))
                            .map(str::to_string),
                        description: item
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if intro.is_none() && services.is_empty() {
            return None;
        }

        let (ordinal, title) = clean_title(raw_title);
        if title.is_empty() {
            debug!(raw_title, "article title is empty after cleaning");
            return None;
        }

        Some(Self {
            id: id_string(value.get("id")),
            ordinal,
            title,
            intro,
            services,
            updated_at: value
                .get("updatedAt")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
        })
    }

    /// Intro followed by each service as an `##` section.
    fn markdown(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if let Some(intro) = &self.intro {
            let intro = strip_structural_markup(intro);
            if !intro.trim().is_empty() {
                sections.push(intro.trim().to_string());
            }
        }

        for service in &self.services {
            let description = service
                .description
                .as_deref()
                .map(strip_structural_markup)
                .unwrap_or_default();
            let description = description.trim();

            match (&service.title, description.is_empty()) {
                (Some(title), true) => sections.push(format!("## {title}")),
                (Some(title), false) => sections.push(format!("## {title}\n\n{description}")),
                (None, false) => sections.push(description.to_string()),
                (None, true) => {}
            }
        }

        sections.join("\n\n")
    }

    /// Source text for the excerpt: the intro, else the first service description.
    fn excerpt_source(&self) -> Option<&str> {
        self.intro
            .as_deref()
            .filter(|s| !strip_structural_markup(s).trim().is_empty())
            .or_else(|| {
                self.services
                    .iter()
                    .find_map(|s| s.description.as_deref().filter(|d| !d.trim().is_empty()))
            })
    }
}

// ---------------------------------------------------------------------------
// Draft posts
// ---------------------------------------------------------------------------

struct Draft {
    block: ArticleBlock,
    /// 1-based position among article blocks in source order.
    position: u32,
}

impl Draft {
    fn new(block: ArticleBlock, position: u32) -> Self {
        Self { block, position }
    }

    fn into_post(
        self,
        order_number: u32,
        slug: String,
        page_updated_at: Option<DateTime<Utc>>,
        defaults: &BlogDefaults,
    ) -> BlogPost {
        let markdown = self.block.markdown();
        let excerpt_text = strip_or_fallback(self.block.excerpt_source(), NO_DESCRIPTION);
        let minutes = read_time_minutes(&markdown, defaults.words_per_minute);

        BlogPost {
            id: self
                .block
                .id
                .clone()
                .unwrap_or_else(|| format!("block-{}", self.position)),
            title: self.block.title.clone(),
            slug,
            excerpt: plain_excerpt(&excerpt_text, defaults.excerpt_chars),
            content: format_content(&markdown),
            order_number,
            source_ordinal: self.block.ordinal,
            cover_image: defaults.default_cover_image.clone(),
            author: defaults.default_author.clone(),
            read_time: format!("{minutes} min read"),
            published_at: self.block.updated_at.or(page_updated_at),
        }
    }
}

/// Slug for `title`, made unique within one extraction.
fn unique_slug(title: &str, order_number: u32, used: &mut HashSet<String>) -> String {
    let base = match slugify(title) {
        s if s.is_empty() => format!("post-{order_number}"),
        s => s,
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }

    if candidate != base {
        warn!(%base, slug = %candidate, "duplicate slug disambiguated");
    }

    used.insert(candidate.clone());
    candidate
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::find_post_by_slug;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn load_fixture(name: &str) -> Value {
        let raw = std::fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"));
        serde_json::from_str(&raw).unwrap_or_else(|e| panic!("invalid fixture {name}: {e}"))
    }

    fn orders(posts: &[BlogPost]) -> Vec<u32> {
        posts.iter().map(|p| p.order_number).collect()
    }

    // --- Fixture-based tests ---

    #[test]
    fn fixture_posts_are_ordered_and_cleaned() {
        let payload = load_fixture("json/blog-page.fixture.json");
        let posts = extract_blog_posts_default(&payload).unwrap();

        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["study-tips", "exam-prep-without-panic", "how-parents-can-help"]
        );
        assert_eq!(orders(&posts), vec![1, 2, 3]);
        assert_eq!(posts[0].title, "Study Tips");
        assert_eq!(posts[0].id, "b-study");
    }

    #[test]
    fn fixture_content_and_metadata() {
        let payload = load_fixture("json/blog-page.fixture.json");
        let posts = extract_blog_posts_default(&payload).unwrap();

        let study = &posts[0];
        assert_eq!(
            study.content,
            "<p>Short sessions beat cramming.</p><h2>Spaced repetition</h2>\
             <p>Review on day 1, 3 and 7.</p><h2>Active recall</h2>\
             <p>Close the book and explain it.</p>"
        );
        assert_eq!(study.excerpt, "Short sessions beat cramming.");
        assert_eq!(study.author, "TutorHub Team");
        assert_eq!(study.read_time, "1 min read");

        let exam = &posts[1];
        assert_eq!(
            exam.content,
            "<p>Start <strong>early</strong>.</p><p>Make a plan.</p>"
        );
        assert!(!exam.excerpt.contains("<html>"));
        assert_eq!(
            exam.published_at.map(|d| d.to_rfc3339()),
            Some("2024-02-10T09:30:00+00:00".to_string())
        );

        let parents = &posts[2];
        assert_eq!(parents.excerpt, "Set a fixed homework time.");
        // Falls back to the page timestamp.
        assert_eq!(
            parents.published_at.map(|d| d.to_rfc3339()),
            Some("2024-03-01T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn collection_envelope_is_unwrapped() {
        let page = load_fixture("json/blog-page.fixture.json");
        let envelope = json!({ "docs": [page], "totalDocs": 1 });
        let posts = extract_blog_posts_default(&envelope).unwrap();
        assert_eq!(posts.len(), 3);
    }

    // --- Error and edge cases ---

    #[test]
    fn missing_layout_is_invalid_content() {
        let err = extract_blog_posts_default(&json!({ "title": "Blog" })).unwrap_err();
        assert!(matches!(err, TutorHubError::InvalidContent { .. }));

        let err = extract_blog_posts_default(&json!({ "layout": "nope" })).unwrap_err();
        assert!(matches!(err, TutorHubError::InvalidContent { .. }));

        let err = extract_blog_posts_default(&json!({ "docs": [] })).unwrap_err();
        assert!(matches!(err, TutorHubError::InvalidContent { .. }));
    }

    #[test]
    fn empty_layout_yields_no_posts() {
        let posts = extract_blog_posts_default(&json!({ "layout": [] })).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn enumeration_order_without_ordinals() {
        let payload = json!({ "layout": [
            { "title": "First", "intro": "a" },
            { "blockType": "hero", "title": "Not an article" },
            { "title": "Second", "intro": "b" },
        ]});
        let posts = extract_blog_posts_default(&payload).unwrap();
        assert_eq!(orders(&posts), vec![1, 2]);
        assert_eq!(posts[1].title, "Second");
        assert_eq!(posts[1].id, "block-2");
    }

    #[test]
    fn explicit_ordinals_win_and_are_renumbered() {
        let payload = json!({ "layout": [
            { "id": 1, "title": "10. Late", "intro": "x" },
            { "id": 2, "title": "Unnumbered", "intro": "x" },
            { "id": 3, "title": "1. Early", "intro": "x" },
        ]});
        let posts = extract_blog_posts_default(&payload).unwrap();

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Unnumbered", "Late"]);
        assert_eq!(orders(&posts), vec![1, 2, 3]);
        assert_eq!(posts[0].id, "3");
    }

    #[test]
    fn explicit_ordinal_survives_renumbering() {
        let payload = json!({ "layout": [
            { "title": "Intro Post", "intro": "a" },
            { "title": "3. Exam Prep", "intro": "b" },
            { "title": "Parents Guide", "intro": "c" },
        ]});
        let posts = extract_blog_posts_default(&payload).unwrap();

        assert_eq!(orders(&posts), vec![1, 2, 3]);
        assert_eq!(posts[1].slug, "exam-prep");
        assert_eq!(posts[1].source_ordinal, Some(3));
        assert_eq!(posts[2].source_ordinal, None);

        let found = find_post_by_slug(&posts, "3-old-renamed-link").unwrap();
        assert_eq!(found.slug, "exam-prep");
    }

    #[test]
    fn duplicate_titles_get_distinct_slugs() {
        let payload = json!({ "layout": [
            { "title": "Tips", "intro": "a" },
            { "title": "Tips", "intro": "b" },
            { "title": "!!!", "intro": "c" },
        ]});
        let posts = extract_blog_posts_default(&payload).unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["tips", "tips-2", "post-3"]);

        for p in &posts {
            assert_eq!(find_post_by_slug(&posts, &p.slug), Some(p));
        }
    }

    #[test]
    fn missing_intro_uses_fallback_excerpt() {
        let payload = json!({ "layout": [
            { "title": "Only services", "services": [ { "serviceTitle": "Heading only" } ] },
        ]});
        let posts = extract_blog_posts_default(&payload).unwrap();
        assert_eq!(posts[0].excerpt, NO_DESCRIPTION);
        assert_eq!(posts[0].content, "<h2>Heading only</h2>");
    }

    #[test]
    fn custom_defaults_are_applied() {
        let defaults = BlogDefaults {
            default_author: "Ms. Rivera".into(),
            default_cover_image: "/c.png".into(),
            words_per_minute: 2,
            excerpt_chars: 8,
        };
        let payload = json!({ "layout": [
            { "title": "Post", "intro": "one two three four five" },
        ]});
        let posts = extract_blog_posts(&payload, &defaults).unwrap();
        assert_eq!(posts[0].author, "Ms. Rivera");
        assert_eq!(posts[0].cover_image, "/c.png");
        assert_eq!(posts[0].read_time, "3 min read");
        assert_eq!(posts[0].excerpt, "one two…");
    }
}
