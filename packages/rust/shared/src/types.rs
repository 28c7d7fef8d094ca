//! Core domain types for TutorHub content and contacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

// ---------------------------------------------------------------------------
// BlogPost
// ---------------------------------------------------------------------------

/// An article derived from a CMS layout block. Rebuilt on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Stable identifier taken from the source block.
    pub id: String,
    /// Display title with any ordinal prefix and surrounding quotes removed.
    pub title: String,
    /// URL-safe identifier derived from the title, unique within one fetch.
    pub slug: String,
    /// Plain-text summary shown on listing cards.
    pub excerpt: String,
    /// HTML fragment rendered from the block's markdown.
    pub content: String,
    /// 1-based display position, contiguous within one fetch.
    pub order_number: u32,
    /// Ordinal written in the source title (`"3. Title"`), before renumbering.
    #[serde(skip)]
    pub source_ordinal: Option<u32>,
    pub cover_image: String,
    pub author: String,
    /// Human-readable estimate such as `"3 min read"`.
    pub read_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Relationship tag carried by a contactable participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Tutor,
    Parent,
    Student,
    /// Sentinel entries that carry a notice rather than a real contact.
    Info,
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tutor => "tutor",
            Self::Parent => "parent",
            Self::Student => "student",
            Self::Info => "info",
        };
        f.pad(s)
    }
}

/// Someone the current user may start a conversation with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: ParticipantRole,
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// A user object as returned by the profile API.
///
/// Relationship arrays are optional upstream; missing or `null` arrays
/// deserialize as empty, and unusable entries inside them are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,
    /// Single-role form used by some user collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "usable_relations")]
    pub tutors: Vec<RelationRef>,
    #[serde(default, deserialize_with = "usable_relations")]
    pub parents: Vec<RelationRef>,
    #[serde(default, deserialize_with = "usable_relations")]
    pub children: Vec<RelationRef>,
    #[serde(default, deserialize_with = "usable_relations")]
    pub students: Vec<RelationRef>,
}

impl UserProfile {
    /// A bare profile with only an identifier, mostly useful in tests.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// All declared role names, `roles` first, then the single `role` field.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .map(String::as_str)
            .chain(self.role.as_deref())
    }

    /// `"First Last"` when either name part is present.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

// ---------------------------------------------------------------------------
// RelationRef
// ---------------------------------------------------------------------------

/// A relationship entry: either a bare ID or an embedded sub-profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationRef {
    Id(#[serde(deserialize_with = "id_from_string_or_number")] String),
    Embedded(Box<UserProfile>),
}

/// A relationship entry normalized to an ID plus optional display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl RelationRef {
    /// Normalize either variant into an ID with whatever display data exists.
    pub fn resolve(&self) -> ResolvedRef {
        match self {
            Self::Id(id) => ResolvedRef {
                id: id.clone(),
                display_name: None,
                email: None,
            },
            Self::Embedded(profile) => ResolvedRef {
                id: profile.id.clone(),
                display_name: profile.full_name(),
                email: profile.email.clone().filter(|e| !e.trim().is_empty()),
            },
        }
    }

    /// The embedded profile, if this reference carries one.
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Id(_) => None,
            Self::Embedded(profile) => Some(profile),
        }
    }
}

impl From<UserProfile> for RelationRef {
    fn from(profile: UserProfile) -> Self {
        Self::Embedded(Box::new(profile))
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Like [`null_as_empty`], but entries that are neither an id nor a profile
/// with an id (`null`, `{}` without `id`, booleans) are skipped.
fn usable_relations<'de, D>(deserializer: D) -> std::result::Result<Vec<RelationRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = null_as_empty(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match RelationRef::deserialize(&value) {
            Ok(relation) => Some(relation),
            Err(e) => {
                trace!(%value, error = %e, "skipping unusable relation entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_ref_accepts_id_or_object() {
        let json = r#"{
            "id": "t1",
            "roles": ["tutor"],
            "students": [
                "s1",
                42,
                { "id": "s3", "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com" }
            ]
        }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("deserialize");

        assert_eq!(profile.students.len(), 3);
        assert_eq!(profile.students[0], RelationRef::Id("s1".into()));
        assert_eq!(profile.students[1], RelationRef::Id("42".into()));

        let resolved = profile.students[2].resolve();
        assert_eq!(resolved.id, "s3");
        assert_eq!(resolved.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(resolved.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn missing_and_null_relations_are_empty() {
        let json = r#"{ "id": 7, "tutors": null }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("deserialize");
        assert_eq!(profile.id, "7");
        assert!(profile.tutors.is_empty());
        assert!(profile.children.is_empty());
        assert_eq!(profile.role_names().count(), 0);
    }

    #[test]
    fn role_names_include_single_role_field() {
        let json = r#"{ "id": "u1", "roles": ["parent"], "role": "admin" }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("deserialize");
        let roles: Vec<&str> = profile.role_names().collect();
        assert_eq!(roles, vec!["parent", "admin"]);
    }

    #[test]
    fn full_name_skips_blank_parts() {
        let mut profile = UserProfile::with_id("u1");
        assert_eq!(profile.full_name(), None);

        profile.first_name = Some("Grace".into());
        profile.last_name = Some("  ".into());
        assert_eq!(profile.full_name().as_deref(), Some("Grace"));
    }

    #[test]
    fn blog_post_serializes_camel_case() {
        let post = BlogPost {
            id: "b1".into(),
            title: "Study Tips".into(),
            slug: "study-tips".into(),
            excerpt: "Short".into(),
            content: "<p>Body</p>".into(),
            order_number: 1,
            source_ordinal: Some(4),
            cover_image: "/cover.jpg".into(),
            author: "Team".into(),
            read_time: "1 min read".into(),
            published_at: None,
        };

        let json = serde_json::to_value(&post).expect("serialize");
        assert_eq!(json["orderNumber"], 1);
        assert_eq!(json["coverImage"], "/cover.jpg");
        assert!(json.get("publishedAt").is_none());
        assert!(json.get("sourceOrdinal").is_none());
    }

    #[test]
    fn participant_role_serializes_lowercase() {
        let p = Participant {
            id: "p1".into(),
            name: "Pat".into(),
            email: String::new(),
            role: ParticipantRole::Parent,
        };
        let json = serde_json::to_value(&p).expect("serialize");
        assert_eq!(json["role"], "parent");
        assert_eq!(ParticipantRole::Info.to_string(), "info");
    }

    #[test]
    fn participant_role_display_honors_width() {
        assert_eq!(format!("[{:<8}]", ParticipantRole::Tutor), "[tutor   ]");
        assert_eq!(format!("[{:>7}]", ParticipantRole::Parent), "[ parent]");
    }

    #[test]
    fn null_relation_entries_are_skipped() {
        let json = r#"{
            "id": "t1",
            "roles": ["tutor"],
            "students": [null, { "id": "s1", "firstName": "Sam" }, true]
        }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("deserialize");
        assert_eq!(profile.students.len(), 1);
        assert_eq!(profile.students[0].resolve().id, "s1");
    }

    #[test]
    fn embedded_relation_without_id_is_skipped() {
        let json = r#"{
            "id": "p1",
            "roles": ["parent"],
            "children": [
                { "firstName": "NoId" },
                { "id": "c1", "tutors": [null, "t9", { "lastName": "Ghost" }] }
            ]
        }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("deserialize");
        assert_eq!(profile.children.len(), 1);

        let child = profile.children[0].profile().expect("embedded child");
        assert_eq!(child.id, "c1");
        assert_eq!(child.tutors, vec![RelationRef::Id("t9".into())]);
    }
}
