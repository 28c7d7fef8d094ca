//! Contactable participants for the "new conversation" picker.
//!
//! The list is computed from the relationship fields on the current user's
//! profile. Exactly one role branch applies per user; roles are not combined.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use tutorhub_shared::{Participant, ParticipantRole, RelationRef, UserProfile};

use crate::recent::RecentStudents;

/// Identifier of the entry returned to admins instead of a contact list.
pub const ADMIN_SENTINEL_ID: &str = "admin-info";

/// Which relationship walk applies to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactScope {
    Student,
    Parent,
    Tutor,
    Admin,
}

impl ContactScope {
    /// Checked in this order; the first role the user holds wins.
    const PRECEDENCE: [Self; 4] = [Self::Student, Self::Parent, Self::Tutor, Self::Admin];

    fn role_name(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Tutor => "tutor",
            Self::Admin => "admin",
        }
    }

    /// The scope for `user`, or `None` when no recognized role is declared.
    pub fn for_user(user: &UserProfile) -> Option<Self> {
        let roles: Vec<String> = user
            .role_names()
            .map(|r| r.trim().to_ascii_lowercase())
            .collect();

        Self::PRECEDENCE
            .into_iter()
            .find(|scope| roles.iter().any(|r| r == scope.role_name()))
    }
}

/// Everyone `user` may start a conversation with, without duplicates.
///
/// Missing relationship arrays count as empty. An unrecognized role yields
/// an empty list; admins get a single informational sentinel.
#[instrument(skip_all, fields(user = %user.id))]
pub fn resolve_contactable_participants(user: &UserProfile) -> Vec<Participant> {
    let Some(scope) = ContactScope::for_user(user) else {
        debug!("no recognized role, no contacts");
        return Vec::new();
    };

    if scope == ContactScope::Admin {
        return vec![admin_sentinel()];
    }

    let participants = dedupe_last_wins(collect(user, scope));
    debug!(?scope, count = participants.len(), "resolved contacts");
    participants
}

/// Like [`resolve_contactable_participants`], also offering a parent the
/// students they recently created.
///
/// Cached entries go first so data from the live profile wins on conflict.
#[instrument(skip_all, fields(user = %user.id))]
pub fn resolve_with_recent(user: &UserProfile, recent: &dyn RecentStudents) -> Vec<Participant> {
    if ContactScope::for_user(user) != Some(ContactScope::Parent) {
        return resolve_contactable_participants(user);
    }

    let mut raw: Vec<Participant> = recent
        .recent()
        .into_iter()
        .map(|p| Participant {
            role: ParticipantRole::Student,
            ..p
        })
        .collect();
    raw.extend(collect(user, ContactScope::Parent));

    let participants = dedupe_last_wins(raw);
    debug!(count = participants.len(), "resolved contacts with recent students");
    participants
}

/// The single entry shown to admins.
pub fn admin_sentinel() -> Participant {
    Participant {
        id: ADMIN_SENTINEL_ID.to_string(),
        name: "Admins message users from the admin panel".to_string(),
        email: String::new(),
        role: ParticipantRole::Info,
    }
}

// ---------------------------------------------------------------------------
// Relationship walks
// ---------------------------------------------------------------------------

fn collect(user: &UserProfile, scope: ContactScope) -> Vec<Participant> {
    let mut out = Vec::new();

    match scope {
        ContactScope::Student => {
            push_all(&mut out, &user.tutors, ParticipantRole::Tutor);
            push_all(&mut out, &user.parents, ParticipantRole::Parent);
        }
        ContactScope::Parent => {
            push_all(&mut out, &user.children, ParticipantRole::Student);
            for child in user.children.iter().filter_map(RelationRef::profile) {
                push_all(&mut out, &child.tutors, ParticipantRole::Tutor);
            }
        }
        ContactScope::Tutor => {
            push_all(&mut out, &user.students, ParticipantRole::Student);
            for student in user.students.iter().filter_map(RelationRef::profile) {
                push_all(&mut out, &student.parents, ParticipantRole::Parent);
            }
        }
        ContactScope::Admin => {}
    }

    out
}

fn push_all(out: &mut Vec<Participant>, refs: &[RelationRef], role: ParticipantRole) {
    for r in refs {
        let resolved = r.resolve();
        if resolved.id.trim().is_empty() {
            trace!(%role, "skipping relation without id");
            continue;
        }

        let name = resolved
            .display_name
            .or_else(|| resolved.email.clone())
            .unwrap_or_else(|| resolved.id.clone());

        out.push(Participant {
            id: resolved.id,
            name,
            email: resolved.email.unwrap_or_default(),
            role,
        });
    }
}

/// Drop repeated ids. The last occurrence's fields win; the entry stays at
/// the position where the id was first seen.
fn dedupe_last_wins(list: Vec<Participant>) -> Vec<Participant> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Participant> = Vec::with_capacity(list.len());

    for p in list {
        match index.get(&p.id) {
            Some(&i) => out[i] = p,
            None => {
                index.insert(p.id.clone(), out.len());
                out.push(p);
            }
        }
    }

    out
}
