//! Who a user may message.
//!
//! [`resolve_contactable_participants`] walks the relationship fields of a
//! profile according to the user's role. [`RecentStudents`] lets a parent see
//! students they just created before the profile catches up.

mod recent;
mod resolver;

pub use recent::{
    DEFAULT_RECENT_CAPACITY, JsonFileRecentStudents, MemoryRecentStudents, RecentStudents,
};
pub use resolver::{
    ADMIN_SENTINEL_ID, ContactScope, admin_sentinel, resolve_contactable_participants,
    resolve_with_recent,
};
