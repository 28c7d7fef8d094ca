//! Recently created students.
//!
//! A parent who just added a student should be able to message them before
//! the profile API reflects the new relationship. The cache is a collaborator
//! passed to the resolver, so any backend can stand in for it.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use tutorhub_shared::{Participant, ParticipantRole, Result, TutorHubError};

/// Number of students kept when no capacity is configured.
pub const DEFAULT_RECENT_CAPACITY: usize = 5;

/// Bounded, most-recent-first store of newly created students.
pub trait RecentStudents {
    /// Record a student as the most recent entry, evicting the oldest past capacity.
    fn remember(&mut self, student: Participant) -> Result<()>;

    /// Cached students, newest first.
    fn recent(&self) -> Vec<Participant>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MemoryRecentStudents {
    capacity: usize,
    entries: VecDeque<Participant>,
}

impl MemoryRecentStudents {
    /// A cache holding at most `capacity` students (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Insert at the front. An existing entry with the same id is replaced.
    pub fn push(&mut self, student: Participant) {
        self.entries.retain(|p| p.id != student.id);
        self.entries.push_front(Participant {
            role: ParticipantRole::Student,
            ..student
        });
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_entries(capacity: usize, entries: Vec<Participant>) -> Self {
        let mut cache = Self::new(capacity);
        // Stored newest first; replay oldest first to keep that order.
        for p in entries.into_iter().rev() {
            cache.push(p);
        }
        cache
    }
}

impl Default for MemoryRecentStudents {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentStudents for MemoryRecentStudents {
    fn remember(&mut self, student: Participant) -> Result<()> {
        self.push(student);
        Ok(())
    }

    fn recent(&self) -> Vec<Participant> {
        self.entries.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// A [`MemoryRecentStudents`] persisted to a JSON array on every change.
#[derive(Debug)]
pub struct JsonFileRecentStudents {
    path: PathBuf,
    inner: MemoryRecentStudents,
}

impl JsonFileRecentStudents {
    /// Load the cache at `path`. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// I/O failures and files that are not a JSON array of participants.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries: Vec<Participant> = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| TutorHubError::io(&path, e))?;
            serde_json::from_str(&raw).map_err(|e| {
                TutorHubError::parse(format!("recent-student cache {}: {e}", path.display()))
            })?
        } else {
            Vec::new()
        };

        debug!(entries = entries.len(), "loaded recent-student cache");

        Ok(Self {
            inner: MemoryRecentStudents::from_entries(capacity, entries),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| TutorHubError::io(dir, e))?;
        }

        let json = serde_json::to_string_pretty(&self.inner.recent())
            .map_err(|e| TutorHubError::parse(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| TutorHubError::io(&self.path, e))
    }
}

impl RecentStudents for JsonFileRecentStudents {
    fn remember(&mut self, student: Participant) -> Result<()> {
        self.inner.push(student);
        self.save()
    }

    fn recent(&self) -> Vec<Participant> {
        self.inner.recent()
    }
}
