//! Persistence boundary.
//!
//! The engine never talks to storage. A [`TopicStore`] hands out snapshots
//! and accepts outbound [`MutationRequest`]s; whoever implements it is
//! responsible for cascading topic-scope writes the same way the engine
//! does.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ErrorCode;
use crate::model::mutation::{MutationRequest, Scope};
use crate::snapshot::{CourseSnapshot, TopicDescriptor};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot not found at {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The store has no record with this id.
    #[error("store has no topic '{id}'")]
    UnknownId { id: String },

    #[error("write rejected: {reason}")]
    Rejected { reason: String },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Missing { .. } => ErrorCode::NotInitialized,
            Self::Json(_) => ErrorCode::SnapshotParseError,
            Self::UnknownId { .. } => ErrorCode::NodeNotFound,
            Self::Io { .. } | Self::Rejected { .. } => ErrorCode::SnapshotWriteFailed,
        }
    }
}

pub trait TopicStore {
    /// Fetch the current course snapshot.
    ///
    /// # Errors
    ///
    /// Implementation-specific read failures.
    fn load(&self) -> Result<CourseSnapshot, StoreError>;

    /// Record one completion write.
    ///
    /// # Errors
    ///
    /// Implementation-specific write failures.
    fn persist(&mut self, mutation: &MutationRequest) -> Result<(), StoreError>;

    /// Overwrite the stored snapshot after a structural edit.
    ///
    /// # Errors
    ///
    /// Implementation-specific write failures.
    fn replace(&mut self, snapshot: &CourseSnapshot) -> Result<(), StoreError>;
}

/// Apply `mutation` to stored descriptors.
///
/// Sets the target, overwrites its subtree for topic scope, then settles
/// parent flags so the stored copy obeys the same AND rule as the engine.
///
/// # Errors
///
/// [`StoreError::UnknownId`] if no descriptor carries the id.
pub fn write_mutation(
    topics: &mut [TopicDescriptor],
    mutation: &MutationRequest,
) -> Result<(), StoreError> {
    let id = mutation.id.as_str();
    let target = find_mut(topics, id).ok_or_else(|| StoreError::UnknownId { id: id.to_string() })?;
    match mutation.scope {
        Scope::Leaf => target.completed = mutation.completed,
        Scope::Topic => overwrite(target, mutation.completed),
    }
    for topic in topics.iter_mut() {
        settle(topic);
    }
    Ok(())
}

fn find_mut<'a>(topics: &'a mut [TopicDescriptor], id: &str) -> Option<&'a mut TopicDescriptor> {
    for topic in topics {
        if topic.id.trim() == id {
            return Some(topic);
        }
        if let Some(found) = find_mut(&mut topic.subtopics, id) {
            return Some(found);
        }
    }
    None
}

fn overwrite(descriptor: &mut TopicDescriptor, completed: bool) {
    descriptor.completed = completed;
    for sub in &mut descriptor.subtopics {
        overwrite(sub, completed);
    }
}

fn settle(descriptor: &mut TopicDescriptor) -> bool {
    if descriptor.subtopics.is_empty() {
        return descriptor.completed;
    }
    let mut all = true;
    for sub in &mut descriptor.subtopics {
        all &= settle(sub);
    }
    descriptor.completed = all;
    all
}

/// In-process store. Cheap to build in tests; can be switched into a
/// failing mode to exercise the no-rollback path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: CourseSnapshot,
    writes: Vec<MutationRequest>,
    fail_writes: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new(snapshot: CourseSnapshot) -> Self {
        Self {
            snapshot,
            writes: Vec::new(),
            fail_writes: false,
        }
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Every mutation accepted so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> &[MutationRequest] {
        &self.writes
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Rejected {
                reason: "store is offline".to_string(),
            });
        }
        Ok(())
    }
}

impl TopicStore for MemoryStore {
    fn load(&self) -> Result<CourseSnapshot, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn persist(&mut self, mutation: &MutationRequest) -> Result<(), StoreError> {
        self.check_writable()?;
        write_mutation(&mut self.snapshot.topics, mutation)?;
        self.writes.push(mutation.clone());
        Ok(())
    }

    fn replace(&mut self, snapshot: &CourseSnapshot) -> Result<(), StoreError> {
        self.check_writable()?;
        self.snapshot = snapshot.clone();
        Ok(())
    }
}

/// Single JSON file holding a [`CourseSnapshot`].
///
/// Every write rewrites the file through a sibling temp file and a rename,
/// so readers never see a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn write(&self, snapshot: &CourseSnapshot) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut body = snapshot.to_json_pretty()?;
        body.push('\n');

        let mut tmp_name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), topics = snapshot.topics.len(), "snapshot written");
        Ok(())
    }
}

impl TopicStore for JsonFileStore {
    fn load(&self) -> Result<CourseSnapshot, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(CourseSnapshot::from_json(&text)?)
    }

    fn persist(&mut self, mutation: &MutationRequest) -> Result<(), StoreError> {
        let mut snapshot = self.load()?;
        write_mutation(&mut snapshot.topics, mutation)?;
        self.write(&snapshot)
    }

    fn replace(&mut self, snapshot: &CourseSnapshot) -> Result<(), StoreError> {
        self.write(snapshot)
    }
}
