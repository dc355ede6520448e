//! One viewer's live session over a course.
//!
//! A [`Session`] owns the engine for its course and a store to write
//! through. Local state always moves first: a completion write updates the
//! tree and summary, then the outbound mutation is handed to the store.
//! If the store fails, the error carries the already-applied [`Update`]
//! and nothing is rolled back.
//!
//! Inbound snapshots (the store's change feed) replace the tree wholesale.
//! Whatever arrives last wins, including over local writes the store has
//! not echoed back yet.

use std::sync::mpsc::Receiver;

use tracing::{info, warn};

use crate::engine::{Action, Outcome, ProgressEngine, ToggleRule};
use crate::error::{EngineError, ErrorCode};
use crate::model::mutation::Update;
use crate::model::summary::ProgressSummary;
use crate::model::tree::Tree;
use crate::snapshot::CourseSnapshot;
use crate::store::{StoreError, TopicStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The local update happened; only the write-through failed.
    #[error("saved locally but not persisted: {source}")]
    Persist {
        update: Box<Update>,
        #[source]
        source: StoreError,
    },
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Engine(err) => err.code(),
            Self::Store(err) | Self::Persist { source: err, .. } => err.code(),
        }
    }

    /// The local update that was applied before persistence failed.
    #[must_use]
    pub fn applied(&self) -> Option<&Update> {
        match self {
            Self::Persist { update, .. } => Some(update),
            _ => None,
        }
    }
}

pub struct Session {
    engine: ProgressEngine,
    course_id: Option<String>,
    title: Option<String>,
    store: Box<dyn TopicStore>,
}

impl Session {
    /// Load the store's current snapshot and build the tree from it.
    ///
    /// # Errors
    ///
    /// Store read failures and snapshot validation errors.
    pub fn open(store: Box<dyn TopicStore>, rule: ToggleRule) -> Result<Self, SessionError> {
        let snapshot = store.load()?;
        let mut session = Self {
            engine: ProgressEngine::new(Tree::default(), rule),
            course_id: None,
            title: None,
            store,
        };
        session.apply_snapshot(&snapshot)?;
        Ok(session)
    }

    #[must_use]
    pub const fn engine(&self) -> &ProgressEngine {
        &self.engine
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        self.engine.summary()
    }

    #[must_use]
    pub fn store(&self) -> &dyn TopicStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn course_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Current state as a full snapshot, metadata included.
    #[must_use]
    pub fn snapshot(&self) -> CourseSnapshot {
        CourseSnapshot {
            course_id: self.course_id.clone(),
            title: self.title.clone(),
            topics: self.engine.snapshot(),
            retired: self.engine.tree().retired_ids(),
        }
    }

    /// Rebuild the tree from `snapshot`, discarding the previous one.
    ///
    /// On a validation error the previous tree is kept.
    ///
    /// # Errors
    ///
    /// See [`Tree::from_snapshot`].
    pub fn apply_snapshot(&mut self, snapshot: &CourseSnapshot) -> Result<ProgressSummary, SessionError> {
        let tree = Tree::from_snapshot(snapshot)?;
        self.engine.replace(tree);
        self.course_id.clone_from(&snapshot.course_id);
        self.title.clone_from(&snapshot.title);
        let summary = self.summary();
        info!(
            course = self.course_id.as_deref().unwrap_or("-"),
            completed = summary.completed_count,
            total = summary.total_count,
            "snapshot applied"
        );
        Ok(summary)
    }

    /// Apply every snapshot already waiting on `feed`, in arrival order.
    ///
    /// Returns how many were applied. A snapshot that fails validation is
    /// skipped with a warning.
    pub fn drain(&mut self, feed: &Receiver<CourseSnapshot>) -> usize {
        let mut applied = 0;
        for snapshot in feed.try_iter() {
            match self.apply_snapshot(&snapshot) {
                Ok(_) => applied += 1,
                Err(err) => warn!(error = %err, "skipping invalid snapshot from feed"),
            }
        }
        applied
    }

    /// Checkbox write on one unit.
    ///
    /// # Errors
    ///
    /// Engine errors leave state untouched. [`SessionError::Persist`]
    /// means the local change stands but the store did not take it.
    pub fn mark(&mut self, id: &str, completed: bool) -> Result<Update, SessionError> {
        let update = self.engine.set_leaf_completion(id, completed)?;
        self.write_through(update)
    }

    /// Topic-level write that cascades to every subtopic.
    ///
    /// # Errors
    ///
    /// As [`Session::mark`].
    pub fn mark_topic(&mut self, id: &str, completed: bool) -> Result<Update, SessionError> {
        let update = self.engine.set_topic_completion(id, completed)?;
        self.write_through(update)
    }

    /// # Errors
    ///
    /// As [`Session::mark`].
    pub fn toggle(&mut self, id: &str) -> Result<Update, SessionError> {
        let update = self.engine.toggle(id)?;
        self.write_through(update)
    }

    /// Run any [`Action`], persisting its outcome.
    ///
    /// Completion writes go out as a single mutation; structural edits
    /// re-save the whole snapshot.
    ///
    /// # Errors
    ///
    /// As [`Session::mark`]. A failed re-save after a structural edit is
    /// reported as [`SessionError::Store`]; the edit is kept locally.
    pub fn dispatch(&mut self, action: &Action) -> Result<Outcome, SessionError> {
        match self.engine.dispatch(action)? {
            Outcome::Mutated(update) => self.write_through(update).map(Outcome::Mutated),
            Outcome::Restructured { summary } => {
                let snapshot = self.snapshot();
                if let Err(err) = self.store.replace(&snapshot) {
                    warn!(error = %err, "structural edit not persisted");
                    return Err(err.into());
                }
                Ok(Outcome::Restructured { summary })
            }
        }
    }

    /// Overwrite the store with the current tree.
    ///
    /// # Errors
    ///
    /// Store write failures.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let snapshot = self.snapshot();
        self.store.replace(&snapshot)?;
        info!(topics = snapshot.topics.len(), "snapshot saved");
        Ok(())
    }

    fn write_through(&mut self, update: Update) -> Result<Update, SessionError> {
        match self.store.persist(&update.mutation) {
            Ok(()) => Ok(update),
            Err(source) => {
                warn!(
                    id = %update.mutation.id,
                    scope = %update.mutation.scope,
                    error = %source,
                    "mutation not persisted; keeping local state"
                );
                Err(SessionError::Persist {
                    update: Box::new(update),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("course_id", &self.course_id)
            .field("summary", &self.summary())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TopicDescriptor;
    use crate::store::MemoryStore;
    use std::sync::mpsc;

    fn course(done: bool) -> CourseSnapshot {
        CourseSnapshot {
            course_id: Some("cs101".into()),
            title: Some("Intro to CS".into()),
            topics: vec![
                TopicDescriptor::new("t1", "One").with_subtopics(vec![
                    TopicDescriptor::new("s1", "a").completed(done),
                    TopicDescriptor::new("s2", "b").completed(done),
                ]),
                TopicDescriptor::new("t2", "Two"),
            ],
            retired: Vec::new(),
        }
    }

    fn open(store: MemoryStore) -> Session {
        Session::open(Box::new(store), ToggleRule::Cascade).expect("open")
    }

    #[test]
    fn open_normalizes_loaded_snapshot() {
        let session = open(MemoryStore::new(course(true)));
        assert!(session.engine().tree().find("t1").expect("t1").completed());
        assert_eq!(session.summary().completed_count, 1);
        assert_eq!(session.course_title(), Some("Intro to CS"));
    }

    #[test]
    fn mark_writes_through_to_store() {
        let mut session = open(MemoryStore::new(course(false)));
        session.mark_topic("t1", true).expect("mark");
        let stored = session.store().load().expect("load");
        assert!(stored.topics[0].subtopics.iter().all(|s| s.completed));
    }

    #[test]
    fn persist_failure_keeps_local_state() {
        let mut store = MemoryStore::new(course(false));
        store.fail_writes(true);
        let mut session = open(store);

        let err = session.mark("t2", true).unwrap_err();
        let update = err.applied().expect("update survives");
        assert_eq!(update.summary.completed_count, 1);
        assert_eq!(err.code(), ErrorCode::SnapshotWriteFailed);
        assert!(session.engine().tree().find("t2").expect("t2").completed());
        assert!(!session.store().load().expect("load").topics[1].completed);
    }

    #[test]
    fn engine_error_changes_nothing() {
        let mut session = open(MemoryStore::new(course(false)));
        let err = session.toggle("missing").unwrap_err();
        assert!(matches!(err, SessionError::Engine(EngineError::NotFound { .. })));
        assert!(err.applied().is_none());
        assert_eq!(session.summary().completed_count, 0);
    }

    #[test]
    fn drained_snapshot_overrides_local_writes() {
        let mut session = open(MemoryStore::new(course(false)));
        session.mark("t2", true).expect("mark");
        assert_eq!(session.summary().completed_count, 1);

        let (tx, rx) = mpsc::channel();
        tx.send(course(true)).expect("send");
        tx.send(course(false)).expect("send");
        assert_eq!(session.drain(&rx), 2);

        // Last snapshot wins: the local t2 write is gone.
        assert_eq!(session.summary().completed_count, 0);
        assert_eq!(session.drain(&rx), 0);
    }

    #[test]
    fn invalid_snapshot_in_feed_is_skipped() {
        let mut session = open(MemoryStore::new(course(false)));
        let mut bad = course(true);
        bad.topics.push(TopicDescriptor::new("t1", "dup"));

        let (tx, rx) = mpsc::channel();
        tx.send(bad).expect("send");
        assert_eq!(session.drain(&rx), 0);
        assert_eq!(session.summary().total_count, 2);
        assert_eq!(session.summary().completed_count, 0);
    }

    #[test]
    fn removed_id_stays_retired_after_reopen() {
        let mut session = open(MemoryStore::new(course(false)));
        session
            .dispatch(&Action::Remove { id: "s2".into() })
            .expect("remove");
        let stored = session.store().load().expect("load");
        assert_eq!(stored.retired, vec!["s2"]);

        let mut reopened = open(MemoryStore::new(stored));
        let err = reopened
            .dispatch(&Action::AddSubtopic {
                parent: "t1".into(),
                topic: TopicDescriptor::new("s2", "again"),
            })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateId);
        assert_eq!(reopened.snapshot().retired, vec!["s2"]);
    }

    #[test]
    fn structural_dispatch_resaves_snapshot() {
        let mut session = open(MemoryStore::new(course(false)));
        let outcome = session
            .dispatch(&Action::AddTopic {
                topic: TopicDescriptor::new("t3", "Three"),
            })
            .expect("dispatch");
        assert_eq!(outcome.summary().total_count, 3);
        let stored = session.store().load().expect("load");
        assert_eq!(stored.topics.len(), 3);
        assert_eq!(stored.course_id.as_deref(), Some("cs101"));
    }
}
