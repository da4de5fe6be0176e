//! The board store: sole owner of the board and of its persistence.
//!
//! Every operation runs to completion before returning. Invalid arguments
//! (blank text, an id that is not where the caller says it is, a move onto
//! the same column) leave the board untouched. Storage failures are logged
//! and swallowed; the in-memory board stays authoritative.

use crate::domain::{snapshot, Board, BoardConfig, ColumnId, NewTask, Task, TaskId, TaskPatch};
use crate::storage::Storage;
use tracing::{debug, trace, warn};

/// Reads the stored board, falling back to an empty one
///
/// Nothing stored, an unreadable backend and a malformed snapshot all give
/// the same default board. When the primary key holds nothing, a task list
/// saved under the legacy key is migrated instead.
pub fn load_snapshot<S: Storage + ?Sized>(storage: &S, config: &BoardConfig) -> Board {
    restore(storage, config).0
}

/// Like [`load_snapshot`], also reporting whether the board came from the legacy key
fn restore<S: Storage + ?Sized>(storage: &S, config: &BoardConfig) -> (Board, bool) {
    let key = config.storage_key.as_str();
    match storage.read(key) {
        Ok(Some(text)) => return (decode_or_default(key, &text, config), false),
        Ok(None) => debug!(key, "no stored board"),
        Err(error) => {
            warn!(key, %error, "could not read board snapshot");
            return (Board::new(&config.titles), false);
        }
    }

    let Some(legacy) = config.legacy_key.as_deref().filter(|legacy| *legacy != key) else {
        return (Board::new(&config.titles), false);
    };
    match storage.read(legacy) {
        Ok(Some(text)) => match snapshot::decode(&text, &config.titles) {
            Ok(board) => {
                debug!(key = legacy, tasks = board.task_count(), "migrating legacy task list");
                (board, true)
            }
            Err(error) => {
                warn!(key = legacy, %error, "discarding malformed legacy task list");
                (Board::new(&config.titles), false)
            }
        },
        Ok(None) => {
            debug!(key, "starting with an empty board");
            (Board::new(&config.titles), false)
        }
        Err(error) => {
            warn!(key = legacy, %error, "could not read legacy task list");
            (Board::new(&config.titles), false)
        }
    }
}

fn decode_or_default(key: &str, text: &str, config: &BoardConfig) -> Board {
    match snapshot::decode(text, &config.titles) {
        Ok(board) => {
            debug!(key, tasks = board.task_count(), "restored board snapshot");
            board
        }
        Err(error) => {
            warn!(key, %error, "discarding malformed board snapshot");
            Board::new(&config.titles)
        }
    }
}

pub struct BoardStore<S: Storage> {
    board: Board,
    storage: S,
    config: BoardConfig,
}

impl<S: Storage> BoardStore<S> {
    /// Opens the store, restoring whatever snapshot the storage holds
    ///
    /// A migrated legacy list is written back under the primary key right
    /// away. The legacy entry itself is left alone.
    pub fn open(storage: S, config: BoardConfig) -> Self {
        let (board, migrated) = restore(&storage, &config);
        let mut store = Self {
            board,
            storage,
            config,
        };
        if migrated {
            store.persist();
        }
        store
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Appends a new task to the backlog
    ///
    /// Returns `None`, and changes nothing, when the text is blank.
    pub fn add_task(&mut self, draft: NewTask) -> Option<Task> {
        let mut id = TaskId::generate();
        while self.board.contains_task(&id) {
            id = TaskId::generate();
        }

        let Some(task) = draft.into_task(id) else {
            trace!("ignoring task with blank text");
            return None;
        };

        debug!(task_id = %task.id(), "adding task to backlog");
        self.board.push(ColumnId::Backlog, task.clone());
        self.persist();
        Some(task)
    }

    /// Removes a task from `column`; returns whether it was there
    pub fn delete_task(&mut self, column: ColumnId, task_id: &TaskId) -> bool {
        if self.board.remove(column, task_id).is_none() {
            trace!(%column, %task_id, "delete ignored, task not in column");
            return false;
        }

        debug!(%column, %task_id, "deleted task");
        self.persist();
        true
    }

    /// Merges `patch` into a task in `column`; returns whether anything changed
    pub fn update_task(&mut self, column: ColumnId, task_id: &TaskId, patch: TaskPatch) -> bool {
        if !self.board.update(column, task_id, patch) {
            trace!(%column, %task_id, "update had no effect");
            return false;
        }

        debug!(%column, %task_id, "updated task");
        self.persist();
        true
    }

    /// Moves a task to the end of `to`
    ///
    /// Same-column moves never reorder anything. A task that is not in
    /// `from` (a stale or duplicated drag payload) is left where it is.
    pub fn move_task(&mut self, task_id: &TaskId, from: ColumnId, to: ColumnId) -> bool {
        if !self.board.move_task(task_id, from, to) {
            trace!(%task_id, %from, %to, "move ignored");
            return false;
        }

        debug!(%task_id, %from, %to, "moved task");
        self.persist();
        true
    }

    /// Replaces the board with three empty columns
    pub fn reset_board(&mut self) {
        debug!(discarded = self.board.task_count(), "resetting board");
        self.board = Board::new(&self.config.titles);
        self.persist();
    }

    /// Reads the stored snapshot without replacing the live board
    pub fn load_snapshot(&self) -> Board {
        load_snapshot(&self.storage, &self.config)
    }

    /// Writes the current board to storage. Failures are logged and dropped.
    pub fn persist(&mut self) {
        let key = self.config.storage_key.as_str();
        let text = match snapshot::encode(&self.board) {
            Ok(text) => text,
            Err(error) => {
                warn!(key, %error, "could not encode board snapshot");
                return;
            }
        };

        match self.storage.write(key, &text) {
            Ok(()) => trace!(key, bytes = text.len(), "persisted board snapshot"),
            Err(error) => warn!(key, %error, "could not persist board snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnTitles, Priority};
    use crate::error::{KanbanError, Result};
    use crate::storage::MemoryStorage;
    use std::collections::HashSet;
    use tracing_test::traced_test;

    fn empty_store() -> BoardStore<MemoryStorage> {
        BoardStore::open(MemoryStorage::new(), BoardConfig::default())
    }

    fn ids(store: &BoardStore<MemoryStorage>, column: ColumnId) -> Vec<TaskId> {
        ids_of(store.board(), column)
    }

    fn ids_of(board: &Board, column: ColumnId) -> Vec<TaskId> {
        board
            .column(column)
            .items
            .iter()
            .map(|t| t.id().clone())
            .collect()
    }

    fn stored(store: &BoardStore<MemoryStorage>) -> Option<String> {
        store
            .storage()
            .get(BoardConfig::DEFAULT_STORAGE_KEY)
            .map(str::to_string)
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(KanbanError::Storage("storage disabled".to_string()))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(KanbanError::Storage("storage disabled".to_string()))
        }
    }

    #[test]
    fn test_write_spec_scenario() {
        let mut store = empty_store();

        let task = store.add_task(NewTask::new("Write spec")).unwrap();
        assert_eq!(ids(&store, ColumnId::Backlog), vec![task.id().clone()]);
        assert!(store.board().column(ColumnId::Doing).is_empty());
        assert!(store.board().column(ColumnId::Done).is_empty());
        assert_eq!(task.priority(), Priority::Normal);
        assert!(task.deadline().is_none());

        assert!(store.move_task(task.id(), ColumnId::Backlog, ColumnId::Doing));
        assert!(store.board().column(ColumnId::Backlog).is_empty());
        assert_eq!(ids(&store, ColumnId::Doing), vec![task.id().clone()]);

        assert!(store.update_task(
            ColumnId::Doing,
            task.id(),
            TaskPatch::default().priority(Priority::High)
        ));
        let updated = &store.board().column(ColumnId::Doing).items[0];
        assert_eq!(updated.priority(), Priority::High);
        assert_eq!(updated.id(), task.id());
        assert_eq!(updated.created_at(), task.created_at());
    }

    #[test]
    fn test_added_ids_are_unique() {
        let mut store = empty_store();
        let mut seen = HashSet::new();

        for n in 0..50 {
            let task = store.add_task(NewTask::new(format!("Task {}", n))).unwrap();
            assert!(seen.insert(task.id().clone()));
        }
        assert_eq!(store.board().task_count(), 50);
    }

    #[test]
    fn test_add_appends_to_backlog() {
        let mut store = empty_store();
        let first = store.add_task(NewTask::new("first")).unwrap();
        let second = store
            .add_task(
                NewTask::new("second")
                    .with_priority(Priority::Low)
                    .with_description("details"),
            )
            .unwrap();

        assert_eq!(
            ids(&store, ColumnId::Backlog),
            vec![first.id().clone(), second.id().clone()]
        );
        assert_eq!(second.priority(), Priority::Low);
        assert_eq!(second.description(), "details");
    }

    #[test]
    fn test_add_blank_text_is_noop() {
        let mut store = empty_store();
        assert!(store.add_task(NewTask::new("   ")).is_none());
        assert!(store.board().is_empty());
        assert!(stored(&store).is_none());
    }

    #[test]
    fn test_move_round_trip_lands_at_end() {
        let mut store = empty_store();
        let a = store.add_task(NewTask::new("a")).unwrap();
        let b = store.add_task(NewTask::new("b")).unwrap();

        assert!(store.move_task(a.id(), ColumnId::Backlog, ColumnId::Done));
        assert!(store.move_task(a.id(), ColumnId::Done, ColumnId::Backlog));

        assert_eq!(
            ids(&store, ColumnId::Backlog),
            vec![b.id().clone(), a.id().clone()]
        );
        assert!(store.board().column(ColumnId::Done).is_empty());
    }

    #[test]
    fn test_same_column_move_is_noop() {
        let mut store = empty_store();
        let a = store.add_task(NewTask::new("a")).unwrap();
        store.add_task(NewTask::new("b")).unwrap();
        let before = store.board().clone();

        assert!(!store.move_task(a.id(), ColumnId::Backlog, ColumnId::Backlog));
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_move_unknown_task_is_noop() {
        let mut store = empty_store();
        store.add_task(NewTask::new("a")).unwrap();
        let before = store.board().clone();

        assert!(!store.move_task(
            &TaskId::from("nonexistent-id"),
            ColumnId::Backlog,
            ColumnId::Doing
        ));
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_move_from_wrong_column_is_noop() {
        let mut store = empty_store();
        let a = store.add_task(NewTask::new("a")).unwrap();
        let before = store.board().clone();

        assert!(!store.move_task(a.id(), ColumnId::Doing, ColumnId::Done));
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut store = empty_store();
        let tasks: Vec<Task> = ["a", "b", "c", "d"]
            .iter()
            .map(|text| store.add_task(NewTask::new(*text)).unwrap())
            .collect();

        assert!(store.delete_task(ColumnId::Backlog, tasks[1].id()));
        assert_eq!(
            ids(&store, ColumnId::Backlog),
            vec![
                tasks[0].id().clone(),
                tasks[2].id().clone(),
                tasks[3].id().clone()
            ]
        );

        assert!(!store.delete_task(ColumnId::Backlog, tasks[1].id()));
        assert!(!store.delete_task(ColumnId::Done, tasks[0].id()));
        assert_eq!(store.board().task_count(), 3);
    }

    #[test]
    fn test_update_missing_task_is_noop() {
        let mut store = empty_store();
        let a = store.add_task(NewTask::new("a")).unwrap();
        let before = store.board().clone();

        assert!(!store.update_task(
            ColumnId::Doing,
            a.id(),
            TaskPatch::default().priority(Priority::High)
        ));
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_reset_board() {
        let mut store = empty_store();
        store.add_task(NewTask::new("a")).unwrap();
        store.reset_board();

        assert!(store.board().is_empty());
        assert_eq!(store.board(), &Board::default());
        assert_eq!(store.load_snapshot(), Board::default());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut store = empty_store();
        let a = store.add_task(NewTask::new("a")).unwrap();
        store.move_task(a.id(), ColumnId::Backlog, ColumnId::Done);

        let restored = store.load_snapshot();
        assert!(restored.column(ColumnId::Backlog).is_empty());
        assert_eq!(restored.column(ColumnId::Done).items[0].id(), a.id());

        let reopened = BoardStore::open(store.into_storage(), BoardConfig::default());
        let (column, task) = reopened.board().find_task(a.id()).unwrap();
        assert_eq!(column, ColumnId::Done);
        assert_eq!(task.text(), "a");
    }

    #[test]
    #[traced_test]
    fn test_corrupt_snapshot_gives_default_board() {
        let mut storage = MemoryStorage::new();
        storage.insert(BoardConfig::DEFAULT_STORAGE_KEY, "{not json");

        let store = BoardStore::open(storage, BoardConfig::default());
        assert_eq!(store.board(), &Board::default());
        assert_eq!(store.load_snapshot(), Board::default());
        assert!(logs_contain("discarding malformed board snapshot"));
    }

    #[test]
    #[traced_test]
    fn test_aliased_duplicate_columns_give_default_board() {
        let mut storage = MemoryStorage::new();
        storage.insert(
            BoardConfig::DEFAULT_STORAGE_KEY,
            r#"{
                "backlog": {"id": "backlog", "title": "B", "items": [{"id": "a", "text": "one", "createdAt": 0}]},
                "todo": {"id": "todo", "title": "T", "items": [{"id": "b", "text": "two", "createdAt": 0}]}
            }"#,
        );

        let store = BoardStore::open(storage, BoardConfig::default());
        assert!(store.board().is_empty());
        assert!(logs_contain("discarding malformed board snapshot"));
    }

    #[test]
    fn test_legacy_task_list_is_migrated_on_open() {
        let legacy = r#"[
            {"id": "1", "title": "One", "description": "", "deadline": "", "status": "todo"},
            {"id": "2", "title": "Two", "description": "", "deadline": "", "status": "in-progress"}
        ]"#;
        let mut storage = MemoryStorage::new();
        storage.insert(BoardConfig::DEFAULT_LEGACY_KEY, legacy);

        let store = BoardStore::open(storage, BoardConfig::default());
        let (column, task) = store.board().find_task(&TaskId::from("2")).unwrap();
        assert_eq!(column, ColumnId::Doing);
        assert_eq!(task.text(), "Two");

        assert!(stored(&store).is_some());
        assert_eq!(
            store.storage().get(BoardConfig::DEFAULT_LEGACY_KEY),
            Some(legacy)
        );

        let reopened = store.load_snapshot();
        assert_eq!(ids_of(&reopened, ColumnId::Backlog), vec![TaskId::from("1")]);
        assert_eq!(ids_of(&reopened, ColumnId::Doing), vec![TaskId::from("2")]);
    }

    #[test]
    fn test_primary_snapshot_wins_over_legacy_list() {
        let mut storage = MemoryStorage::new();
        storage.insert(
            BoardConfig::DEFAULT_STORAGE_KEY,
            r#"{"done": {"id": "done", "title": "Done", "items": [{"id": "x", "text": "kept", "createdAt": 0}]}}"#,
        );
        storage.insert(
            BoardConfig::DEFAULT_LEGACY_KEY,
            r#"[{"id": "1", "title": "ignored", "status": "todo"}]"#,
        );

        let store = BoardStore::open(storage, BoardConfig::default());
        assert_eq!(store.board().task_count(), 1);
        assert!(store.board().contains_task(&TaskId::from("x")));
    }

    #[test]
    fn test_legacy_key_can_be_disabled() {
        let mut storage = MemoryStorage::new();
        storage.insert(
            BoardConfig::DEFAULT_LEGACY_KEY,
            r#"[{"id": "1", "title": "One", "status": "todo"}]"#,
        );

        let store = BoardStore::open(storage, BoardConfig::default().with_legacy_key(None));
        assert!(store.board().is_empty());
        assert!(stored(&store).is_none());
    }

    #[test]
    fn test_duplicate_ids_in_snapshot_give_default_board() {
        let mut storage = MemoryStorage::new();
        storage.insert(
            BoardConfig::DEFAULT_STORAGE_KEY,
            r#"{
                "backlog": {"id": "backlog", "title": "B", "items": [{"id": "x", "text": "one", "createdAt": 0}]},
                "done": {"id": "done", "title": "D", "items": [{"id": "x", "text": "two", "createdAt": 0}]}
            }"#,
        );

        let store = BoardStore::open(storage, BoardConfig::default());
        assert!(store.board().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = BoardStore::open(MemoryStorage::with_quota(16), BoardConfig::default());

        let task = store.add_task(NewTask::new("too big to store")).unwrap();

        assert!(store.board().contains_task(task.id()));
        assert!(stored(&store).is_none());
        assert!(logs_contain("could not persist board snapshot"));

        assert!(store.move_task(task.id(), ColumnId::Backlog, ColumnId::Doing));
        assert_eq!(ids(&store, ColumnId::Doing), vec![task.id().clone()]);
    }

    #[test]
    fn test_unusable_storage_is_survivable() {
        let mut store = BoardStore::open(FailingStorage, BoardConfig::default());
        assert!(store.board().is_empty());

        let task = store.add_task(NewTask::new("still works")).unwrap();
        assert!(store.delete_task(ColumnId::Backlog, task.id()));
        store.reset_board();
        assert!(store.board().is_empty());
    }

    #[test]
    fn test_custom_key_and_titles() {
        let config = BoardConfig::default()
            .with_storage_key("team-board")
            .with_titles(ColumnTitles {
                backlog: "To Do".to_string(),
                doing: "In Progress".to_string(),
                done: "Shipped".to_string(),
            });
        let mut store = BoardStore::open(MemoryStorage::new(), config);
        store.add_task(NewTask::new("a")).unwrap();

        assert!(store.storage().get("team-board").is_some());
        assert!(stored(&store).is_none());
        assert_eq!(store.board().column(ColumnId::Done).title, "Shipped");
    }
}
