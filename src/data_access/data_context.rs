//! Task rows in a single redb file.
//!
//! `tasks` maps id → postcard-encoded row. `tasks_by_created_at` is an
//! ordering index keyed by (created_at, id) so listing never has to sort.
//! `task_meta` holds the id sequence; ids are never handed out twice.

use chrono::{Datelike, NaiveDate};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};

use crate::{
    data_access::store_error::StoreError,
    task::{NewTask, Task, TaskFilter},
};

const TASKS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("tasks");
const TASKS_BY_CREATED_AT: TableDefinition<(i32, u64), ()> = TableDefinition::new("tasks_by_created_at");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("task_meta");

const NEXT_ID_KEY: &str = "next_id";

/// On-disk row. The id lives in the key, the date as days from CE.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    title: String,
    completed: bool,
    created_at: i32,
}

fn days_from_ce(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn encode_task(task: &Task) -> Result<Vec<u8>, StoreError> {
    let record = TaskRecord {
        title: task.title.clone(),
        completed: task.completed,
        created_at: days_from_ce(task.created_at),
    };
    postcard::to_allocvec(&record).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode_record(bytes: &[u8]) -> Result<TaskRecord, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode_task(id: u64, bytes: &[u8]) -> Result<Task, StoreError> {
    let record = decode_record(bytes)?;
    let created_at = NaiveDate::from_num_days_from_ce_opt(record.created_at)
        .ok_or(StoreError::InvalidDate(record.created_at))?;
    Ok(Task {
        id,
        title: record.title,
        completed: record.completed,
        created_at,
    })
}

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Open (or create) the database file and make sure every table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TASKS_TABLE)?;
            let _ = write_txn.open_table(TASKS_BY_CREATED_AT)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;
        Ok(DataContext { db: Arc::new(db) })
    }

    /// Live handles on the database, one per clone of this context.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.db)
    }

    pub fn count_tasks(&self) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;
        Ok(tasks_table.len()?)
    }

    /// Store a new task under the next id of the sequence.
    pub fn insert_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let write_txn = self.db.begin_write()?;
        let task;
        {
            let mut meta = write_txn.open_table(META_TABLE)?;
            let id = meta.get(NEXT_ID_KEY)?.map(|guard| guard.value()).unwrap_or(1);
            meta.insert(NEXT_ID_KEY, id + 1)?;

            task = new_task.with_id(id);
            let task_bytes = encode_task(&task)?;

            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            tasks_table.insert(task.id, task_bytes.as_slice())?;

            let mut index = write_txn.open_table(TASKS_BY_CREATED_AT)?;
            index.insert((days_from_ce(task.created_at), task.id), ())?;
        }
        write_txn.commit()?;
        Ok(task)
    }

    pub fn get_task(&self, id: u64) -> Result<Option<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        match tasks_table.get(id)? {
            Some(data) => Ok(Some(decode_task(id, data.value())?)),
            None => Ok(None),
        }
    }

    /// Tasks in ascending `created_at` order (ties by id), filtered, then paged.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TASKS_BY_CREATED_AT)?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let mut tasks = Vec::new();
        let mut skipped = 0;
        for entry in index.iter()? {
            if tasks.len() as u64 >= filter.limit {
                break;
            }
            let (key, _) = entry?;
            let (_, id) = key.value();
            let Some(data) = tasks_table.get(id)? else {
                continue;
            };
            let task = decode_task(id, data.value())?;
            if !filter.matches(&task) {
                continue;
            }
            if skipped < filter.offset {
                skipped += 1;
                continue;
            }
            tasks.push(task);
        }
        Ok(tasks)
    }

    /// Read-modify-write of one task inside a single write transaction.
    /// Returns `None` (and writes nothing) when the id does not exist.
    pub fn modify_task<F>(&self, id: u64, apply: F) -> Result<Option<Task>, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let write_txn = self.db.begin_write()?;
        let task;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let current = tasks_table
                .get(id)?
                .map(|data| decode_task(id, data.value()))
                .transpose()?;
            let Some(mut updated) = current else {
                return Ok(None);
            };

            // id and created_at are fixed: the ordering index depends on both.
            let created_at = updated.created_at;
            apply(&mut updated);
            updated.id = id;
            updated.created_at = created_at;

            let task_bytes = encode_task(&updated)?;
            tasks_table.insert(id, task_bytes.as_slice())?;
            task = updated;
        }
        write_txn.commit()?;
        Ok(Some(task))
    }

    pub fn delete_task(&self, id: u64) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let removed = tasks_table
                .remove(id)?
                .map(|data| decode_record(data.value()))
                .transpose()?;

            deleted = match removed {
                Some(record) => {
                    let mut index = write_txn.open_table(TASKS_BY_CREATED_AT)?;
                    index.remove((record.created_at, id))?;
                    true
                }
                None => false,
            };
        }
        write_txn.commit()?;
        Ok(deleted)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs, path::PathBuf};

    /// Create a temp database file that is removed on drop.
    struct TempDb {
        ctx: DataContext,
        path: PathBuf,
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    fn temp_db(name: &str) -> TempDb {
        let path = env::temp_dir().join(format!("tasks_test_{name}_{}.redb", std::process::id()));
        let _ = fs::remove_file(&path); // clean up any leftover
        let ctx = DataContext::new(&path).unwrap();
        TempDb { ctx, path }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_task(title: &str, completed: bool, created_at: NaiveDate) -> NewTask {
        NewTask {
            title: title.to_string(),
            completed,
            created_at,
        }
    }

    fn all(status: Option<bool>) -> TaskFilter {
        TaskFilter { offset: 0, limit: 20, status }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let db = temp_db("ids");

        let first = db.ctx.insert_task(new_task("a", false, date(2026, 1, 1))).unwrap();
        let second = db.ctx.insert_task(new_task("b", false, date(2026, 1, 1))).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(db.ctx.count_tasks().unwrap(), 2);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let db = temp_db("reuse");

        let first = db.ctx.insert_task(new_task("a", false, date(2026, 1, 1))).unwrap();
        assert!(db.ctx.delete_task(first.id).unwrap());

        let second = db.ctx.insert_task(new_task("b", false, date(2026, 1, 1))).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(db.ctx.get_task(first.id).unwrap(), None);
    }

    #[test]
    fn get_round_trips_all_fields() {
        let db = temp_db("get");

        let created = db.ctx.insert_task(new_task("buy milk", true, date(2024, 2, 29))).unwrap();
        assert_eq!(db.ctx.get_task(created.id).unwrap(), Some(created));
        assert_eq!(db.ctx.get_task(999).unwrap(), None);
    }

    #[test]
    fn list_orders_by_created_at_then_id() {
        let db = temp_db("order");

        db.ctx.insert_task(new_task("late", false, date(2026, 3, 1))).unwrap();
        db.ctx.insert_task(new_task("early", false, date(2026, 1, 1))).unwrap();
        db.ctx.insert_task(new_task("middle-1", false, date(2026, 2, 1))).unwrap();
        db.ctx.insert_task(new_task("middle-2", false, date(2026, 2, 1))).unwrap();

        let titles: Vec<String> = db.ctx.list_tasks(&all(None)).unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["early", "middle-1", "middle-2", "late"]);
    }

    #[test]
    fn list_filters_by_status() {
        let db = temp_db("status");

        db.ctx.insert_task(new_task("open", false, date(2026, 1, 1))).unwrap();
        db.ctx.insert_task(new_task("done", true, date(2026, 1, 2))).unwrap();

        let done = db.ctx.list_tasks(&all(Some(true))).unwrap();
        assert_eq!(done.len(), 1);
        assert!(done[0].completed);

        let open = db.ctx.list_tasks(&all(Some(false))).unwrap();
        assert_eq!(open.len(), 1);
        assert!(!open[0].completed);

        assert_eq!(db.ctx.list_tasks(&all(None)).unwrap().len(), 2);
    }

    #[test]
    fn list_applies_offset_after_filter() {
        let db = temp_db("paging");

        for day in 1..=6 {
            db.ctx.insert_task(new_task(&format!("t{day}"), day % 2 == 0, date(2026, 1, day))).unwrap();
        }

        let page = db.ctx
            .list_tasks(&TaskFilter { offset: 1, limit: 1, status: Some(true) })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "t4");

        let empty = db.ctx
            .list_tasks(&TaskFilter { offset: 0, limit: 0, status: None })
            .unwrap();
        assert!(empty.is_empty());

        let past_end = db.ctx
            .list_tasks(&TaskFilter { offset: 10, limit: 20, status: None })
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[test]
    fn modify_keeps_id_and_created_at() {
        let db = temp_db("modify");

        let created = db.ctx.insert_task(new_task("draft", false, date(2026, 5, 5))).unwrap();
        let updated = db.ctx
            .modify_task(created.id, |task| {
                task.title = "final".to_string();
                task.completed = true;
                task.id = 42;
                task.created_at = date(1999, 1, 1);
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.title, "final");
        assert_eq!(db.ctx.get_task(created.id).unwrap(), Some(updated));
        assert_eq!(db.ctx.list_tasks(&all(None)).unwrap().len(), 1);
    }

    #[test]
    fn modify_missing_task_is_none() {
        let db = temp_db("modify_missing");
        let result = db.ctx.modify_task(5, |task| task.completed = true).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn delete_removes_row_and_index_entry() {
        let db = temp_db("delete");

        let doomed = db.ctx.insert_task(new_task("doomed", false, date(2026, 1, 1))).unwrap();
        assert!(db.ctx.delete_task(doomed.id).unwrap());
        assert!(!db.ctx.delete_task(doomed.id).unwrap());

        assert_eq!(db.ctx.get_task(doomed.id).unwrap(), None);
        assert!(db.ctx.list_tasks(&all(None)).unwrap().is_empty());
    }

    #[test]
    fn data_survives_reopen() {
        let path = env::temp_dir().join(format!("tasks_test_reopen_{}.redb", std::process::id()));
        let _ = fs::remove_file(&path);

        let created = {
            let ctx = DataContext::new(&path).unwrap();
            ctx.insert_task(new_task("persisted", false, date(2026, 1, 1))).unwrap()
        };

        // Reopen: the row and the id sequence should both be there
        let ctx = DataContext::new(&path).unwrap();
        assert_eq!(ctx.get_task(created.id).unwrap(), Some(created.clone()));
        let next = ctx.insert_task(new_task("next", false, date(2026, 1, 1))).unwrap();
        assert_eq!(next.id, created.id + 1);

        drop(ctx);
        let _ = fs::remove_file(&path);
    }
}
