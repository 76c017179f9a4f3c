use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("cannot delete the only remaining user; add another user first")]
    LastUser,
}

// ---------------------------------------------------------------------------
// Row enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Store both enums as their display strings so rows stay readable with
// the sqlite3 CLI.

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        TaskStatus::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Priority::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A stored task. Field order mirrors the declared table schema and
/// rows are decoded in that same order.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub file_data: Option<Vec<u8>>,
    pub file_name: Option<String>,
    pub assigned_to: String,
    pub assigned_by: String,
}

/// A task as entered in the form, before it has an id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub file_data: Option<Vec<u8>>,
    pub file_name: Option<String>,
    pub assigned_to: String,
    pub assigned_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// TaskStore
// ---------------------------------------------------------------------------

/// SQLite-backed task and user storage. Every operation is a single
/// short-lived statement; there are no cross-operation transactions.
pub struct TaskStore {
    conn: Connection,
}

const DEFAULT_USER_EMAIL: &str = "example@example.com";
const DEFAULT_USER_NAME: &str = "Example User";

impl TaskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        store.seed_default_user()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        store.seed_default_user()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              task_name TEXT NOT NULL,
              status TEXT NOT NULL,
              due_date TEXT NOT NULL,
              priority TEXT NOT NULL,
              file_data BLOB,
              file_name TEXT,
              assigned_to TEXT NOT NULL,
              assigned_by TEXT NOT NULL,
              FOREIGN KEY (assigned_to) REFERENCES users(name),
              FOREIGN KEY (assigned_by) REFERENCES users(name)
            );

            CREATE TABLE IF NOT EXISTS users (
              email TEXT PRIMARY KEY,
              name TEXT UNIQUE NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// The app needs at least one assignable user to be usable.
    fn seed_default_user(&self) -> Result<(), StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if count == 0 {
            self.conn.execute(
                "INSERT INTO users (email, name) VALUES (?1, ?2)",
                params![DEFAULT_USER_EMAIL, DEFAULT_USER_NAME],
            )?;
        }
        Ok(())
    }

    // -- Tasks --

    pub fn add_task(&self, task: &NewTask) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO tasks (task_name, status, due_date, priority, file_data, file_name, assigned_to, assigned_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.name,
                task.status,
                task.due_date,
                task.priority,
                task.file_data,
                task.file_name,
                task.assigned_to,
                task.assigned_by,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_name, status, due_date, priority, file_data, file_name, assigned_to, assigned_by
             FROM tasks ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Task {
                id: row.get(0)?,
                name: row.get(1)?,
                status: row.get(2)?,
                due_date: row.get(3)?,
                priority: row.get(4)?,
                file_data: row.get(5)?,
                file_name: row.get(6)?,
                assigned_to: row.get(7)?,
                assigned_by: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn update_task(
        &self,
        id: i64,
        status: TaskStatus,
        due_date: NaiveDate,
        priority: Priority,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE tasks SET status = ?1, due_date = ?2, priority = ?3 WHERE id = ?4",
            params![status, due_date, priority, id],
        )?;
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(())
    }

    // -- Users --

    /// Adding an existing email is a no-op.
    pub fn add_user(&self, email: &str, name: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (email, name) VALUES (?1, ?2)",
            params![email, name],
        )?;
        Ok(())
    }

    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT email, name FROM users ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                email: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Deleting the last remaining user is refused: tasks must always
    /// have someone to be assigned to.
    pub fn delete_user(&self, email: &str) -> Result<(), StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if count <= 1 {
            return Err(StoreError::LastUser);
        }
        self.conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TaskStore {
        TaskStore::open_in_memory().unwrap()
    }

    fn new_task(name: &str) -> NewTask {
        NewTask {
            name: name.to_string(),
            status: TaskStatus::ToDo,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            priority: Priority::Medium,
            file_data: None,
            file_name: None,
            assigned_to: DEFAULT_USER_NAME.to_string(),
            assigned_by: DEFAULT_USER_NAME.to_string(),
        }
    }

    #[test]
    fn seeds_a_default_user() {
        let s = store();
        let users = s.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, DEFAULT_USER_EMAIL);
    }

    #[test]
    fn task_round_trip_keeps_every_field() {
        let s = store();
        let mut task = new_task("write report");
        task.file_data = Some(vec![1, 2, 3]);
        task.file_name = Some("notes.txt".to_string());
        let id = s.add_task(&task).unwrap();

        let tasks = s.tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        let got = &tasks[0];
        assert_eq!(got.id, id);
        assert_eq!(got.name, "write report");
        assert_eq!(got.status, TaskStatus::ToDo);
        assert_eq!(got.due_date.to_string(), "2026-09-01");
        assert_eq!(got.priority, Priority::Medium);
        assert_eq!(got.file_data.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(got.file_name.as_deref(), Some("notes.txt"));
        assert_eq!(got.assigned_to, DEFAULT_USER_NAME);
        assert_eq!(got.assigned_by, DEFAULT_USER_NAME);
    }

    #[test]
    fn update_changes_status_due_and_priority() {
        let s = store();
        let id = s.add_task(&new_task("t")).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
        s.update_task(id, TaskStatus::Completed, due, Priority::High)
            .unwrap();
        let got = &s.tasks().unwrap()[0];
        assert_eq!(got.status, TaskStatus::Completed);
        assert_eq!(got.due_date, due);
        assert_eq!(got.priority, Priority::High);
    }

    #[test]
    fn delete_removes_the_task() {
        let s = store();
        let id = s.add_task(&new_task("t")).unwrap();
        s.delete_task(id).unwrap();
        assert!(s.tasks().unwrap().is_empty());
    }

    #[test]
    fn adding_an_existing_email_is_ignored() {
        let s = store();
        s.add_user("a@example.com", "Alice").unwrap();
        s.add_user("a@example.com", "Alicia").unwrap();
        let users = s.users().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.name == "Alice"));
    }

    #[test]
    fn refuses_to_delete_the_last_user() {
        let s = store();
        let err = s.delete_user(DEFAULT_USER_EMAIL).unwrap_err();
        assert!(matches!(err, StoreError::LastUser));

        s.add_user("a@example.com", "Alice").unwrap();
        s.delete_user(DEFAULT_USER_EMAIL).unwrap();
        assert_eq!(s.users().unwrap().len(), 1);
    }

    #[test]
    fn status_and_priority_round_trip_through_sql() {
        let s = store();
        for (i, status) in TaskStatus::ALL.into_iter().enumerate() {
            let mut t = new_task(&format!("t{i}"));
            t.status = status;
            t.priority = Priority::ALL[i];
            s.add_task(&t).unwrap();
        }
        let tasks = s.tasks().unwrap();
        let statuses: Vec<TaskStatus> = tasks.iter().map(|t| t.status).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());
    }
}
