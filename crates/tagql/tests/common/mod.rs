#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use tagql::prelude::*;
use uuid::Uuid;

tagql::int_enum! {
    pub enum Priority {
        Low = 1,
        Medium = 2,
        High = 3,
    }
}

tagql::table! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct User in "users" as UserColumns {
        pub id: Tagged<User, i64> => "id" [primary_key, has_default],
        pub name: String => "name" [has_default],
    }
}

tagql::table! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Reminder in "reminders" as ReminderColumns {
        pub id: Tagged<Reminder, Uuid> => "id" [primary_key],
        pub assigned_user_id: Option<Tagged<User, i64>> => "assignedUserID",
        pub due_date: Option<DateTime<Utc>> => "dueDate",
        pub is_completed: bool => "isCompleted" [has_default],
        pub is_flagged: bool => "isFlagged" [has_default],
        pub notes: String => "notes" [has_default],
        pub priority: Option<Priority> => "priority",
        pub title: String => "title" [has_default],
    }
}

impl Reminder {
    pub fn new(n: u128, title: &str) -> Self {
        Self {
            id: reminder_id(n),
            assigned_user_id: None,
            due_date: None,
            is_completed: false,
            is_flagged: false,
            notes: String::new(),
            priority: None,
            title: title.to_string(),
        }
    }
}

impl ReminderColumns {
    /// Open and due before today. Undated reminders are never past due.
    pub fn is_past_due(self) -> Expr<bool> {
        let overdue: Expr<bool> =
            tagql::sql!("coalesce({}, date('now')) < date('now')", self.due_date)
                .expect("valid template");
        !self.is_completed & overdue
    }

    /// Case-insensitive search over title and notes.
    pub fn searching(self, text: &str) -> Expr<bool> {
        self.title.collate(Collation::NoCase).contains(text)
            | self.notes.collate(Collation::NoCase).contains(text)
    }
}

pub fn reminder_id(n: u128) -> Tagged<Reminder, Uuid> {
    Tagged::new(Uuid::from_u128(n))
}

pub fn user_id(n: i64) -> Tagged<User, i64> {
    Tagged::new(n)
}

/// 2001-01-01T00:00:00Z
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(978_307_200, 0).expect("valid timestamp")
}

pub const SCHEMA: &str = r#"
CREATE TABLE "reminders" (
  "id" BLOB PRIMARY KEY NOT NULL,
  "assignedUserID" INTEGER,
  "dueDate" DATE,
  "isCompleted" BOOLEAN NOT NULL DEFAULT 0,
  "isFlagged" BOOLEAN NOT NULL DEFAULT 0,
  "notes" TEXT NOT NULL DEFAULT '',
  "priority" INTEGER,
  "title" TEXT NOT NULL DEFAULT ''
);
CREATE TABLE "users" (
  "id" INTEGER PRIMARY KEY AUTOINCREMENT,
  "name" TEXT NOT NULL DEFAULT ''
);
"#;

pub fn mock_reminders() -> Vec<Reminder> {
    let now = now();
    let days = Duration::days;
    vec![
        Reminder {
            assigned_user_id: Some(user_id(1)),
            due_date: Some(now),
            notes: "Milk, Eggs, Apples".to_string(),
            ..Reminder::new(0, "Groceries")
        },
        Reminder {
            due_date: Some(now - days(2)),
            is_flagged: true,
            ..Reminder::new(1, "Haircut")
        },
        Reminder {
            due_date: Some(now),
            notes: "Ask about diet".to_string(),
            priority: Some(Priority::High),
            ..Reminder::new(2, "Doctor appointment")
        },
        Reminder {
            due_date: Some(now - days(190)),
            is_completed: true,
            ..Reminder::new(3, "Take a walk")
        },
        Reminder::new(4, "Buy concert tickets"),
        Reminder {
            assigned_user_id: Some(user_id(2)),
            due_date: Some(now + days(2)),
            is_flagged: true,
            priority: Some(Priority::High),
            ..Reminder::new(5, "Pick up kids from school")
        },
        Reminder {
            due_date: Some(now - days(2)),
            is_completed: true,
            priority: Some(Priority::Low),
            ..Reminder::new(6, "Get laundry")
        },
        Reminder {
            due_date: Some(now + days(4)),
            priority: Some(Priority::High),
            ..Reminder::new(7, "Take out trash")
        },
        Reminder {
            assigned_user_id: Some(user_id(3)),
            due_date: Some(now + days(2)),
            notes: "Status of tax return\nExpenses for next year\nChanging payroll company"
                .to_string(),
            ..Reminder::new(8, "Call accountant")
        },
        Reminder {
            assigned_user_id: Some(user_id(3)),
            due_date: Some(now - days(2)),
            is_completed: true,
            priority: Some(Priority::Medium),
            ..Reminder::new(9, "Send weekly emails")
        },
    ]
}

/// In-memory database with the schema and mock data loaded.
pub fn database() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(SCHEMA).expect("create schema");

    User::insert(|c| c.name)
        .expect("insert users")
        .values("Blob".to_string())
        .values("Blob Jr".to_string())
        .values("Blob Sr".to_string())
        .execute(&conn)
        .expect("seed users");

    Reminder::insert_records(mock_reminders())
        .execute(&conn)
        .expect("seed reminders");

    conn
}
