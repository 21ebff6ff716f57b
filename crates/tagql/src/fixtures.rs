//! Tables shared by unit tests.

use crate::Tagged;
use chrono::{DateTime, Utc};
use uuid::Uuid;

crate::int_enum! {
    pub enum Priority {
        Low = 1,
        Medium = 2,
        High = 3,
    }
}

crate::table! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct User in "users" as UserColumns {
        pub id: Tagged<User, i64> => "id" [primary_key, has_default],
        pub name: String => "name" [has_default],
    }
}

crate::table! {
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

crate::table! {
    /// Keyless table with a generated column.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Event in "events" as EventColumns {
        pub name: String => "name",
        pub name_length: i64 => "nameLength" [read_only],
    }
}

pub fn reminder_id(n: u128) -> Tagged<Reminder, Uuid> {
    Tagged::new(Uuid::from_u128(n))
}

pub fn groceries() -> Reminder {
    Reminder {
        id: reminder_id(0),
        assigned_user_id: Some(Tagged::new(1)),
        due_date: DateTime::from_timestamp(978_307_200, 0),
        is_completed: true,
        is_flagged: false,
        notes: "Milk, Eggs, Apples".to_string(),
        priority: None,
        title: "Groceries".to_string(),
    }
}
