mod common;

use chrono::DateTime;
use common::{Priority, Reminder, User, database, now, reminder_id, user_id};
use tagql::prelude::*;
use tagql::{ConstructionError, DecodeReason, DriverErrorKind};
use uuid::Uuid;

#[test]
fn select_ids_and_titles() {
    let db = database();
    let rows = Reminder::select(|c| (c.id, c.title))
        .unwrap()
        .order_by(|c| c.id)
        .unwrap()
        .fetch_all(&db)
        .unwrap();

    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0], (reminder_id(0), "Groceries".to_string()));
    assert_eq!(rows[9], (reminder_id(9), "Send weekly emails".to_string()));
    assert_eq!(
        rows[5].0.to_string(),
        "00000000-0000-0000-0000-000000000005"
    );
}

#[test]
fn join_assigned_users() {
    let db = database();
    let rows = Reminder::all()
        .join::<User, _, _>(|r, u| r.assigned_user_id.eq(u.id))
        .unwrap()
        .order_by(|(r, _)| r.due_date.desc())
        .unwrap()
        .order_by(|(r, _)| r.id)
        .unwrap()
        .select(|(r, u)| (r.title, u.name))
        .unwrap()
        .fetch_all(&db)
        .unwrap();

    let rows: Vec<(&str, &str)> = rows
        .iter()
        .map(|(title, name)| (title.as_str(), name.as_str()))
        .collect();
    assert_eq!(
        rows,
        [
            ("Pick up kids from school", "Blob Jr"),
            ("Call accountant", "Blob Sr"),
            ("Groceries", "Blob"),
            ("Send weekly emails", "Blob Sr"),
        ]
    );
}

#[test]
fn left_join_keeps_unassigned_reminders() {
    let db = database();
    let rows = Reminder::all()
        .left_join::<User, _, _>(|r, u| r.assigned_user_id.eq(u.id))
        .unwrap()
        .order_by(|(r, _)| r.id)
        .unwrap()
        .fetch_all(&db)
        .unwrap();

    assert_eq!(rows.len(), 10);
    assert_eq!(rows.iter().filter(|(_, user)| user.is_some()).count(), 4);
    let (groceries, blob) = &rows[0];
    assert_eq!(groceries.title, "Groceries");
    assert_eq!(
        blob.as_ref().map(|u| u.name.as_str()),
        Some("Blob")
    );
    assert!(rows[1].1.is_none());
}

#[test]
fn insert_with_upsert_returning_records() {
    let db = database();
    let id1 = Tagged::new(Uuid::parse_str("5D45F24C-D1AF-4981-B8F4-8BC46DF9F72C").unwrap());
    let id2 = Tagged::new(Uuid::parse_str("EA4DF179-90EA-4911-96E3-B465FC2AB76B").unwrap());
    let epoch = DateTime::from_timestamp(0, 0);

    let insert = Reminder::insert(|c| (c.id, c.title, c.is_completed, c.due_date, c.priority))
        .unwrap()
        .values((id1, "Groceries".to_string(), true, Some(now()), Some(Priority::High)))
        .values((id2, "Haircut".to_string(), false, epoch, Some(Priority::Low)))
        .on_conflict_do_update(|c, _| [c.title.set(c.title.concat(" Copy"))])
        .unwrap()
        .returning_all();

    let inserted = insert.fetch_all(&db).unwrap();
    assert_eq!(
        inserted,
        [
            Reminder {
                id: id1,
                due_date: Some(now()),
                is_completed: true,
                priority: Some(Priority::High),
                ..Reminder::new(0, "Groceries")
            },
            Reminder {
                id: id2,
                due_date: epoch,
                priority: Some(Priority::Low),
                ..Reminder::new(0, "Haircut")
            },
        ]
    );
    assert_eq!(Reminder::count().fetch_one(&db).unwrap(), 12);

    // Second run hits the primary key and renames instead
    let upserted = insert.fetch_all(&db).unwrap();
    assert_eq!(upserted[0].title, "Groceries Copy");
    assert_eq!(upserted[1].title, "Haircut Copy");
    assert_eq!(Reminder::count().fetch_one(&db).unwrap(), 12);
}

#[test]
fn insert_default_values_assigns_next_id() {
    let db = database();
    let insert = User::insert_default().returning(|c| c.id).unwrap();
    let ids = insert.fetch_all(&db).unwrap();
    assert_eq!(ids, [user_id(4)]);
    let id = ids[0];
    assert_eq!(User::count().fetch_one(&db).unwrap(), 4);

    let name = User::filter(|c| c.id.eq(id))
        .unwrap()
        .select(|c| c.name)
        .unwrap()
        .fetch_one(&db)
        .unwrap();
    assert_eq!(name, "");
}

#[test]
fn empty_insert_writes_nothing() {
    let db = database();
    Reminder::insert(|c| (c.id, c.title))
        .unwrap()
        .execute(&db)
        .unwrap();
    assert_eq!(Reminder::count().fetch_one(&db).unwrap(), 10);
}

#[test]
fn toggle_every_reminder() {
    let db = database();
    let mut rows = Reminder::update(|c| [c.is_completed.set(c.is_completed.toggle())])
        .unwrap()
        .returning(|c| (c.title, c.priority, c.is_completed))
        .unwrap()
        .fetch_all(&db)
        .unwrap();
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(rows.len(), 10);
    let reopened: Vec<_> = rows
        .iter()
        .filter(|(_, _, completed)| !completed)
        .map(|(title, priority, _)| (title.as_str(), *priority))
        .collect();
    assert_eq!(
        reopened,
        [
            ("Get laundry", Some(Priority::Low)),
            ("Send weekly emails", Some(Priority::Medium)),
            ("Take a walk", None),
        ]
    );
}

#[test]
fn complete_reminders_without_priority() {
    let db = database();
    let mut titles: Vec<String> = Reminder::update(|c| [c.is_completed.set(true)])
        .unwrap()
        .filter(|c| c.priority.is_null())
        .unwrap()
        .returning(|c| (c.title, c.priority, c.is_completed))
        .unwrap()
        .fetch_all(&db)
        .unwrap()
        .into_iter()
        .map(|(title, priority, completed)| {
            assert_eq!(priority, None);
            assert!(completed);
            title
        })
        .collect();
    titles.sort();

    assert_eq!(
        titles,
        [
            "Buy concert tickets",
            "Call accountant",
            "Groceries",
            "Haircut",
            "Take a walk"
        ]
    );
}

#[test]
fn update_whole_record_by_primary_key() {
    let db = database();
    let mut reminder = Reminder::filter(|c| c.id.eq(reminder_id(0)))
        .unwrap()
        .fetch_one(&db)
        .unwrap();
    reminder.is_completed = !reminder.is_completed;

    let update = reminder.update_record().unwrap().returning_all();
    assert_eq!(
        update.to_debug_sql(),
        r#"UPDATE "reminders" SET "assignedUserID" = 1, "dueDate" = '2001-01-01 00:00:00.000', "isCompleted" = 1, "isFlagged" = 0, "notes" = 'Milk, Eggs, Apples', "priority" = NULL, "title" = 'Groceries' WHERE ("reminders"."id" = X'00000000000000000000000000000000') RETURNING "id", "assignedUserID", "dueDate", "isCompleted", "isFlagged", "notes", "priority", "title""#
    );

    let updated = update.fetch_one(&db).unwrap();
    assert_eq!(updated, reminder);
    assert!(updated.is_completed);
    assert_eq!(updated.assigned_user_id, Some(user_id(1)));
}

#[test]
fn delete_by_id_returning_record() {
    let db = database();
    let deleted = Reminder::delete()
        .filter(|c| c.id.eq(reminder_id(1)))
        .unwrap()
        .returning_all()
        .fetch_all(&db)
        .unwrap();

    assert_eq!(deleted.len(), 1);
    let haircut = &deleted[0];
    assert_eq!(haircut.title, "Haircut");
    assert!(haircut.is_flagged);
    assert_eq!(
        haircut.due_date.map(|d| d.to_rfc3339()),
        Some("2000-12-30T00:00:00+00:00".to_string())
    );
    assert_eq!(Reminder::count().fetch_one(&db).unwrap(), 9);

    let again = Reminder::delete()
        .filter(|c| c.id.eq(reminder_id(1)))
        .unwrap()
        .returning(|c| c.id)
        .unwrap()
        .fetch_optional(&db)
        .unwrap();
    assert_eq!(again, None);
}

#[test]
fn delete_record_removes_one_row() {
    let db = database();
    let reminder = Reminder::filter(|c| c.id.eq(reminder_id(4)))
        .unwrap()
        .fetch_one(&db)
        .unwrap();
    reminder.delete_record().unwrap().execute(&db).unwrap();
    assert_eq!(Reminder::count().fetch_one(&db).unwrap(), 9);
}

#[test]
fn past_due_reminders() {
    let db = database();
    let titles = Reminder::filter(|c| c.is_past_due())
        .unwrap()
        .order_by(|c| c.id)
        .unwrap()
        .select(|c| c.title)
        .unwrap()
        .fetch_all(&db)
        .unwrap();
    assert_eq!(
        titles,
        [
            "Groceries",
            "Haircut",
            "Doctor appointment",
            "Pick up kids from school",
            "Take out trash",
            "Call accountant"
        ]
    );
}

#[test]
fn search_is_case_insensitive() {
    let db = database();
    let search = |text: &str| {
        Reminder::filter(|c| c.searching(text))
            .unwrap()
            .order_by(|c| c.id)
            .unwrap()
            .select(|c| c.title)
            .unwrap()
            .fetch_all(&db)
            .unwrap()
    };
    assert_eq!(search("MILK"), ["Groceries"]);
    assert_eq!(search("payroll"), ["Call accountant"]);
    assert_eq!(search("take"), ["Take a walk", "Take out trash"]);
    assert!(search("100%").is_empty());
}

#[test]
fn grouped_counts() {
    let db = database();
    let rows = Reminder::all()
        .group_by(|c| c.priority)
        .unwrap()
        .order_by(|c| c.priority)
        .unwrap()
        .select(|c| (c.priority, count_all()))
        .unwrap()
        .fetch_all(&db)
        .unwrap();
    assert_eq!(
        rows,
        [
            (None, 5),
            (Some(Priority::Low), 1),
            (Some(Priority::Medium), 1),
            (Some(Priority::High), 3),
        ]
    );

    let flagged = Reminder::filter(|c| c.is_flagged)
        .unwrap()
        .count()
        .fetch_one(&db)
        .unwrap();
    assert_eq!(flagged, 2);
}

#[test]
fn paging_through_titles() {
    let db = database();
    let page = |offset| {
        Reminder::all()
            .order_by(|c| c.id)
            .unwrap()
            .select(|c| c.title)
            .unwrap()
            .limit(3)
            .offset(offset)
            .fetch_all(&db)
            .unwrap()
    };
    assert_eq!(page(0), ["Groceries", "Haircut", "Doctor appointment"]);
    assert_eq!(page(9), ["Send weekly emails"]);

    let tail = Reminder::all()
        .order_by(|c| c.id)
        .unwrap()
        .select(|c| c.title)
        .unwrap()
        .offset(8)
        .fetch_all(&db)
        .unwrap();
    assert_eq!(tail, ["Call accountant", "Send weekly emails"]);
}

#[test]
fn fetch_one_without_rows_is_not_found() {
    let db = database();
    let err = Reminder::filter(|c| c.title.eq("Nothing"))
        .unwrap()
        .fetch_one(&db)
        .unwrap_err();
    assert!(matches!(err, QueryError::NotFound(_)));
}

#[test]
fn primary_key_conflicts_surface_as_constraint_errors() {
    let db = database();
    let err = Reminder::insert(|c| (c.id, c.title))
        .unwrap()
        .values((reminder_id(0), "Duplicate".to_string()))
        .execute(&db)
        .unwrap_err();
    match err {
        QueryError::Driver(driver) => assert_eq!(driver.kind, DriverErrorKind::Constraint),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn decode_failures_name_the_column() {
    let db = database();
    db.execute_batch(r#"UPDATE "reminders" SET "priority" = 7 WHERE "title" = 'Haircut'"#)
        .unwrap();

    let err = Reminder::all()
        .select(|c| (c.title, c.priority))
        .unwrap()
        .fetch_all(&db)
        .unwrap_err();
    match err {
        QueryError::Decode(decode) => {
            assert_eq!(decode.column.as_deref(), Some("priority"));
            assert!(matches!(decode.reason, DecodeReason::OutOfRange));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn foreign_columns_are_rejected_before_execution() {
    let err = Reminder::update(|_| [User::COLUMNS.name.set("x")]).unwrap_err();
    assert_eq!(
        err,
        ConstructionError::UnknownColumn {
            table: "reminders".into(),
            column: "name".into()
        }
    );

    let err = Reminder::update(|c| [c.title.set(User::COLUMNS.name)]).unwrap_err();
    assert_eq!(
        err,
        ConstructionError::ColumnNotInScope {
            table: "users".into(),
            column: "name".into()
        }
    );

    let db = database();
    let err = Reminder::delete()
        .filter(|_| User::COLUMNS.name.eq("Blob"))
        .map(|delete| delete.execute(&db))
        .unwrap_err();
    assert!(matches!(err, ConstructionError::ColumnNotInScope { .. }));
    assert_eq!(Reminder::count().fetch_one(&db).unwrap(), 10);
}

#[test]
fn joined_user_columns_filter_reminders() {
    let db = database();
    let titles = Reminder::all()
        .join::<User, _, _>(|r, u| r.assigned_user_id.eq(u.id))
        .unwrap()
        .filter(|(_, u)| u.name.eq("Blob Sr"))
        .unwrap()
        .order_by(|(r, _)| r.id)
        .unwrap()
        .select(|(r, _)| r.title)
        .unwrap()
        .fetch_all(&db)
        .unwrap();
    assert_eq!(titles, ["Call accountant", "Send weekly emails"]);
}
