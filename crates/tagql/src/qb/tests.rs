use super::*;
use crate::error::ConstructionError;
use crate::expr::{BoolOps, Expr, ExprOps, NullableOps, TextOps, count_all};
use crate::fixtures::{Event, Priority, Reminder, User, groceries, reminder_id};
use crate::table::{Assignment, ColumnRef, Table};
use crate::value::Value;
use chrono::DateTime;

fn assert_balanced<S: Statement>(statement: &S) {
    let fragment = statement.to_fragment();
    assert_eq!(fragment.placeholder_count(), fragment.values().len());
}

// ==================== SELECT ====================

#[test]
fn select_qualifies_columns() {
    let q = Reminder::select(|c| (c.id, c.title)).unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT "reminders"."id", "reminders"."title" FROM "reminders""#
    );
    assert_eq!(q.result_labels(), ["id", "title"]);
}

#[test]
fn select_all_lists_every_column_in_schema_order() {
    assert_eq!(
        User::all().to_sql(),
        r#"SELECT "users"."id", "users"."name" FROM "users""#
    );
    assert_eq!(User::all().result_labels(), ["id", "name"]);
}

#[test]
fn join_with_ordering() {
    let q = Reminder::all()
        .join::<User, _, _>(|r, u| r.assigned_user_id.eq(u.id))
        .unwrap()
        .select(|(r, u)| (r.title, u.name))
        .unwrap()
        .order_by(|(r, _)| r.due_date.desc())
        .unwrap()
        .order_by(|(r, _)| r.title)
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT "reminders"."title", "users"."name" FROM "reminders" JOIN "users" ON ("reminders"."assignedUserID" = "users"."id") ORDER BY "reminders"."dueDate" DESC, "reminders"."title""#
    );
    assert_eq!(q.result_labels(), ["title", "name"]);
}

#[test]
fn left_join_selects_both_tables() {
    let q = User::all()
        .left_join::<Reminder, _, _>(|u, r| r.assigned_user_id.eq(u.id))
        .unwrap();
    let sql = q.to_sql();
    assert!(sql.starts_with(r#"SELECT "users"."id", "users"."name", "reminders"."id""#));
    assert!(sql.ends_with(
        r#"FROM "users" LEFT JOIN "reminders" ON ("reminders"."assignedUserID" = "users"."id")"#
    ));
    assert_eq!(q.result_labels().len(), 2 + 8);
}

#[test]
fn raw_join_predicates_are_parenthesized() {
    let q = Reminder::all()
        .join::<User, _, _>(|r, u| {
            let on: Expr<bool> =
                crate::sql!("{} = {} OR {} IS NULL", r.assigned_user_id, u.id, r.assigned_user_id)
                    .unwrap();
            on
        })
        .unwrap()
        .select(|(r, _)| r.id)
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT "reminders"."id" FROM "reminders" JOIN "users" ON ("reminders"."assignedUserID" = "users"."id" OR "reminders"."assignedUserID" IS NULL)"#
    );
}

#[test]
fn filters_are_conjoined() {
    let q = Reminder::filter(|c| !c.is_completed)
        .unwrap()
        .filter(|c| c.priority.eq(Priority::High))
        .unwrap()
        .select(|c| c.title)
        .unwrap();
    let f = q.to_fragment();
    assert_eq!(
        f.sql(),
        r#"SELECT "reminders"."title" FROM "reminders" WHERE NOT ("reminders"."isCompleted") AND ("reminders"."priority" = ?)"#
    );
    assert_eq!(f.values(), vec![Value::Integer(3)]);
}

#[test]
fn group_by_and_having() {
    let q = Reminder::all()
        .select(|c| (c.priority, count_all()))
        .unwrap()
        .group_by(|c| c.priority)
        .unwrap()
        .having(|_| count_all().gt(1i64))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT "reminders"."priority", count(*) FROM "reminders" GROUP BY "reminders"."priority" HAVING (count(*) > ?)"#
    );
    assert_balanced(&q);
}

#[test]
fn distinct_selection() {
    let q = Reminder::all().select(|c| c.priority).unwrap().distinct();
    assert_eq!(
        q.to_sql(),
        r#"SELECT DISTINCT "reminders"."priority" FROM "reminders""#
    );
}

#[test]
fn limit_and_offset_are_bound() {
    let q = Reminder::select(|c| c.title).unwrap().limit(2).offset(4);
    let f = q.to_fragment();
    assert_eq!(
        f.sql(),
        r#"SELECT "reminders"."title" FROM "reminders" LIMIT ? OFFSET ?"#
    );
    assert_eq!(f.values(), vec![Value::Integer(2), Value::Integer(4)]);
}

#[test]
fn offset_without_limit_is_unbounded() {
    let f = Reminder::select(|c| c.title)
        .unwrap()
        .offset(3)
        .to_fragment();
    assert!(f.sql().ends_with("LIMIT ? OFFSET ?"));
    assert_eq!(f.values(), vec![Value::Integer(-1), Value::Integer(3)]);
}

#[test]
fn count_drops_ordering_and_paging() {
    let q = Reminder::filter(|c| c.is_flagged)
        .unwrap()
        .order_by(|c| c.title)
        .unwrap()
        .limit(3)
        .count();
    assert_eq!(
        q.to_sql(),
        r#"SELECT count(*) FROM "reminders" WHERE "reminders"."isFlagged""#
    );
    assert_eq!(Reminder::count().to_sql(), r#"SELECT count(*) FROM "reminders""#);
}

#[test]
fn empty_selection_selects_null() {
    let q = Reminder::select(|_| ()).unwrap();
    assert_eq!(q.to_sql(), r#"SELECT NULL FROM "reminders""#);
    assert_eq!(q.result_labels(), ["NULL"]);
}

#[test]
fn clause_order_does_not_depend_on_call_order() {
    let a = Reminder::all()
        .limit(1)
        .filter(|c| c.title.eq("x"))
        .unwrap()
        .order_by(|c| c.title.asc())
        .unwrap()
        .select(|c| c.id)
        .unwrap();
    let b = Reminder::all()
        .order_by(|c| c.title.asc())
        .unwrap()
        .filter(|c| c.title.eq("x"))
        .unwrap()
        .select(|c| c.id)
        .unwrap()
        .limit(1);
    assert_eq!(a.to_fragment(), b.to_fragment());
    assert_eq!(
        a.to_sql(),
        r#"SELECT "reminders"."id" FROM "reminders" WHERE ("reminders"."title" = ?) ORDER BY "reminders"."title" ASC LIMIT ?"#
    );
}

#[test]
fn builders_are_persistent_values() {
    let base = Reminder::filter(|c| c.is_flagged).unwrap();
    let narrowed = base.clone().filter(|c| c.title.eq("a")).unwrap();
    assert!(!base.to_sql().contains("title"));
    assert!(narrowed.to_sql().contains("title"));
    assert!(format!("{base:?}").contains("SELECT"));
}

#[test]
fn select_clauses_reject_columns_of_other_tables() {
    let foreign = || User::COLUMNS.name.eq("Blob");
    assert_eq!(
        Reminder::filter(|_| foreign()).unwrap_err(),
        ConstructionError::ColumnNotInScope {
            table: "users".into(),
            column: "name".into(),
        }
    );
    assert!(Reminder::all().having(|_| foreign()).is_err());
    assert!(Reminder::order_by(|_| User::COLUMNS.name).is_err());
    assert!(Reminder::all().group_by(|_| User::COLUMNS.id).is_err());
    assert!(Reminder::select(|c| (c.title, User::COLUMNS.name)).is_err());

    let spliced = Reminder::filter(|c| {
        let predicate: Expr<bool> = crate::sql!("{} = {}", c.title, User::COLUMNS.name).unwrap();
        predicate
    });
    assert!(matches!(
        spliced,
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
}

#[test]
fn joined_tables_come_into_scope() {
    let joined = Reminder::all()
        .join::<User, _, _>(|r, u| r.assigned_user_id.eq(u.id))
        .unwrap();
    assert!(joined.clone().filter(|_| User::COLUMNS.name.eq("Blob")).is_ok());
    assert!(joined.filter(|_| Event::COLUMNS.name.eq("launch")).is_err());

    let on_third_table = Reminder::all()
        .join::<User, _, _>(|_, u| Event::COLUMNS.name.eq(u.name));
    assert!(matches!(
        on_third_table,
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
}

#[test]
fn unknown_column_of_an_in_scope_table_is_rejected() {
    let missing = crate::table::Column::<String>::new("reminders", "missing");
    assert_eq!(
        Reminder::filter(|_| missing.eq("x")).unwrap_err(),
        ConstructionError::UnknownColumn {
            table: "reminders".into(),
            column: "missing".into(),
        }
    );
}

// ==================== INSERT ====================

#[test]
fn insert_with_upsert_and_returning() {
    let due = DateTime::from_timestamp(978_307_200, 0);
    let q = Reminder::insert(|c| (c.id, c.title, c.is_completed, c.due_date, c.priority))
        .unwrap()
        .values((reminder_id(10), "Groceries".to_string(), true, due, Some(Priority::High)))
        .values((reminder_id(11), "Haircut".to_string(), false, due, Some(Priority::Low)))
        .on_conflict_do_update(|c, _| [c.title.set(c.title.concat(" Copy"))])
        .unwrap()
        .returning_all();
    assert_eq!(
        q.to_sql(),
        r#"INSERT INTO "reminders" ("id", "title", "isCompleted", "dueDate", "priority") VALUES (?, ?, ?, ?, ?), (?, ?, ?, ?, ?) ON CONFLICT DO UPDATE SET "title" = ("reminders"."title" || ?) RETURNING "id", "assignedUserID", "dueDate", "isCompleted", "isFlagged", "notes", "priority", "title""#
    );
    assert_eq!(q.row_count(), 2);
    assert_balanced(&q);
    assert_eq!(q.result_labels().len(), 8);
}

#[test]
fn null_values_render_as_keyword() {
    let q = Reminder::insert(|c| (c.id, c.priority))
        .unwrap()
        .values((reminder_id(1), None));
    let f = q.to_fragment();
    assert_eq!(
        f.sql(),
        r#"INSERT INTO "reminders" ("id", "priority") VALUES (?, NULL)"#
    );
    assert_eq!(f.values().len(), 1);
}

#[test]
fn conflict_target_and_excluded_row() {
    let q = Reminder::insert(|c| (c.id, c.title))
        .unwrap()
        .values((reminder_id(1), "a".to_string()))
        .on_conflict_target(|c| c.id)
        .unwrap()
        .on_conflict_do_update(|c, excluded| [c.title.set(excluded.title)])
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"INSERT INTO "reminders" ("id", "title") VALUES (?, ?) ON CONFLICT ("id") DO UPDATE SET "title" = "excluded"."title""#
    );

    let ignored = Reminder::insert(|c| c.title)
        .unwrap()
        .values("a".to_string())
        .on_conflict_target(|c| c.id)
        .unwrap()
        .on_conflict_do_nothing();
    assert!(ignored.to_sql().ends_with(r#"ON CONFLICT ("id") DO NOTHING"#));
}

#[test]
fn upsert_assignments_see_the_table_and_excluded_row_only() {
    let insert = || {
        Reminder::insert(|c| (c.id, c.title))
            .unwrap()
            .values((reminder_id(1), "a".to_string()))
    };
    assert!(insert()
        .on_conflict_do_update(|c, excluded| [c.notes.set(c.title.concat(excluded.title))])
        .is_ok());
    assert!(matches!(
        insert().on_conflict_do_update(|c, _| [c.title.set(User::COLUMNS.name)]),
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
}

#[test]
fn insert_default_writes_exactly_one_row() {
    let q = User::insert_default().returning(|c| c.id).unwrap();
    assert_eq!(
        q.to_sql(),
        r#"INSERT INTO "users" DEFAULT VALUES RETURNING "id""#
    );
    assert_eq!(q.row_count(), 1);
    assert!(q.to_fragment().values().is_empty());
}

/// A column list that names nothing.
struct NoColumns;

impl ColumnList for NoColumns {
    type Values = ();

    fn column_refs(&self) -> Vec<ColumnRef> {
        Vec::new()
    }

    fn encode_row(_values: ()) -> Vec<Value> {
        Vec::new()
    }
}

#[test]
fn insert_requires_at_least_one_column() {
    assert_eq!(
        User::insert(|_| NoColumns).unwrap_err(),
        ConstructionError::EmptyColumnList {
            table: "users".into()
        }
    );
}

#[test]
fn insert_without_rows_is_a_no_op_statement() {
    let q = Reminder::insert(|c| (c.id, c.title)).unwrap();
    assert_eq!(
        q.to_sql(),
        r#"INSERT INTO "reminders" ("id", "title") SELECT NULL, NULL WHERE 0"#
    );
    assert_eq!(q.row_count(), 0);
}

#[test]
fn insert_records_skips_read_only_columns() {
    let q = Event::insert_records([Event {
        name: "launch".into(),
        name_length: 0,
    }]);
    let f = q.to_fragment();
    assert_eq!(f.sql(), r#"INSERT INTO "events" ("name") VALUES (?)"#);
    assert_eq!(f.values(), vec![Value::Text("launch".into())]);

    let q = Reminder::insert_records(vec![groceries(), groceries()]);
    assert_eq!(q.row_count(), 2);
    assert_balanced(&q);
}

#[test]
fn insert_rejects_bad_column_lists() {
    assert!(matches!(
        Reminder::insert(|c| (c.title, c.title)),
        Err(ConstructionError::DuplicateColumn { .. })
    ));
    assert!(matches!(
        Reminder::insert(|_| User::COLUMNS.name),
        Err(ConstructionError::UnknownColumn { .. })
    ));
    assert!(matches!(
        Reminder::insert(|c| c.title)
            .unwrap()
            .on_conflict_do_update(|_, _| Vec::<Assignment>::new()),
        Err(ConstructionError::EmptyAssignments { .. })
    ));
    assert!(matches!(
        Reminder::insert(|c| c.title)
            .unwrap()
            .returning(|c| (c.id, User::COLUMNS.id)),
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
}

#[test]
fn dynamic_rows_must_match_the_column_count() {
    let q = Reminder::insert(|c| (c.id, c.title))
        .unwrap()
        .try_values(vec![Value::Blob(vec![0; 16]), Value::Text("a".into())])
        .unwrap();
    assert_eq!(
        q.try_values(vec![Value::Null]).unwrap_err(),
        ConstructionError::ArityMismatch {
            expected: 2,
            actual: 1,
            row: 1
        }
    );
}

// ==================== UPDATE ====================

#[test]
fn toggle_update_returning() {
    let q = Reminder::update(|c| [c.is_completed.set(c.is_completed.toggle())])
        .unwrap()
        .returning(|c| (c.title, c.priority, c.is_completed))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"UPDATE "reminders" SET "isCompleted" = NOT ("reminders"."isCompleted") RETURNING "title", "priority", "isCompleted""#
    );
    assert_eq!(q.result_labels(), ["title", "priority", "isCompleted"]);
}

#[test]
fn update_with_filter() {
    let q = Reminder::update(|c| [c.is_completed.set(true), c.is_flagged.set(false)])
        .unwrap()
        .filter(|c| c.priority.is_null())
        .unwrap();
    let f = q.to_fragment();
    assert_eq!(
        f.sql(),
        r#"UPDATE "reminders" SET "isCompleted" = ?, "isFlagged" = ? WHERE ("reminders"."priority" IS NULL)"#
    );
    assert_eq!(f.values(), vec![Value::Integer(1), Value::Integer(0)]);
}

#[test]
fn update_record_writes_every_non_key_column() {
    let q = groceries().update_record().unwrap();
    assert_eq!(
        q.to_debug_sql(),
        r#"UPDATE "reminders" SET "assignedUserID" = 1, "dueDate" = '2001-01-01 00:00:00.000', "isCompleted" = 1, "isFlagged" = 0, "notes" = 'Milk, Eggs, Apples', "priority" = NULL, "title" = 'Groceries' WHERE ("reminders"."id" = X'00000000000000000000000000000000')"#
    );
    assert_balanced(&q);
}

#[test]
fn update_rejects_bad_assignments() {
    assert!(matches!(
        Reminder::update(|_| Vec::<Assignment>::new()),
        Err(ConstructionError::EmptyAssignments { .. })
    ));
    assert!(matches!(
        Reminder::update(|_| [User::COLUMNS.name.set("x")]),
        Err(ConstructionError::UnknownColumn { .. })
    ));
    assert!(matches!(
        Reminder::update(|c| [c.title.set("a"), c.title.set("b")]),
        Err(ConstructionError::DuplicateColumn { .. })
    ));
    assert_eq!(
        Reminder::update(|c| [c.title.set(User::COLUMNS.name)]).unwrap_err(),
        ConstructionError::ColumnNotInScope {
            table: "users".into(),
            column: "name".into(),
        }
    );
    assert!(matches!(
        Reminder::update(|c| [c.title.set(c.title)])
            .unwrap()
            .filter(|_| User::COLUMNS.name.eq("Blob")),
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
    assert!(matches!(
        Event {
            name: "a".into(),
            name_length: 1
        }
        .update_record(),
        Err(ConstructionError::MissingPrimaryKey { .. })
    ));
}

// ==================== DELETE ====================

#[test]
fn delete_with_filter_and_returning() {
    let q = Reminder::delete()
        .filter(|c| c.id.eq(reminder_id(1)))
        .unwrap()
        .returning(|c| c.title)
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"DELETE FROM "reminders" WHERE ("reminders"."id" = ?) RETURNING "title""#
    );
    assert_balanced(&q);
}

#[test]
fn delete_record_matches_primary_key() {
    let q = groceries().delete_record().unwrap();
    assert_eq!(
        q.to_sql(),
        r#"DELETE FROM "reminders" WHERE ("reminders"."id" = ?)"#
    );
    assert_eq!(Reminder::delete().to_sql(), r#"DELETE FROM "reminders""#);
}

#[test]
fn delete_rejects_foreign_predicates_and_returning() {
    assert!(matches!(
        Reminder::delete().filter(|_| User::COLUMNS.name.eq("Blob")),
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
    assert!(matches!(
        Reminder::delete().returning(|_| User::COLUMNS.name),
        Err(ConstructionError::ColumnNotInScope { .. })
    ));
}
