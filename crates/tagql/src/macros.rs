//! Declarative macros for table descriptions, integer-backed enums and raw SQL.

/// Declare a record struct, its typed column set and its [`Table`](crate::Table) impl.
///
/// Field order is column order. Optional flags after the column name:
/// `primary_key`, `has_default`, `read_only`. Nullability comes from the
/// field type (`Option<T>` columns are nullable).
///
/// ```ignore
/// tagql::table! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Reminder in "reminders" as ReminderColumns {
///         pub id: Tagged<Reminder, Uuid> => "id" [primary_key],
///         pub title: String => "title" [has_default],
///         pub due_date: Option<DateTime<Utc>> => "dueDate",
///     }
/// }
///
/// let c = Reminder::COLUMNS;
/// assert_eq!(c.title.name(), "title");
/// ```
///
/// A duplicate column name fails compilation once `SCHEMA` is used.
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal as $columns:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty => $col:literal $([$($flag:ident),* $(,)?])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        #[doc = concat!("Typed columns of `", $table, "`.")]
        #[derive(Debug, Clone, Copy)]
        $vis struct $columns {
            $(pub $field: $crate::Column<$ty>,)*
        }

        impl $columns {
            pub const DEFS: &'static [$crate::ColumnDef] = &[
                $(
                    $crate::ColumnDef::new($col, <$ty as $crate::Codec>::KIND)
                        .nullable(<$ty as $crate::Codec>::NULLABLE)
                        $($(.$flag())*)?
                ),*
            ];

            /// Columns qualified by `table`.
            pub const fn scoped(table: &'static str) -> Self {
                Self {
                    $($field: $crate::Column::new(table, $col),)*
                }
            }
        }

        impl $crate::Table for $name {
            const SCHEMA: $crate::TableSchema = $crate::TableSchema::new($table, $columns::DEFS);

            type Columns = $columns;

            const COLUMNS: $columns = $columns::scoped($table);

            const EXCLUDED: $columns = $columns::scoped("excluded");

            fn encode_values(&self) -> ::std::vec::Vec<$crate::Value> {
                ::std::vec![$($crate::Codec::encode(&self.$field)),*]
            }

            fn decode_row(
                row: &mut $crate::RowReader<'_>,
            ) -> ::std::result::Result<Self, $crate::DecodeError> {
                ::std::result::Result::Ok(Self {
                    $($field: row.next::<$ty>()?,)*
                })
            }
        }
    };
}

/// Declare a field-less enum stored as an INTEGER column.
///
/// Derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`
/// and `Hash`; do not derive them again. Unknown integers fail to decode with
/// an out-of-range error.
///
/// ```ignore
/// tagql::int_enum! {
///     pub enum Priority {
///         Low = 1,
///         Medium = 2,
///         High = 3,
///     }
/// }
/// ```
#[macro_export]
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($variant = $value,)*
        }

        impl $crate::Codec for $name {
            const KIND: $crate::StorageKind = $crate::StorageKind::Integer;

            fn encode(&self) -> $crate::Value {
                $crate::Value::Integer(*self as i64)
            }

            fn decode(value: $crate::Value) -> ::std::result::Result<Self, $crate::DecodeError> {
                match value {
                    $($crate::Value::Integer(v) if v == $value => {
                        ::std::result::Result::Ok($name::$variant)
                    })*
                    other @ $crate::Value::Integer(_) => ::std::result::Result::Err(
                        $crate::DecodeError::out_of_range(Self::KIND, other),
                    ),
                    other => ::std::result::Result::Err(
                        $crate::DecodeError::unexpected(Self::KIND, other),
                    ),
                }
            }
        }
    };
}

/// Raw SQL with `{}` placeholders filled by expressions, in order.
///
/// Expands to [`expr::raw`](crate::expr::raw) and returns
/// `Result<Expr<T>, ConstructionError>`; the result type is usually inferred.
///
/// ```ignore
/// let past_due: Expr<bool> = sql!("coalesce({}, date('now')) < date('now')", c.due_date)?;
/// ```
#[macro_export]
macro_rules! sql {
    ($template:literal $(, $arg:expr)* $(,)?) => {
        $crate::expr::raw($template, ::std::vec![$($crate::AnyExpr::from($arg)),*])
    };
}
