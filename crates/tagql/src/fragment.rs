//! Parameter-safe SQL fragments.

use crate::ident::push_quoted;
use crate::value::Value;

/// One piece of a [`Fragment`].
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Verbatim SQL text
    Sql(String),
    /// A bound value, rendered as `?`
    Bind(Value),
}

/// SQL text interleaved with bound values.
///
/// The number of `?` placeholders in [`Fragment::sql`] always equals the
/// length of [`Fragment::values`]; both come from the same part list, so
/// concatenation preserves bind order.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    parts: Vec<Part>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment from raw SQL text.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        if sql.is_empty() {
            return Self::new();
        }
        Self {
            parts: vec![Part::Sql(sql)],
        }
    }

    /// Create a fragment holding a single bound value.
    pub fn bind(value: Value) -> Self {
        let mut out = Self::new();
        out.push_bind(value);
        out
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(Part::Sql(last)) => last.push_str(sql),
            _ => self.parts.push(Part::Sql(sql.to_string())),
        }
        self
    }

    /// Append a placeholder and bind its value.
    ///
    /// `NULL` is written as the keyword and binds nothing.
    pub fn push_bind(&mut self, value: Value) -> &mut Self {
        if value.is_null() {
            return self.push("NULL");
        }
        self.parts.push(Part::Bind(value));
        self
    }

    /// Append a double-quoted identifier.
    pub fn push_ident(&mut self, name: &str) -> &mut Self {
        let mut quoted = String::with_capacity(name.len() + 2);
        push_quoted(&mut quoted, name);
        self.push(&quoted)
    }

    /// Append `"table"."column"`.
    pub fn push_qualified(&mut self, table: &str, column: &str) -> &mut Self {
        self.push_ident(table).push(".").push_ident(column)
    }

    /// Append another fragment, consuming it.
    pub fn push_fragment(&mut self, other: Fragment) -> &mut Self {
        for part in other.parts {
            match part {
                Part::Sql(sql) => {
                    self.push(&sql);
                }
                Part::Bind(value) => self.parts.push(Part::Bind(value)),
            }
        }
        self
    }

    /// Append fragments separated by `sep`.
    pub fn push_joined<I>(&mut self, items: I, sep: &str) -> &mut Self
    where
        I: IntoIterator<Item = Fragment>,
    {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.push_fragment(item);
        }
        self
    }

    /// Concatenate two fragments.
    pub fn concat(mut self, other: Fragment) -> Self {
        self.push_fragment(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number of bound values (and `?` placeholders).
    pub fn placeholder_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Bind(_)))
            .count()
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> Vec<Value> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Bind(v) => Some(v.clone()),
                Part::Sql(_) => None,
            })
            .collect()
    }

    /// Render SQL with `?` placeholders.
    pub fn sql(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Sql(sql) => out.push_str(sql),
                Part::Bind(_) => out.push('?'),
            }
        }
        out
    }

    /// Split into SQL text and bound values.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut values = Vec::new();
        for part in self.parts {
            match part {
                Part::Sql(s) => sql.push_str(&s),
                Part::Bind(v) => {
                    sql.push('?');
                    values.push(v);
                }
            }
        }
        (sql, values)
    }

    /// Render with values inlined as literals. For logs and tests only.
    pub fn to_debug_sql(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Sql(sql) => out.push_str(sql),
                Part::Bind(v) => v.write_literal(&mut out),
            }
        }
        out
    }
}
