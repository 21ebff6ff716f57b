//! Shared rendering and execution surface of all statements.

use crate::driver::{self, Driver};
use crate::error::{QueryError, QueryResult};
use crate::expr::Node;
use crate::fragment::Fragment;
use crate::qb::selection::Selection;

/// A renderable, executable statement.
///
/// Rendering is pure: the same builder always produces the same SQL text and
/// bound values. Execution hands both to a [`Driver`] and decodes each row
/// through [`Statement::Shape`].
pub trait Statement {
    /// Per-row result shape (`()` for statements without `RETURNING`).
    type Shape: Selection;

    /// SQL text with `?` placeholders plus the bound values.
    fn to_fragment(&self) -> Fragment;

    /// Result column labels, used to annotate decode errors.
    fn result_labels(&self) -> Vec<String>;

    fn to_sql(&self) -> String {
        self.to_fragment().sql()
    }

    /// SQL text with values inlined as literals. For logs and tests only.
    fn to_debug_sql(&self) -> String {
        self.to_fragment().to_debug_sql()
    }

    /// Execute and decode every row.
    fn fetch_all(
        &self,
        driver: &(impl Driver + ?Sized),
    ) -> QueryResult<Vec<<Self::Shape as Selection>::Output>> {
        let labels = self.result_labels();
        driver::fetch::<Self::Shape, _>(driver, self.to_fragment(), &labels)
    }

    /// Execute and decode the first row; `NotFound` if there is none.
    fn fetch_one(
        &self,
        driver: &(impl Driver + ?Sized),
    ) -> QueryResult<<Self::Shape as Selection>::Output> {
        self.fetch_optional(driver)?
            .ok_or_else(|| QueryError::not_found("statement returned no rows"))
    }

    /// Execute and decode the first row, if any.
    fn fetch_optional(
        &self,
        driver: &(impl Driver + ?Sized),
    ) -> QueryResult<Option<<Self::Shape as Selection>::Output>> {
        Ok(self.fetch_all(driver)?.into_iter().next())
    }

    /// Execute and discard any rows.
    fn execute(&self, driver: &(impl Driver + ?Sized)) -> QueryResult<()> {
        let (sql, values) = self.to_fragment().into_parts();
        driver::log_statement(&sql, values.len());
        driver.run(&sql, &values)?;
        Ok(())
    }
}

pub(crate) fn labels_of(items: &[Node]) -> Vec<String> {
    items.iter().map(Node::label).collect()
}

/// Render items as a bare `RETURNING` list.
pub(crate) fn render_returning(items: &[Node], out: &mut Fragment) {
    if items.is_empty() {
        return;
    }
    out.push(" RETURNING ");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(", ");
        }
        item.render(out, false);
    }
}
