//! Raw SQL splices with typed interpolation.

use super::{AnyExpr, Expr, Node, RawPart};
use crate::codec::Codec;
use crate::error::ConstructionError;

/// Parse a template with `{}` placeholders and splice `args` into it.
///
/// Text outside placeholders is taken verbatim. `{{` and `}}` produce literal
/// braces. Each argument renders recursively, so its bound values keep their
/// position in the final statement.
///
/// ```ignore
/// let past_due: Expr<bool> = raw(
///     "coalesce({}, date('now')) < date('now')",
///     vec![Reminder::COLUMNS.due_date.into()],
/// )?;
/// ```
pub fn raw<T>(template: &str, args: Vec<AnyExpr>) -> Result<Expr<T>, ConstructionError> {
    let arguments = args.len();
    let mut args = args.into_iter();
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut placeholders = 0usize;
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => match chars.next() {
                Some('{') => text.push('{'),
                Some('}') => {
                    placeholders += 1;
                    if !text.is_empty() {
                        parts.push(RawPart::Sql(std::mem::take(&mut text)));
                    }
                    if let Some(arg) = args.next() {
                        parts.push(RawPart::Node(arg.node));
                    }
                }
                _ => {
                    return Err(ConstructionError::MalformedTemplate(format!(
                        "unmatched '{{' in {template:?}"
                    )));
                }
            },
            '}' => match chars.next() {
                Some('}') => text.push('}'),
                _ => {
                    return Err(ConstructionError::MalformedTemplate(format!(
                        "unmatched '}}' in {template:?}"
                    )));
                }
            },
            other => text.push(other),
        }
    }

    if placeholders != arguments {
        return Err(ConstructionError::TemplateArity {
            placeholders,
            arguments,
        });
    }
    if !text.is_empty() {
        parts.push(RawPart::Sql(text));
    }
    Ok(Expr::from_node(Node::Raw(parts)))
}

/// Infallible raw SQL builder.
///
/// ```ignore
/// let expr: Expr<bool> = RawSql::new()
///     .sql("instr(")
///     .expr(Reminder::COLUMNS.notes)
///     .sql(", ")
///     .bind("Milk".to_string())
///     .sql(") > 0")
///     .finish();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawSql {
    parts: Vec<RawPart>,
}

impl RawSql {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append verbatim SQL text.
    pub fn sql(mut self, text: &str) -> Self {
        match self.parts.last_mut() {
            Some(RawPart::Sql(last)) => last.push_str(text),
            _ => self.parts.push(RawPart::Sql(text.to_string())),
        }
        self
    }

    /// Splice an expression.
    pub fn expr(mut self, expr: impl Into<AnyExpr>) -> Self {
        self.parts.push(RawPart::Node(expr.into().node));
        self
    }

    /// Bind a value.
    pub fn bind<V: Codec>(mut self, value: V) -> Self {
        self.parts.push(RawPart::Node(Node::Bind(value.encode())));
        self
    }

    pub fn finish<T>(self) -> Expr<T> {
        Expr::from_node(Node::Raw(self.parts))
    }
}
