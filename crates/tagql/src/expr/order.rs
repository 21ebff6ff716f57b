use super::{Expr, Expression, Node};
use crate::fragment::Fragment;
use crate::table::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nulls {
    First,
    Last,
}

/// One `ORDER BY` key.
#[derive(Debug, Clone)]
pub struct OrderTerm {
    node: Node,
    direction: Option<Direction>,
    nulls: Option<Nulls>,
}

impl OrderTerm {
    pub(crate) fn new(node: Node, direction: Option<Direction>) -> Self {
        Self {
            node,
            direction,
            nulls: None,
        }
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }

    pub(crate) fn render(&self, out: &mut Fragment) {
        self.node.render(out, true);
        match self.direction {
            Some(Direction::Asc) => {
                out.push(" ASC");
            }
            Some(Direction::Desc) => {
                out.push(" DESC");
            }
            None => {}
        }
        match self.nulls {
            Some(Nulls::First) => {
                out.push(" NULLS FIRST");
            }
            Some(Nulls::Last) => {
                out.push(" NULLS LAST");
            }
            None => {}
        }
    }
}

/// Anything usable as an `ORDER BY` key.
pub trait IntoOrderTerm {
    fn into_order_term(self) -> OrderTerm;
}

impl IntoOrderTerm for OrderTerm {
    fn into_order_term(self) -> OrderTerm {
        self
    }
}

impl<T> IntoOrderTerm for Expr<T> {
    fn into_order_term(self) -> OrderTerm {
        OrderTerm::new(self.node, None)
    }
}

impl<T> IntoOrderTerm for Column<T> {
    fn into_order_term(self) -> OrderTerm {
        OrderTerm::new(self.into_expr().node, None)
    }
}
