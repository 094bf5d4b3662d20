//! Composite boolean expressions for WHERE/HAVING clauses.
//!
//! An [`Expression`] is either a raw predicate leaf (`"u.id = :id"`) or a
//! composite that joins its children with AND/OR. Rendering parenthesizes
//! every child of a composite individually, so operator precedence is always
//! explicit in the output text.

use std::fmt;

/// Operator joining the children of a composite expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeOp {
    /// Children joined with `" AND "`.
    And,
    /// Children joined with `" OR "`.
    Or,
}

impl CompositeOp {
    fn separator(self) -> &'static str {
        match self {
            CompositeOp::And => " AND ",
            CompositeOp::Or => " OR ",
        }
    }
}

/// A boolean predicate tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// Raw predicate text, emitted verbatim.
    Raw(String),
    /// AND/OR group over child predicates.
    Composite {
        /// Operator joining the children.
        op: CompositeOp,
        /// Ordered children, leaves or nested composites.
        parts: Vec<Expression>,
    },
}

impl Expression {
    /// Raw predicate leaf.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expression::Raw(sql.into())
    }

    /// Base comparison leaf: `left <op> right`.
    pub fn comparison(left: &str, op: &str, right: &str) -> Self {
        Expression::Raw(format!("{left} {op} {right}"))
    }

    /// `left = right`
    pub fn eq(left: &str, right: &str) -> Self {
        Self::comparison(left, "=", right)
    }

    /// `left <> right`
    pub fn neq(left: &str, right: &str) -> Self {
        Self::comparison(left, "<>", right)
    }

    /// `left < right`
    pub fn lt(left: &str, right: &str) -> Self {
        Self::comparison(left, "<", right)
    }

    /// `left <= right`
    pub fn lte(left: &str, right: &str) -> Self {
        Self::comparison(left, "<=", right)
    }

    /// `left > right`
    pub fn gt(left: &str, right: &str) -> Self {
        Self::comparison(left, ">", right)
    }

    /// `left >= right`
    pub fn gte(left: &str, right: &str) -> Self {
        Self::comparison(left, ">=", right)
    }

    /// `column LIKE pattern`
    pub fn like(column: &str, pattern: &str) -> Self {
        Self::comparison(column, "LIKE", pattern)
    }

    /// `column NOT LIKE pattern`
    pub fn not_like(column: &str, pattern: &str) -> Self {
        Self::comparison(column, "NOT LIKE", pattern)
    }

    /// `column IN (values...)`
    pub fn in_list(column: &str, values: &[&str]) -> Self {
        Expression::Raw(format!("{column} IN ({})", values.join(", ")))
    }

    /// `column NOT IN (values...)`
    pub fn not_in(column: &str, values: &[&str]) -> Self {
        Expression::Raw(format!("{column} NOT IN ({})", values.join(", ")))
    }

    /// `column IS NULL`
    pub fn is_null(column: &str) -> Self {
        Expression::Raw(format!("{column} IS NULL"))
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: &str) -> Self {
        Expression::Raw(format!("{column} IS NOT NULL"))
    }

    /// AND group over the given children.
    pub fn and_x<I, E>(parts: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::Composite {
            op: CompositeOp::And,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// OR group over the given children.
    pub fn or_x<I, E>(parts: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::Composite {
            op: CompositeOp::Or,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Combine `self` with `other` under `op`.
    ///
    /// A composite already using `op` gains `other` as one more child; any
    /// other shape (a leaf, or a composite of the opposite operator) is
    /// wrapped whole as the first child of a new composite.
    pub fn combine(self, op: CompositeOp, other: Expression) -> Expression {
        match self {
            Expression::Composite {
                op: existing,
                mut parts,
            } if existing == op => {
                parts.push(other);
                Expression::Composite { op, parts }
            }
            existing => Expression::Composite {
                op,
                parts: vec![existing, other],
            },
        }
    }

    /// Render to predicate text.
    ///
    /// Every child of a composite is parenthesized, including a lone child.
    /// A raw leaf renders verbatim.
    pub fn render(&self) -> String {
        match self {
            Expression::Raw(sql) => sql.clone(),
            Expression::Composite { op, parts } => parts
                .iter()
                .map(|part| format!("({})", part.render()))
                .collect::<Vec<_>>()
                .join(op.separator()),
        }
    }
}

impl From<&str> for Expression {
    fn from(sql: &str) -> Self {
        Expression::Raw(sql.to_string())
    }
}

impl From<String> for Expression {
    fn from(sql: String) -> Self {
        Expression::Raw(sql)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_leaves() {
        assert_eq!(Expression::eq("u.id", ":id").render(), "u.id = :id");
        assert_eq!(Expression::neq("u.id", "1").render(), "u.id <> 1");
        assert_eq!(Expression::lte("age", "65").render(), "age <= 65");
        assert_eq!(
            Expression::like("name", "'%foo%'").render(),
            "name LIKE '%foo%'"
        );
        assert_eq!(Expression::is_null("deleted_at").render(), "deleted_at IS NULL");
        assert_eq!(
            Expression::in_list("id", &["1", "2", "3"]).render(),
            "id IN (1, 2, 3)"
        );
    }

    #[test]
    fn composite_parenthesizes_every_child() {
        let expr = Expression::and_x(["a = 1", "b = 2"]);
        assert_eq!(expr.render(), "(a = 1) AND (b = 2)");
    }

    #[test]
    fn composite_with_single_child_still_wraps_it() {
        let expr = Expression::and_x([Expression::eq("u.nickname", "?")]);
        assert_eq!(expr.render(), "(u.nickname = ?)");
    }

    #[test]
    fn nested_composites_render_inner_to_outer() {
        let expr = Expression::or_x([
            Expression::and_x(["a = 1", "b = 2"]),
            Expression::raw("c = 3"),
        ]);
        assert_eq!(expr.render(), "((a = 1) AND (b = 2)) OR (c = 3)");
    }

    #[test]
    fn combine_same_operator_appends_a_child() {
        let expr = Expression::and_x(["a = 1", "b = 2"])
            .combine(CompositeOp::And, Expression::raw("c = 3"));
        assert_eq!(expr.render(), "(a = 1) AND (b = 2) AND (c = 3)");
    }

    #[test]
    fn combine_opposite_operator_wraps_the_existing_tree() {
        let expr = Expression::and_x(["a = 1", "b = 2"])
            .combine(CompositeOp::Or, Expression::raw("c = 3"));
        assert_eq!(expr.render(), "((a = 1) AND (b = 2)) OR (c = 3)");
    }

    #[test]
    fn combine_leaf_creates_a_composite() {
        let expr = Expression::raw("a = 1").combine(CompositeOp::And, Expression::raw("b = 2"));
        assert_eq!(expr.render(), "(a = 1) AND (b = 2)");
    }

    #[test]
    fn display_matches_render() {
        let expr = Expression::or_x(["a = 1", "b = 2"]);
        assert_eq!(expr.to_string(), expr.render());
    }
}
