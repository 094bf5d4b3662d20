//! FROM/JOIN clause model and the alias-graph resolver.
//!
//! Aliases are validated lazily: declaring a JOIN never fails, only rendering
//! does. The resolver walks each FROM root breadth-first over the JOIN edges
//! hanging off it, so a parent's direct children are all emitted before any
//! grandchild, in declaration order within a level.

use std::collections::{HashMap, VecDeque};

use crate::error::{QueryError, QueryResult};

/// JOIN flavor, rendered as `<KEYWORD> JOIN`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    /// `INNER JOIN` (the default for the generic join call).
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
}

impl JoinType {
    /// The SQL keyword preceding `JOIN`.
    pub fn keyword(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        }
    }
}

/// One FROM root: a table plus an optional alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FromClause {
    /// Table name.
    pub table: String,
    /// Explicit alias; `None` defaults to the table name itself.
    pub alias: Option<String>,
}

impl FromClause {
    /// The alias this entry registers: explicit, or the table name.
    pub fn effective_alias(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.table)
    }

    /// True when the alias equals the table name; such an alias is never
    /// printed.
    pub fn is_self_aliased(&self) -> bool {
        self.effective_alias() == self.table
    }
}

/// One JOIN edge hanging off a previously declared alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinClause {
    /// Alias of the FROM entry or earlier JOIN this edge attaches to.
    pub from_alias: String,
    /// INNER/LEFT/RIGHT.
    pub join_type: JoinType,
    /// Joined table name.
    pub table: String,
    /// Explicit alias; `None` defaults to the joined table's name.
    pub alias: Option<String>,
    /// ON condition text.
    pub condition: String,
}

impl JoinClause {
    /// The alias this entry registers: explicit, or the joined table's name.
    pub fn effective_alias(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.table)
    }

    /// True when the alias equals the joined table's name.
    pub fn is_self_aliased(&self) -> bool {
        self.effective_alias() == self.table
    }
}

/// Render the full FROM clause text: every root plus its join subtree, roots
/// separated by `", "`.
///
/// Registration happens first, in declaration order (FROM entries, then JOIN
/// entries), failing fast with [`QueryError::UnknownAlias`] or
/// [`QueryError::NonUniqueAlias`]. With `exclude_aliases` set, no alias is
/// printed; a colliding JOIN alias is then registered under a synthetic
/// internal name instead of failing, since the conflict can never reach the
/// output.
pub(crate) fn render_from(
    from: &[FromClause],
    joins: &[JoinClause],
    exclude_aliases: bool,
) -> QueryResult<String> {
    let mut registered: Vec<String> = Vec::with_capacity(from.len() + joins.len());
    for root in from {
        let alias = root.effective_alias();
        if registered.iter().any(|known| known == alias) {
            return Err(QueryError::non_unique_alias(alias, registered));
        }
        registered.push(alias.to_string());
    }

    // Internal node key per join: its effective alias, or a synthetic
    // substitute when exclude_aliases hides a collision.
    let mut node_keys: Vec<String> = Vec::with_capacity(joins.len());
    for (idx, join) in joins.iter().enumerate() {
        if !registered.iter().any(|known| known == &join.from_alias) {
            return Err(QueryError::unknown_alias(&join.from_alias, registered));
        }
        let alias = join.effective_alias();
        let key = if registered.iter().any(|known| known == alias) {
            if !exclude_aliases {
                return Err(QueryError::non_unique_alias(alias, registered));
            }
            format!("{alias}#{idx}")
        } else {
            alias.to_string()
        };
        registered.push(key.clone());
        node_keys.push(key);
    }

    // Adjacency buckets: parent alias -> join indices, declaration order kept.
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, join) in joins.iter().enumerate() {
        children.entry(join.from_alias.as_str()).or_default().push(idx);
    }

    let mut roots = Vec::with_capacity(from.len());
    for root in from {
        let mut text = root.table.clone();
        if !exclude_aliases && !root.is_self_aliased() {
            text.push(' ');
            text.push_str(root.effective_alias());
        }

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(root.effective_alias());
        while let Some(parent) = queue.pop_front() {
            for &idx in children.get(parent).into_iter().flatten() {
                let join = &joins[idx];
                text.push(' ');
                text.push_str(join.join_type.keyword());
                text.push_str(" JOIN ");
                text.push_str(&join.table);
                if !exclude_aliases && !join.is_self_aliased() {
                    text.push(' ');
                    text.push_str(join.effective_alias());
                }
                text.push_str(" ON ");
                text.push_str(&join.condition);
                queue.push_back(&node_keys[idx]);
            }
        }
        roots.push(text);
    }

    Ok(roots.join(", "))
}
