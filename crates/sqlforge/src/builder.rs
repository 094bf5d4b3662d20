//! The statement assembler: fluent part mutation plus the dirty/clean render
//! cache.
//!
//! Every mutating call updates the part collections and marks the cache
//! dirty; rendering is lazy and memoized. Alias validation runs only inside
//! the render step, so clauses can be declared in any order.

use std::fmt;

use serde_json::Value;

use crate::error::QueryResult;
use crate::expr::{CompositeOp, Expression};
use crate::joins::{FromClause, JoinClause, JoinType, render_from};
use crate::param::{ParamKey, ParameterStore, ParameterType};

/// Statement shape the builder is currently assembling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryType {
    /// No shape-defining call has been made yet.
    #[default]
    Undefined,
    /// `SELECT ...`
    Select,
    /// `INSERT INTO ...`
    Insert,
    /// `UPDATE ...`
    Update,
    /// `DELETE FROM ...`
    Delete,
}

/// Render-cache validity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    /// The cached SQL string matches the current parts.
    #[default]
    Clean,
    /// The cached SQL string is stale and must be recomputed.
    Dirty,
}

/// Direction of one ORDER BY entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// `ASC` (the default when no direction is given).
    #[default]
    Asc,
    /// `DESC`
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw part collections, readable for diagnostics through
/// [`QueryBuilder::parts`].
#[derive(Clone, Debug, Default)]
pub struct QueryParts {
    /// SELECT list expressions.
    pub select: Vec<String>,
    /// SELECT DISTINCT flag.
    pub distinct: bool,
    /// FROM roots; also holds the target table of INSERT/UPDATE/DELETE.
    pub from: Vec<FromClause>,
    /// JOIN edges, declaration order.
    pub join: Vec<JoinClause>,
    /// UPDATE assignments, declaration order.
    pub set: Vec<(String, String)>,
    /// WHERE tree.
    pub where_clause: Option<Expression>,
    /// GROUP BY expressions.
    pub group_by: Vec<String>,
    /// HAVING tree.
    pub having: Option<Expression>,
    /// ORDER BY entries.
    pub order_by: Vec<(String, SortOrder)>,
    /// Row limit; stored for the execution layer, not rendered.
    pub limit: Option<u64>,
    /// Row offset; stored for the execution layer, not rendered.
    pub offset: Option<u64>,
    /// INSERT column/placeholder pairs, first-seen order.
    pub values: Vec<(String, String)>,
}

/// Fluent assembler for one parameterized SQL statement.
///
/// The builder owns its part collections and parameter store outright;
/// [`Clone`] produces a fully independent statement.
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    kind: QueryType,
    parts: QueryParts,
    state: RenderState,
    rendered: String,
    params: ParameterStore,
    exclude_aliases: bool,
}

impl QueryBuilder {
    /// Create an empty builder (kind [`QueryType::Undefined`], state
    /// [`RenderState::Clean`]).
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Diagnostics ====================

    /// Current statement shape.
    pub fn kind(&self) -> QueryType {
        self.kind
    }

    /// Current render-cache state.
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Read-only view of the raw part collections.
    pub fn parts(&self) -> &QueryParts {
        &self.parts
    }

    /// The stored row limit, if any.
    pub fn limit(&self) -> Option<u64> {
        self.parts.limit
    }

    /// The stored row offset, if any.
    pub fn offset(&self) -> Option<u64> {
        self.parts.offset
    }

    /// Whether alias emission is suppressed.
    pub fn exclude_aliases(&self) -> bool {
        self.exclude_aliases
    }

    fn mark_dirty(&mut self) {
        self.state = RenderState::Dirty;
    }

    fn set_kind(&mut self, kind: QueryType) {
        if self.kind == kind {
            return;
        }
        // Parts with no meaning under the new shape are dropped; FROM is
        // shared by every shape and always survives.
        match kind {
            QueryType::Select => {
                self.parts.set.clear();
                self.parts.values.clear();
            }
            QueryType::Insert => {
                self.parts.select.clear();
                self.parts.distinct = false;
                self.parts.join.clear();
                self.parts.set.clear();
                self.parts.where_clause = None;
                self.parts.group_by.clear();
                self.parts.having = None;
                self.parts.order_by.clear();
                self.parts.limit = None;
                self.parts.offset = None;
            }
            QueryType::Update => {
                self.parts.select.clear();
                self.parts.distinct = false;
                self.parts.join.clear();
                self.parts.group_by.clear();
                self.parts.having = None;
                self.parts.order_by.clear();
                self.parts.limit = None;
                self.parts.offset = None;
                self.parts.values.clear();
            }
            QueryType::Delete => {
                self.parts.select.clear();
                self.parts.distinct = false;
                self.parts.join.clear();
                self.parts.set.clear();
                self.parts.group_by.clear();
                self.parts.having = None;
                self.parts.order_by.clear();
                self.parts.limit = None;
                self.parts.offset = None;
                self.parts.values.clear();
            }
            QueryType::Undefined => {}
        }
        self.kind = kind;
    }

    fn normalize_alias(alias: Option<&str>) -> Option<String> {
        alias.filter(|a| !a.is_empty()).map(str::to_string)
    }

    // ==================== SELECT ====================

    /// Set the SELECT list, replacing any previous one; an empty slice only
    /// switches the statement shape.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        self.set_kind(QueryType::Select);
        self.mark_dirty();
        if !columns.is_empty() {
            self.parts.select = columns.iter().map(|c| c.to_string()).collect();
        }
        self
    }

    /// Append to the SELECT list.
    pub fn add_select(&mut self, columns: &[&str]) -> &mut Self {
        self.set_kind(QueryType::Select);
        self.mark_dirty();
        self.parts
            .select
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(&mut self) -> &mut Self {
        self.mark_dirty();
        self.parts.distinct = true;
        self
    }

    // ==================== FROM / JOIN ====================

    /// Add a FROM root. The alias defaults to the table name when absent or
    /// empty (and is then never printed).
    ///
    /// # Panics
    /// Panics on an empty table name.
    pub fn from<'a>(&mut self, table: &str, alias: impl Into<Option<&'a str>>) -> &mut Self {
        assert!(!table.is_empty(), "FROM requires a non-empty table name");
        self.mark_dirty();
        self.parts.from.push(FromClause {
            table: table.to_string(),
            alias: Self::normalize_alias(alias.into()),
        });
        self
    }

    fn push_join<'a>(
        &mut self,
        from_alias: &str,
        join_type: JoinType,
        table: &str,
        alias: impl Into<Option<&'a str>>,
        condition: &str,
    ) -> &mut Self {
        assert!(!table.is_empty(), "JOIN requires a non-empty table name");
        self.mark_dirty();
        self.parts.join.push(JoinClause {
            from_alias: from_alias.to_string(),
            join_type,
            table: table.to_string(),
            alias: Self::normalize_alias(alias.into()),
            condition: condition.to_string(),
        });
        self
    }

    /// Add a JOIN (INNER by default) hanging off `from_alias`.
    ///
    /// `from_alias` is not checked here; an unknown alias surfaces as
    /// [`QueryError::UnknownAlias`](crate::QueryError::UnknownAlias) when the
    /// statement is rendered.
    pub fn join<'a>(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: impl Into<Option<&'a str>>,
        condition: &str,
    ) -> &mut Self {
        self.push_join(from_alias, JoinType::Inner, table, alias, condition)
    }

    /// Add an INNER JOIN.
    pub fn inner_join<'a>(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: impl Into<Option<&'a str>>,
        condition: &str,
    ) -> &mut Self {
        self.push_join(from_alias, JoinType::Inner, table, alias, condition)
    }

    /// Add a LEFT JOIN.
    pub fn left_join<'a>(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: impl Into<Option<&'a str>>,
        condition: &str,
    ) -> &mut Self {
        self.push_join(from_alias, JoinType::Left, table, alias, condition)
    }

    /// Add a RIGHT JOIN.
    pub fn right_join<'a>(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: impl Into<Option<&'a str>>,
        condition: &str,
    ) -> &mut Self {
        self.push_join(from_alias, JoinType::Right, table, alias, condition)
    }

    // ==================== WHERE / HAVING ====================

    fn combine_part(
        part: &mut Option<Expression>,
        op: CompositeOp,
        predicate: Expression,
        seed_base: bool,
    ) {
        *part = Some(match part.take() {
            Some(existing) => existing.combine(op, predicate),
            None if seed_base => Expression::raw("1 = 1").combine(CompositeOp::And, predicate),
            None => predicate,
        });
    }

    /// Set the WHERE condition. The first call stores the predicate verbatim;
    /// later calls combine with the existing tree using AND.
    pub fn where_(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.mark_dirty();
        Self::combine_part(
            &mut self.parts.where_clause,
            CompositeOp::And,
            predicate.into(),
            false,
        );
        self
    }

    /// AND the predicate onto the WHERE tree. As the very first condition it
    /// is combined with a trivially-true `1 = 1` base leaf.
    pub fn and_where(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.mark_dirty();
        Self::combine_part(
            &mut self.parts.where_clause,
            CompositeOp::And,
            predicate.into(),
            true,
        );
        self
    }

    /// OR the predicate onto the WHERE tree. As the very first condition it
    /// is stored verbatim.
    pub fn or_where(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.mark_dirty();
        Self::combine_part(
            &mut self.parts.where_clause,
            CompositeOp::Or,
            predicate.into(),
            false,
        );
        self
    }

    /// Set the HAVING condition; same combination rules as [`Self::where_`].
    pub fn having(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.mark_dirty();
        Self::combine_part(
            &mut self.parts.having,
            CompositeOp::And,
            predicate.into(),
            false,
        );
        self
    }

    /// AND the predicate onto the HAVING tree; same first-call rule as
    /// [`Self::and_where`].
    pub fn and_having(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.mark_dirty();
        Self::combine_part(
            &mut self.parts.having,
            CompositeOp::And,
            predicate.into(),
            true,
        );
        self
    }

    /// OR the predicate onto the HAVING tree.
    pub fn or_having(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.mark_dirty();
        Self::combine_part(
            &mut self.parts.having,
            CompositeOp::Or,
            predicate.into(),
            false,
        );
        self
    }

    // ==================== GROUP BY / ORDER BY ====================

    /// Set the GROUP BY list, replacing any previous one. An empty slice is
    /// a no-op.
    pub fn group_by(&mut self, columns: &[&str]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        self.mark_dirty();
        self.parts.group_by = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append to the GROUP BY list. An empty slice is a no-op.
    pub fn add_group_by(&mut self, columns: &[&str]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        self.mark_dirty();
        self.parts
            .group_by
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Set the ORDER BY list to this single entry, replacing any previous
    /// list. Direction defaults to `ASC`.
    pub fn order_by(&mut self, sort: &str, order: impl Into<Option<SortOrder>>) -> &mut Self {
        self.mark_dirty();
        self.parts.order_by = vec![(sort.to_string(), order.into().unwrap_or_default())];
        self
    }

    /// Append one ORDER BY entry. Direction defaults to `ASC`.
    pub fn add_order_by(&mut self, sort: &str, order: impl Into<Option<SortOrder>>) -> &mut Self {
        self.mark_dirty();
        self.parts
            .order_by
            .push((sort.to_string(), order.into().unwrap_or_default()));
        self
    }

    /// Store a row limit for the execution layer.
    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.mark_dirty();
        self.parts.limit = Some(limit);
        self
    }

    /// Store a row offset for the execution layer.
    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.mark_dirty();
        self.parts.offset = Some(offset);
        self
    }

    // ==================== INSERT / UPDATE / DELETE ====================

    /// Switch to an INSERT statement targeting `table`.
    ///
    /// # Panics
    /// Panics on an empty table name.
    pub fn insert(&mut self, table: &str) -> &mut Self {
        assert!(!table.is_empty(), "INSERT requires a non-empty table name");
        self.set_kind(QueryType::Insert);
        self.mark_dirty();
        self.parts.from = vec![FromClause {
            table: table.to_string(),
            alias: None,
        }];
        self
    }

    /// Switch to an UPDATE statement targeting `table`.
    ///
    /// # Panics
    /// Panics on an empty table name.
    pub fn update<'a>(&mut self, table: &str, alias: impl Into<Option<&'a str>>) -> &mut Self {
        assert!(!table.is_empty(), "UPDATE requires a non-empty table name");
        self.set_kind(QueryType::Update);
        self.mark_dirty();
        self.parts.from = vec![FromClause {
            table: table.to_string(),
            alias: Self::normalize_alias(alias.into()),
        }];
        self
    }

    /// Switch to a DELETE statement targeting `table`.
    ///
    /// # Panics
    /// Panics on an empty table name.
    pub fn delete<'a>(&mut self, table: &str, alias: impl Into<Option<&'a str>>) -> &mut Self {
        assert!(!table.is_empty(), "DELETE requires a non-empty table name");
        self.set_kind(QueryType::Delete);
        self.mark_dirty();
        self.parts.from = vec![FromClause {
            table: table.to_string(),
            alias: Self::normalize_alias(alias.into()),
        }];
        self
    }

    /// Append one UPDATE assignment (`column = value`).
    pub fn set(&mut self, column: &str, value: &str) -> &mut Self {
        self.mark_dirty();
        self.parts.set.push((column.to_string(), value.to_string()));
        self
    }

    /// Upsert one INSERT column. A later write to an existing column updates
    /// its value but keeps its original position; a new column is appended.
    pub fn set_value(&mut self, column: &str, value: &str) -> &mut Self {
        self.mark_dirty();
        if let Some(entry) = self
            .parts
            .values
            .iter_mut()
            .find(|(existing, _)| existing == column)
        {
            entry.1 = value.to_string();
        } else {
            self.parts
                .values
                .push((column.to_string(), value.to_string()));
        }
        self
    }

    /// Replace the whole INSERT column set with the given pairs.
    pub fn values(&mut self, pairs: &[(&str, &str)]) -> &mut Self {
        self.mark_dirty();
        self.parts.values = pairs
            .iter()
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        self
    }

    // ==================== Parameters ====================

    /// Bind a named parameter on the statement's store; returns the
    /// placeholder text to embed in a predicate. See
    /// [`ParameterStore::create_named_parameter`].
    pub fn create_named_parameter(
        &mut self,
        value: impl Into<Value>,
        ty: Option<ParameterType>,
        placeholder: Option<&str>,
    ) -> String {
        self.mark_dirty();
        self.params.create_named_parameter(value, ty, placeholder)
    }

    /// Bind the next positional parameter; returns `"?"`.
    pub fn create_positional_parameter(
        &mut self,
        value: impl Into<Value>,
        ty: Option<ParameterType>,
    ) -> String {
        self.mark_dirty();
        self.params.create_positional_parameter(value, ty)
    }

    /// Upsert a parameter binding under an explicit key.
    pub fn set_parameter(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
        ty: Option<ParameterType>,
    ) -> &mut Self {
        self.mark_dirty();
        self.params.set_parameter(key, value, ty);
        self
    }

    /// The bound value for a key, if present.
    pub fn parameter(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.params.parameter(key)
    }

    /// The type tag for a key; untyped and absent both read as `None`.
    pub fn parameter_type(&self, key: impl Into<ParamKey>) -> Option<ParameterType> {
        self.params.parameter_type(key)
    }

    /// The statement's parameter store.
    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    // ==================== Part management ====================

    /// Suppress (or restore) alias emission in FROM/JOIN text. Internal
    /// alias resolution is unaffected.
    pub fn set_exclude_aliases(&mut self, exclude: bool) -> &mut Self {
        self.mark_dirty();
        self.exclude_aliases = exclude;
        self
    }

    /// Clear one named part. Known names: `select`, `distinct`, `from`,
    /// `join`, `set`, `where`, `groupBy`, `having`, `orderBy`, `limit`,
    /// `offset`, `values`. Unknown names are ignored.
    pub fn reset_query_part(&mut self, name: &str) -> &mut Self {
        self.mark_dirty();
        match name {
            "select" => self.parts.select.clear(),
            "distinct" => self.parts.distinct = false,
            "from" => self.parts.from.clear(),
            "join" => self.parts.join.clear(),
            "set" => self.parts.set.clear(),
            "where" => self.parts.where_clause = None,
            "groupBy" => self.parts.group_by.clear(),
            "having" => self.parts.having = None,
            "orderBy" => self.parts.order_by.clear(),
            "limit" => self.parts.limit = None,
            "offset" => self.parts.offset = None,
            "values" => self.parts.values.clear(),
            _ => {}
        }
        self
    }

    /// Clear several named parts at once.
    pub fn reset_query_parts(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.reset_query_part(name);
        }
        self
    }

    // ==================== Rendering ====================

    /// Render the statement, or return the cached text when nothing changed
    /// since the last successful render.
    ///
    /// A failed render caches nothing and leaves the state
    /// [`RenderState::Dirty`].
    pub fn sql(&mut self) -> QueryResult<String> {
        if self.state == RenderState::Clean {
            return Ok(self.rendered.clone());
        }
        match self.render() {
            Ok(sql) => {
                tracing::debug!(kind = ?self.kind, sql = %sql, "rendered statement");
                self.rendered = sql.clone();
                self.state = RenderState::Clean;
                Ok(sql)
            }
            Err(err) => {
                tracing::warn!(error = %err, "statement failed to render");
                Err(err)
            }
        }
    }

    fn render(&self) -> QueryResult<String> {
        Ok(match self.kind {
            QueryType::Select => self.render_select()?,
            QueryType::Insert => self.render_insert(),
            QueryType::Update => self.render_update(),
            QueryType::Delete => self.render_delete(),
            QueryType::Undefined => String::new(),
        })
    }

    fn render_select(&self) -> QueryResult<String> {
        let mut sql = String::from("SELECT");
        if self.parts.distinct {
            sql.push_str(" DISTINCT");
        }
        if !self.parts.select.is_empty() {
            sql.push(' ');
            sql.push_str(&self.parts.select.join(", "));
        }
        if !self.parts.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&render_from(
                &self.parts.from,
                &self.parts.join,
                self.exclude_aliases,
            )?);
        }
        if let Some(where_clause) = &self.parts.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.render());
        }
        if !self.parts.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.parts.group_by.join(", "));
        }
        if let Some(having) = &self.parts.having {
            sql.push_str(" HAVING ");
            sql.push_str(&having.render());
        }
        if !self.parts.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let entries: Vec<String> = self
                .parts
                .order_by
                .iter()
                .map(|(sort, order)| format!("{sort} {}", order.keyword()))
                .collect();
            sql.push_str(&entries.join(", "));
        }
        Ok(sql)
    }

    fn target_table(&self) -> (&str, Option<&str>) {
        match self.parts.from.first() {
            Some(clause) => (
                clause.table.as_str(),
                clause.alias.as_deref().filter(|a| *a != clause.table),
            ),
            None => ("", None),
        }
    }

    fn render_insert(&self) -> String {
        let (table, _) = self.target_table();
        let columns: Vec<&str> = self.parts.values.iter().map(|(c, _)| c.as_str()).collect();
        let placeholders: Vec<&str> = self.parts.values.iter().map(|(_, v)| v.as_str()).collect();
        format!(
            "INSERT INTO {table} ({}) VALUES({})",
            columns.join(", "),
            placeholders.join(", ")
        )
    }

    fn render_update(&self) -> String {
        let (table, alias) = self.target_table();
        let mut sql = format!("UPDATE {table}");
        if let Some(alias) = alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        sql.push_str(" SET ");
        let assignments: Vec<String> = self
            .parts
            .set
            .iter()
            .map(|(column, value)| format!("{column} = {value}"))
            .collect();
        sql.push_str(&assignments.join(", "));
        if let Some(where_clause) = &self.parts.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.render());
        }
        sql
    }

    fn render_delete(&self) -> String {
        let (table, alias) = self.target_table();
        let mut sql = format!("DELETE FROM {table}");
        if let Some(alias) = alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        if let Some(where_clause) = &self.parts.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.render());
        }
        sql
    }
}

impl fmt::Display for QueryBuilder {
    /// Goes through the same render routine as [`QueryBuilder::sql`]; a clean
    /// cache is returned as-is. Display cannot promote the state to Clean,
    /// and a render failure writes the error's display text instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.state == RenderState::Clean {
            return f.write_str(&self.rendered);
        }
        match self.render() {
            Ok(sql) => f.write_str(&sql),
            Err(err) => write!(f, "{err}"),
        }
    }
}
