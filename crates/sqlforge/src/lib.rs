//! # sqlforge
//!
//! A driver-independent, parameterized SQL statement assembler.
//!
//! ## Features
//!
//! - **Fluent assembly**: declare SELECT/INSERT/UPDATE/DELETE parts in any
//!   order; the builder renders them into one deterministic SQL string
//! - **Alias graph**: JOINs hang off declared aliases and are emitted
//!   breadth-first per FROM root, validated lazily at render time
//! - **Composite predicates**: AND/OR trees with explicit parenthesization,
//!   grown incrementally through `and_where` / `or_where`
//! - **Parameter store**: named (`:name`) and positional (`?`) bindings with
//!   optional type tags, carried alongside the SQL text
//! - **Render cache**: `sql()` memoizes until the next mutation
//!
//! ## Usage
//!
//! ```
//! use sqlforge::{QueryBuilder, SortOrder};
//!
//! let mut qb = QueryBuilder::new();
//! let placeholder = qb.create_named_parameter("active", None, None);
//! qb.select(&["u.id", "u.name"])
//!     .from("users", "u")
//!     .inner_join("u", "phones", "p", "p.user_id = u.id")
//!     .where_(format!("u.status = {placeholder}"))
//!     .and_where("p.verified = 1")
//!     .order_by("u.name", SortOrder::Asc);
//!
//! assert_eq!(
//!     qb.sql().unwrap(),
//!     "SELECT u.id, u.name FROM users u \
//!      INNER JOIN phones p ON p.user_id = u.id \
//!      WHERE (u.status = :dcValue1) AND (p.verified = 1) \
//!      ORDER BY u.name ASC"
//! );
//! ```

pub mod builder;
pub mod error;
pub mod expr;
pub mod joins;
pub mod param;


pub use builder::{QueryBuilder, QueryParts, QueryType, RenderState, SortOrder};
pub use error::{QueryError, QueryResult};
pub use expr::{CompositeOp, Expression};
pub use joins::{FromClause, JoinClause, JoinType};
pub use param::{ParamKey, ParameterStore, ParameterType};

/// Create a builder already shaped as a SELECT over the given columns.
///
/// # Example
/// ```
/// let mut qb = sqlforge::select(&["u.id"]);
/// qb.from("users", "u");
/// assert_eq!(qb.sql().unwrap(), "SELECT u.id FROM users u");
/// ```
pub fn select(columns: &[&str]) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.select(columns);
    qb
}

/// Create a builder already shaped as an INSERT into the given table.
///
/// # Example
/// ```
/// let mut qb = sqlforge::insert("users");
/// qb.set_value("name", "?");
/// assert_eq!(qb.sql().unwrap(), "INSERT INTO users (name) VALUES(?)");
/// ```
pub fn insert(table: &str) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.insert(table);
    qb
}

/// Create a builder already shaped as an UPDATE of the given table.
///
/// # Example
/// ```
/// let mut qb = sqlforge::update("users", "u");
/// qb.set("u.name", "?");
/// assert_eq!(qb.sql().unwrap(), "UPDATE users u SET u.name = ?");
/// ```
pub fn update<'a>(table: &str, alias: impl Into<Option<&'a str>>) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.update(table, alias);
    qb
}

/// Create a builder already shaped as a DELETE from the given table.
///
/// # Example
/// ```
/// let mut qb = sqlforge::delete("users", "u");
/// qb.where_("u.id = ?");
/// assert_eq!(qb.sql().unwrap(), "DELETE FROM users u WHERE u.id = ?");
/// ```
pub fn delete<'a>(table: &str, alias: impl Into<Option<&'a str>>) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.delete(table, alias);
    qb
}
