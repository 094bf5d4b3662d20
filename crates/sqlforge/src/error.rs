//! Error types for sqlforge

use thiserror::Error;

/// Result type alias for render operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while rendering a statement.
///
/// Both variants are produced only by the lazy render step
/// ([`QueryBuilder::sql`](crate::QueryBuilder::sql)), never when a FROM or
/// JOIN is declared. Clauses may therefore be declared in any order before
/// the statement is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A JOIN references a `from_alias` that no FROM entry or earlier JOIN
    /// registered.
    #[error(
        "The given alias '{alias}' is not part of any FROM or JOIN clause table. \
         The currently registered aliases are: {}.",
        .registered.join(", ")
    )]
    UnknownAlias {
        /// The alias the JOIN asked for.
        alias: String,
        /// Aliases known at the time of failure, in declaration order.
        registered: Vec<String>,
    },

    /// Two FROM/JOIN entries resolve to the same alias.
    #[error(
        "The given alias '{alias}' is not unique in FROM and JOIN clause table. \
         The currently registered aliases are: {}.",
        .registered.join(", ")
    )]
    NonUniqueAlias {
        /// The alias that collided.
        alias: String,
        /// Aliases known at the time of failure, in declaration order.
        registered: Vec<String>,
    },
}

impl QueryError {
    /// Create an unknown-alias error.
    pub fn unknown_alias(alias: impl Into<String>, registered: Vec<String>) -> Self {
        Self::UnknownAlias {
            alias: alias.into(),
            registered,
        }
    }

    /// Create a non-unique-alias error.
    pub fn non_unique_alias(alias: impl Into<String>, registered: Vec<String>) -> Self {
        Self::NonUniqueAlias {
            alias: alias.into(),
            registered,
        }
    }

    /// The offending alias.
    pub fn alias(&self) -> &str {
        match self {
            Self::UnknownAlias { alias, .. } | Self::NonUniqueAlias { alias, .. } => alias,
        }
    }

    /// The aliases registered at the time of failure, in declaration order.
    pub fn registered_aliases(&self) -> &[String] {
        match self {
            Self::UnknownAlias { registered, .. } | Self::NonUniqueAlias { registered, .. } => {
                registered
            }
        }
    }
}
