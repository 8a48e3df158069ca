//! Query model definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::twitter::QueryError;

/// Which kind of feed a query reads from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    User,
    List,
    Search,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::User => "user",
            QueryType::List => "list",
            QueryType::Search => "search",
        }
    }
}

impl FromStr for QueryType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(QueryType::User),
            "list" => Ok(QueryType::List),
            "search" => Ok(QueryType::Search),
            other => Err(QueryError::InvalidQueryType(other.to_string())),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored feed request.
///
/// `kind` stays a plain string so rows written by other tools still load;
/// it is validated when the query runs.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Query {
    pub id: i64,
    pub kind: String,
    pub value: String,
    /// Due for the next poll
    pub interested: bool,
}

impl Query {
    pub fn query_type(&self) -> Result<QueryType, QueryError> {
        self.kind.parse()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.value)
    }
}
