//! Argument types for search API operations.
//!
//! # Design
//! Results stay as `serde_json::Value`: the service owns the response schema
//! and the SDK hands payloads through untouched. Only inputs that need
//! encoding rules of their own (log type, multi-query strategy, query
//! parameters) get dedicated types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which log entries `GetLogs` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Query,
    Build,
    Error,
    #[default]
    All,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Query => "query",
            LogType::Build => "build",
            LogType::Error => "error",
            LogType::All => "all",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution strategy for a multi-index query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryStrategy {
    /// Run every query.
    #[default]
    #[serde(rename = "none")]
    None,
    /// Stop once enough hits were gathered by the earlier queries.
    #[serde(rename = "stopIfEnoughMatches")]
    StopIfEnoughMatches,
}

impl QueryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStrategy::None => "none",
            QueryStrategy::StopIfEnoughMatches => "stopIfEnoughMatches",
        }
    }
}

impl fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(QueryStrategy::None),
            "stopIfEnoughMatches" => Ok(QueryStrategy::StopIfEnoughMatches),
            other => Err(format!("unknown query strategy: {other}")),
        }
    }
}

/// Full-text query plus search parameters, rendered as a URL parameter string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            query: Some(text.into()),
            parameters: BTreeMap::new(),
        }
    }

    /// Set a search parameter such as `hitsPerPage` or `attributesToRetrieve`.
    /// Setting `query` replaces the query text.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name == "query" {
            self.query = Some(value.into());
        } else {
            self.parameters.insert(name, value.into());
        }
        self
    }

    /// Render as `query=..&name=value..`, query text first, then parameters
    /// in key order. The text is emitted once even if `parameters` also
    /// holds a `query` entry.
    pub fn to_params(&self) -> String {
        let mut pairs = Vec::with_capacity(self.parameters.len() + 1);
        if let Some(text) = &self.query {
            pairs.push(format!("query={}", urlencoding::encode(text)));
        }
        for (name, value) in self.parameters.iter().filter(|(name, _)| *name != "query") {
            pairs.push(format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            ));
        }
        pairs.join("&")
    }
}

/// A query addressed to one index, as used by multi-index queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuery {
    pub index_name: String,
    #[serde(default)]
    pub query: Query,
}

impl IndexQuery {
    pub fn new(index_name: impl Into<String>, query: Query) -> Self {
        Self {
            index_name: index_name.into(),
            query,
        }
    }
}
