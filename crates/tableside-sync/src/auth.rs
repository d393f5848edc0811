//! # Table-Scoped Request Tokens
//!
//! Table-scoped reads and writes carry a lightweight per-request token
//! derived from the table number and the current timestamp. It lets the
//! backend attribute traffic to a table and reject obviously malformed
//! requests; it is NOT a security boundary and provides no authentication.

use chrono::Utc;
use std::fmt::Display;

use crate::model::TableNumber;

/// A freshly issued token for one table-scoped request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAuth(String);

impl TableAuth {
    /// Header name the token is sent under.
    pub const HEADER: &'static str = "X-Table-Auth";

    /// Derive a token for the given table at the current instant. Issued
    /// per request, never cached.
    pub fn issue(table: TableNumber) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        Self(format!("table:{table}:time:{timestamp}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TableAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
