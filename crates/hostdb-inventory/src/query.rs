//! SQL query builder for the host table

use std::fmt;

/// Columns read for every host, cast to types the row decoder expects
///
/// `ip_address` may be stored as `inet` and `ssh_port` as `smallint`, so both
/// are normalized in SQL. `inet::text` keeps the netmask (`10.0.0.1/32`), so
/// everything from the first `/` is dropped; plain text values pass through.
pub const HOST_COLUMNS: &[&str] = &[
    "hostname",
    IP_ADDRESS_COLUMN,
    "environment",
    "role",
    "ssh_user",
    "ssh_port::int4 AS ssh_port",
    "region",
];

/// Address column without any netmask suffix
pub const IP_ADDRESS_COLUMN: &str = "split_part(ip_address::text, '/', 1) AS ip_address";

/// SQL query builder
#[derive(Debug, Clone)]
pub struct Query {
    /// SELECT clause
    select: Vec<String>,
    /// FROM clause
    from: String,
    /// WHERE clauses
    where_clauses: Vec<String>,
}

impl Query {
    /// Create a new query for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            select: vec!["*".to_string()],
            from: table.into(),
            where_clauses: Vec::new(),
        }
    }

    /// Select specific columns
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Add WHERE clause on a boolean column
    #[must_use]
    pub fn where_true(mut self, column: &str) -> Self {
        self.where_clauses.push(format!("{column} = true"));
        self
    }

    /// Build the SQL string
    #[must_use]
    pub fn build(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.select.join(", "), self.from);

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        sql
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}

/// Query for every host flagged active in `table`
#[must_use]
pub fn active_hosts(table: &str) -> Query {
    Query::new(table).select(HOST_COLUMNS).where_true("active")
}

/// Check that a table name is a plain, optionally schema-qualified identifier
///
/// The table name is interpolated into SQL, so anything beyond
/// `[A-Za-z_][A-Za-z0-9_]*` segments joined by a single `.` is refused.
#[must_use]
pub fn is_valid_table_name(name: &str) -> bool {
    let segments: Vec<&str> = name.split('.').collect();
    segments.len() <= 2
        && segments.iter().all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
