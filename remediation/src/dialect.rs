use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL dialect a fix script is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    SqlServer,
    MySql,
}

impl Dialect {
    /// Resolves a free-form database type such as `"PostgreSQL 15"` or
    /// `"Azure SQL Server"`. Anything unrecognised is treated as MySQL.
    pub fn detect(database_type: &str) -> Self {
        let lowered = database_type.to_lowercase();
        if lowered.contains("postgres") {
            Dialect::Postgres
        } else if lowered.contains("mssql")
            || lowered.contains("sqlserver")
            || lowered.contains("sql server")
        {
            Dialect::SqlServer
        } else {
            Dialect::MySql
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::SqlServer => "sqlserver",
            Dialect::MySql => "mysql",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "PostgreSQL",
            Dialect::SqlServer => "SQL Server",
            Dialect::MySql => "MySQL",
        }
    }

    /// Renders an identifier. Plain identifiers are emitted as-is; anything
    /// else is quoted, and the second value reports whether quoting happened.
    pub fn identifier(&self, raw: &str) -> (String, bool) {
        if raw.is_empty() || is_plain_identifier(raw) {
            return (raw.to_string(), false);
        }

        let quoted = match self {
            Dialect::Postgres => format!("\"{}\"", raw.replace('"', "\"\"")),
            Dialect::SqlServer => format!("[{}]", raw.replace(']', "]]")),
            Dialect::MySql => format!("`{}`", raw.replace('`', "``")),
        };
        (quoted, true)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn is_plain_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Escapes a value for use inside a single-quoted SQL string literal.
pub(crate) fn string_literal(raw: &str) -> String {
    raw.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_dialects_by_substring() {
        assert_eq!(Dialect::detect("postgresql"), Dialect::Postgres);
        assert_eq!(Dialect::detect("PostgreSQL 15"), Dialect::Postgres);
        assert_eq!(Dialect::detect("mssql"), Dialect::SqlServer);
        assert_eq!(Dialect::detect("Microsoft SQL Server 2019"), Dialect::SqlServer);
        assert_eq!(Dialect::detect("sqlserver"), Dialect::SqlServer);
        assert_eq!(Dialect::detect("mysql"), Dialect::MySql);
        assert_eq!(Dialect::detect("snowflake"), Dialect::MySql);
        assert_eq!(Dialect::detect(""), Dialect::MySql);
    }

    #[test]
    fn plain_identifiers_pass_through() {
        for dialect in [Dialect::Postgres, Dialect::SqlServer, Dialect::MySql] {
            assert_eq!(dialect.identifier("customer_email"), ("customer_email".into(), false));
            assert_eq!(dialect.identifier("_tmp2"), ("_tmp2".into(), false));
            assert_eq!(dialect.identifier(""), (String::new(), false));
        }
    }

    #[test]
    fn unsafe_identifiers_are_quoted_per_dialect() {
        assert_eq!(
            Dialect::Postgres.identifier("first name"),
            ("\"first name\"".into(), true)
        );
        assert_eq!(
            Dialect::Postgres.identifier("a\"; DROP TABLE x; --"),
            ("\"a\"\"; DROP TABLE x; --\"".into(), true)
        );
        assert_eq!(Dialect::SqlServer.identifier("odd]name"), ("[odd]]name]".into(), true));
        assert_eq!(Dialect::MySql.identifier("2fa`code"), ("`2fa``code`".into(), true));
    }

    #[test]
    fn string_literals_double_quotes() {
        assert_eq!(string_literal("o'brien"), "o''brien");
    }
}
