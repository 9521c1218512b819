//! Bound queries
//!
//! A `BoundQuery` is SQL text with `@name` placeholders plus the named values
//! for them. It is built per call site, executed once and dropped.
//! Compilation rewrites every placeholder to the driver's positional `?` and
//! orders the values to match, so a name may appear more than once.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use fleet_core::StoredEnum;
use sqlx::any::AnyRow;

use super::StoreCause;

/// Text encoding used for date columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value that can be bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Stored text form of an enum-valued column.
    pub fn stored<E: StoredEnum>(value: E) -> Self {
        Self::Text(value.as_str().to_owned())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        Self::Text(v.format(DATE_FORMAT).to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// How the round trip is run and what the transform receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Returns rows.
    Rows,
    /// Returns an affected-row count and, for inserts, the generated key.
    Command,
}

/// SQL with named parameters, not yet executed.
#[derive(Debug, Clone)]
pub struct BoundQuery {
    sql: String,
    params: Vec<(&'static str, SqlValue)>,
    kind: QueryKind,
}

impl BoundQuery {
    /// A statement that returns rows.
    pub fn rows(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            kind: QueryKind::Rows,
        }
    }

    /// A statement run for its effect.
    pub fn command(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            kind: QueryKind::Command,
        }
    }

    /// Bind a value to `@name`. A later bind of the same name replaces it.
    pub fn bind(mut self, name: &'static str, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Bind several values at once.
    pub fn bind_all(mut self, params: impl IntoIterator<Item = (&'static str, SqlValue)>) -> Self {
        for (name, value) in params {
            self = self.bind(name, value);
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Rewrite placeholders to positional form and order the values.
    ///
    /// Quoted strings, quoted identifiers, `--` and `/* */` comments and
    /// `@@` system variables are copied through untouched. MySQL's `#`
    /// comments are not recognised since SQLite has no such syntax.
    pub fn compile(self) -> Result<CompiledQuery, StoreCause> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = Vec::with_capacity(self.params.len());
        let mut used: HashSet<&'static str> = HashSet::new();

        let mut chars = self.sql.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            match c {
                '\'' | '"' | '`' => {
                    sql.push(c);
                    // Copy through to the matching quote; doubled quotes are
                    // an escaped quote and keep us inside.
                    while let Some((_, inner)) = chars.next() {
                        sql.push(inner);
                        if inner == c {
                            if chars.peek().map(|(_, n)| *n) == Some(c) {
                                if let Some((_, escaped)) = chars.next() {
                                    sql.push(escaped);
                                }
                                continue;
                            }
                            break;
                        }
                    }
                }
                '-' if chars.peek().map(|(_, n)| *n) == Some('-') => {
                    sql.push(c);
                    for (_, inner) in chars.by_ref() {
                        sql.push(inner);
                        if inner == '\n' {
                            break;
                        }
                    }
                }
                '/' if chars.peek().map(|(_, n)| *n) == Some('*') => {
                    sql.push(c);
                    if let Some((_, star)) = chars.next() {
                        sql.push(star);
                    }
                    let mut prev = '\0';
                    for (_, inner) in chars.by_ref() {
                        sql.push(inner);
                        if prev == '*' && inner == '/' {
                            break;
                        }
                        prev = inner;
                    }
                }
                '@' if chars.peek().map(|(_, n)| *n) == Some('@') => {
                    sql.push_str("@@");
                    chars.next();
                }
                '@' if chars
                    .peek()
                    .is_some_and(|(_, n)| n.is_ascii_alphabetic() || *n == '_') =>
                {
                    let name_start = start + 1;
                    let mut name_end = name_start;
                    while let Some((i, n)) = chars.peek().copied() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            name_end = i + n.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let name = &self.sql[name_start..name_end];
                    let (bound_name, value) = self
                        .params
                        .iter()
                        .find(|(n, _)| *n == name)
                        .ok_or_else(|| StoreCause::UnboundParameter(name.to_owned()))?;
                    used.insert(*bound_name);
                    values.push(value.clone());
                    sql.push('?');
                }
                _ => sql.push(c),
            }
        }

        if let Some((name, _)) = self.params.iter().find(|(n, _)| !used.contains(n)) {
            return Err(StoreCause::UnusedParameter((*name).to_owned()));
        }

        Ok(CompiledQuery {
            sql,
            values,
            kind: self.kind,
        })
    }
}

/// Positional SQL and its values, ready for the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub values: Vec<SqlValue>,
    pub kind: QueryKind,
}

/// Raw result of one round trip, handed to the caller's transform.
pub enum QueryOutput {
    Rows(Vec<AnyRow>),
    Done {
        rows_affected: u64,
        last_insert_id: Option<i64>,
    },
}

impl fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(rows) => f.debug_tuple("Rows").field(&rows.len()).finish(),
            Self::Done {
                rows_affected,
                last_insert_id,
            } => f
                .debug_struct("Done")
                .field("rows_affected", rows_affected)
                .field("last_insert_id", last_insert_id)
                .finish(),
        }
    }
}

impl QueryOutput {
    /// Rows returned; empty for commands.
    pub fn into_rows(self) -> Vec<AnyRow> {
        match self {
            Self::Rows(rows) => rows,
            Self::Done { .. } => Vec::new(),
        }
    }

    /// First row, if any.
    pub fn into_first(self) -> Option<AnyRow> {
        self.into_rows().into_iter().next()
    }

    pub fn rows_affected(&self) -> u64 {
        match self {
            Self::Rows(rows) => rows.len() as u64,
            Self::Done { rows_affected, .. } => *rows_affected,
        }
    }

    /// Generated key of an insert, when the driver reported one.
    pub fn last_insert_id(&self) -> Option<i64> {
        match self {
            Self::Done { last_insert_id, .. } => *last_insert_id,
            Self::Rows(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_named_placeholders_in_order() {
        let compiled = BoundQuery::rows(
            "SELECT id FROM vehicles WHERE status = @status AND year >= @year",
        )
        .bind("year", 2020i64)
        .bind("status", "Available")
        .compile()
        .unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT id FROM vehicles WHERE status = ? AND year >= ?"
        );
        assert_eq!(
            compiled.values,
            vec![SqlValue::Text("Available".into()), SqlValue::Int(2020)]
        );
    }

    #[test]
    fn repeated_name_binds_twice() {
        let compiled = BoundQuery::rows(
            "SELECT id FROM vacations WHERE start_date <= @day AND end_date >= @day",
        )
        .bind("day", NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
        .compile()
        .unwrap();

        assert_eq!(compiled.values.len(), 2);
        assert_eq!(compiled.values[0], SqlValue::Text("2025-07-01".into()));
    }

    #[test]
    fn skips_quoted_text_and_system_variables() {
        let compiled = BoundQuery::rows(
            "SELECT 'user@example.com', `odd@col`, @@version, 'it''s @x' FROM users WHERE id = @id",
        )
        .bind("id", 1i64)
        .compile()
        .unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT 'user@example.com', `odd@col`, @@version, 'it''s @x' FROM users WHERE id = ?"
        );
        assert_eq!(compiled.values, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn comments_are_copied_through() {
        let sql = "SELECT id -- driver's @id, not bound\nFROM drivers /* @status: it's */ WHERE id = @id";
        let compiled = BoundQuery::rows(sql).bind("id", 7i64).compile().unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT id -- driver's @id, not bound\nFROM drivers /* @status: it's */ WHERE id = ?"
        );
        assert_eq!(compiled.values, vec![SqlValue::Int(7)]);

        let compiled = BoundQuery::rows("SELECT @a - -1 /* open").bind("a", 1i64).compile().unwrap();
        assert_eq!(compiled.sql, "SELECT ? - -1 /* open");
    }

    #[test]
    fn unbound_placeholder_is_an_error() {
        let err = BoundQuery::rows("SELECT * FROM drivers WHERE id = @id")
            .compile()
            .unwrap_err();
        assert!(matches!(err, StoreCause::UnboundParameter(name) if name == "id"));
    }

    #[test]
    fn unused_parameter_is_an_error() {
        let err = BoundQuery::command("DELETE FROM buses")
            .bind("id", 3i64)
            .compile()
            .unwrap_err();
        assert!(matches!(err, StoreCause::UnusedParameter(name) if name == "id"));
    }

    #[test]
    fn rebinding_replaces_value() {
        let compiled = BoundQuery::rows("SELECT * FROM users WHERE id = @id")
            .bind("id", 1i64)
            .bind("id", 2i64)
            .compile()
            .unwrap();
        assert_eq!(compiled.values, vec![SqlValue::Int(2)]);
    }

    #[test]
    fn option_and_enum_values() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
        assert_eq!(
            SqlValue::stored(fleet_core::VehicleStatus::OnMission),
            SqlValue::Text("OnMission".into())
        );
    }

    #[test]
    fn output_accessors() {
        let done = QueryOutput::Done {
            rows_affected: 1,
            last_insert_id: Some(42),
        };
        assert_eq!(done.rows_affected(), 1);
        assert_eq!(done.last_insert_id(), Some(42));
        assert!(done.into_rows().is_empty());
    }
}
