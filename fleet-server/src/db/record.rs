//! Table metadata and row mapping
//!
//! A `Record` describes its table and maps rows both ways. Enum and date
//! columns go through [`get_enum`] and [`get_date`], the only decode paths
//! for text-encoded columns: an unknown enum value or malformed date fails
//! the row with a column-decode error instead of substituting a default.

use chrono::NaiveDate;
use fleet_core::StoredEnum;
use sqlx::any::AnyRow;
use sqlx::Row;

use super::query::{SqlValue, DATE_FORMAT};

/// A plain record stored in one table.
pub trait Record: Sized + Send + Sync + 'static {
    /// Table name.
    const TABLE: &'static str;

    /// Surrogate key column; `None` for link rows.
    const KEY: Option<&'static str>;

    /// Data columns, in the order `values` returns them.
    const COLUMNS: &'static [&'static str];

    /// Map one row to a record.
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error>;

    /// Column values, aligned with `COLUMNS`.
    fn values(&self) -> Vec<SqlValue>;

    /// Comma-separated select list: key first, then data columns.
    fn projection() -> String {
        Self::KEY
            .into_iter()
            .chain(Self::COLUMNS.iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A record with a generated surrogate key.
pub trait Keyed: Record {
    fn key(&self) -> Option<i64>;
}

/// Key column of a keyed record. Keyed records always declare `KEY`.
pub(crate) fn key_column<R: Keyed>() -> &'static str {
    R::KEY.unwrap_or("id")
}

/// Decode a text-encoded enum column, rejecting unknown values.
pub fn get_enum<E: StoredEnum>(row: &AnyRow, column: &str) -> Result<E, sqlx::Error> {
    let text: String = row.try_get(column)?;
    E::parse(&text).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_owned(),
        source: Box::new(e),
    })
}

/// Decode a `YYYY-MM-DD` date column.
pub fn get_date(row: &AnyRow, column: &str) -> Result<NaiveDate, sqlx::Error> {
    let text: String = row.try_get(column)?;
    parse_date(column, &text)
}

/// Decode a nullable `YYYY-MM-DD` date column.
pub fn get_opt_date(row: &AnyRow, column: &str) -> Result<Option<NaiveDate>, sqlx::Error> {
    let text: Option<String> = row.try_get(column)?;
    text.map(|t| parse_date(column, &t)).transpose()
}

fn parse_date(column: &str, text: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_owned(),
        source: Box::new(e),
    })
}

/// WHERE clause with its named parameters.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clause: Option<String>,
    params: Vec<(&'static str, SqlValue)>,
}

impl Filter {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Raw condition using `@name` placeholders; bind with [`Filter::param`].
    pub fn raw(clause: impl Into<String>) -> Self {
        Self {
            clause: Some(clause.into()),
            params: Vec::new(),
        }
    }

    /// `column = @column`
    pub fn eq(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::all().and_eq(column, value)
    }

    /// Add `AND column = @column`.
    pub fn and_eq(self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.and(format!("{column} = @{column}")).param(column, value)
    }

    /// Add `AND (condition)`.
    pub fn and(mut self, condition: impl Into<String>) -> Self {
        let condition = condition.into();
        self.clause = Some(match self.clause.take() {
            Some(existing) => format!("{existing} AND {condition}"),
            None => condition,
        });
        self
    }

    /// Bind a value used by the clause.
    pub fn param(mut self, name: &'static str, value: impl Into<SqlValue>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// ` WHERE ...` or an empty string.
    pub fn where_sql(&self) -> String {
        match &self.clause {
            Some(clause) => format!(" WHERE {clause}"),
            None => String::new(),
        }
    }

    pub fn into_params(self) -> Vec<(&'static str, SqlValue)> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_builds_where_clause() {
        let filter = Filter::eq("status", "Available").and("year >= @year").param("year", 2020i64);
        assert_eq!(
            filter.where_sql(),
            " WHERE status = @status AND year >= @year"
        );
        assert_eq!(filter.into_params().len(), 2);
    }

    #[test]
    fn empty_filter_has_no_where() {
        assert_eq!(Filter::all().where_sql(), "");
    }
}
