//! Database layer - connection provider, query executor and repositories
//!
//! # Design Principles
//!
//! - One pooled connection per call, returned on every exit path
//! - SQL uses `@name` placeholders, compiled to positional `?` per round trip
//! - Repositories propagate every failure as `DataAccessError`; a missing row
//!   is `None`/`false`, never an error
//! - Multi-table writes go through a `UnitOfWork` transaction

pub mod dialect;
pub mod error;
pub mod executor;
pub mod migrations;
pub mod provider;
pub mod query;
pub mod record;
pub mod repos;
pub mod table;

pub use dialect::Dialect;
pub use error::{DataAccessError, StoreCause};
pub use executor::{QueryExecutor, Session, UnitOfWork};
pub use provider::ConnectionProvider;
pub use query::{BoundQuery, QueryKind, QueryOutput, SqlValue};
pub use record::{Filter, Keyed, Record};
pub use repos::*;
pub use table::Table;
