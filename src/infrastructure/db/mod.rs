pub mod enrollment_query;
pub mod sqlite;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::tabular::Table;

pub use enrollment_query::enrollment_query;
pub use sqlite::SqliteTableStore;

/// Relational store the entity tables are mirrored into
#[async_trait]
pub trait TableStore {
    /// Create or wholesale replace table `name` with the contents of `table`
    async fn load_table(&self, table: &Table, name: &str) -> Result<()>;

    /// Run a read-only statement and return its result set
    async fn query(&self, sql: &str) -> Result<Table>;
}
