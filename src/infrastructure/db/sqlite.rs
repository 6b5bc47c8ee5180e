use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{Table, Value};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Column, Executor, Pool, Row, Sqlite, Statement,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::TableStore;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

static WRITE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(INSERT|UPDATE|DELETE|DROP|ALTER|CREATE|ATTACH|DETACH|PRAGMA|VACUUM|REINDEX)\b")
        .expect("write keyword pattern")
});

/// String literals and quoted identifiers, which may contain any keyword
static QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|`[^`]*`|\[[^\]]*\]"#).expect("quoted text pattern")
});

/// Embedded SQLite store behind a single connection
pub struct SqliteTableStore {
    pool: Pool<Sqlite>,
}

impl SqliteTableStore {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
            })?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        if let Some(parent) = options
            .get_filename()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::IoError(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        // One connection: in-memory databases are per connection, and the
        // pipeline is single-threaded anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;

        info!(database_url, "Connected to table store");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Extract a column value from a row as a table cell
    fn extract_column_value(row: &SqliteRow, index: usize) -> Value {
        // NULL decodes as None for any of these, so it is caught by the first
        if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            return v.map(Value::Int).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            return v.map(Value::Float).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            return v.map(Value::Text).unwrap_or(Value::Null);
        }

        // Default to null for unsupported types (blobs)
        Value::Null
    }
}

#[async_trait]
impl TableStore for SqliteTableStore {
    async fn load_table(&self, table: &Table, name: &str) -> Result<()> {
        validate_identifier(name)?;

        let column_defs: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                format!("{} {}", quote_identifier(column), table.column_type(idx).sql_type())
            })
            .collect();
        let placeholders = vec!["?"; table.columns().len()].join(", ");

        let drop_sql = format!("DROP TABLE IF EXISTS {}", quote_identifier(name));
        let create_sql = format!(
            "CREATE TABLE {} ({})",
            quote_identifier(name),
            column_defs.join(", ")
        );
        let insert_sql = format!(
            "INSERT INTO {} VALUES ({})",
            quote_identifier(name),
            placeholders
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(&drop_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to drop {}: {}", name, e)))?;
        sqlx::query(&create_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create {}: {}", name, e)))?;

        for row in table.rows() {
            let mut query = sqlx::query(&insert_sql);
            for cell in row {
                query = match cell {
                    Value::Null => query.bind(Option::<String>::None),
                    Value::Int(n) => query.bind(*n),
                    Value::Float(f) => query.bind(*f),
                    Value::Text(s) => query.bind(s.as_str()),
                };
            }
            query.execute(&mut *tx).await.map_err(|e| {
                AppError::DatabaseError(format!("Failed to insert into {}: {}", name, e))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit {}: {}", name, e)))?;

        info!(table = name, rows = table.len(), "Table loaded into store");
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Table> {
        ensure_read_only(sql)?;
        debug!(sql, "Running query");

        let statement = (&self.pool)
            .prepare(sql)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to prepare query: {}", e)))?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Query execution failed: {}", e)))?;

        let mut table = Table::new(columns);
        for row in &rows {
            let cells = (0..row.columns().len())
                .map(|i| Self::extract_column_value(row, i))
                .collect();
            table.push_row(cells);
        }
        Ok(table)
    }
}

pub fn validate_identifier(name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid table name '{}'",
            name
        )))
    }
}

/// Only SELECT / WITH statements without write keywords are accepted.
/// Keywords inside string literals or quoted identifiers are ignored.
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let head = sql.trim_start().to_uppercase();
    if !(head.starts_with("SELECT") || head.starts_with("WITH")) {
        return Err(AppError::ValidationError(
            "Only SELECT queries are allowed".to_string(),
        ));
    }
    let unquoted = QUOTED.replace_all(sql, "''");
    if let Some(found) = WRITE_KEYWORD.find(&unquoted) {
        return Err(AppError::ValidationError(format!(
            "Query contains forbidden keyword: {}",
            found.as_str().to_uppercase()
        )));
    }
    Ok(())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteTableStore {
        SqliteTableStore::init("sqlite::memory:").await.unwrap()
    }

    fn department_table() -> Table {
        Table::from_columns(
            vec!["department_id".into(), "department_name".into()],
            vec![
                vec![Value::Int(10), Value::Int(20)],
                vec![Value::Text("CS".into()), Value::Null],
            ],
        )
    }

    #[tokio::test]
    async fn test_load_and_query_roundtrip() {
        let store = memory_store().await;
        store.load_table(&department_table(), "department").await.unwrap();

        let result = store
            .query("SELECT department_id, department_name FROM department ORDER BY department_id")
            .await
            .unwrap();

        assert_eq!(result, department_table());
    }

    #[tokio::test]
    async fn test_load_replaces_existing_table() {
        let store = memory_store().await;
        store.load_table(&department_table(), "department").await.unwrap();

        let smaller = department_table().head(1);
        store.load_table(&smaller, "department").await.unwrap();

        let result = store.query("SELECT COUNT(*) AS n FROM department").await.unwrap();
        assert_eq!(result.get(0, "n"), Some(&Value::Int(1)));
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let store = memory_store().await;
        store.load_table(&department_table(), "department").await.unwrap();

        let result = store
            .query("SELECT department_name FROM department WHERE department_id = 99")
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), &["department_name"]);
    }

    #[tokio::test]
    async fn test_float_columns_roundtrip() {
        let store = memory_store().await;
        let table = Table::from_columns(
            vec!["rate".into()],
            vec![vec![Value::Float(0.6), Value::Null]],
        );
        store.load_table(&table, "rates").await.unwrap();

        let result = store.query("SELECT rate FROM rates").await.unwrap();
        assert_eq!(result.get(0, "rate"), Some(&Value::Float(0.6)));
        assert_eq!(result.get(1, "rate"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_rejects_bad_table_name() {
        let store = memory_store().await;
        let err = store
            .load_table(&department_table(), "department; DROP TABLE x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_read_only_guard() {
        assert!(ensure_read_only("SELECT * FROM course").is_ok());
        assert!(ensure_read_only("  with t AS (SELECT 1) SELECT * FROM t").is_ok());
        assert!(ensure_read_only("SELECT created_at FROM course").is_ok());
        assert!(ensure_read_only("DELETE FROM course").is_err());
        assert!(ensure_read_only("SELECT 1; DROP TABLE course").is_err());
    }

    #[test]
    fn test_read_only_guard_ignores_quoted_text() {
        assert!(
            ensure_read_only("SELECT * FROM course WHERE course_name = 'Create Lab'").is_ok()
        );
        assert!(ensure_read_only("SELECT \"delete\" FROM course").is_ok());
        assert!(ensure_read_only("SELECT 'it''s' AS s; DELETE FROM course").is_err());
    }

    #[tokio::test]
    async fn test_query_accepts_keyword_in_literal() {
        let store = memory_store().await;
        store.load_table(&department_table(), "department").await.unwrap();

        let result = store
            .query("SELECT department_name FROM department WHERE department_name <> 'Drop Box'")
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
    }
}
