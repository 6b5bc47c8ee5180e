// ============================================================
// TABULAR DOMAIN LAYER
// ============================================================
// Core types for delimited tables: cells, tables, ingest candidates
// No I/O, no async

mod ingest_config;
mod table;
mod value;

pub use ingest_config::{Delimiter, IngestConfig, TextEncoding};
pub use table::Table;
pub use value::{infer_column, ColumnType, Value};
