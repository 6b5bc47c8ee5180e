// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Encoding probing, format-tolerant parsing, and CSV export

mod csv_parser;
mod csv_writer;
mod encoding_prober;
mod table_loader;

pub use csv_parser::{CsvParser, DelimitedParser, ParseAttemptError};
pub use csv_writer::{write_table, write_table_to};
pub use encoding_prober::{EncodingGuess, EncodingProber};
pub use table_loader::{LoadAttempt, LoadedTable, TableLoader};
pub(crate) use table_loader::read_file;
