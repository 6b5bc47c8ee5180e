//! Command line definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "enrollment-dashboard")]
#[command(about = "University enrollment ingestion, reporting and dashboard")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = crate::infrastructure::config::CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding the entity files (overrides the configuration)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `enrollment_dashboard=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how every file in the data directory would be read
    Check,

    /// Join the entity files and export the processed table
    Process,

    /// Process, then write the charts and the summary report
    Report,

    /// Load the entity files into the database
    DbLoad,

    /// Run a read-only SQL statement against the database, print CSV
    Query {
        /// SELECT or WITH statement
        sql: String,
    },

    /// Compute the enrollment join inside the database, print CSV
    DbEnrollment,

    /// Start the interactive dashboard
    Serve {
        /// Bind address (overrides the configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides the configuration)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_with_overrides() {
        let cli = Cli::try_parse_from([
            "enrollment-dashboard",
            "--data-dir",
            "fixtures",
            "query",
            "SELECT * FROM course",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("fixtures")));
        assert!(matches!(cli.command, Commands::Query { sql } if sql == "SELECT * FROM course"));
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["enrollment-dashboard", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), host: None }));
    }
}
