use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::use_cases::data_check::DataCheck;
use crate::application::use_cases::database_setup::DatabaseSetup;
use crate::application::use_cases::enrollment_pipeline::EnrollmentPipeline;
use crate::domain::error::{AppError, Result};
use crate::domain::tabular::Table;
use crate::infrastructure::config::{AppConfig, ConfigService};
use crate::infrastructure::csv::{write_table_to, TableLoader};
use crate::infrastructure::db::{SqliteTableStore, TableStore};
use crate::interfaces::cli::{Cli, Commands};
use crate::interfaces::http::{start_server, DashboardState};
use crate::interfaces::report::{generate_report, render_summary};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = ConfigService::load(Some(&cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn print_table(table: &Table) -> Result<()> {
    let stdout = std::io::stdout();
    write_table_to(stdout.lock(), table)
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;
    init_tracing(&config.log_level);
    info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    match cli.command {
        Commands::Check => {
            let checker = DataCheck::new(TableLoader::new(config.ingest.clone()));
            let mut stdout = std::io::stdout().lock();
            for check in checker.check_dir(&config.data_dir)? {
                writeln!(stdout, "{}", check.render())?;
            }
        }
        Commands::Process => {
            let processed = EnrollmentPipeline::new(&config).run()?;
            processed.write_processed(&config.processed_dir)?;
            print!("{}", render_summary(&processed.summary));
        }
        Commands::Report => {
            let processed = EnrollmentPipeline::new(&config).run()?;
            processed.write_processed(&config.processed_dir)?;
            generate_report(&processed, &config.output_dir)?;
            print!("{}", render_summary(&processed.summary));
        }
        Commands::DbLoad => {
            let store = SqliteTableStore::init(&config.database_url).await?;
            let setup = DatabaseSetup::new(
                &store,
                TableLoader::new(config.ingest.clone()),
                config.data_dir.clone(),
            );
            let loaded = setup.load_all().await;
            store.close().await;
            let loaded = loaded?;
            println!("Loaded {} table(s) into {}", loaded.len(), config.database_url);
        }
        Commands::Query { sql } => {
            let store = SqliteTableStore::init(&config.database_url).await?;
            let result = store.query(&sql).await;
            store.close().await;
            print_table(&result?)?;
        }
        Commands::DbEnrollment => {
            let store = SqliteTableStore::init(&config.database_url).await?;
            let result = DatabaseSetup::new(
                &store,
                TableLoader::new(config.ingest.clone()),
                config.data_dir.clone(),
            )
            .enrollment()
            .await;
            store.close().await;
            print_table(result?.table())?;
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let server = start_server(DashboardState::new(config))
                .map_err(|e| AppError::IoError(format!("Failed to start dashboard: {}", e)))?;
            server
                .await
                .map_err(|e| AppError::IoError(format!("Dashboard stopped: {}", e)))?;
        }
    }

    Ok(())
}
