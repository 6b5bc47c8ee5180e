pub mod data_check;
pub mod database_setup;
pub mod enrollment_join;
pub mod enrollment_pipeline;
pub mod enrollment_summary;
