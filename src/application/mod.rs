pub mod use_cases;

pub use use_cases::data_check::DataCheck;
pub use use_cases::database_setup::DatabaseSetup;
pub use use_cases::enrollment_pipeline::{EnrollmentPipeline, ProcessedEnrollment};
