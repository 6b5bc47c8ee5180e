pub mod enrollment;
pub mod error;
pub mod tabular;
