// ============================================================
// ENROLLMENT DOMAIN LAYER
// ============================================================
// Source entities, the joined enrollment table and its summaries

mod entity;
mod filter;
mod record;
mod summary;

pub use entity::{columns, Entity};
pub use filter::{EnrollmentFilter, DEPARTMENTS_PARAM, TERMS_PARAM};
pub use record::{EnrollmentRecord, EnrollmentTable};
pub use summary::{group_sum, top_n, Summary};
