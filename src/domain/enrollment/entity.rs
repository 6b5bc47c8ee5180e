use std::fmt;

/// Column names shared by the source files and the joined table
pub mod columns {
    pub const COURSE_ID: &str = "course_id";
    pub const COURSE_NAME: &str = "course_name";
    pub const DEPARTMENT_ID: &str = "department_id";
    pub const DEPARTMENT_NAME: &str = "department_name";
    pub const INSTRUCTOR_ID: &str = "instructor_id";
    pub const INSTRUCTOR_NAME: &str = "instructor_name";
    pub const ENROLLED: &str = "enrolled";
    pub const CAPACITY: &str = "capacity";
    pub const TERM: &str = "term";
    pub const ENROLLMENT_RATE: &str = "enrollment_rate";
}

/// One of the four source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Course,
    Section,
    Instructor,
    Department,
}

impl Entity {
    /// Load order used by the pipeline
    pub const ALL: [Entity; 4] = [
        Entity::Course,
        Entity::Section,
        Entity::Instructor,
        Entity::Department,
    ];

    /// Base file name under the data directory, also the store table name
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Course => "course",
            Entity::Section => "section",
            Entity::Instructor => "instructor",
            Entity::Department => "department",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
