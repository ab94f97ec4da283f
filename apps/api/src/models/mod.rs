// Reference records read from the DTP workbook. All read-only.

pub mod job;
pub mod occupation;
pub mod talent;

pub use job::JobPosting;
pub use occupation::Occupation;
pub use talent::{AssessmentRecord, TalentRecord};
