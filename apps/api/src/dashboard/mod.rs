// National talent dashboard: aggregates over workbook records and the
// assessments completed in live sessions.

pub mod aggregate;
pub mod handlers;
