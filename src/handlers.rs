pub mod alerts;
pub mod dashboard;
pub mod plan;
pub mod processes;
