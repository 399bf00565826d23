pub mod dashboard;
pub mod filters;
pub mod plan;
pub mod process;
