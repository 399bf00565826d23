pub mod error;
pub mod forms;
