pub mod alert_service;
pub mod attachment_service;
pub mod dashboard_service;
pub mod history;
pub mod process_service;
