pub mod plan_repo;
pub use plan_repo::PlanRepository;
pub mod process_repo;
pub use process_repo::ProcessRepository;
