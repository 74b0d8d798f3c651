pub mod lifetime;
pub mod scheduler;

pub use scheduler::{MaintenanceReport, MaintenanceScheduler};
