pub mod access;
pub mod assignments;
pub mod classes;
pub mod files;
pub mod notifications;
pub mod reports;
pub mod submissions;

pub use assignments::AssignmentService;
pub use classes::ClassService;
pub use files::{FileStorage, LocalFileStorage};
pub use notifications::NotificationService;
pub use reports::ReportService;
pub use submissions::SubmissionService;
