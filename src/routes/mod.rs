pub mod assignments;

pub mod classes;

pub mod notifications;

pub mod students;

pub mod submissions;

pub mod teachers;

pub use assignments::configure_assignment_routes;
pub use classes::configure_class_routes;
pub use notifications::configure_notification_routes;
pub use students::configure_student_routes;
pub use submissions::configure_submission_routes;
pub use teachers::configure_teacher_routes;

use actix_web::web;

/// 注册全部 `/api/v1` 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_assignment_routes)
        .configure(configure_submission_routes)
        .configure(configure_class_routes)
        .configure(configure_student_routes)
        .configure(configure_teacher_routes)
        .configure(configure_notification_routes);
}
