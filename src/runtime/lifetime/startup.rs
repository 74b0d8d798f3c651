use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::users::entities::{NewUser, UserRole};
use crate::runtime::scheduler::MaintenanceScheduler;
use crate::services::{
    AssignmentService, ClassService, FileStorage, LocalFileStorage, NotificationService,
    ReportService, SubmissionService,
};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub assignments: AssignmentService,
    pub submissions: SubmissionService,
    pub notifications: NotificationService,
    pub reports: ReportService,
    pub classes: ClassService,
    pub scheduler: Option<MaintenanceScheduler>,
}

/// 初始化默认管理员账号
/// 数据库中没有任何用户时创建一个 admin，并打印一次性访问令牌
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
    let admin = match storage
        .create_user(NewUser {
            name: "Administrator".to_string(),
            email,
            role: UserRole::Admin,
        })
        .await
    {
        Ok(user) => user,
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
            return;
        }
    };

    info!("Default admin account created (ID: {})", admin.id);
    match JwtUtils::generate_access_token(admin.id, UserRole::ADMIN) {
        Ok(token) => {
            warn!("==========================================================");
            warn!("  Bootstrap admin access token (expires with jwt settings):");
            warn!("  {}", token);
            warn!("==========================================================");
        }
        Err(e) => warn!("Failed to issue bootstrap admin token: {}", e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、业务服务和后台维护任务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    let files: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::from_config());
    let notifications =
        NotificationService::new(storage.clone(), config.scheduler.utc_offset_hours);
    let assignments = AssignmentService::new(storage.clone(), notifications.clone());
    let submissions = SubmissionService::new(storage.clone(), files);
    let reports = ReportService::new(storage.clone());
    let classes = ClassService::new(storage.clone());

    let scheduler = if config.scheduler.enabled {
        Some(MaintenanceScheduler::new(
            assignments.clone(),
            submissions.clone(),
            notifications.clone(),
            config.scheduler.clone(),
        ))
    } else {
        warn!("Maintenance scheduler disabled by configuration");
        None
    };

    Ok(StartupContext {
        storage,
        assignments,
        submissions,
        notifications,
        reports,
        classes,
        scheduler,
    })
}
