//! 后台维护任务
//!
//! 按固定间隔依次执行截止提醒、关闭过期作业、清理旧通知和清理被替换的提交文件。
//! 单个任务失败只记录日志，不影响其他任务和下一轮执行。

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::models::notifications::responses::ReminderRunSummary;
use crate::services::submissions::ReplacedFileCleanup;
use crate::services::{AssignmentService, NotificationService, SubmissionService};

/// 一轮维护的结果，失败的任务为 None
#[derive(Debug, Default)]
pub struct MaintenanceReport {
    pub reminders: Option<ReminderRunSummary>,
    pub closed_assignments: Option<u64>,
    pub deleted_notifications: Option<u64>,
    pub replaced_files: Option<ReplacedFileCleanup>,
}

#[derive(Clone)]
pub struct MaintenanceScheduler {
    assignments: AssignmentService,
    submissions: SubmissionService,
    notifications: NotificationService,
    config: SchedulerConfig,
}

impl MaintenanceScheduler {
    pub fn new(
        assignments: AssignmentService,
        submissions: SubmissionService,
        notifications: NotificationService,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            assignments,
            submissions,
            notifications,
            config,
        }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match self
            .notifications
            .deadline_reminders(now, self.config.reminder_window_hours)
            .await
        {
            Ok(summary) => report.reminders = Some(summary),
            Err(e) => error!("Deadline reminder job failed: {}", e),
        }

        match self
            .assignments
            .close_expired(now, self.config.close_grace_hours)
            .await
        {
            Ok(closed) => report.closed_assignments = Some(closed),
            Err(e) => error!("Closing expired assignments failed: {}", e),
        }

        match self
            .notifications
            .cleanup_old_notifications(self.config.notification_retention_days, now)
            .await
        {
            Ok(cleanup) => report.deleted_notifications = Some(cleanup.deleted),
            Err(e) => error!("Notification cleanup failed: {}", e),
        }

        match self
            .submissions
            .cleanup_replaced_files(now, self.config.replaced_file_grace_hours)
            .await
        {
            Ok(cleanup) => report.replaced_files = Some(cleanup),
            Err(e) => error!("Replaced file cleanup failed: {}", e),
        }

        debug!("Maintenance run finished: {:?}", report);
        report
    }

    /// 持续运行，直到所在任务被取消
    pub async fn run(self) {
        let period = Duration::from_secs(self.config.tick_interval_secs.max(1));
        info!(
            "Maintenance scheduler started, interval {}s",
            period.as_secs()
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_once(Utc::now()).await;
        }
    }
}
