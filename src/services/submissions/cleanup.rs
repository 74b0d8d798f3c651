use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::SubmissionService;
use crate::errors::Result;

/// 一次旧文件清理的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplacedFileCleanup {
    pub checked: u64,
    pub deleted: u64,
    pub failed: u64,
}

/// 删除被新版本替换掉的提交文件
///
/// 只处理早于宽限期的提交。仍被新版本使用的对象不删除；删除失败只记日志，
/// 引用无论成败都会清除。
pub async fn cleanup_replaced_files(
    service: &SubmissionService,
    now: DateTime<Utc>,
    grace_hours: i64,
) -> Result<ReplacedFileCleanup> {
    let cutoff = now - Duration::hours(grace_hours.max(0));
    let storage = service.get_storage();
    let pending = storage.list_submissions_with_replaced_file(cutoff).await?;

    let mut result = ReplacedFileCleanup::default();
    for submission in pending {
        let Some(url) = submission.previous_file_url.as_deref() else {
            continue;
        };
        result.checked += 1;

        // 同一对象被重新提交时仍在使用，只清除引用
        if submission.file_url.as_deref() == Some(url) {
            storage.clear_previous_file_url(submission.id).await?;
            continue;
        }

        match service.files.delete(url).await {
            Ok(()) => result.deleted += 1,
            Err(e) => {
                result.failed += 1;
                warn!(
                    "Failed to delete replaced file {} of submission {}: {}",
                    url, submission.id, e
                );
            }
        }

        storage.clear_previous_file_url(submission.id).await?;
    }

    if result.checked > 0 {
        info!(
            "Replaced file cleanup: {} checked, {} deleted, {} failed",
            result.checked, result.deleted, result.failed
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LmsError;
    use crate::models::submissions::requests::SubmitAssignmentRequest;
    use crate::services::files::FileStorage;
    use crate::test_utils::seed_fixture;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingFiles {
        deleted: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl FileStorage for RecordingFiles {
        async fn delete(&self, url: &str) -> Result<()> {
            if self.fail_on.as_deref() == Some(url) {
                return Err(LmsError::file_operation("磁盘不可用"));
            }
            self.deleted.lock().expect("lock").push(url.to_string());
            Ok(())
        }
    }

    fn with_file(url: &str) -> SubmitAssignmentRequest {
        SubmitAssignmentRequest {
            file_url: Some(url.to_string()),
            file_name: Some("work.zip".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cleanup_respects_grace_and_clears_reference() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        let files = Arc::new(RecordingFiles {
            fail_on: Some("/uploads/broken.zip".into()),
            ..Default::default()
        });
        let service = SubmissionService::new(f.storage.clone(), files.clone());

        let alice = &f.students[0];
        let bob = &f.students[1];
        service.submit(assignment.id, alice, with_file("/uploads/a1.zip")).await.expect("a1");
        let a2 = service
            .submit(assignment.id, alice, with_file("/uploads/a2.zip"))
            .await
            .expect("a2");
        service.submit(assignment.id, bob, with_file("/uploads/broken.zip")).await.expect("b1");
        service.submit(assignment.id, bob, with_file("/uploads/b2.zip")).await.expect("b2");

        // 宽限期内不处理
        let early = service
            .cleanup_replaced_files(Utc::now(), 24)
            .await
            .expect("cleanup");
        assert_eq!(early, ReplacedFileCleanup::default());

        let later = service
            .cleanup_replaced_files(Utc::now() + Duration::hours(25), 24)
            .await
            .expect("cleanup");
        assert_eq!(later.checked, 2);
        assert_eq!(later.deleted, 1);
        assert_eq!(later.failed, 1);
        assert_eq!(
            files.deleted.lock().expect("lock").as_slice(),
            ["/uploads/a1.zip".to_string()]
        );

        let refreshed = f
            .storage
            .get_submission_by_id(a2.submission.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(refreshed.previous_file_url, None);

        let again = service
            .cleanup_replaced_files(Utc::now() + Duration::hours(25), 24)
            .await
            .expect("cleanup");
        assert_eq!(again.checked, 0);
    }

    #[tokio::test]
    async fn test_resubmitted_object_is_not_deleted() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        let files = Arc::new(RecordingFiles::default());
        let service = SubmissionService::new(f.storage.clone(), files.clone());
        let student = &f.students[0];

        service.submit(assignment.id, student, with_file("/uploads/same.zip")).await.expect("v1");
        let v2 = service
            .submit(assignment.id, student, with_file("/uploads/same.zip"))
            .await
            .expect("v2");
        assert_eq!(v2.submission.previous_file_url.as_deref(), Some("/uploads/same.zip"));

        let result = service
            .cleanup_replaced_files(Utc::now() + Duration::hours(25), 24)
            .await
            .expect("cleanup");
        assert_eq!(result.checked, 1);
        assert_eq!(result.deleted, 0);
        assert!(files.deleted.lock().expect("lock").is_empty());

        let refreshed = f
            .storage
            .get_submission_by_id(v2.submission.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(refreshed.previous_file_url, None);
    }
}
