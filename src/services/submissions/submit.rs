use chrono::{DateTime, Utc};
use tracing::info;

use super::{SubmissionService, compute_lateness};
use crate::errors::{LmsError, Result};
use crate::models::assignments::entities::AssignmentStatus;
use crate::models::submissions::{
    entities::NewSubmission, requests::SubmitAssignmentRequest, responses::SubmitResponse,
};
use crate::models::users::entities::User;
use crate::services::access::ensure_enrolled;
use crate::utils::validate;

fn validate_submit(req: &SubmitAssignmentRequest) -> Result<()> {
    if !req.has_content() && !req.has_file() {
        return Err(LmsError::validation_failed("提交内容和文件不能同时为空"));
    }
    if let Some(content) = &req.content {
        validate::validate_content(content).map_err(LmsError::validation_failed)?;
    }
    Ok(())
}

/// 学生提交作业，生成新版本
///
/// 前置检查依次为：作业存在、作业已发布、学生已选该班级。
pub async fn submit_assignment(
    service: &SubmissionService,
    assignment_id: i64,
    student: &User,
    req: SubmitAssignmentRequest,
    now: DateTime<Utc>,
) -> Result<SubmitResponse> {
    let assignment = service.load_assignment(assignment_id).await?;

    if assignment.status != AssignmentStatus::Published {
        return Err(LmsError::invalid_state("作业未处于可提交状态"));
    }

    let storage = service.get_storage();
    ensure_enrolled(storage, student.id, assignment.class_id).await?;
    validate_submit(&req)?;

    let lateness = compute_lateness(assignment.deadline, now);
    let submission = storage
        .create_submission_version(NewSubmission {
            assignment_id,
            student_id: student.id,
            content: req.content,
            file_url: req.file_url.filter(|u| !u.is_empty()),
            file_name: req.file_name,
            file_size: req.file_size,
            mime_type: req.mime_type,
            lateness,
            submitted_at: now,
        })
        .await?;

    info!(
        "Student {} submitted assignment {} (version {}, late: {})",
        student.id, assignment_id, submission.version, submission.is_late
    );

    let message = match submission.late_by_minutes {
        Some(minutes) if submission.is_late => format!("提交成功，迟交 {minutes} 分钟"),
        _ => "提交成功".to_string(),
    };

    Ok(SubmitResponse {
        submission,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TempDatabase, seed_fixture, seed_fixture_with};
    use chrono::Duration;

    fn text(content: &str) -> SubmitAssignmentRequest {
        SubmitAssignmentRequest {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resubmission_retires_previous_latest() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        let service = f.submission_service();
        let student = &f.students[0];

        let first = service
            .submit(assignment.id, student, text("第一版"))
            .await
            .expect("first");
        let second = service
            .submit(assignment.id, student, text("第二版"))
            .await
            .expect("second");

        assert_eq!(first.submission.version, 1);
        assert_eq!(second.submission.version, 2);
        assert!(second.submission.is_latest);
        assert_eq!(second.message, "提交成功");

        let history = service.history(assignment.id, student.id).await.expect("history");
        let latest: Vec<_> = history.iter().filter(|s| s.is_latest).collect();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, second.submission.id);
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_late_submission_reports_minutes() {
        let f = seed_fixture().await;
        let deadline = Utc::now() - Duration::hours(1);
        let assignment = f.published_assignment(deadline).await;

        let response = submit_assignment(
            &f.submission_service(),
            assignment.id,
            &f.students[0],
            text("迟到的作业"),
            deadline + Duration::minutes(90) + Duration::seconds(20),
        )
        .await
        .expect("submit");

        assert!(response.submission.is_late);
        assert_eq!(response.submission.late_by_minutes, Some(90));
        assert!(response.message.contains("90"));
    }

    #[tokio::test]
    async fn test_replaced_file_is_remembered() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        let service = f.submission_service();
        let student = &f.students[0];

        let with_file = |url: &str| SubmitAssignmentRequest {
            file_url: Some(url.to_string()),
            file_name: Some("report.pdf".into()),
            ..Default::default()
        };

        service
            .submit(assignment.id, student, with_file("/uploads/a.pdf"))
            .await
            .expect("v1");
        let v2 = service
            .submit(assignment.id, student, with_file("/uploads/b.pdf"))
            .await
            .expect("v2");
        assert_eq!(
            v2.submission.previous_file_url.as_deref(),
            Some("/uploads/a.pdf")
        );

        // 纯文本重交同样记录被替换的文件
        let v3 = service
            .submit(assignment.id, student, text("只改文字"))
            .await
            .expect("v3");
        assert_eq!(v3.submission.previous_file_url.as_deref(), Some("/uploads/b.pdf"));

        let v4 = service
            .submit(assignment.id, student, text("再改一次"))
            .await
            .expect("v4");
        assert_eq!(v4.submission.previous_file_url, None);
    }

    #[tokio::test]
    async fn test_precondition_order() {
        let f = seed_fixture().await;
        let service = f.submission_service();
        let deadline = Utc::now() + Duration::days(1);

        let missing = service.submit(9999, &f.students[0], text("内容")).await;
        assert!(matches!(missing, Err(LmsError::NotFound(_))));

        // 草稿作业：即使不是班级成员也先报状态错误
        let draft = f.draft_assignment(deadline).await;
        let not_published = service.submit(draft.id, &f.outsider, text("内容")).await;
        assert!(matches!(not_published, Err(LmsError::InvalidState(_))));

        let published = f.published_assignment(deadline).await;
        let not_enrolled = service.submit(published.id, &f.outsider, text("内容")).await;
        assert!(matches!(not_enrolled, Err(LmsError::AccessDenied(_))));

        let empty = service
            .submit(published.id, &f.students[0], SubmitAssignmentRequest::default())
            .await;
        assert!(matches!(empty, Err(LmsError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_closed_assignment_rejects_submission() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() - Duration::hours(1)).await;
        f.assignment_service()
            .close_expired(Utc::now(), 0)
            .await
            .expect("close");

        let result = f
            .submission_service()
            .submit(assignment.id, &f.students[0], text("太晚了"))
            .await;
        assert!(matches!(result, Err(LmsError::InvalidState(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_keep_single_latest() {
        // 文件库 + 多连接池，写者真正并行
        let db = TempDatabase::new("lms-submit");
        let f = seed_fixture_with(&db.url(), 8).await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        let service = f.submission_service();
        let student = f.students[0].clone();
        let assignment_id = assignment.id;

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            let student = student.clone();
            handles.push(tokio::spawn(async move {
                service
                    .submit(assignment_id, &student, text(&format!("版本 {i}")))
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            // 锁竞争只能表现为 Conflict
            match handle.await.expect("join") {
                Ok(_) => accepted += 1,
                Err(LmsError::Conflict(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(accepted >= 1);

        let history = service.history(assignment.id, student.id).await.expect("history");
        assert_eq!(history.len(), accepted);
        assert_eq!(history.iter().filter(|s| s.is_latest).count(), 1);
        let mut versions: Vec<i32> = history.iter().map(|s| s.version).collect();
        versions.sort();
        let expected: Vec<i32> = (1..=versions.len() as i32).collect();
        assert_eq!(versions, expected);
    }
}
