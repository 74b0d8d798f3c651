use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::ReportService;
use super::statistics::{compute_grade_statistics, round2};
use crate::errors::Result;
use crate::models::common::pagination::{MAX_PAGE, PaginationInfo};
use crate::models::assignments::entities::{Assignment, AssignmentStatus};
use crate::models::classes::entities::ClassBrief;
use crate::models::reports::{
    AssignmentSortBy, GradedScore, SortOrder, StudentAssignmentFilter, StudentAssignmentRow,
    StudentAssignmentsQuery, StudentAssignmentsResponse, StudentAssignmentsSummary,
    StudentGradeItem, StudentGradesResponse, SubmissionBucket,
};
use crate::models::submissions::entities::Submission;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// 作业在某学生视角下的归类
pub fn bucket_for(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> SubmissionBucket {
    match submission {
        Some(_) => SubmissionBucket::Submitted,
        None if assignment.is_past_deadline(now) => SubmissionBucket::Overdue,
        None => SubmissionBucket::Pending,
    }
}

fn matches_filter(filter: StudentAssignmentFilter, bucket: SubmissionBucket) -> bool {
    match filter {
        StudentAssignmentFilter::All => true,
        StudentAssignmentFilter::Submitted => bucket == SubmissionBucket::Submitted,
        StudentAssignmentFilter::Pending => bucket == SubmissionBucket::Pending,
        StudentAssignmentFilter::Overdue => bucket == SubmissionBucket::Overdue,
    }
}

fn compare_rows(sort_by: AssignmentSortBy, a: &StudentAssignmentRow, b: &StudentAssignmentRow) -> Ordering {
    let primary = match sort_by {
        AssignmentSortBy::Deadline => a.assignment.deadline.cmp(&b.assignment.deadline),
        AssignmentSortBy::Created => a.assignment.created_at.cmp(&b.assignment.created_at),
        AssignmentSortBy::Class => a
            .class
            .name
            .cmp(&b.class.name)
            .then(a.assignment.deadline.cmp(&b.assignment.deadline)),
        // 未评分视为最低
        AssignmentSortBy::Grade => {
            let score = |row: &StudentAssignmentRow| row.submission.as_ref().and_then(|s| s.score);
            score(a).cmp(&score(b))
        }
    };
    primary.then(a.assignment.id.cmp(&b.assignment.id))
}

/// 对学生的作业行做归类、筛选、排序与分页
///
/// 汇总计数基于筛选前的全部作业。
pub fn aggregate_for_student(
    rows: Vec<(Assignment, ClassBrief, Option<Submission>)>,
    query: &StudentAssignmentsQuery,
    now: DateTime<Utc>,
) -> StudentAssignmentsResponse {
    let mut summary = StudentAssignmentsSummary::default();
    let mut items: Vec<StudentAssignmentRow> = rows
        .into_iter()
        .map(|(assignment, class, submission)| {
            let bucket = bucket_for(&assignment, submission.as_ref(), now);
            summary.total += 1;
            match bucket {
                SubmissionBucket::Submitted => summary.submitted += 1,
                SubmissionBucket::Pending => summary.pending += 1,
                SubmissionBucket::Overdue => summary.overdue += 1,
            }
            StudentAssignmentRow {
                assignment,
                class,
                bucket,
                submission,
            }
        })
        .filter(|row| matches_filter(query.status, row.bucket))
        .collect();

    items.sort_by(|a, b| {
        let ord = compare_rows(query.sort_by, a, b);
        match query.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let page = query.page.unwrap_or(1).clamp(1, MAX_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let total = items.len() as i64;
    let start = ((page - 1) * limit).min(total) as usize;

    let items: Vec<StudentAssignmentRow> = items.into_iter().skip(start).take(limit as usize).collect();

    StudentAssignmentsResponse {
        items,
        pagination: PaginationInfo::new(page, limit, total),
        summary,
    }
}

/// 收集学生所选班级中可见作业及其最新提交
async fn load_student_rows(
    service: &ReportService,
    student_id: i64,
) -> Result<Vec<(Assignment, ClassBrief, Option<Submission>)>> {
    let storage = service.get_storage();
    let class_ids = storage.list_student_class_ids(student_id).await?;
    if class_ids.is_empty() {
        return Ok(Vec::new());
    }

    let classes: HashMap<i64, ClassBrief> = storage
        .list_classes_by_ids(&class_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.brief()))
        .collect();

    let assignments = storage
        .list_assignments_for_classes(&class_ids, AssignmentStatus::student_visible())
        .await?;
    let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();

    let mut latest: HashMap<i64, Submission> = storage
        .list_student_latest_submissions(student_id, &assignment_ids)
        .await?
        .into_iter()
        .map(|s| (s.assignment_id, s))
        .collect();

    Ok(assignments
        .into_iter()
        .filter_map(|assignment| {
            let class = classes.get(&assignment.class_id)?.clone();
            let submission = latest.remove(&assignment.id);
            Some((assignment, class, submission))
        })
        .collect())
}

pub async fn student_assignments(
    service: &ReportService,
    student_id: i64,
    query: StudentAssignmentsQuery,
    now: DateTime<Utc>,
) -> Result<StudentAssignmentsResponse> {
    let rows = load_student_rows(service, student_id).await?;
    Ok(aggregate_for_student(rows, &query, now))
}

/// 学生已批改的最新提交，最近批改的在前
pub async fn student_grades(service: &ReportService, student_id: i64) -> Result<StudentGradesResponse> {
    let rows = load_student_rows(service, student_id).await?;

    let mut grades: Vec<StudentGradeItem> = rows
        .into_iter()
        .filter_map(|(assignment, class, submission)| {
            let submission = submission?;
            let score = submission.score?;
            let percentage = if assignment.max_score > 0 {
                round2(f64::from(score) / f64::from(assignment.max_score) * 100.0)
            } else {
                0.0
            };
            Some(StudentGradeItem {
                assignment_id: assignment.id,
                assignment_title: assignment.title,
                class,
                score,
                max_score: assignment.max_score,
                percentage,
                feedback: submission.feedback,
                graded_at: submission.graded_at,
            })
        })
        .collect();
    grades.sort_by(|a, b| b.graded_at.cmp(&a.graded_at));

    let scores: Vec<GradedScore> = grades
        .iter()
        .map(|g| GradedScore {
            score: g.score,
            max_score: g.max_score,
        })
        .collect();

    Ok(StudentGradesResponse {
        statistics: compute_grade_statistics(&scores),
        grades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0)
            .single()
            .expect("valid date")
    }

    fn assignment(id: i64, deadline: DateTime<Utc>) -> Assignment {
        Assignment {
            id,
            class_id: 1,
            teacher_id: 1,
            title: format!("作业 {id}"),
            description: "描述内容足够长的作业".into(),
            instruction: None,
            deadline,
            max_score: 100,
            status: AssignmentStatus::Published,
            file_url: None,
            file_name: None,
            created_at: now() - Duration::days(10) + Duration::hours(id),
            updated_at: now(),
        }
    }

    fn submission(assignment_id: i64, score: Option<i32>) -> Submission {
        Submission {
            id: assignment_id * 10,
            assignment_id,
            student_id: 7,
            version: 1,
            content: Some("答案".into()),
            file_url: None,
            file_name: None,
            file_size: None,
            mime_type: None,
            is_latest: true,
            is_late: false,
            late_by_minutes: None,
            status: if score.is_some() {
                SubmissionStatus::Graded
            } else {
                SubmissionStatus::Submitted
            },
            score,
            feedback: None,
            graded_at: None,
            previous_file_url: None,
            submitted_at: now() - Duration::days(1),
        }
    }

    fn class(name: &str) -> ClassBrief {
        ClassBrief {
            id: 1,
            name: name.into(),
            subject: None,
        }
    }

    fn rows() -> Vec<(Assignment, ClassBrief, Option<Submission>)> {
        vec![
            // 已提交且已评分
            (assignment(1, now() - Duration::days(2)), class("B 班"), Some(submission(1, Some(88)))),
            // 已截止未提交
            (assignment(2, now() - Duration::days(1)), class("A 班"), None),
            // 未截止未提交
            (assignment(3, now() + Duration::days(1)), class("C 班"), None),
            // 已提交未评分
            (assignment(4, now() + Duration::days(3)), class("A 班"), Some(submission(4, None))),
        ]
    }

    fn ids(response: &StudentAssignmentsResponse) -> Vec<i64> {
        response.items.iter().map(|r| r.assignment.id).collect()
    }

    #[test]
    fn test_buckets_and_summary() {
        let response = aggregate_for_student(rows(), &StudentAssignmentsQuery::default(), now());
        assert_eq!(
            response.summary,
            StudentAssignmentsSummary {
                total: 4,
                submitted: 2,
                pending: 1,
                overdue: 1,
            }
        );
        assert_eq!(ids(&response), vec![1, 2, 3, 4]);
        assert_eq!(response.items[1].bucket, SubmissionBucket::Overdue);
        assert_eq!(response.items[2].bucket, SubmissionBucket::Pending);
    }

    #[test]
    fn test_filter_keeps_summary_of_all() {
        let query = StudentAssignmentsQuery {
            status: StudentAssignmentFilter::Submitted,
            ..Default::default()
        };
        let response = aggregate_for_student(rows(), &query, now());
        assert_eq!(ids(&response), vec![1, 4]);
        assert_eq!(response.summary.total, 4);
        assert_eq!(response.pagination.total, 2);
    }

    #[test]
    fn test_sorting() {
        let by_class = StudentAssignmentsQuery {
            sort_by: AssignmentSortBy::Class,
            ..Default::default()
        };
        assert_eq!(ids(&aggregate_for_student(rows(), &by_class, now())), vec![2, 4, 1, 3]);

        let by_grade_desc = StudentAssignmentsQuery {
            sort_by: AssignmentSortBy::Grade,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let response = aggregate_for_student(rows(), &by_grade_desc, now());
        assert_eq!(response.items[0].assignment.id, 1);

        let by_created_desc = StudentAssignmentsQuery {
            sort_by: AssignmentSortBy::Created,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(
            ids(&aggregate_for_student(rows(), &by_created_desc, now())),
            vec![4, 3, 2, 1]
        );
    }

    #[test]
    fn test_pagination_is_clamped() {
        let query = StudentAssignmentsQuery {
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        };
        let response = aggregate_for_student(rows(), &query, now());
        assert_eq!(ids(&response), vec![4]);
        assert_eq!(response.pagination.total_pages, 2);

        let beyond = StudentAssignmentsQuery {
            page: Some(9),
            limit: Some(0),
            ..Default::default()
        };
        let response = aggregate_for_student(rows(), &beyond, now());
        assert!(response.items.is_empty());
        assert_eq!(response.pagination.page_size, 1);
    }

    #[test]
    fn test_huge_page_is_past_the_end() {
        let query = StudentAssignmentsQuery {
            page: Some(i64::MAX),
            limit: Some(50),
            ..Default::default()
        };
        let response = aggregate_for_student(rows(), &query, now());
        assert!(response.items.is_empty());
        assert_eq!(response.pagination.page, MAX_PAGE);
        assert_eq!(response.pagination.total, rows().len() as i64);
        assert_eq!(response.summary.total, rows().len() as i64);
    }

    #[tokio::test]
    async fn test_student_grades_from_storage() {
        use crate::models::submissions::requests::GradeSubmissionRequest;
        use crate::test_utils::seed_fixture;

        let f = seed_fixture().await;
        let a1 = f.published_assignment(Utc::now() + Duration::days(1)).await;
        let a2 = f.published_assignment(Utc::now() + Duration::days(2)).await;
        let student = &f.students[0];
        let s1 = f.submit_as(student, a1.id).await;
        let s2 = f.submit_as(student, a2.id).await;
        f.submit_as(&f.students[1], a1.id).await;

        let submissions = f.submission_service();
        for (id, score) in [(s1.id, 90), (s2.id, 70)] {
            submissions
                .grade(
                    id,
                    f.teacher.id,
                    GradeSubmissionRequest {
                        score,
                        feedback: None,
                    },
                )
                .await
                .expect("grade");
        }

        let grades = f.report_service().student_grades(student.id).await.expect("grades");
        assert_eq!(grades.grades.len(), 2);
        assert_eq!(grades.statistics.average_score, 80.0);
        assert_eq!(grades.statistics.average_percentage, 80.0);

        let overview = f
            .report_service()
            .student_assignments(student.id, StudentAssignmentsQuery::default())
            .await
            .expect("assignments");
        assert_eq!(overview.summary.submitted, 2);
    }
}
