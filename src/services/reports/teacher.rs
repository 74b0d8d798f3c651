use std::collections::{HashMap, HashSet};

use super::ReportService;
use super::statistics::{compute_grade_statistics, round2};
use crate::errors::Result;
use crate::models::classes::entities::ClassBrief;
use crate::models::reports::{GradedScore, TeacherAssignmentStats, TeacherDashboardResponse};
use crate::models::submissions::entities::{Submission, SubmissionStatus};

/// 教师看板：每个作业的提交率、批改进度与成绩分布
pub async fn teacher_dashboard(
    service: &ReportService,
    teacher_id: i64,
) -> Result<TeacherDashboardResponse> {
    let storage = service.get_storage();

    let class_ids = storage.list_teacher_class_ids(teacher_id).await?;
    let assignments = storage.list_teacher_assignments(teacher_id).await?;

    // 作业所在班级可能已不再由该教师授课，这里一并统计
    let mut all_class_ids: Vec<i64> = class_ids.clone();
    all_class_ids.extend(assignments.iter().map(|a| a.class_id));
    all_class_ids.sort_unstable();
    all_class_ids.dedup();

    let classes: HashMap<i64, ClassBrief> = storage
        .list_classes_by_ids(&all_class_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.brief()))
        .collect();

    let mut enrolled: HashMap<i64, i64> = HashMap::new();
    let mut students: HashSet<i64> = HashSet::new();
    for class_id in &all_class_ids {
        let ids = storage.list_class_student_ids(*class_id).await?;
        enrolled.insert(*class_id, ids.len() as i64);
        if class_ids.contains(class_id) {
            students.extend(ids);
        }
    }

    let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let mut by_assignment: HashMap<i64, Vec<Submission>> = HashMap::new();
    for submission in storage
        .list_latest_submissions_for_assignments(&assignment_ids)
        .await?
    {
        by_assignment
            .entry(submission.assignment_id)
            .or_default()
            .push(submission);
    }

    let mut pending_grading = 0;
    let mut stats = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let Some(class) = classes.get(&assignment.class_id).cloned() else {
            continue;
        };
        let latest = by_assignment.remove(&assignment.id).unwrap_or_default();
        let enrolled_students = enrolled.get(&assignment.class_id).copied().unwrap_or(0);

        let submitted = latest.len() as i64;
        let graded = latest
            .iter()
            .filter(|s| s.status == SubmissionStatus::Graded)
            .count() as i64;
        let late = latest.iter().filter(|s| s.is_late).count() as i64;
        pending_grading += submitted - graded;

        let scores: Vec<GradedScore> = latest
            .iter()
            .filter_map(|s| {
                s.score.map(|score| GradedScore {
                    score,
                    max_score: assignment.max_score,
                })
            })
            .collect();

        let submission_rate = if enrolled_students > 0 {
            round2(submitted as f64 / enrolled_students as f64 * 100.0)
        } else {
            0.0
        };

        stats.push(TeacherAssignmentStats {
            assignment_id: assignment.id,
            title: assignment.title,
            class,
            status: assignment.status,
            deadline: assignment.deadline,
            enrolled_students,
            submitted,
            graded,
            late,
            submission_rate,
            statistics: compute_grade_statistics(&scores),
        });
    }

    Ok(TeacherDashboardResponse {
        total_classes: class_ids.len() as i64,
        total_assignments: stats.len() as i64,
        total_students: students.len() as i64,
        pending_grading,
        assignments: stats,
    })
}
