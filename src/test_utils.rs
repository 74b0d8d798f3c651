//! 测试夹具：SQLite（默认内存库）+ 真实迁移 + 一个带教师与学生的班级

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::assignments::{entities::Assignment, requests::CreateAssignmentRequest};
use crate::models::classes::entities::Class;
use crate::models::submissions::entities::{Lateness, NewSubmission, Submission};
use crate::models::users::entities::{NewUser, User, UserRole};
use crate::services::{
    AssignmentService, ClassService, LocalFileStorage, NotificationService, ReportService,
    SubmissionService,
};
use crate::storage::{SeaOrmStorage, Storage};

pub(crate) const TEST_UTC_OFFSET_HOURS: i32 = 7;

pub(crate) struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub db: DatabaseConnection,
    pub admin: User,
    pub teacher: User,
    pub other_teacher: User,
    pub students: Vec<User>,
    // 未加入班级的学生
    pub outsider: User,
    pub class: Class,
}

async fn create_user(storage: &dyn Storage, name: &str, role: UserRole) -> User {
    storage
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{name}@lms.test"),
            role,
        })
        .await
        .expect("create user")
}

pub(crate) fn create_request(class_id: i64, deadline: DateTime<Utc>) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        class_id,
        title: "第一章练习".into(),
        description: "完成第一章全部课后习题".into(),
        instruction: None,
        deadline,
        max_score: 100,
        file_url: None,
        file_name: None,
    }
}

pub(crate) async fn seed_fixture() -> Fixture {
    seed_fixture_with("sqlite::memory:", 1).await
}

/// 临时的 SQLite 文件库，离开作用域时连同 WAL 文件一起删除
pub(crate) struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{prefix}-{:016x}.db", rand::random::<u64>()));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub(crate) async fn seed_fixture_with(url: &str, pool_size: u32) -> Fixture {
    let sea = SeaOrmStorage::connect(url, pool_size, 5)
        .await
        .expect("test database");
    let db = sea.db.clone();
    let storage: Arc<dyn Storage> = Arc::new(sea);

    let admin = create_user(storage.as_ref(), "admin", UserRole::Admin).await;
    let teacher = create_user(storage.as_ref(), "teacher", UserRole::Teacher).await;
    let other_teacher = create_user(storage.as_ref(), "other_teacher", UserRole::Teacher).await;
    let mut students = Vec::new();
    for i in 1..=3 {
        students.push(create_user(storage.as_ref(), &format!("student{i}"), UserRole::Student).await);
    }
    let outsider = create_user(storage.as_ref(), "outsider", UserRole::Student).await;

    let class = storage
        .create_class("软件工程 1 班", Some("软件工程"))
        .await
        .expect("create class");
    storage
        .assign_teacher(teacher.id, class.id)
        .await
        .expect("assign teacher");
    for student in &students {
        storage
            .enroll_student(student.id, class.id)
            .await
            .expect("enroll");
    }

    Fixture {
        storage,
        db,
        admin,
        teacher,
        other_teacher,
        students,
        outsider,
        class,
    }
}

impl Fixture {
    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(self.storage.clone(), TEST_UTC_OFFSET_HOURS)
    }

    pub fn assignment_service(&self) -> AssignmentService {
        AssignmentService::new(self.storage.clone(), self.notification_service())
    }

    pub fn submission_service(&self) -> SubmissionService {
        let files = Arc::new(LocalFileStorage::new(std::env::temp_dir().join("lms-test-uploads")));
        SubmissionService::new(self.storage.clone(), files)
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.storage.clone())
    }

    pub fn class_service(&self) -> ClassService {
        ClassService::new(self.storage.clone())
    }

    /// 直接写入草稿作业，不做截止时间校验
    pub async fn draft_assignment(&self, deadline: DateTime<Utc>) -> Assignment {
        self.storage
            .create_assignment(self.teacher.id, create_request(self.class.id, deadline))
            .await
            .expect("create assignment")
    }

    /// 直接发布作业，不触发通知
    pub async fn published_assignment(&self, deadline: DateTime<Utc>) -> Assignment {
        let draft = self.draft_assignment(deadline).await;
        assert!(
            self.storage
                .mark_assignment_published(draft.id)
                .await
                .expect("publish")
        );
        self.storage
            .get_assignment_by_id(draft.id)
            .await
            .expect("get assignment")
            .expect("assignment exists")
    }

    /// 以按时提交的方式直接写入一个新版本
    pub async fn submit_as(&self, student: &User, assignment_id: i64) -> Submission {
        self.storage
            .create_submission_version(NewSubmission {
                assignment_id,
                student_id: student.id,
                content: Some(format!("{} 的答案", student.name)),
                file_url: None,
                file_name: None,
                file_size: None,
                mime_type: None,
                lateness: Lateness::ON_TIME,
                submitted_at: Utc::now(),
            })
            .await
            .expect("submit")
    }
}
