//! 班级与成员关系存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::enrollments::{
    ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as Enrollments,
};
use crate::entity::teacher_classes::{
    ActiveModel as TeacherClassActiveModel, Column as TeacherClassColumn, Entity as TeacherClasses,
};
use crate::errors::{LmsError, Result};
use crate::models::classes::entities::Class;
use crate::utils::random_code::generate_enrollment_code;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

// 选课码冲突时的最大重试次数
const MAX_CODE_ATTEMPTS: usize = 5;

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, name: &str, subject: Option<&str>) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        for _ in 0..MAX_CODE_ATTEMPTS {
            let model = ActiveModel {
                name: Set(name.to_string()),
                subject: Set(subject.map(str::to_string)),
                enrollment_code: Set(generate_enrollment_code()),
                created_at: Set(now),
                ..Default::default()
            };

            match model.insert(&self.db).await {
                Ok(result) => return Ok(result.into_class()),
                Err(e) => match db_error("创建班级失败", e) {
                    LmsError::Conflict(_) => continue,
                    other => return Err(other),
                },
            }
        }

        Err(LmsError::conflict("无法生成唯一的选课码"))
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询班级失败", e))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 通过选课码获取班级
    pub async fn get_class_by_code_impl(&self, enrollment_code: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::EnrollmentCode.eq(enrollment_code))
            .one(&self.db)
            .await
            .map_err(|e| db_error("通过选课码查询班级失败", e))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 批量获取班级
    pub async fn list_classes_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Class>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = Classes::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("批量查询班级失败", e))?;

        Ok(results.into_iter().map(|m| m.into_class()).collect())
    }

    /// 指派教师
    pub async fn assign_teacher_impl(&self, teacher_id: i64, class_id: i64) -> Result<()> {
        let model = TeacherClassActiveModel {
            teacher_id: Set(teacher_id),
            class_id: Set(class_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("指派教师失败", e))?;

        Ok(())
    }

    /// 学生选课
    pub async fn enroll_student_impl(&self, student_id: i64, class_id: i64) -> Result<()> {
        let model = EnrollmentActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("学生选课失败", e))?;

        Ok(())
    }

    /// 教师是否授课于该班级
    pub async fn is_teacher_of_class_impl(&self, teacher_id: i64, class_id: i64) -> Result<bool> {
        let count = TeacherClasses::find()
            .filter(TeacherClassColumn::TeacherId.eq(teacher_id))
            .filter(TeacherClassColumn::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| db_error("查询授课关系失败", e))?;

        Ok(count > 0)
    }

    /// 学生是否已选该班级
    pub async fn is_student_enrolled_impl(&self, student_id: i64, class_id: i64) -> Result<bool> {
        let count = Enrollments::find()
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| db_error("查询选课关系失败", e))?;

        Ok(count > 0)
    }

    /// 班级的全部学生ID
    pub async fn list_class_student_ids_impl(&self, class_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .select_only()
            .column(EnrollmentColumn::StudentId)
            .order_by_asc(EnrollmentColumn::StudentId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询班级学生失败", e))
    }

    /// 学生所选的全部班级ID
    pub async fn list_student_class_ids_impl(&self, student_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .select_only()
            .column(EnrollmentColumn::ClassId)
            .order_by_asc(EnrollmentColumn::ClassId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询学生班级失败", e))
    }

    /// 教师授课的全部班级ID
    pub async fn list_teacher_class_ids_impl(&self, teacher_id: i64) -> Result<Vec<i64>> {
        TeacherClasses::find()
            .filter(TeacherClassColumn::TeacherId.eq(teacher_id))
            .select_only()
            .column(TeacherClassColumn::ClassId)
            .order_by_asc(TeacherClassColumn::ClassId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询教师班级失败", e))
    }
}
