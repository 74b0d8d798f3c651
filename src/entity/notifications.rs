//! 通知实体（同一事件的所有接收者共享）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub notification_type: String,
    pub class_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub material_id: Option<i64>,
    pub quiz_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_notifications::Entity")]
    UserNotifications,
}

impl Related<super::user_notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserNotifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_notification(self) -> crate::models::notifications::entities::Notification {
        use crate::models::notifications::entities::{Notification, NotificationType, RelatedRefs};
        use chrono::{DateTime, Utc};

        Notification {
            id: self.id,
            title: self.title,
            message: self.message,
            notification_type: self
                .notification_type
                .parse::<NotificationType>()
                .unwrap_or(NotificationType::AssignmentUpdated),
            related: RelatedRefs {
                class_id: self.class_id,
                assignment_id: self.assignment_id,
                material_id: self.material_id,
                quiz_id: self.quiz_id,
            },
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
