//! 通知存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, db_error};
use crate::entity::notifications::{
    ActiveModel as NotificationActiveModel, Column as NotificationColumn, Entity as Notifications,
};
use crate::entity::user_notifications::{ActiveModel, Column, Entity as UserNotifications};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    notifications::{
        entities::{NewNotification, Notification, NotificationType, UserNotification},
        requests::NotificationListQuery,
        responses::{NotificationItem, NotificationListResponse, NotificationStats, TypeCount},
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

const DELIVERY_BATCH_SIZE: usize = 500;

impl SeaOrmStorage {
    /// 创建通知
    pub async fn create_notification_impl(
        &self,
        notification: NewNotification,
    ) -> Result<Notification> {
        let related = notification.related;

        let model = NotificationActiveModel {
            title: Set(notification.title),
            message: Set(notification.message),
            notification_type: Set(notification.notification_type.to_string()),
            class_id: Set(related.class_id),
            assignment_id: Set(related.assignment_id),
            material_id: Set(related.material_id),
            quiz_id: Set(related.quiz_id),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("创建通知失败", e))?;

        Ok(result.into_notification())
    }

    /// 为每个接收者写入一条投递记录
    pub async fn create_user_notifications_impl(
        &self,
        notification_id: i64,
        user_ids: &[i64],
    ) -> Result<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        // 分批插入，避免超出数据库的绑定参数上限
        for chunk in user_ids.chunks(DELIVERY_BATCH_SIZE) {
            let models = chunk.iter().map(|&user_id| ActiveModel {
                user_id: Set(user_id),
                notification_id: Set(notification_id),
                is_read: Set(false),
                read_at: Set(None),
                created_at: Set(now),
                ..Default::default()
            });
            UserNotifications::insert_many(models)
                .exec(&txn)
                .await
                .map_err(|e| db_error("创建通知投递失败", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(user_ids.len() as u64)
    }

    /// 获取属于该用户的投递记录
    pub async fn get_user_notification_impl(
        &self,
        user_notification_id: i64,
        user_id: i64,
    ) -> Result<Option<UserNotification>> {
        let result = UserNotifications::find_by_id(user_notification_id)
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询通知失败", e))?;

        Ok(result.map(|m| m.into_user_notification()))
    }

    /// 标记单条已读，已读过的不会改写 read_at
    pub async fn mark_user_notification_read_impl(
        &self,
        user_notification_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = UserNotifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .col_expr(Column::ReadAt, Expr::value(Some(read_at.timestamp())))
            .filter(Column::Id.eq(user_notification_id))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("标记通知已读失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 标记该用户全部未读为已读
    pub async fn mark_all_user_notifications_read_impl(
        &self,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = UserNotifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .col_expr(Column::ReadAt, Expr::value(Some(read_at.timestamp())))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("标记全部已读失败", e))?;

        Ok(result.rows_affected)
    }

    /// 未读数量
    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<i64> {
        let count = UserNotifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计未读通知失败", e))?;

        Ok(count as i64)
    }

    /// 分页列出用户通知，可按类型和班级过滤
    pub async fn list_user_notifications_impl(
        &self,
        user_id: i64,
        query: NotificationListQuery,
        class_id: Option<i64>,
    ) -> Result<NotificationListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = UserNotifications::find()
            .inner_join(Notifications)
            .filter(Column::UserId.eq(user_id));

        if let Some(notification_type) = query.notification_type {
            select = select
                .filter(NotificationColumn::NotificationType.eq(notification_type.to_string()));
        }
        if let Some(class_id) = class_id {
            select = select.filter(NotificationColumn::ClassId.eq(class_id));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计通知数量失败", e))?;

        let deliveries = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .offset((page - 1) * size)
            .limit(size)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询通知列表失败", e))?;

        let notification_ids: Vec<i64> = deliveries.iter().map(|d| d.notification_id).collect();
        let notifications: HashMap<i64, Notification> = if notification_ids.is_empty() {
            HashMap::new()
        } else {
            Notifications::find()
                .filter(NotificationColumn::Id.is_in(notification_ids))
                .all(&self.db)
                .await
                .map_err(|e| db_error("查询通知内容失败", e))?
                .into_iter()
                .map(|m| (m.id, m.into_notification()))
                .collect()
        };

        let items = deliveries
            .into_iter()
            .filter_map(|delivery| {
                let notification = notifications.get(&delivery.notification_id)?.clone();
                Some(NotificationItem::from_parts(
                    delivery.into_user_notification(),
                    notification,
                ))
            })
            .collect();

        Ok(NotificationListResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 查找 since 之后为该作业创建的某类通知
    pub async fn find_notification_since_impl(
        &self,
        assignment_id: i64,
        notification_type: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let result = Notifications::find()
            .filter(NotificationColumn::AssignmentId.eq(assignment_id))
            .filter(NotificationColumn::NotificationType.eq(notification_type.to_string()))
            .filter(NotificationColumn::CreatedAt.gte(since.timestamp()))
            .order_by_desc(NotificationColumn::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询已发送通知失败", e))?;

        Ok(result.map(|m| m.into_notification()))
    }

    /// 删除早于 cutoff 的通知及其投递记录
    pub async fn delete_notifications_before_impl(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        let ids: Vec<i64> = Notifications::find()
            .filter(NotificationColumn::CreatedAt.lt(cutoff.timestamp()))
            .select_only()
            .column(NotificationColumn::Id)
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(|e| db_error("查询旧通知失败", e))?;

        if ids.is_empty() {
            txn.commit()
                .await
                .map_err(|e| db_error("提交事务失败", e))?;
            return Ok(0);
        }

        UserNotifications::delete_many()
            .filter(Column::NotificationId.is_in(ids.clone()))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除通知投递失败", e))?;

        let result = Notifications::delete_many()
            .filter(NotificationColumn::Id.is_in(ids))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除旧通知失败", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(result.rows_affected)
    }

    /// 通知统计
    pub async fn notification_stats_impl(&self) -> Result<NotificationStats> {
        let total_notifications = Notifications::find()
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计通知失败", e))?;

        let total_deliveries = UserNotifications::find()
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计通知投递失败", e))?;

        let unread_deliveries = UserNotifications::find()
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计未读投递失败", e))?;

        let rows: Vec<(String, i64)> = Notifications::find()
            .select_only()
            .column(NotificationColumn::NotificationType)
            .column_as(NotificationColumn::Id.count(), "type_count")
            .group_by(NotificationColumn::NotificationType)
            .order_by_asc(NotificationColumn::NotificationType)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| db_error("按类型统计通知失败", e))?;

        let by_type = rows
            .into_iter()
            .filter_map(|(notification_type, count)| {
                notification_type
                    .parse::<NotificationType>()
                    .ok()
                    .map(|notification_type| TypeCount {
                        notification_type,
                        count,
                    })
            })
            .collect();

        Ok(NotificationStats {
            total_notifications: total_notifications as i64,
            total_deliveries: total_deliveries as i64,
            unread_deliveries: unread_deliveries as i64,
            by_type,
        })
    }
}
