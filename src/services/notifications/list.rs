use super::NotificationService;
use crate::errors::Result;
use crate::models::notifications::{
    requests::NotificationListQuery, responses::NotificationListResponse,
};
use crate::models::users::entities::User;
use crate::services::access::{ensure_class_access, load_class};

/// 调用者的通知列表，新通知在前
pub async fn list_notifications(
    service: &NotificationService,
    caller_id: i64,
    query: NotificationListQuery,
) -> Result<NotificationListResponse> {
    service
        .get_storage()
        .list_user_notifications(caller_id, query, None)
        .await
}

/// 调用者在某个班级下收到的通知
pub async fn list_class_notifications(
    service: &NotificationService,
    caller: &User,
    class_id: i64,
    query: NotificationListQuery,
) -> Result<NotificationListResponse> {
    let storage = service.get_storage();
    load_class(storage, class_id).await?;
    ensure_class_access(storage, caller, class_id).await?;

    storage
        .list_user_notifications(caller.id, query, Some(class_id))
        .await
}

#[cfg(test)]
mod tests {
    use crate::errors::LmsError;
    use crate::models::PaginationQuery;
    use crate::models::notifications::entities::{NotificationType, RelatedRefs};
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::test_utils::seed_fixture;

    #[tokio::test]
    async fn test_filter_by_type_and_paginate() {
        let f = seed_fixture().await;
        let service = f.notification_service();

        for i in 0..3 {
            service
                .notify_class(
                    f.class.id,
                    NotificationType::MaterialUploaded,
                    format!("资料 {i}"),
                    "内容".into(),
                    RelatedRefs::default(),
                )
                .await
                .expect("fan out");
        }
        service
            .notify_class(
                f.class.id,
                NotificationType::GradePublished,
                "成绩已发布".into(),
                "内容".into(),
                RelatedRefs::default(),
            )
            .await
            .expect("fan out");

        let student = &f.students[0];
        let all = service
            .list(student.id, NotificationListQuery::default())
            .await
            .expect("list");
        assert_eq!(all.pagination.total, 4);
        // 新通知在前
        assert_eq!(all.items[0].title, "成绩已发布");

        let materials = service
            .list(
                student.id,
                NotificationListQuery {
                    pagination: PaginationQuery { page: 2, size: 2 },
                    notification_type: Some(NotificationType::MaterialUploaded),
                },
            )
            .await
            .expect("list");
        assert_eq!(materials.pagination.total, 3);
        assert_eq!(materials.pagination.total_pages, 2);
        assert_eq!(materials.items.len(), 1);
        assert!(
            materials
                .items
                .iter()
                .all(|n| n.notification_type == NotificationType::MaterialUploaded)
        );
    }

    #[tokio::test]
    async fn test_huge_page_returns_empty_list() {
        let f = seed_fixture().await;
        let service = f.notification_service();
        service
            .notify_class(
                f.class.id,
                NotificationType::MaterialUploaded,
                "资料".into(),
                "内容".into(),
                RelatedRefs::default(),
            )
            .await
            .expect("fan out");

        let list = service
            .list(
                f.students[0].id,
                NotificationListQuery {
                    pagination: PaginationQuery {
                        page: i64::MAX,
                        size: 100,
                    },
                    notification_type: None,
                },
            )
            .await
            .expect("list");
        assert!(list.items.is_empty());
        assert_eq!(list.pagination.total, 1);
        assert_eq!(list.pagination.page, crate::models::MAX_PAGE);
    }

    #[tokio::test]
    async fn test_class_listing_requires_access() {
        let f = seed_fixture().await;
        let service = f.notification_service();
        service
            .notify_class(
                f.class.id,
                NotificationType::MaterialUploaded,
                "资料".into(),
                "内容".into(),
                RelatedRefs::default(),
            )
            .await
            .expect("fan out");

        let own = service
            .list_for_class(&f.students[1], f.class.id, NotificationListQuery::default())
            .await
            .expect("list");
        assert_eq!(own.items.len(), 1);
        assert_eq!(own.items[0].related_data.class_id, Some(f.class.id));

        let denied = service
            .list_for_class(&f.outsider, f.class.id, NotificationListQuery::default())
            .await;
        assert!(matches!(denied, Err(LmsError::AccessDenied(_))));
    }
}
