use super::models::{NewNotification, Notification};
use super::repository;
use crate::shared::database::SqliteStore;
use crate::shared::errors::AppResult;

/// 通知の配信・既読状態を担うストア
pub trait NotificationStore {
    fn list_notifications(&self, user_id: &str) -> AppResult<Vec<Notification>>;

    /// 生成された通知イベントを保存する
    fn save_notification(
        &self,
        user_id: &str,
        notification: NewNotification,
    ) -> AppResult<Notification>;

    fn mark_notification_read(&self, id: &str) -> AppResult<Notification>;
}

impl NotificationStore for SqliteStore {
    fn list_notifications(&self, user_id: &str) -> AppResult<Vec<Notification>> {
        repository::find_all(self.connection(), user_id)
    }

    fn save_notification(
        &self,
        user_id: &str,
        notification: NewNotification,
    ) -> AppResult<Notification> {
        repository::insert(self.connection(), user_id, notification)
    }

    fn mark_notification_read(&self, id: &str) -> AppResult<Notification> {
        repository::mark_as_read(self.connection(), id)
    }
}
