use super::models::{NewNotification, Notification, NotificationType};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{generate_id, parse_timestamp};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "SELECT id, user_id, notification_type, title, message, subscription_id,
        is_read, scheduled_for, created_at, updated_at
     FROM notifications";

/// データベースの1行（未検証の文字列を含む）
struct NotificationRow {
    id: String,
    user_id: String,
    notification_type: String,
    title: String,
    message: String,
    subscription_id: Option<String>,
    is_read: bool,
    scheduled_for: Option<String>,
    created_at: String,
    updated_at: String,
}

impl NotificationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            notification_type: row.get(2)?,
            title: row.get(3)?,
            message: row.get(4)?,
            subscription_id: row.get(5)?,
            is_read: row.get::<_, i64>(6)? != 0,
            scheduled_for: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_notification(self) -> AppResult<Notification> {
        Ok(Notification {
            notification_type: self.notification_type.parse::<NotificationType>()?,
            scheduled_for: self.scheduled_for.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            subscription_id: self.subscription_id,
            is_read: self.is_read,
        })
    }
}

/// 通知を保存する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - ユーザーID
/// * `new_notification` - 生成された通知イベント
///
/// # 戻り値
/// 保存された通知（未読）
pub fn insert(
    conn: &Connection,
    user_id: &str,
    new_notification: NewNotification,
) -> AppResult<Notification> {
    let notification = new_notification.into_notification(generate_id(), user_id);

    conn.execute(
        "INSERT INTO notifications (id, user_id, notification_type, title, message, subscription_id,
            is_read, scheduled_for, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            notification.id,
            notification.user_id,
            notification.notification_type.as_str(),
            notification.title,
            notification.message,
            notification.subscription_id,
            notification.is_read,
            notification.scheduled_for.map(|t| t.to_rfc3339()),
            notification.created_at.to_rfc3339(),
            notification.updated_at.to_rfc3339(),
        ],
    )?;

    log::debug!(
        "通知を保存しました: id={}, type={}",
        notification.id,
        notification.notification_type
    );
    Ok(notification)
}

/// ユーザーの通知を新しい順に取得する
pub fn find_all(conn: &Connection, user_id: &str) -> AppResult<Vec<Notification>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt
        .query_map(params![user_id], NotificationRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut notifications = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id.clone();
        match row.into_notification() {
            Ok(notification) => notifications.push(notification),
            Err(e) => log::warn!("不正な通知行をスキップしました: id={id}, error={e}"),
        }
    }
    Ok(notifications)
}

/// 通知を既読にする
pub fn mark_as_read(conn: &Connection, id: &str) -> AppResult<Notification> {
    let rows_affected = conn.execute(
        "UPDATE notifications SET is_read = 1, updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), id],
    )?;
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("ID {id} の通知が見つかりません")));
    }

    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        NotificationRow::from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("ID {id} の通知が見つかりません")))?
    .into_notification()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::create_tables;
    use chrono::Duration;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn event(title: &str, created_at: chrono::DateTime<Utc>) -> NewNotification {
        NewNotification {
            notification_type: NotificationType::PriceIncrease,
            title: title.to_string(),
            message: "Netflixの料金が2.00値上がりしました".to_string(),
            subscription_id: Some("sub-1".to_string()),
            is_read: false,
            scheduled_for: None,
            created_at,
        }
    }

    #[test]
    fn test_insert_and_list_newest_first() {
        let conn = create_test_db();
        let now = Utc::now();
        insert(&conn, "user-1", event("old", now - Duration::hours(2))).unwrap();
        insert(&conn, "user-1", event("new", now)).unwrap();
        insert(&conn, "user-2", event("other", now)).unwrap();

        let notifications = find_all(&conn, "user-1").unwrap();
        let titles: Vec<_> = notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old"]);
        assert!(notifications.iter().all(|n| !n.is_read));
        assert_eq!(
            notifications[0].notification_type,
            NotificationType::PriceIncrease
        );
    }

    #[test]
    fn test_mark_as_read() {
        let conn = create_test_db();
        let saved = insert(&conn, "user-1", event("値上げ", Utc::now())).unwrap();

        let read = mark_as_read(&conn, &saved.id).unwrap();
        assert!(read.is_read);
        assert_eq!(read.created_at, saved.created_at);

        assert!(matches!(
            mark_as_read(&conn, "missing"),
            Err(AppError::NotFound(_))
        ));
    }
}
