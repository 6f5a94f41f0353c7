use crate::shared::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Reminder,
    PriceIncrease,
    TrialEnding,
    Overdue,
    BudgetAlert,
}

impl NotificationType {
    pub const ALL: [NotificationType; 5] = [
        NotificationType::Reminder,
        NotificationType::PriceIncrease,
        NotificationType::TrialEnding,
        NotificationType::Overdue,
        NotificationType::BudgetAlert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Reminder => "reminder",
            NotificationType::PriceIncrease => "price_increase",
            NotificationType::TrialEnding => "trial_ending",
            NotificationType::Overdue => "overdue",
            NotificationType::BudgetAlert => "budget_alert",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| AppError::validation(format!("無効な通知種別です: {value}")))
    }
}

/// 通知データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub subscription_id: Option<String>,
    pub is_read: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 生成された通知イベント（IDはストアが採番）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub subscription_id: Option<String>,
    /// 生成時点では常にfalse
    pub is_read: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn into_notification(self, id: String, user_id: &str) -> Notification {
        Notification {
            id,
            user_id: user_id.to_string(),
            notification_type: self.notification_type,
            title: self.title,
            message: self.message,
            subscription_id: self.subscription_id,
            is_read: self.is_read,
            scheduled_for: self.scheduled_for,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_names() {
        assert_eq!(
            serde_json::to_string(&NotificationType::PriceIncrease).unwrap(),
            "\"price_increase\""
        );
        assert_eq!(
            "trial_ending".parse::<NotificationType>().unwrap(),
            NotificationType::TrialEnding
        );
        assert!("push".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_new_notification_is_unread() {
        let now = Utc::now();
        let notification = NewNotification {
            notification_type: NotificationType::Overdue,
            title: "支払い期限切れ".to_string(),
            message: "Netflixの支払い期限が過ぎています".to_string(),
            subscription_id: Some("sub-1".to_string()),
            is_read: false,
            scheduled_for: None,
            created_at: now,
        }
        .into_notification("n-1".to_string(), "user-1");

        assert!(!notification.is_read);
        assert_eq!(notification.updated_at, now);
    }
}
