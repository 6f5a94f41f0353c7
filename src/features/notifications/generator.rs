//! 通知イベントの生成
//!
//! どの関数も既存の通知との重複チェックは行わない。
//! 同じ入力で2回呼べば同じイベントが2回生成される。

use super::models::{NewNotification, NotificationType};
use crate::features::analytics::{days_until_due, BudgetInsights};
use crate::features::subscriptions::Subscription;
use crate::shared::utils::format_amount;
use chrono::{DateTime, NaiveDate, Utc};

/// 無料トライアル終了通知を出す最大日数
pub const TRIAL_ENDING_NOTICE_DAYS: i64 = 3;

/// 値上げされたサブスクリプションを検出する
pub fn check_for_price_increases(
    subscriptions: &[Subscription],
    now: DateTime<Utc>,
) -> Vec<NewNotification> {
    subscriptions
        .iter()
        .filter_map(|subscription| {
            let previous = subscription.previous_amount?;
            if subscription.amount <= previous {
                return None;
            }
            let delta = subscription.amount - previous;
            Some(NewNotification {
                notification_type: NotificationType::PriceIncrease,
                title: "値上げのお知らせ".to_string(),
                message: format!(
                    "{}の料金が{}値上がりしました",
                    subscription.name,
                    format_amount(delta)
                ),
                subscription_id: Some(subscription.id.clone()),
                is_read: false,
                scheduled_for: None,
                created_at: now,
            })
        })
        .collect()
}

/// 終了間近（残り1〜3日）の無料トライアルを検出する
///
/// 当日終了のトライアルと終了済みのトライアルは対象外。
pub fn check_for_trial_ending(
    subscriptions: &[Subscription],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<NewNotification> {
    subscriptions
        .iter()
        .filter(|subscription| subscription.is_free_trial)
        .filter_map(|subscription| {
            let end = subscription.trial_end_date?;
            let days = (end - today).num_days();
            if days <= 0 || days > TRIAL_ENDING_NOTICE_DAYS {
                return None;
            }
            Some(NewNotification {
                notification_type: NotificationType::TrialEnding,
                title: "無料トライアル終了間近".to_string(),
                message: format!("{}の無料トライアルはあと{days}日で終了します", subscription.name),
                subscription_id: Some(subscription.id.clone()),
                is_read: false,
                scheduled_for: None,
                created_at: now,
            })
        })
        .collect()
}

/// 支払日のリマインドを生成する
///
/// # 引数
/// * `subscriptions` - 対象のサブスクリプション
/// * `default_reminder_days` - ユーザー設定のリマインド日数
/// * `today` - ユーザーのタイムゾーンでの今日
/// * `now` - 生成時刻
///
/// 支払日までの日数がリマインド日数のいずれかに一致する未払いの請求が対象。
/// サブスクリプション個別の設定がある場合はそちらを優先する。
pub fn check_for_due_reminders(
    subscriptions: &[Subscription],
    default_reminder_days: &[u32],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<NewNotification> {
    subscriptions
        .iter()
        .filter(|subscription| !subscription.is_paid)
        .filter_map(|subscription| {
            let days = days_until_due(subscription.next_due_date, today);
            let offsets = subscription
                .reminder_days
                .as_deref()
                .unwrap_or(default_reminder_days);
            if !offsets.iter().any(|offset| i64::from(*offset) == days) {
                return None;
            }
            let message = if days == 0 {
                format!("{}の支払日は今日です", subscription.name)
            } else {
                format!("{}の支払日まであと{days}日です", subscription.name)
            };
            Some(NewNotification {
                notification_type: NotificationType::Reminder,
                title: "支払いリマインド".to_string(),
                message,
                subscription_id: Some(subscription.id.clone()),
                is_read: false,
                scheduled_for: None,
                created_at: now,
            })
        })
        .collect()
}

/// 支払日を過ぎた未払いの請求を検出する
pub fn check_for_overdue(
    subscriptions: &[Subscription],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<NewNotification> {
    subscriptions
        .iter()
        .filter(|subscription| !subscription.is_paid)
        .filter_map(|subscription| {
            let days = days_until_due(subscription.next_due_date, today);
            if days >= 0 {
                return None;
            }
            Some(NewNotification {
                notification_type: NotificationType::Overdue,
                title: "支払い期限切れ".to_string(),
                message: format!(
                    "{}の支払い期限を{}日過ぎています",
                    subscription.name,
                    -days
                ),
                subscription_id: Some(subscription.id.clone()),
                is_read: false,
                scheduled_for: None,
                created_at: now,
            })
        })
        .collect()
}

/// 予算超過の警告を生成する（超過していない場合はNone）
pub fn check_for_budget_alert(
    insights: &BudgetInsights,
    now: DateTime<Utc>,
) -> Option<NewNotification> {
    if !insights.overspending {
        return None;
    }
    Some(NewNotification {
        notification_type: NotificationType::BudgetAlert,
        title: "予算超過".to_string(),
        message: format!(
            "今月のサブスクリプション費用が予算を{}超過しています（使用率{:.0}%）",
            format_amount(-insights.remaining_budget),
            insights.percentage_used
        ),
        subscription_id: None,
        is_read: false,
        scheduled_for: None,
        created_at: now,
    })
}
