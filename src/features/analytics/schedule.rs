use super::models::DueStatus;
use crate::features::subscriptions::Subscription;
use chrono::NaiveDate;

/// 「まもなく支払い」とみなす日数の上限（この日数未満）
pub const DUE_SOON_DAYS: i64 = 7;

/// 支払日までの日数（過ぎている場合は負の値）
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

impl DueStatus {
    /// 支払日と今日から状況を判定する
    pub fn classify(due_date: NaiveDate, today: NaiveDate) -> Self {
        match days_until_due(due_date, today) {
            days if days < 0 => DueStatus::Overdue(-days),
            0 => DueStatus::DueToday,
            days if days < DUE_SOON_DAYS => DueStatus::DueSoon(days),
            days => DueStatus::Upcoming(days),
        }
    }
}

/// 支払日の昇順に並べたサブスクリプション
///
/// 同じ支払日の場合は元の順序を保つ。
pub fn upcoming_bills(subscriptions: &[Subscription]) -> Vec<&Subscription> {
    let mut bills: Vec<&Subscription> = subscriptions.iter().collect();
    bills.sort_by_key(|subscription| subscription.next_due_date);
    bills
}

/// 今日からn日以内に支払日が来る請求（支払日の昇順）
///
/// 支払日を過ぎたものは含まない。
pub fn bills_due_within(
    subscriptions: &[Subscription],
    today: NaiveDate,
    days: i64,
) -> Vec<&Subscription> {
    upcoming_bills(subscriptions)
        .into_iter()
        .filter(|subscription| {
            let remaining = days_until_due(subscription.next_due_date, today);
            (0..=days).contains(&remaining)
        })
        .collect()
}

/// まもなく支払日が来る請求（支払日の昇順）
///
/// 残り日数が `0 <= days < window` のもの。`window` がDUE_SOON_DAYSのとき
/// `DueStatus::DueToday` と `DueStatus::DueSoon` に一致する。
pub fn bills_due_soon(
    subscriptions: &[Subscription],
    today: NaiveDate,
    window: i64,
) -> Vec<&Subscription> {
    upcoming_bills(subscriptions)
        .into_iter()
        .filter(|subscription| {
            let remaining = days_until_due(subscription.next_due_date, today);
            (0..window).contains(&remaining)
        })
        .collect()
}

/// 無料トライアル中のサブスクリプション
pub fn active_free_trials(subscriptions: &[Subscription]) -> Vec<&Subscription> {
    subscriptions
        .iter()
        .filter(|subscription| subscription.is_free_trial)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::{Category, NewSubscription, Recurrence};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscription(id: &str, next_due_date: NaiveDate) -> Subscription {
        NewSubscription {
            name: id.to_string(),
            amount: 5.0,
            category: Category::Utilities,
            recurrence: Recurrence::Monthly,
            next_due_date,
            start_date: date(2024, 1, 1),
            created_at: Utc::now(),
            is_paid: false,
            description: None,
            notes: None,
            is_free_trial: false,
            trial_end_date: None,
            auto_renew: None,
            reminder_days: None,
        }
        .into_subscription(id.to_string(), "user-1")
    }

    fn ids(bills: Vec<&Subscription>) -> Vec<&str> {
        bills.into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_upcoming_bills_is_stable() {
        let subs = vec![
            subscription("c", date(2024, 3, 20)),
            subscription("a", date(2024, 3, 5)),
            subscription("b1", date(2024, 3, 10)),
            subscription("b2", date(2024, 3, 10)),
        ];
        assert_eq!(ids(upcoming_bills(&subs)), vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_bills_due_within() {
        let today = date(2024, 3, 10);
        let subs = vec![
            subscription("overdue", date(2024, 3, 9)),
            subscription("today", today),
            subscription("week", date(2024, 3, 17)),
            subscription("later", date(2024, 3, 18)),
        ];
        assert_eq!(ids(bills_due_within(&subs, today, 7)), vec!["today", "week"]);
        assert_eq!(ids(bills_due_within(&subs, today, 0)), vec!["today"]);
    }

    #[test]
    fn test_bills_due_soon_matches_due_status() {
        let today = date(2024, 3, 10);
        let subs = vec![
            subscription("overdue", date(2024, 3, 9)),
            subscription("today", today),
            subscription("six", date(2024, 3, 16)),
            subscription("seven", date(2024, 3, 17)),
        ];
        assert_eq!(
            ids(bills_due_soon(&subs, today, DUE_SOON_DAYS)),
            vec!["today", "six"]
        );
        for sub in &subs {
            let listed = bills_due_soon(&subs, today, DUE_SOON_DAYS)
                .iter()
                .any(|s| s.id == sub.id);
            let soon = matches!(
                DueStatus::classify(sub.next_due_date, today),
                DueStatus::DueToday | DueStatus::DueSoon(_)
            );
            assert_eq!(listed, soon, "{}", sub.id);
        }
        assert!(bills_due_soon(&subs, today, 0).is_empty());
    }

    #[test]
    fn test_due_status() {
        let today = date(2024, 3, 10);
        assert_eq!(DueStatus::classify(date(2024, 3, 7), today), DueStatus::Overdue(3));
        assert_eq!(DueStatus::classify(today, today), DueStatus::DueToday);
        assert_eq!(DueStatus::classify(date(2024, 3, 16), today), DueStatus::DueSoon(6));
        assert_eq!(DueStatus::classify(date(2024, 3, 17), today), DueStatus::Upcoming(7));
    }

    #[test]
    fn test_active_free_trials() {
        let mut trial = subscription("trial", date(2024, 3, 10));
        trial.is_free_trial = true;
        let subs = vec![subscription("paid", date(2024, 3, 10)), trial];
        assert_eq!(ids(active_free_trials(&subs)), vec!["trial"]);
    }
}
