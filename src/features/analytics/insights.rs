use super::models::{BudgetInsights, SavingsOpportunities};
use super::schedule::days_until_due;
use crate::features::subscriptions::Subscription;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// 予算使用率の警告ライン（%）
pub const BUDGET_WARNING_PERCENTAGE: f64 = 80.0;

/// 未使用とみなすまでの経過日数
pub const UNUSED_AFTER_DAYS: i64 = 30;

/// 節約候補として扱うトライアル終了までの日数（この日数未満）
pub const TRIAL_ENDING_WINDOW_DAYS: i64 = 7;

/// 予算に対する使用状況を計算する
///
/// # 引数
/// * `total_monthly` - 月額換算の合計
/// * `monthly_budget` - 月額予算（ユーザー情報がない場合はNone）
///
/// # 戻り値
/// 予算インサイト。ユーザー情報がない場合はゼロ値。
pub fn budget_insights(total_monthly: f64, monthly_budget: Option<f64>) -> BudgetInsights {
    let Some(budget) = monthly_budget else {
        return BudgetInsights::default();
    };

    let percentage_used = if budget > 0.0 {
        total_monthly / budget * 100.0
    } else {
        0.0
    };
    let overspending = total_monthly > budget;

    let mut recommendations = Vec::new();
    if overspending {
        recommendations.push("使っていないサブスクリプションの解約を検討しましょう".to_string());
        recommendations.push("エンターテインメント系のサブスクリプションを見直しましょう".to_string());
    }
    if percentage_used > BUDGET_WARNING_PERCENTAGE {
        recommendations.push("予算の上限に近づいています".to_string());
    }

    BudgetInsights {
        percentage_used,
        remaining_budget: budget - total_monthly,
        overspending,
        recommendations,
    }
}

/// 節約候補を抽出する
///
/// # 引数
/// * `subscriptions` - 対象のサブスクリプション
/// * `today` - ユーザーのタイムゾーンでの今日
/// * `now` - 現在時刻
///
/// # 抽出規則
/// - 未使用: 作成から30日以上経過し、金額が正のもの
/// - 値上げ: 前回金額より現在の金額が高いもの
/// - トライアル終了間近: 終了日まで0日以上7日未満のもの
pub fn savings_opportunities(
    subscriptions: &[Subscription],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> SavingsOpportunities {
    let unused_threshold = now - Duration::days(UNUSED_AFTER_DAYS);

    SavingsOpportunities {
        unused_subscriptions: select(subscriptions, |s| {
            s.created_at < unused_threshold && s.amount > 0.0
        }),
        price_increases: select(subscriptions, Subscription::has_price_increase),
        trial_ending: select(subscriptions, |s| {
            s.is_free_trial
                && s.trial_end_date.is_some_and(|end| {
                    (0..TRIAL_ENDING_WINDOW_DAYS).contains(&days_until_due(end, today))
                })
        }),
    }
}

fn select(
    subscriptions: &[Subscription],
    predicate: impl Fn(&Subscription) -> bool,
) -> Vec<Subscription> {
    subscriptions
        .iter()
        .filter(|subscription| predicate(*subscription))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::{Category, NewSubscription, Recurrence};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscription(id: &str, created_at: DateTime<Utc>) -> Subscription {
        NewSubscription {
            name: id.to_string(),
            amount: 9.99,
            category: Category::Entertainment,
            recurrence: Recurrence::Monthly,
            next_due_date: date(2024, 4, 1),
            start_date: date(2024, 1, 1),
            created_at,
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

    #[test]
    fn test_budget_insights_over_budget() {
        let insights = budget_insights(600.0, Some(500.0));
        assert_eq!(insights.percentage_used, 120.0);
        assert_eq!(insights.remaining_budget, -100.0);
        assert!(insights.overspending);
        assert_eq!(insights.recommendations.len(), 3);
        assert!(insights.recommendations[0].contains("解約"));
    }

    #[test]
    fn test_budget_insights_near_limit() {
        let insights = budget_insights(450.0, Some(500.0));
        assert_eq!(insights.percentage_used, 90.0);
        assert!(!insights.overspending);
        assert_eq!(insights.recommendations, vec!["予算の上限に近づいています".to_string()]);

        let relaxed = budget_insights(100.0, Some(500.0));
        assert!(relaxed.recommendations.is_empty());
        assert_eq!(relaxed.remaining_budget, 400.0);
    }

    #[test]
    fn test_budget_insights_without_user() {
        let insights = budget_insights(600.0, None);
        assert_eq!(insights, BudgetInsights::default());
        assert_eq!(insights.percentage_used, 0.0);
        assert!(insights.recommendations.is_empty());
    }

    #[test]
    fn test_budget_insights_non_positive_budget() {
        let insights = budget_insights(10.0, Some(0.0));
        assert_eq!(insights.percentage_used, 0.0);
        assert!(insights.overspending);
    }

    #[test]
    fn test_savings_opportunities() {
        let now = Utc::now();
        let today = now.date_naive();

        let old = subscription("old", now - Duration::days(45));
        let fresh = subscription("fresh", now - Duration::days(3));

        let mut raised = subscription("raised", now);
        raised.previous_amount = Some(7.99);

        let trial = |id: &str, offset: i64| {
            let mut s = subscription(id, now);
            s.is_free_trial = true;
            s.trial_end_date = Some(today + Duration::days(offset));
            s
        };
        let subs = vec![
            old,
            fresh,
            raised,
            trial("ends-today", 0),
            trial("ends-in-6", 6),
            trial("ends-in-7", 7),
            trial("expired", -1),
        ];

        let result = savings_opportunities(&subs, today, now);
        let ids = |subs: &[Subscription]| subs.iter().map(|s| s.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(&result.unused_subscriptions), vec!["old"]);
        assert_eq!(ids(&result.price_increases), vec!["raised"]);
        assert_eq!(ids(&result.trial_ending), vec!["ends-today", "ends-in-6"]);
    }
}
