use super::service::SubscriptionTracker;
use super::store::TrackerStore;
use crate::features::analytics::{BudgetInsights, SavingsOpportunities, SpendingSummary};
use crate::features::history::MonthlyPaymentTotal;
use crate::features::subscriptions::Subscription;
use chrono::NaiveDate;
use serde::Serialize;

/// 支払い推移に含める月数
const TREND_MONTHS: u32 = 6;

/// 現在の状況をまとめた表示用レポート
#[derive(Debug, Serialize)]
pub struct TrackerReport<'a> {
    pub user_id: &'a str,
    pub today: NaiveDate,
    pub summary: SpendingSummary,
    pub budget_insights: BudgetInsights,
    pub due_soon: Vec<&'a Subscription>,
    pub free_trials: Vec<&'a Subscription>,
    pub savings_opportunities: SavingsOpportunities,
    pub payment_trend: Vec<MonthlyPaymentTotal>,
    pub unread_notifications: usize,
}

impl<S: TrackerStore> SubscriptionTracker<S> {
    /// 現在の状況をレポートにまとめる
    pub fn report(&self) -> TrackerReport<'_> {
        TrackerReport {
            user_id: self.user_id(),
            today: self.today(),
            summary: self.spending_summary(),
            budget_insights: self.budget_insights(),
            due_soon: self.due_soon(),
            free_trials: self.active_free_trials(),
            savings_opportunities: self.savings_opportunities(),
            payment_trend: self.monthly_payment_trend(TREND_MONTHS),
            unread_notifications: self.unread_notification_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::features::subscriptions::{Category, CreateSubscriptionDto, Recurrence};
    use crate::features::tracker::SubscriptionTracker;
    use crate::shared::config::TrackerConfig;
    use crate::shared::database::SqliteStore;

    #[test]
    fn test_report_serializes() {
        let mut tracker =
            SubscriptionTracker::new(SqliteStore::open_in_memory().unwrap(), &TrackerConfig::default())
                .unwrap();
        let today = tracker.today();
        let mut dto = CreateSubscriptionDto::new(
            "Netflix",
            15.99,
            Category::Entertainment,
            Recurrence::Monthly,
            today,
        );
        dto.next_due_date = Some(today);
        tracker.create(dto).unwrap();
        let id = tracker.subscriptions()[0].id.clone();
        tracker.mark_paid(&id).unwrap();

        let report = tracker.report();
        assert_eq!(report.summary.active_subscription_count, 1);
        assert_eq!(report.payment_trend.len(), 6);
        assert_eq!(report.payment_trend[5].amount, 15.99);
        assert!(report.due_soon.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["user_id"], "local-user");
        assert_eq!(json["summary"]["by_category"]["Entertainment"], 15.99);
        assert_eq!(json["budget_insights"]["percentage_used"], 0.0);
    }
}
