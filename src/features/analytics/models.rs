use crate::features::subscriptions::{Category, Subscription};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 支払日までの状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum DueStatus {
    /// 支払日を過ぎている（経過日数）
    Overdue(i64),
    DueToday,
    /// まもなく支払い（残り日数）
    DueSoon(i64),
    Upcoming(i64),
}

/// 予算に対する使用状況
///
/// ユーザー情報がない場合はすべてゼロ値（`Default`）になる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetInsights {
    pub percentage_used: f64,
    /// 超過時は負の値
    pub remaining_budget: f64,
    pub overspending: bool,
    pub recommendations: Vec<String>,
}

/// 節約候補（同じサブスクリプションが複数の分類に入ることがある）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunities {
    pub unused_subscriptions: Vec<Subscription>,
    pub price_increases: Vec<Subscription>,
    pub trial_ending: Vec<Subscription>,
}

/// 支出サマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub total_monthly: f64,
    pub total_yearly: f64,
    pub average_per_day: f64,
    pub by_category: BTreeMap<Category, f64>,
    pub active_subscription_count: usize,
    pub budget_usage_percentage: f64,
}
