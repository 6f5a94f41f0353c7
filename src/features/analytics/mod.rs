/// 分析機能モジュール
///
/// 月額換算・集計・支払予定・予算インサイト・節約候補を計算します。
/// すべて入力に対する純粋な計算で、状態は持ちません。
pub mod calculations;
pub mod insights;
pub mod models;
pub mod schedule;

pub use calculations::{
    monthly_amount, monthly_payment_trend, normalize_monthly, spending_by_category,
    spending_summary, total_monthly_amount,
};
pub use insights::{budget_insights, savings_opportunities};
pub use models::{BudgetInsights, DueStatus, SavingsOpportunities, SpendingSummary};
pub use schedule::{
    active_free_trials, bills_due_soon, bills_due_within, days_until_due, upcoming_bills,
};
