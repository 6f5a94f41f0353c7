use super::insights::budget_insights;
use super::models::SpendingSummary;
use crate::features::history::{MonthlyPaymentTotal, PaymentRecord};
use crate::features::subscriptions::{Category, Recurrence, Subscription};
use crate::shared::utils::local_date;
use chrono::{Datelike, Months, NaiveDate};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// 請求周期あたりの金額を月額換算する
///
/// # 換算規則
/// - Weekly: 金額 × 52 / 12
/// - Monthly: そのまま
/// - Yearly: 金額 / 12
///
/// 丸めは行わない（表示側の責務）。
pub fn normalize_monthly(amount: f64, recurrence: Recurrence) -> f64 {
    match recurrence {
        Recurrence::Weekly => amount * 52.0 / 12.0,
        Recurrence::Monthly => amount,
        Recurrence::Yearly => amount / 12.0,
    }
}

/// サブスクリプションの月額換算
pub fn monthly_amount(subscription: &Subscription) -> f64 {
    normalize_monthly(subscription.amount, subscription.recurrence)
}

/// 月額換算の合計（支払い状況に関わらずすべてを含む）
pub fn total_monthly_amount(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .fold(0.0, |acc, subscription| acc + monthly_amount(subscription))
}

/// カテゴリ別の月額換算合計
///
/// 8つのカテゴリすべてがキーとして含まれ、該当なしのカテゴリは0になる。
pub fn spending_by_category(subscriptions: &[Subscription]) -> BTreeMap<Category, f64> {
    let mut totals: BTreeMap<Category, f64> =
        Category::ALL.iter().map(|category| (*category, 0.0)).collect();

    for subscription in subscriptions {
        *totals.entry(subscription.category).or_insert(0.0) += monthly_amount(subscription);
    }

    totals
}

/// 支出サマリーを計算する
///
/// # 引数
/// * `subscriptions` - 対象のサブスクリプション
/// * `monthly_budget` - 月額予算（ユーザー情報がない場合はNone）
pub fn spending_summary(
    subscriptions: &[Subscription],
    monthly_budget: Option<f64>,
) -> SpendingSummary {
    let total_monthly = total_monthly_amount(subscriptions);

    let summary = SpendingSummary {
        total_monthly,
        total_yearly: total_monthly * 12.0,
        average_per_day: total_monthly / 30.0,
        by_category: spending_by_category(subscriptions),
        active_subscription_count: subscriptions.len(),
        budget_usage_percentage: budget_insights(total_monthly, monthly_budget).percentage_used,
    };

    log::debug!(
        "支出サマリーを計算しました: total_monthly={:.2}, count={}",
        summary.total_monthly,
        summary.active_subscription_count
    );
    summary
}

/// 直近の月別支払い合計
///
/// # 引数
/// * `history` - 支払い履歴
/// * `today` - 基準日
/// * `months` - 対象の月数（今月を含む）
/// * `timezone` - 支払日時を日付に変換するタイムゾーン
///
/// # 戻り値
/// 古い月から順に並んだ月別合計。支払いのない月は0。
pub fn monthly_payment_trend(
    history: &[PaymentRecord],
    today: NaiveDate,
    months: u32,
    timezone: Tz,
) -> Vec<MonthlyPaymentTotal> {
    let current_month = today.with_day(1).unwrap_or(today);

    (0..months)
        .rev()
        .filter_map(|offset| current_month.checked_sub_months(Months::new(offset)))
        .map(|month_start| {
            let amount = history
                .iter()
                .filter(|payment| {
                    let paid_on = local_date(payment.paid_at, timezone);
                    paid_on.year() == month_start.year() && paid_on.month() == month_start.month()
                })
                .map(|payment| payment.amount)
                .sum();
            MonthlyPaymentTotal {
                month: month_start.format("%Y-%m").to_string(),
                amount,
            }
        })
        .collect()
}
