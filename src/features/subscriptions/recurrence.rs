use super::models::{Recurrence, Subscription, UpdateSubscriptionDto};
use crate::shared::errors::{AppError, AppResult};
use chrono::{Days, Months, NaiveDate};

impl Recurrence {
    /// 基準日を1周期だけ進める
    ///
    /// # 引数
    /// * `anchor` - 基準日（開始日または現在の支払日）
    ///
    /// # 戻り値
    /// 次の支払日
    ///
    /// # 計算規則
    /// - Weekly: 7日後
    /// - Monthly: 翌月の同日（存在しない場合は月末に丸める）
    /// - Yearly: 翌年の同月同日（2/29は翌年2/28）
    pub fn advance(self, anchor: NaiveDate) -> AppResult<NaiveDate> {
        let next = match self {
            Recurrence::Weekly => anchor.checked_add_days(Days::new(7)),
            Recurrence::Monthly => anchor.checked_add_months(Months::new(1)),
            Recurrence::Yearly => anchor.checked_add_months(Months::new(12)),
        };

        next.ok_or_else(|| {
            AppError::validation(format!("日付が範囲外です: {anchor} + {self}"))
        })
    }
}

/// 周期名を指定して次の支払日を計算する
///
/// # 引数
/// * `anchor` - 基準日
/// * `recurrence` - 周期名（"Weekly" / "Monthly" / "Yearly"）
///
/// # 戻り値
/// 次の支払日、または未知の周期名の場合は `InvalidRecurrence`
pub fn next_due_date(anchor: NaiveDate, recurrence: &str) -> AppResult<NaiveDate> {
    recurrence.parse::<Recurrence>()?.advance(anchor)
}

/// 支払い記録による状態遷移を計算する
///
/// 支払い済みにすると同時に次の周期へ進み、新しい周期は未払いに戻る。
/// 戻り値の変更内容をストアが確定させるまでローカル状態は変更しない。
pub fn mark_paid_changes(subscription: &Subscription) -> AppResult<UpdateSubscriptionDto> {
    let next = subscription.recurrence.advance(subscription.next_due_date)?;

    Ok(UpdateSubscriptionDto {
        next_due_date: Some(next),
        is_paid: Some(false),
        ..UpdateSubscriptionDto::default()
    })
}
