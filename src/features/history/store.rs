use super::models::{NewPayment, PaymentRecord};
use super::repository;
use crate::features::subscriptions::{Subscription, UpdateSubscriptionDto};
use crate::shared::database::SqliteStore;
use crate::shared::errors::AppResult;

/// 支払い履歴の永続化を担うストア
pub trait PaymentHistoryStore {
    /// 支払い履歴を新しい順に取得する
    fn list_payments(&self, user_id: &str) -> AppResult<Vec<PaymentRecord>>;

    /// サブスクリプションの更新と支払いの記録を不可分に行う
    fn record_payment(
        &self,
        user_id: &str,
        changes: &UpdateSubscriptionDto,
        payment: NewPayment,
    ) -> AppResult<(Subscription, PaymentRecord)>;
}

impl PaymentHistoryStore for SqliteStore {
    fn list_payments(&self, user_id: &str) -> AppResult<Vec<PaymentRecord>> {
        repository::find_all(self.connection(), user_id)
    }

    fn record_payment(
        &self,
        user_id: &str,
        changes: &UpdateSubscriptionDto,
        payment: NewPayment,
    ) -> AppResult<(Subscription, PaymentRecord)> {
        repository::record_payment(self.connection(), user_id, changes, payment)
    }
}
