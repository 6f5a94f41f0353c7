use super::models::{NewSubscription, Subscription, UpdateSubscriptionDto};
use super::repository;
use crate::shared::database::SqliteStore;
use crate::shared::errors::AppResult;

/// サブスクリプションの永続化を担うストア
///
/// トラッカーはこのトレイト経由でのみ永続化を行い、応答を受け取ってから
/// メモリ上のコレクションを更新する。
pub trait SubscriptionStore {
    /// ユーザーのサブスクリプションを登録順に取得する
    fn list(&self, user_id: &str) -> AppResult<Vec<Subscription>>;

    /// サブスクリプションを作成し、IDを採番したレコードを返す
    fn create(&self, user_id: &str, subscription: NewSubscription) -> AppResult<Subscription>;

    /// 部分更新を適用し、更新後のレコードを返す
    fn update(&self, id: &str, changes: &UpdateSubscriptionDto) -> AppResult<Subscription>;

    /// サブスクリプションを削除する
    fn delete(&self, id: &str) -> AppResult<()>;
}

impl SubscriptionStore for SqliteStore {
    fn list(&self, user_id: &str) -> AppResult<Vec<Subscription>> {
        repository::find_all(self.connection(), user_id)
    }

    fn create(&self, user_id: &str, subscription: NewSubscription) -> AppResult<Subscription> {
        repository::create(self.connection(), user_id, subscription)
    }

    fn update(&self, id: &str, changes: &UpdateSubscriptionDto) -> AppResult<Subscription> {
        repository::update(self.connection(), id, changes)
    }

    fn delete(&self, id: &str) -> AppResult<()> {
        repository::delete(self.connection(), id)
    }
}
