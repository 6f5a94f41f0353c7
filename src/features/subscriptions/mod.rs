/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連する機能を提供します：
/// - データモデル（固定カテゴリ・請求周期）と入力フォームの検証
/// - 請求周期による支払日の計算と支払い記録の状態遷移
/// - SQLiteリポジトリと永続化ストアのトレイト
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod store;

pub use models::{
    Category, CreateSubscriptionDto, NewSubscription, Recurrence, Subscription, SubscriptionForm,
    UpdateSubscriptionDto,
};
pub use recurrence::{mark_paid_changes, next_due_date};
pub use store::SubscriptionStore;
