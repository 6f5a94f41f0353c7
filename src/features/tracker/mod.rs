/// トラッカー機能モジュール
///
/// 1ユーザー分のサブスクリプション・支払い履歴・通知・予算を保持する
/// 状態コンテナを提供します。永続化は注入されたストアに委ねます。
pub mod report;
pub mod service;
pub mod store;


pub use report::TrackerReport;
pub use service::SubscriptionTracker;
pub use store::TrackerStore;
