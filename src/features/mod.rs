/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・計算・データベース操作・ストアを
/// まとめた自己完結型のユニットです。`tracker` がこれらを束ねる状態コンテナです。
pub mod analytics;
pub mod history;
pub mod notifications;
pub mod subscriptions;
pub mod tracker;
pub mod users;
