/// 通知機能モジュール
///
/// 値上げ・トライアル終了・支払いリマインド・期限切れ・予算超過の
/// 通知イベントを生成し、ストア経由で保存します。
pub mod generator;
pub mod models;
pub mod repository;
pub mod store;

pub use generator::{
    check_for_budget_alert, check_for_due_reminders, check_for_overdue,
    check_for_price_increases, check_for_trial_ending,
};
pub use models::{NewNotification, Notification, NotificationType};
pub use store::NotificationStore;
