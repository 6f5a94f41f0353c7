/// 支払い履歴機能モジュール
///
/// 支払い記録（次回支払日の更新と履歴追加）と履歴の取得を提供します。
pub mod models;
pub mod repository;
pub mod store;

pub use models::{MonthlyPaymentTotal, NewPayment, PaymentRecord};
pub use store::PaymentHistoryStore;
