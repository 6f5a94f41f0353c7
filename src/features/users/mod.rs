/// ユーザー機能モジュール
///
/// 予算・通貨・タイムゾーン・通知設定などのユーザーコンテキストを扱います。
pub mod models;
pub mod repository;
pub mod store;

pub use models::{validate_budget, CreateUserDto, NotificationPreferences, UserProfile};
pub use store::UserStore;
