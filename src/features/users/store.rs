use super::models::{CreateUserDto, NotificationPreferences, UserProfile};
use super::repository;
use crate::shared::database::SqliteStore;
use crate::shared::errors::AppResult;

/// ユーザー（予算コンテキスト）の永続化を担うストア
pub trait UserStore {
    /// ユーザーを取得する（存在しない場合はNone）
    fn find_user(&self, user_id: &str) -> AppResult<Option<UserProfile>>;

    /// ユーザーを登録する
    ///
    /// 通貨・タイムゾーンが未指定の場合は既定値を使う。
    fn create_user(
        &self,
        user_id: &str,
        dto: CreateUserDto,
        default_currency: &str,
        default_timezone: &str,
    ) -> AppResult<UserProfile>;

    /// 月額予算を更新する
    fn update_budget(&self, user_id: &str, monthly_budget: f64) -> AppResult<UserProfile>;

    /// 通知設定を更新する
    fn update_preferences(
        &self,
        user_id: &str,
        preferences: &NotificationPreferences,
    ) -> AppResult<UserProfile>;
}

impl UserStore for SqliteStore {
    fn find_user(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        repository::find_by_id(self.connection(), user_id)
    }

    fn create_user(
        &self,
        user_id: &str,
        dto: CreateUserDto,
        default_currency: &str,
        default_timezone: &str,
    ) -> AppResult<UserProfile> {
        repository::create(
            self.connection(),
            user_id,
            dto,
            default_currency,
            default_timezone,
        )
    }

    fn update_budget(&self, user_id: &str, monthly_budget: f64) -> AppResult<UserProfile> {
        repository::update_budget(self.connection(), user_id, monthly_budget)
    }

    fn update_preferences(
        &self,
        user_id: &str,
        preferences: &NotificationPreferences,
    ) -> AppResult<UserProfile> {
        repository::update_preferences(self.connection(), user_id, preferences)
    }
}
