use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{parse_timezone, validate_required_field, validate_text_length};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// 通知設定
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NotificationPreferences {
    /// 支払日の何日前にリマインドするか
    pub reminder_days: Vec<u32>,
    pub price_increase_alerts: bool,
    pub trial_end_alerts: bool,
    pub overdue_alerts: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            reminder_days: vec![1, 3],
            price_increase_alerts: true,
            trial_end_alerts: true,
            overdue_alerts: true,
        }
    }
}

/// ユーザー（予算コンテキスト）データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub monthly_budget: f64,  // 月額のサブスクリプション予算（正の数値）
    pub currency: String,     // 表示用。計算はすべて同一通貨とみなす
    pub timezone: String,     // IANAタイムゾーン名
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// ユーザーのタイムゾーンを取得する
    pub fn tz(&self) -> AppResult<Tz> {
        parse_timezone(&self.timezone)
    }
}

/// ユーザー作成用DTO
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub monthly_budget: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl CreateUserDto {
    /// 作成内容を検証する
    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.name, "名前")?;
        validate_text_length(&self.name, 100, "名前")?;
        validate_email(&self.email)?;
        validate_budget(self.monthly_budget)?;
        if let Some(timezone) = &self.timezone {
            parse_timezone(timezone)?;
        }
        Ok(())
    }
}

/// 予算のバリデーション
///
/// # バリデーション規則
/// - 有限の正の数値であること
pub fn validate_budget(budget: f64) -> AppResult<()> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(AppError::validation("予算は正の数値で入力してください"));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    validate_required_field(email, "メールアドレス")?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation("メールアドレスの形式が正しくありません")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> CreateUserDto {
        CreateUserDto {
            name: "山田太郎".to_string(),
            email: "taro@example.com".to_string(),
            monthly_budget: 500.0,
            currency: None,
            timezone: Some("Asia/Tokyo".to_string()),
        }
    }

    #[test]
    fn test_create_user_dto_validation() {
        assert!(dto().validate().is_ok());

        let mut invalid = dto();
        invalid.monthly_budget = 0.0;
        assert!(invalid.validate().is_err());

        let mut invalid = dto();
        invalid.email = "taro".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = dto();
        invalid.timezone = Some("Nowhere/City".to_string());
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_validate_budget() {
        assert!(validate_budget(0.01).is_ok());
        assert!(validate_budget(-1.0).is_err());
        assert!(validate_budget(f64::NAN).is_err());
    }

    #[test]
    fn test_default_preferences() {
        let prefs = NotificationPreferences::default();
        assert_eq!(prefs.reminder_days, vec![1, 3]);
        assert!(prefs.price_increase_alerts && prefs.trial_end_alerts && prefs.overdue_alerts);
    }
}
