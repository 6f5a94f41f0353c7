use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    non_empty, normalize_string, parse_amount, parse_date, validate_amount, validate_description,
    validate_name,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// サブスクリプションのカテゴリ（固定の8種類、ユーザーによる追加は不可）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Entertainment,
    Utilities,
    Rent,
    Education,
    Health,
    Transport,
    Food,
    Other,
}

impl Category {
    /// すべてのカテゴリ（表示順）
    pub const ALL: [Category; 8] = [
        Category::Entertainment,
        Category::Utilities,
        Category::Rent,
        Category::Education,
        Category::Health,
        Category::Transport,
        Category::Food,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::Education => "Education",
            Category::Health => "Health",
            Category::Transport => "Transport",
            Category::Food => "Food",
            Category::Other => "Other",
        }
    }

    /// カテゴリごとの表示色（カテゴリから一意に決まる）
    pub fn color(&self) -> &'static str {
        match self {
            Category::Entertainment => "#8B5CF6",
            Category::Utilities => "#10B981",
            Category::Rent => "#F59E0B",
            Category::Education => "#3B82F6",
            Category::Health => "#EF4444",
            Category::Transport => "#6366F1",
            Category::Food => "#F97316",
            Category::Other => "#6B7280",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == value.trim())
            .ok_or_else(|| AppError::validation(format!("無効なカテゴリです: {value}")))
    }
}

/// 請求周期（金額はこの周期あたりの金額）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recurrence {
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub const ALL: [Recurrence; 3] = [Recurrence::Weekly, Recurrence::Monthly, Recurrence::Yearly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Recurrence::ALL
            .iter()
            .copied()
            .find(|recurrence| recurrence.as_str() == value.trim())
            .ok_or_else(|| AppError::invalid_recurrence(value))
    }
}

/// サブスクリプションデータモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: f64,                      // 請求周期あたりの金額（正の数値）
    pub category: Category,
    pub recurrence: Recurrence,
    pub next_due_date: NaiveDate,         // 次回支払日（支払い記録で進む）
    pub start_date: NaiveDate,            // 作成後は不変
    pub created_at: DateTime<Utc>,        // 作成後は不変
    pub updated_at: DateTime<Utc>,
    pub is_paid: bool,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub is_free_trial: bool,
    pub trial_end_date: Option<NaiveDate>,
    pub previous_amount: Option<f64>,     // 価格変更前の金額
    pub auto_renew: Option<bool>,
    pub reminder_days: Option<Vec<u32>>,  // 個別のリマインド日数（通知側で使用）
}

impl Subscription {
    /// 表示色（カテゴリから導出）
    pub fn color(&self) -> &'static str {
        self.category.color()
    }

    /// 値上げされているかどうか
    pub fn has_price_increase(&self) -> bool {
        matches!(self.previous_amount, Some(previous) if self.amount > previous)
    }

    /// レコード全体の整合性を検証する
    ///
    /// 部分更新を適用した結果に対して使う。各項目の単独チェックは
    /// `UpdateSubscriptionDto::validate` が行う。
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_amount(self.amount)?;
        if self.next_due_date < self.start_date {
            return Err(AppError::validation(
                "次回支払日は開始日以降の日付を指定してください",
            ));
        }
        if self.is_free_trial && self.trial_end_date.is_none() {
            return Err(AppError::validation(
                "無料トライアルには終了日を指定してください",
            ));
        }
        Ok(())
    }

    /// 部分更新を適用する
    ///
    /// # 引数
    /// * `changes` - 更新内容（Noneの項目は変更しない）
    /// * `now` - 更新時刻
    pub fn apply(&mut self, changes: &UpdateSubscriptionDto, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = normalize_string(name);
        }
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(recurrence) = changes.recurrence {
            self.recurrence = recurrence;
        }
        if let Some(next_due_date) = changes.next_due_date {
            self.next_due_date = next_due_date;
        }
        if let Some(is_paid) = changes.is_paid {
            self.is_paid = is_paid;
        }
        if let Some(description) = &changes.description {
            self.description = non_empty(Some(description.clone()));
        }
        if let Some(notes) = &changes.notes {
            self.notes = non_empty(Some(notes.clone()));
        }
        if let Some(is_free_trial) = changes.is_free_trial {
            self.is_free_trial = is_free_trial;
        }
        if let Some(trial_end_date) = changes.trial_end_date {
            self.trial_end_date = Some(trial_end_date);
        }
        if let Some(previous_amount) = changes.previous_amount {
            self.previous_amount = Some(previous_amount);
        }
        if let Some(auto_renew) = changes.auto_renew {
            self.auto_renew = Some(auto_renew);
        }
        if let Some(reminder_days) = &changes.reminder_days {
            self.reminder_days = Some(reminder_days.clone());
        }
        self.updated_at = now;
    }
}

/// ストアへ渡す新規サブスクリプション（IDはストアが採番）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewSubscription {
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub recurrence: Recurrence,
    pub next_due_date: NaiveDate,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub is_paid: bool,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub is_free_trial: bool,
    pub trial_end_date: Option<NaiveDate>,
    pub auto_renew: Option<bool>,
    pub reminder_days: Option<Vec<u32>>,
}

impl NewSubscription {
    /// 採番済みIDとユーザーIDを付与して完全なレコードにする
    pub fn into_subscription(self, id: String, user_id: &str) -> Subscription {
        Subscription {
            id,
            user_id: user_id.to_string(),
            name: self.name,
            amount: self.amount,
            category: self.category,
            recurrence: self.recurrence,
            next_due_date: self.next_due_date,
            start_date: self.start_date,
            created_at: self.created_at,
            updated_at: self.created_at,
            is_paid: self.is_paid,
            description: self.description,
            notes: self.notes,
            is_free_trial: self.is_free_trial,
            trial_end_date: self.trial_end_date,
            previous_amount: None,
            auto_renew: self.auto_renew,
            reminder_days: self.reminder_days,
        }
    }
}

/// サブスクリプション作成用DTO
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateSubscriptionDto {
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub recurrence: Recurrence,
    pub start_date: NaiveDate,
    /// 未指定の場合は開始日から1周期進めた日付
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_free_trial: bool,
    #[serde(default)]
    pub trial_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub auto_renew: Option<bool>,
    #[serde(default)]
    pub reminder_days: Option<Vec<u32>>,
}

impl CreateSubscriptionDto {
    /// 最小限の項目でDTOを作成する
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: Category,
        recurrence: Recurrence,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            category,
            recurrence,
            start_date,
            next_due_date: None,
            description: None,
            notes: None,
            is_free_trial: false,
            trial_end_date: None,
            auto_renew: None,
            reminder_days: None,
        }
    }

    /// 作成内容を検証する
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_amount(self.amount)?;
        validate_description(&self.description)?;
        if let Some(next_due_date) = self.next_due_date {
            if next_due_date < self.start_date {
                return Err(AppError::validation(
                    "次回支払日は開始日以降の日付を指定してください",
                ));
            }
        }
        if self.is_free_trial && self.trial_end_date.is_none() {
            return Err(AppError::validation(
                "無料トライアルには終了日を指定してください",
            ));
        }
        Ok(())
    }
}

/// サブスクリプション更新用DTO（部分更新）
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct UpdateSubscriptionDto {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub recurrence: Option<Recurrence>,
    pub next_due_date: Option<NaiveDate>,
    pub is_paid: Option<bool>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub is_free_trial: Option<bool>,
    pub trial_end_date: Option<NaiveDate>,
    pub previous_amount: Option<f64>,
    pub auto_renew: Option<bool>,
    pub reminder_days: Option<Vec<u32>>,
}

impl UpdateSubscriptionDto {
    /// 更新内容を検証する
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(previous_amount) = self.previous_amount {
            validate_amount(previous_amount)?;
        }
        validate_description(&self.description)?;
        Ok(())
    }

    /// 変更項目がないかどうか
    pub fn is_empty(&self) -> bool {
        *self == UpdateSubscriptionDto::default()
    }
}

/// 入力フォームからの生の値
///
/// 表示層から渡される文字列をそのまま保持し、検証後にDTOへ変換する。
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SubscriptionForm {
    pub name: String,
    pub amount: String,
    pub category: String,
    pub recurrence: String,
    #[serde(default)]
    pub description: String,
    /// 編集画面でのみ使用（YYYY-MM-DD）
    #[serde(default)]
    pub next_due_date: Option<String>,
}

impl SubscriptionForm {
    /// 新規作成用のDTOに変換する
    ///
    /// # 引数
    /// * `start_date` - 開始日（通常は今日）
    ///
    /// # 戻り値
    /// 検証済みの作成用DTO、または入力が不正な場合はバリデーションエラー
    pub fn into_create_dto(self, start_date: NaiveDate) -> AppResult<CreateSubscriptionDto> {
        validate_name(&self.name)?;
        let amount = parse_amount(&self.amount)?;
        let category = self.category.parse::<Category>()?;
        let recurrence = parse_recurrence_input(&self.recurrence)?;

        let mut dto = CreateSubscriptionDto::new(
            normalize_string(&self.name),
            amount,
            category,
            recurrence,
            start_date,
        );
        dto.description = non_empty(Some(self.description));
        dto.next_due_date = self.next_due_date.as_deref().map(parse_date).transpose()?;
        dto.validate()?;
        Ok(dto)
    }

    /// 編集用のDTOに変換する
    pub fn into_update_dto(self) -> AppResult<UpdateSubscriptionDto> {
        validate_name(&self.name)?;
        let amount = parse_amount(&self.amount)?;
        let category = self.category.parse::<Category>()?;
        let recurrence = parse_recurrence_input(&self.recurrence)?;

        let dto = UpdateSubscriptionDto {
            name: Some(normalize_string(&self.name)),
            amount: Some(amount),
            category: Some(category),
            recurrence: Some(recurrence),
            description: Some(normalize_string(&self.description)),
            next_due_date: self.next_due_date.as_deref().map(parse_date).transpose()?,
            ..UpdateSubscriptionDto::default()
        };
        dto.validate()?;
        Ok(dto)
    }
}

/// フォーム入力の周期名はユーザー入力なのでバリデーションエラーとして扱う
fn parse_recurrence_input(value: &str) -> AppResult<Recurrence> {
    value
        .parse::<Recurrence>()
        .map_err(|_| AppError::validation(format!("無効な請求周期です: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_subscription() -> Subscription {
        NewSubscription {
            name: "Netflix".to_string(),
            amount: 15.99,
            category: Category::Entertainment,
            recurrence: Recurrence::Monthly,
            next_due_date: date(2024, 2, 1),
            start_date: date(2024, 1, 1),
            created_at: Utc::now(),
            is_paid: false,
            description: None,
            notes: None,
            is_free_trial: false,
            trial_end_date: None,
            auto_renew: None,
            reminder_days: None,
        }
        .into_subscription("sub-1".to_string(), "user-1")
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" Rent ".parse::<Category>().unwrap(), Category::Rent);
        assert!(matches!(
            "Gaming".parse::<Category>(),
            Err(AppError::Validation(_))
        ));
        assert_eq!(Category::ALL.len(), 8);
    }

    #[test]
    fn test_category_color_is_fixed_per_category() {
        assert_eq!(Category::Entertainment.color(), "#8B5CF6");
        assert_eq!(Category::Other.color(), "#6B7280");
        let sub = sample_subscription();
        assert_eq!(sub.color(), Category::Entertainment.color());
    }

    #[test]
    fn test_recurrence_parsing() {
        assert_eq!("Weekly".parse::<Recurrence>().unwrap(), Recurrence::Weekly);
        assert!(matches!(
            "Daily".parse::<Recurrence>(),
            Err(AppError::InvalidRecurrence(_))
        ));
    }

    #[test]
    fn test_unknown_category_rejected_at_deserialization() {
        let json = r#"{
            "name": "Gym",
            "amount": 30.0,
            "category": "Fitness",
            "recurrence": "Monthly",
            "start_date": "2024-01-01"
        }"#;
        assert!(serde_json::from_str::<CreateSubscriptionDto>(json).is_err());
    }

    #[test]
    fn test_create_dto_deserialization_defaults() {
        let json = r#"{
            "name": "Spotify",
            "amount": 9.99,
            "category": "Entertainment",
            "recurrence": "Monthly",
            "start_date": "2024-01-01"
        }"#;
        let dto: CreateSubscriptionDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.category, Category::Entertainment);
        assert!(!dto.is_free_trial);
        assert_eq!(dto.next_due_date, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_dto_validation() {
        let mut dto = CreateSubscriptionDto::new(
            "Netflix",
            -5.0,
            Category::Entertainment,
            Recurrence::Monthly,
            date(2024, 1, 1),
        );
        assert!(matches!(dto.validate(), Err(AppError::Validation(_))));

        dto.amount = 15.99;
        dto.name = "  ".to_string();
        assert!(matches!(dto.validate(), Err(AppError::Validation(_))));

        dto.name = "Netflix".to_string();
        dto.is_free_trial = true;
        assert!(dto.validate().is_err());

        dto.trial_end_date = Some(date(2024, 1, 14));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut sub = sample_subscription();
        let changes = UpdateSubscriptionDto {
            amount: Some(17.99),
            category: Some(Category::Other),
            description: Some("  ".to_string()),
            ..UpdateSubscriptionDto::default()
        };

        sub.apply(&changes, Utc::now());

        assert_eq!(sub.amount, 17.99);
        assert_eq!(sub.category, Category::Other);
        assert_eq!(sub.color(), "#6B7280");
        assert_eq!(sub.description, None);
        assert_eq!(sub.name, "Netflix");
    }

    #[test]
    fn test_validate_checks_applied_record() {
        let mut sub = sample_subscription();
        assert!(sub.validate().is_ok());

        let trial_only = UpdateSubscriptionDto {
            is_free_trial: Some(true),
            ..UpdateSubscriptionDto::default()
        };
        assert!(trial_only.validate().is_ok());
        sub.apply(&trial_only, Utc::now());
        assert!(matches!(sub.validate(), Err(AppError::Validation(_))));

        let mut early = sample_subscription();
        early.apply(
            &UpdateSubscriptionDto {
                next_due_date: Some(date(2023, 12, 31)),
                ..UpdateSubscriptionDto::default()
            },
            Utc::now(),
        );
        assert!(matches!(early.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_has_price_increase() {
        let mut sub = sample_subscription();
        assert!(!sub.has_price_increase());

        sub.previous_amount = Some(12.99);
        assert!(sub.has_price_increase());

        sub.previous_amount = Some(19.99);
        assert!(!sub.has_price_increase());
    }

    #[test]
    fn test_form_into_create_dto() {
        let form = SubscriptionForm {
            name: "  Netflix ".to_string(),
            amount: "15.99".to_string(),
            category: "Entertainment".to_string(),
            recurrence: "Monthly".to_string(),
            description: "".to_string(),
            next_due_date: None,
        };

        let dto = form.into_create_dto(date(2024, 1, 1)).unwrap();
        assert_eq!(dto.name, "Netflix");
        assert_eq!(dto.amount, 15.99);
        assert_eq!(dto.description, None);
    }

    #[test]
    fn test_form_rejects_invalid_input() {
        let base = SubscriptionForm {
            name: "Netflix".to_string(),
            amount: "15.99".to_string(),
            category: "Entertainment".to_string(),
            recurrence: "Monthly".to_string(),
            ..SubscriptionForm::default()
        };

        let mut form = base.clone();
        form.amount = "abc".to_string();
        assert!(matches!(
            form.into_create_dto(date(2024, 1, 1)),
            Err(AppError::Validation(_))
        ));

        let mut form = base.clone();
        form.name = "".to_string();
        assert!(form.into_create_dto(date(2024, 1, 1)).is_err());

        let mut form = base.clone();
        form.recurrence = "Daily".to_string();
        assert!(matches!(
            form.into_create_dto(date(2024, 1, 1)),
            Err(AppError::Validation(_))
        ));

        let mut form = base;
        form.category = "Gaming".to_string();
        assert!(form.into_update_dto().is_err());
    }

    #[test]
    fn test_update_dto_is_empty() {
        assert!(UpdateSubscriptionDto::default().is_empty());
        let dto = UpdateSubscriptionDto {
            is_paid: Some(true),
            ..UpdateSubscriptionDto::default()
        };
        assert!(!dto.is_empty());
    }
}
