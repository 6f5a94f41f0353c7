pub mod nanoid;

use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

pub use self::nanoid::generate_id;

/// 日付文字列を解析する
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 解析された日付、または無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn parse_date(date_str: &str) -> AppResult<NaiveDate> {
    let date_str = date_str.trim();
    if date_str.len() != 10
        || date_str.chars().nth(4) != Some('-')
        || date_str.chars().nth(7) != Some('-')
    {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("無効な日付です"))?;

    if !(1900..=2100).contains(&date.year()) {
        return Err(AppError::validation(
            "日付は1900年から2100年の間で入力してください",
        ));
    }

    Ok(date)
}

/// 日付を保存用の文字列に変換する
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 保存済みの日付文字列（YYYY-MM-DD）を解析する
///
/// 入力フォーム向けの年の範囲チェックは行わない。
/// 周期計算で2100年を超えた日付もそのまま読み戻せる。
pub fn parse_stored_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| {
            AppError::validation(format!("保存された日付の形式が正しくありません: {value} ({e})"))
        })
}

/// RFC3339形式のタイムスタンプを解析する
pub fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::validation(format!("タイムスタンプの形式が正しくありません: {e}")))
}

/// 金額のバリデーション
///
/// # バリデーション規則
/// - 有限の正の数値であること
/// - 10桁以内であること
pub fn validate_amount(amount: f64) -> AppResult<()> {
    if !amount.is_finite() {
        return Err(AppError::validation("無効な金額です"));
    }

    if amount <= 0.0 {
        return Err(AppError::validation("金額は正の数値で入力してください"));
    }

    if amount >= 10_000_000_000.0 {
        return Err(AppError::validation("金額は10桁以内で入力してください"));
    }

    Ok(())
}

/// 入力フォームの金額文字列を解析する
///
/// # 引数
/// * `amount_str` - 金額文字列（前後の空白は無視）
///
/// # 戻り値
/// 検証済みの金額、または無効な場合はエラー
pub fn parse_amount(amount_str: &str) -> AppResult<f64> {
    validate_required_field(amount_str, "金額")?;

    let amount = amount_str
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::validation("金額は数値で入力してください"))?;

    validate_amount(amount)?;
    Ok(amount)
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 必須フィールドのバリデーション
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// サービス名のバリデーション
///
/// # バリデーション規則
/// - 必須項目であること
/// - 255文字以内であること
pub fn validate_name(name: &str) -> AppResult<()> {
    validate_required_field(name, "サービス名")?;
    validate_text_length(name.trim(), 255, "サービス名")?;
    Ok(())
}

/// 説明文のバリデーション（Noneの場合は有効）
pub fn validate_description(description: &Option<String>) -> AppResult<()> {
    if let Some(desc) = description {
        validate_text_length(desc, 500, "説明")?;
    }
    Ok(())
}

/// IANAタイムゾーン名を解析する
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::validation(format!("不明なタイムゾーンです: {name}")))
}

/// 指定タイムゾーンでの現在日付を取得する
///
/// # 引数
/// * `now` - 基準時刻（UTC）
/// * `timezone` - ユーザーのタイムゾーン
pub fn local_date(now: DateTime<Utc>, timezone: Tz) -> NaiveDate {
    now.with_timezone(&timezone).date_naive()
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 空文字列をNoneとして扱う
pub fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| normalize_string(&t)).filter(|t| !t.is_empty())
}

/// 金額を表示用にフォーマット
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}
