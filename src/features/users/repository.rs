use super::models::{validate_budget, CreateUserDto, NotificationPreferences, UserProfile};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{normalize_string, parse_timestamp};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// ユーザーを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - ユーザーID（セッションで扱うID）
/// * `dto` - ユーザー作成用DTO
/// * `default_currency` - 通貨未指定時の値
/// * `default_timezone` - タイムゾーン未指定時の値
pub fn create(
    conn: &Connection,
    id: &str,
    dto: CreateUserDto,
    default_currency: &str,
    default_timezone: &str,
) -> AppResult<UserProfile> {
    dto.validate()?;

    let now = Utc::now();
    let user = UserProfile {
        id: id.to_string(),
        name: normalize_string(&dto.name),
        email: normalize_string(&dto.email),
        monthly_budget: dto.monthly_budget,
        currency: dto.currency.unwrap_or_else(|| default_currency.to_string()),
        timezone: dto.timezone.unwrap_or_else(|| default_timezone.to_string()),
        notification_preferences: NotificationPreferences::default(),
        created_at: now,
        updated_at: now,
    };

    let rows_affected = insert(conn, &user)?;
    if rows_affected == 0 {
        return Err(AppError::validation(format!("ID {id} のユーザーは既に登録されています")));
    }
    log::info!("ユーザーを作成しました: id={}", user.id);
    Ok(user)
}

/// ユーザーを登録する（既存の場合は何もせず0を返す）
fn insert(conn: &Connection, user: &UserProfile) -> AppResult<usize> {
    let prefs = &user.notification_preferences;
    let rows_affected = conn.execute(
        "INSERT OR IGNORE INTO users (id, name, email, monthly_budget, currency, timezone, reminder_days,
            price_increase_alerts, trial_end_alerts, overdue_alerts, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            user.id,
            user.name,
            user.email,
            user.monthly_budget,
            user.currency,
            user.timezone,
            serde_json::to_string(&prefs.reminder_days)?,
            prefs.price_increase_alerts,
            prefs.trial_end_alerts,
            prefs.overdue_alerts,
            user.created_at.to_rfc3339(),
            user.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(rows_affected)
}

/// IDでユーザーを取得する（存在しない場合はNone）
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<UserProfile>> {
    let row = conn
        .query_row(
            "SELECT id, name, email, monthly_budget, currency, timezone, reminder_days,
                price_increase_alerts, trial_end_alerts, overdue_alerts, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    (
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ),
                    (
                        row.get::<_, String>(6)?,
                        row.get::<_, i64>(7)? != 0,
                        row.get::<_, i64>(8)? != 0,
                        row.get::<_, i64>(9)? != 0,
                        row.get::<_, String>(10)?,
                        row.get::<_, String>(11)?,
                    ),
                ))
            },
        )
        .optional()?;

    let Some((
        (id, name, email, monthly_budget, currency, timezone),
        (reminder_days, price_increase_alerts, trial_end_alerts, overdue_alerts, created_at, updated_at),
    )) = row
    else {
        return Ok(None);
    };

    Ok(Some(UserProfile {
        id,
        name,
        email,
        monthly_budget,
        currency,
        timezone,
        notification_preferences: NotificationPreferences {
            reminder_days: serde_json::from_str(&reminder_days)?,
            price_increase_alerts,
            trial_end_alerts,
            overdue_alerts,
        },
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    }))
}

/// 月額予算を更新する
pub fn update_budget(conn: &Connection, id: &str, monthly_budget: f64) -> AppResult<UserProfile> {
    validate_budget(monthly_budget)?;

    let rows_affected = conn.execute(
        "UPDATE users SET monthly_budget = ?1, updated_at = ?2 WHERE id = ?3",
        params![monthly_budget, Utc::now().to_rfc3339(), id],
    )?;
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("ID {id} のユーザーが見つかりません")));
    }

    log::info!("月額予算を更新しました: user_id={id}, budget={monthly_budget}");
    find_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("ID {id} のユーザーが見つかりません")))
}

/// 通知設定を更新する
pub fn update_preferences(
    conn: &Connection,
    id: &str,
    preferences: &NotificationPreferences,
) -> AppResult<UserProfile> {
    let rows_affected = conn.execute(
        "UPDATE users SET reminder_days = ?1, price_increase_alerts = ?2, trial_end_alerts = ?3,
            overdue_alerts = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            serde_json::to_string(&preferences.reminder_days)?,
            preferences.price_increase_alerts,
            preferences.trial_end_alerts,
            preferences.overdue_alerts,
            Utc::now().to_rfc3339(),
            id,
        ],
    )?;
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("ID {id} のユーザーが見つかりません")));
    }

    find_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("ID {id} のユーザーが見つかりません")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::create_tables;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn dto() -> CreateUserDto {
        CreateUserDto {
            name: "Hanako".to_string(),
            email: "hanako@example.com".to_string(),
            monthly_budget: 500.0,
            currency: None,
            timezone: None,
        }
    }

    #[test]
    fn test_user_crud() {
        let conn = create_test_db();
        let user = create(&conn, "user-1", dto(), "JPY", "Asia/Tokyo").unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.currency, "JPY");
        assert_eq!(user.timezone, "Asia/Tokyo");

        let found = find_by_id(&conn, &user.id).unwrap().unwrap();
        assert_eq!(found, user);

        let updated = update_budget(&conn, &user.id, 800.0).unwrap();
        assert_eq!(updated.monthly_budget, 800.0);

        let prefs = NotificationPreferences {
            reminder_days: vec![7],
            overdue_alerts: false,
            ..NotificationPreferences::default()
        };
        let updated = update_preferences(&conn, &user.id, &prefs).unwrap();
        assert_eq!(updated.notification_preferences, prefs);
    }

    #[test]
    fn test_invalid_budget_is_rejected() {
        let conn = create_test_db();
        let user = create(&conn, "user-1", dto(), "JPY", "Asia/Tokyo").unwrap();

        assert!(matches!(
            update_budget(&conn, &user.id, -10.0),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            find_by_id(&conn, &user.id).unwrap().unwrap().monthly_budget,
            500.0
        );
    }

    #[test]
    fn test_duplicate_user_is_rejected() {
        let conn = create_test_db();
        create(&conn, "user-1", dto(), "JPY", "Asia/Tokyo").unwrap();
        assert!(matches!(
            create(&conn, "user-1", dto(), "USD", "UTC"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            find_by_id(&conn, "user-1").unwrap().unwrap().currency,
            "JPY"
        );
    }

    #[test]
    fn test_missing_user() {
        let conn = create_test_db();
        assert!(find_by_id(&conn, "nobody").unwrap().is_none());
        assert!(matches!(
            update_budget(&conn, "nobody", 100.0),
            Err(AppError::NotFound(_))
        ));
    }
}
