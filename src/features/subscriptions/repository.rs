use super::models::{Category, NewSubscription, Recurrence, Subscription, UpdateSubscriptionDto};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{format_date, generate_id, parse_stored_date, parse_timestamp};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, amount, category, recurrence, next_due_date, start_date,
        is_paid, description, notes, is_free_trial, trial_end_date, previous_amount, auto_renew,
        reminder_days, created_at, updated_at
     FROM subscriptions";

/// データベースの1行（未検証の文字列を含む）
struct SubscriptionRow {
    id: String,
    user_id: String,
    name: String,
    amount: f64,
    category: String,
    recurrence: String,
    next_due_date: String,
    start_date: String,
    is_paid: bool,
    description: Option<String>,
    notes: Option<String>,
    is_free_trial: bool,
    trial_end_date: Option<String>,
    previous_amount: Option<f64>,
    auto_renew: Option<bool>,
    reminder_days: Option<String>,
    created_at: String,
    updated_at: String,
}

impl SubscriptionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            amount: row.get(3)?,
            category: row.get(4)?,
            recurrence: row.get(5)?,
            next_due_date: row.get(6)?,
            start_date: row.get(7)?,
            is_paid: row.get::<_, i64>(8)? != 0,
            description: row.get(9)?,
            notes: row.get(10)?,
            is_free_trial: row.get::<_, i64>(11)? != 0,
            trial_end_date: row.get(12)?,
            previous_amount: row.get(13)?,
            auto_renew: row.get::<_, Option<i64>>(14)?.map(|v| v != 0),
            reminder_days: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    /// 固定の列挙値・日付形式に変換する
    fn into_subscription(self) -> AppResult<Subscription> {
        let reminder_days = match self.reminder_days {
            Some(json) => Some(serde_json::from_str::<Vec<u32>>(&json)?),
            None => None,
        };

        Ok(Subscription {
            recurrence: self.recurrence.parse::<Recurrence>()?,
            category: self.category.parse::<Category>()?,
            next_due_date: parse_stored_date(&self.next_due_date)?,
            start_date: parse_stored_date(&self.start_date)?,
            trial_end_date: self
                .trial_end_date
                .as_deref()
                .map(parse_stored_date)
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            amount: self.amount,
            is_paid: self.is_paid,
            description: self.description,
            notes: self.notes,
            is_free_trial: self.is_free_trial,
            previous_amount: self.previous_amount,
            auto_renew: self.auto_renew,
            reminder_days,
        })
    }
}

fn reminder_days_json(days: &Option<Vec<u32>>) -> AppResult<Option<String>> {
    Ok(match days {
        Some(days) => Some(serde_json::to_string(days)?),
        None => None,
    })
}

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - ユーザーID
/// * `new_subscription` - 作成内容（IDはここで採番）
///
/// # 戻り値
/// 作成されたサブスクリプション、または失敗時はエラー
pub fn create(
    conn: &Connection,
    user_id: &str,
    new_subscription: NewSubscription,
) -> AppResult<Subscription> {
    let subscription = new_subscription.into_subscription(generate_id(), user_id);

    conn.execute(
        "INSERT INTO subscriptions (id, user_id, name, amount, category, recurrence, next_due_date,
            start_date, is_paid, description, notes, is_free_trial, trial_end_date, previous_amount,
            auto_renew, reminder_days, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            subscription.id,
            subscription.user_id,
            subscription.name,
            subscription.amount,
            subscription.category.as_str(),
            subscription.recurrence.as_str(),
            format_date(subscription.next_due_date),
            format_date(subscription.start_date),
            subscription.is_paid,
            subscription.description,
            subscription.notes,
            subscription.is_free_trial,
            subscription.trial_end_date.map(format_date),
            subscription.previous_amount,
            subscription.auto_renew,
            reminder_days_json(&subscription.reminder_days)?,
            subscription.created_at.to_rfc3339(),
            subscription.updated_at.to_rfc3339(),
        ],
    )?;

    log::info!("サブスクリプションを作成しました: id={}", subscription.id);
    Ok(subscription)
}

/// IDでサブスクリプションを取得する
///
/// # 戻り値
/// サブスクリプション、存在しない場合は `NotFound`
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Subscription> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            SubscriptionRow::from_row,
        )
        .optional()?;

    match row {
        Some(row) => row.into_subscription(),
        None => Err(AppError::NotFound(format!(
            "ID {id} のサブスクリプションが見つかりません"
        ))),
    }
}

/// ユーザーのサブスクリプション一覧を登録順に取得する
///
/// 周期やカテゴリが固定値以外の行はログに記録してスキップする。
pub fn find_all(conn: &Connection, user_id: &str) -> AppResult<Vec<Subscription>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY rowid"
    ))?;
    let rows = stmt
        .query_map(params![user_id], SubscriptionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut subscriptions = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id.clone();
        match row.into_subscription() {
            Ok(subscription) => subscriptions.push(subscription),
            Err(e) => {
                log::error!("不正なサブスクリプション行をスキップしました: id={id}, error={e}");
            }
        }
    }

    Ok(subscriptions)
}

/// サブスクリプションを部分更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `changes` - 更新内容
///
/// # 戻り値
/// 更新後のサブスクリプション
pub fn update(
    conn: &Connection,
    id: &str,
    changes: &UpdateSubscriptionDto,
) -> AppResult<Subscription> {
    let mut subscription = find_by_id(conn, id)?;
    subscription.apply(changes, Utc::now());
    write(conn, &subscription)?;
    Ok(subscription)
}

/// 可変項目をすべて書き戻す（id・開始日・作成日時は不変）
pub fn write(conn: &Connection, subscription: &Subscription) -> AppResult<()> {
    let rows_affected = conn.execute(
        "UPDATE subscriptions
         SET name = ?1, amount = ?2, category = ?3, recurrence = ?4, next_due_date = ?5,
             is_paid = ?6, description = ?7, notes = ?8, is_free_trial = ?9, trial_end_date = ?10,
             previous_amount = ?11, auto_renew = ?12, reminder_days = ?13, updated_at = ?14
         WHERE id = ?15",
        params![
            subscription.name,
            subscription.amount,
            subscription.category.as_str(),
            subscription.recurrence.as_str(),
            format_date(subscription.next_due_date),
            subscription.is_paid,
            subscription.description,
            subscription.notes,
            subscription.is_free_trial,
            subscription.trial_end_date.map(format_date),
            subscription.previous_amount,
            subscription.auto_renew,
            reminder_days_json(&subscription.reminder_days)?,
            subscription.updated_at.to_rfc3339(),
            subscription.id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "ID {} のサブスクリプションが見つかりません",
            subscription.id
        )));
    }

    Ok(())
}

/// サブスクリプションを削除する
pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let rows_affected = conn.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "ID {id} のサブスクリプションが見つかりません"
        )));
    }

    log::info!("サブスクリプションを削除しました: id={id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::create_tables;
    use chrono::NaiveDate;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_subscription(name: &str) -> NewSubscription {
        NewSubscription {
            name: name.to_string(),
            amount: 15.99,
            category: Category::Entertainment,
            recurrence: Recurrence::Monthly,
            next_due_date: date(2024, 2, 1),
            start_date: date(2024, 1, 1),
            created_at: Utc::now(),
            is_paid: false,
            description: Some("動画配信".to_string()),
            notes: None,
            is_free_trial: false,
            trial_end_date: None,
            auto_renew: Some(true),
            reminder_days: Some(vec![1, 3]),
        }
    }

    #[test]
    fn test_subscription_crud_operations() {
        let conn = create_test_db();

        let created = create(&conn, "user-1", new_subscription("Netflix")).unwrap();
        assert_eq!(created.id.len(), 21);
        assert_eq!(created.user_id, "user-1");

        let retrieved = find_by_id(&conn, &created.id).unwrap();
        assert_eq!(retrieved.name, "Netflix");
        assert_eq!(retrieved.next_due_date, date(2024, 2, 1));
        assert_eq!(retrieved.reminder_days, Some(vec![1, 3]));
        assert_eq!(retrieved.auto_renew, Some(true));

        let changes = UpdateSubscriptionDto {
            amount: Some(17.99),
            previous_amount: Some(15.99),
            ..UpdateSubscriptionDto::default()
        };
        let updated = update(&conn, &created.id, &changes).unwrap();
        assert_eq!(updated.amount, 17.99);
        assert_eq!(updated.previous_amount, Some(15.99));
        assert_eq!(updated.start_date, created.start_date);

        delete(&conn, &created.id).unwrap();
        assert!(matches!(
            find_by_id(&conn, &created.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_all_keeps_insertion_order_and_scopes_user() {
        let conn = create_test_db();
        create(&conn, "user-1", new_subscription("B")).unwrap();
        create(&conn, "user-1", new_subscription("A")).unwrap();
        create(&conn, "user-2", new_subscription("C")).unwrap();

        let names: Vec<String> = find_all(&conn, "user-1")
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_find_all_skips_invalid_recurrence_rows() {
        let conn = create_test_db();
        let valid = create(&conn, "user-1", new_subscription("Valid")).unwrap();
        let broken = create(&conn, "user-1", new_subscription("Broken")).unwrap();

        conn.execute(
            "UPDATE subscriptions SET recurrence = 'Daily' WHERE id = ?1",
            params![broken.id],
        )
        .unwrap();

        let subscriptions = find_all(&conn, "user-1").unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].id, valid.id);

        assert!(matches!(
            find_by_id(&conn, &broken.id),
            Err(AppError::InvalidRecurrence(_))
        ));
    }

    #[test]
    fn test_dates_after_2100_are_read_back() {
        let conn = create_test_db();
        let mut far = new_subscription("Domain");
        far.recurrence = Recurrence::Yearly;
        far.start_date = date(2100, 3, 1);
        far.next_due_date = date(2101, 3, 1);
        let created = create(&conn, "user-1", far).unwrap();

        assert_eq!(
            find_by_id(&conn, &created.id).unwrap().next_due_date,
            date(2101, 3, 1)
        );
        assert_eq!(find_all(&conn, "user-1").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let conn = create_test_db();
        assert!(matches!(delete(&conn, "missing"), Err(AppError::NotFound(_))));
        assert!(matches!(
            update(&conn, "missing", &UpdateSubscriptionDto::default()),
            Err(AppError::NotFound(_))
        ));
    }
}
