use super::models::{NewPayment, PaymentRecord};
use crate::features::subscriptions::{repository as subscription_repository, Subscription, UpdateSubscriptionDto};
use crate::shared::errors::AppResult;
use crate::shared::utils::{format_date, generate_id, parse_stored_date, parse_timestamp};
use chrono::Utc;
use rusqlite::{params, Connection};

/// 支払いを記録する
///
/// サブスクリプションの更新と支払い履歴の追加を1つのトランザクションで行う。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - ユーザーID
/// * `changes` - サブスクリプションへの変更（次回支払日の更新など）
/// * `payment` - 記録する支払い
///
/// # 戻り値
/// 更新後のサブスクリプションと作成された支払い履歴
pub fn record_payment(
    conn: &Connection,
    user_id: &str,
    changes: &UpdateSubscriptionDto,
    payment: NewPayment,
) -> AppResult<(Subscription, PaymentRecord)> {
    let tx = conn.unchecked_transaction()?;

    let mut subscription = subscription_repository::find_by_id(&tx, &payment.subscription_id)?;
    subscription.apply(changes, Utc::now());
    subscription_repository::write(&tx, &subscription)?;

    let record = payment.into_record(generate_id(), user_id);
    tx.execute(
        "INSERT INTO payments (id, user_id, subscription_id, subscription_name, amount, due_date, paid_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id,
            record.user_id,
            record.subscription_id,
            record.subscription_name,
            record.amount,
            format_date(record.due_date),
            record.paid_at.to_rfc3339(),
        ],
    )?;

    tx.commit()?;

    log::info!(
        "支払いを記録しました: subscription_id={}, due_date={}",
        record.subscription_id,
        record.due_date
    );
    Ok((subscription, record))
}

/// ユーザーの支払い履歴を新しい順に取得する
pub fn find_all(conn: &Connection, user_id: &str) -> AppResult<Vec<PaymentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, subscription_id, subscription_name, amount, due_date, paid_at
         FROM payments WHERE user_id = ?1 ORDER BY paid_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(
            |(id, user_id, subscription_id, subscription_name, amount, due_date, paid_at)| {
                Ok(PaymentRecord {
                    id,
                    user_id,
                    subscription_id,
                    subscription_name,
                    amount,
                    due_date: parse_stored_date(&due_date)?,
                    paid_at: parse_timestamp(&paid_at)?,
                })
            },
        )
        .collect()
}
