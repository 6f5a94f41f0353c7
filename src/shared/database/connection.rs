use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を開き、テーブルを作成する
///
/// # 引数
/// * `database_path` - データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
pub fn initialize_database(database_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(database_path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {database_path:?}");

    Ok(conn)
}

/// テスト・一時利用向けのインメモリデータベースを開く
pub fn initialize_in_memory_database() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    create_tables(&conn)?;
    Ok(conn)
}

/// データベーステーブルを作成する（既存テーブルはそのまま）
///
/// # 引数
/// * `conn` - データベース接続
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_users_table(conn)?;
    create_subscriptions_table(conn)?;
    create_payments_table(conn)?;
    create_notifications_table(conn)?;
    create_indexes(conn)?;

    log::debug!("テーブル作成を確認しました");
    Ok(())
}

fn create_users_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            monthly_budget REAL NOT NULL CHECK(monthly_budget > 0),
            currency TEXT NOT NULL,
            timezone TEXT NOT NULL,
            reminder_days TEXT NOT NULL DEFAULT '[1,3]',
            price_increase_alerts INTEGER NOT NULL DEFAULT 1,
            trial_end_alerts INTEGER NOT NULL DEFAULT 1,
            overdue_alerts INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn create_subscriptions_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK(amount > 0),
            category TEXT NOT NULL,
            recurrence TEXT NOT NULL,
            next_due_date TEXT NOT NULL,
            start_date TEXT NOT NULL,
            is_paid INTEGER NOT NULL DEFAULT 0,
            description TEXT,
            notes TEXT,
            is_free_trial INTEGER NOT NULL DEFAULT 0,
            trial_end_date TEXT,
            previous_amount REAL,
            auto_renew INTEGER,
            reminder_days TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn create_payments_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            subscription_id TEXT NOT NULL,
            subscription_name TEXT NOT NULL,
            amount REAL NOT NULL,
            due_date TEXT NOT NULL,
            paid_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn create_notifications_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            notification_type TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            subscription_id TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            scheduled_for TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_user ON subscriptions(user_id);
         CREATE INDEX IF NOT EXISTS idx_payments_user ON payments(user_id, paid_at);
         CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at);",
    )?;
    Ok(())
}
