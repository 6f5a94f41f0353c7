pub mod connection;

use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

pub use connection::{create_tables, initialize_database, initialize_in_memory_database};

/// SQLiteを使ったローカル永続化ストア
///
/// 各機能のストアトレイト（サブスクリプション・履歴・通知・ユーザー）を実装する。
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// データベースファイルを開く
    pub fn open(database_path: &Path) -> AppResult<Self> {
        Ok(Self {
            conn: initialize_database(database_path)?,
        })
    }

    /// インメモリデータベースを開く
    pub fn open_in_memory() -> AppResult<Self> {
        Ok(Self {
            conn: initialize_in_memory_database()?,
        })
    }

    /// 内部のデータベース接続を取得する
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
