pub mod features;
pub mod shared;

use features::tracker::SubscriptionTracker;
use log::{error, info};
use shared::config::{
    initialize_application, initialize_logging_system, load_environment_variables,
    log_initialization_complete, TrackerConfig,
};
use shared::database::SqliteStore;
use shared::errors::AppResult;

/// 起動時の動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 現在の状況をJSONで出力する
    Report,
    /// 通知を生成してから状況を出力する
    Scan,
}

impl Command {
    /// コマンドライン引数から動作を決める（未知の引数はReport）
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        match args.into_iter().nth(1).as_deref() {
            Some("scan") => Command::Scan,
            _ => Command::Report,
        }
    }
}

/// アプリケーションを実行する
///
/// # 処理内容
/// 1. 環境変数とログシステムの初期化
/// 2. データディレクトリとデータベースの準備
/// 3. トラッカーの読み込み（必要に応じて通知の生成）
/// 4. 状況レポートを標準出力へ出力
pub fn run(command: Command) -> AppResult<()> {
    load_environment_variables();
    initialize_logging_system();

    info!("アプリケーション初期化を開始します...");

    let config = TrackerConfig::from_env();
    let init = initialize_application(&config)?;

    let store = SqliteStore::open(&init.database_path).map_err(|e| {
        error!("データベースの初期化に失敗しました: {e}");
        e
    })?;
    log_initialization_complete(&init);

    let mut tracker = SubscriptionTracker::new(store, &config)?;
    tracker.load()?;

    if command == Command::Scan {
        let generated = tracker.scan_notifications()?;
        info!("通知スキャンが完了しました: {}件", generated.len());
    }

    let report = serde_json::to_string_pretty(&tracker.report())?;
    println!("{report}");
    Ok(())
}
