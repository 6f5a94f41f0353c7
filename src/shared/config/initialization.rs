use super::environment::{get_database_filename, get_environment, Environment, TrackerConfig};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// アプリケーションデータディレクトリのパス
    pub app_data_dir: PathBuf,
    /// データベースファイルのパス
    pub database_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `config` - トラッカー設定
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. データベースファイルパスの決定（設定値 > アプリデータディレクトリ）
/// 2. 親ディレクトリの作成
/// 3. 初回起動の判定
pub fn initialize_application(config: &TrackerConfig) -> AppResult<InitializationResult> {
    let environment = get_environment();

    let database_path = match &config.database_path {
        Some(path) => path.clone(),
        None => default_app_data_dir()?.join(get_database_filename(environment.clone())),
    };

    let app_data_dir = database_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    ensure_directory(&app_data_dir)?;

    // 初回起動かどうかを判定（データベースファイルの存在で判定）
    let is_first_run = !database_path.exists();

    if is_first_run {
        log_first_run_initialization(&environment, &app_data_dir, &database_path);
    }

    Ok(InitializationResult {
        is_first_run,
        app_data_dir,
        database_path,
        environment,
    })
}

/// OS標準のデータディレクトリ配下のアプリケーションディレクトリを取得する
fn default_app_data_dir() -> AppResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("billpilot"))
        .ok_or_else(|| AppError::configuration("アプリデータディレクトリの取得に失敗しました"))
}

/// ディレクトリを確実に作成する
fn ensure_directory(dir: &Path) -> AppResult<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::configuration(format!("アプリデータディレクトリの作成に失敗: {e}"))
    })?;

    log::info!("アプリケーションデータディレクトリを作成しました: {dir:?}");
    Ok(())
}

fn log_first_run_initialization(
    environment: &Environment,
    app_data_dir: &Path,
    database_path: &Path,
) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("アプリデータディレクトリ: {app_data_dir:?}");
    log::info!("データベースファイル: {database_path:?}");
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("初回起動の初期化が正常に完了しました");
    } else {
        log::info!("アプリケーション起動完了（既存データベースを使用）");
    }
    log::info!("環境: {:?}", result.environment);
    log::info!("データベース: {:?}", result.database_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_application_with_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");
        let config = TrackerConfig {
            database_path: Some(db_path.clone()),
            ..TrackerConfig::default()
        };

        let result = initialize_application(&config).unwrap();

        assert!(result.is_first_run);
        assert_eq!(result.database_path, db_path);
        assert!(result.app_data_dir.exists());
    }

    #[test]
    fn test_existing_database_is_not_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("existing.db");
        std::fs::write(&db_path, b"").unwrap();
        let config = TrackerConfig {
            database_path: Some(db_path),
            ..TrackerConfig::default()
        };

        let result = initialize_application(&config).unwrap();
        assert!(!result.is_first_run);
    }

    #[test]
    fn test_log_initialization_complete() {
        let result = InitializationResult {
            is_first_run: true,
            app_data_dir: PathBuf::from("/tmp/test"),
            database_path: PathBuf::from("/tmp/test/billpilot.db"),
            environment: Environment::Development,
        };

        // ログ出力関数が正常に実行されることを確認（パニックしない）
        log_initialization_complete(&result);
    }
}
