use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数を取得する（デフォルト値付き）
///
/// # 引数
/// * `var_name` - 環境変数名
/// * `default_value` - デフォルト値
///
/// # 戻り値
/// 環境変数の値、または見つからない場合はデフォルト値
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        std::env::var($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
        }
    }

    /// 開発環境かどうかを判定
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// 支払いトラッカーの動作設定
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// データベースファイルの明示的なパス（未指定時はアプリデータディレクトリ配下）
    pub database_path: Option<PathBuf>,
    /// セッションで扱うユーザーID
    pub user_id: String,
    /// 「まもなく支払い」とみなす日数
    pub due_soon_days: i64,
    /// ユーザー情報がない場合のタイムゾーン
    pub default_timezone: String,
    /// ユーザー情報がない場合の通貨
    pub default_currency: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            user_id: "local-user".to_string(),
            due_soon_days: 7,
            default_timezone: "Asia/Tokyo".to_string(),
            default_currency: "JPY".to_string(),
        }
    }
}

impl TrackerConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// トラッカー設定（数値のパースに失敗した項目はデフォルト値）
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_path = std::env::var("BILLPILOT_DATABASE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let user_id = crate::get_env_var_or_default!("BILLPILOT_USER_ID", defaults.user_id);

        let due_soon_days = crate::get_env_var_or_default!(
            "BILLPILOT_DUE_SOON_DAYS",
            defaults.due_soon_days
        )
        .parse::<i64>()
        .ok()
        .filter(|days| *days >= 0)
        .unwrap_or_else(|| {
            log::warn!(
                "BILLPILOT_DUE_SOON_DAYSのパースに失敗しました。デフォルト値{}日を使用します",
                defaults.due_soon_days
            );
            defaults.due_soon_days
        });

        let default_timezone = crate::get_env_var_or_default!(
            "BILLPILOT_DEFAULT_TIMEZONE",
            defaults.default_timezone
        );
        let default_currency = crate::get_env_var_or_default!(
            "BILLPILOT_DEFAULT_CURRENCY",
            defaults.default_currency
        );

        log::info!(
            "トラッカー設定: user_id={user_id}, due_soon_days={due_soon_days}, timezone={default_timezone}"
        );

        Self {
            database_path,
            user_id,
            due_soon_days,
            default_timezone,
            default_currency,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_billpilot.db"
/// - プロダクション環境: "billpilot.db"
pub fn get_database_filename(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "billpilot.db",
        Environment::Development => "dev_billpilot.db",
    }
}

/// 環境変数の読み込みを確認する
///
/// # 注意
/// 本番ビルドでは.envファイルは読み込まない
pub fn load_environment_variables() {
    if cfg!(debug_assertions) {
        match dotenv::dotenv() {
            Ok(path) => {
                eprintln!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                eprintln!("環境ファイルの読み込みに失敗: {e}");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化（開発環境ではモジュールパスも出力）
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let log_level = parse_log_level(&env_config.log_level);

    // 二重初期化はエラーになるためtry_initを使う
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(env_config.is_development())
        .format_target(false)
        .try_init();

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        env_config.log_level,
        env_config.environment
    );
}

fn parse_log_level(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}
