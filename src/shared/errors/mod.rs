use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// 入力値のバリデーションエラー（状態は変更されない）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 対象のリソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 固定の周期以外の値が渡された場合のエラー（プログラミングエラー扱い）
    #[error("無効な請求周期です: {0}")]
    InvalidRecurrence(String),

    /// 永続化ストアでの失敗（ネットワーク・データベース）
    #[error("ストアエラー: {0}")]
    RemoteFailure(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（ストアの一時的なエラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（不変条件の違反）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::InvalidRecurrence(_) => "サブスクリプションの請求周期が不正です",
            AppError::RemoteFailure(_) => "データの保存中にエラーが発生しました",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::InvalidRecurrence(_) => ErrorSeverity::Critical,
            AppError::RemoteFailure(_) => ErrorSeverity::Medium,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
        }
    }

    /// 呼び出し側で再試行や入力修正により回復可能なエラーかどうか
    ///
    /// リトライは行わない。判断は呼び出し側に委ねる。
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::NotFound(_) | AppError::RemoteFailure(_)
        )
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 無効な請求周期エラーを作成するヘルパー関数
    pub fn invalid_recurrence<S: Into<String>>(value: S) -> Self {
        AppError::InvalidRecurrence(value.into())
    }

    /// ストア失敗エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `operation` - 失敗した操作名
    /// * `message` - エラーメッセージ
    pub fn remote_failure<S: Into<String>>(operation: S, message: S) -> Self {
        AppError::RemoteFailure(format!("{}: {}", operation.into(), message.into()))
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// AppErrorからStringへの変換（表示層での使用のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// rusqlite::ErrorからAppErrorへの変換
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::RemoteFailure(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
