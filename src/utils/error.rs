use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Network error fetching {url}: {message}")]
    NetworkError { url: String, message: String },

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Persistence error on {path}: {message}")]
    PersistenceError { path: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid extraction pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Persistence,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        EtlError::NetworkError {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn persistence(path: impl Into<String>, message: impl ToString) -> Self {
        EtlError::PersistenceError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::NetworkError { .. } | EtlError::HttpClientError(_) => ErrorCategory::Network,
            EtlError::PersistenceError { .. } | EtlError::SerializationError(_) => {
                ErrorCategory::Persistence
            }
            EtlError::CsvError(_) | EtlError::SpreadsheetError(_) | EtlError::IoError(_) => {
                ErrorCategory::Output
            }
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::PatternError(_) => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Persistence => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "檢查網路連線；境外來源需要本機代理 (sources.proxy_url) 正在執行"
            }
            ErrorCategory::Persistence => "檢查快取目錄的讀寫權限，或刪除損壞的 JSON 快取後重跑",
            ErrorCategory::Output => "確認輸出檔案沒有被其他程式 (例如 Excel) 開啟",
            ErrorCategory::Configuration => "檢查設定檔內容與命令列參數",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::NetworkError { url, .. } => format!("無法取得頁面: {}", url),
            EtlError::PersistenceError { path, .. } => format!("快取檔案讀寫失敗: {}", path),
            EtlError::SpreadsheetError(_) | EtlError::CsvError(_) => {
                "輸出表格寫入失敗".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
