use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// 執行設定；設定檔中省略的鍵都使用內建預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub crawl: CrawlConfig,
    pub load: LoadConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub entry_url: String,
    /// Base for the relative province and school links.
    pub origin: String,
    pub moe_985_url: String,
    pub moe_211_url: String,
    pub discipline_url: String,
    pub proxy_url: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            entry_url: "https://zt.zjzs.net/xk2024/".to_string(),
            origin: "https://zt.zjzs.net/xk2024/".to_string(),
            moe_985_url: "http://www.moe.gov.cn/srcsite/A22/s7065/200612/t20061206_128833.html"
                .to_string(),
            moe_211_url: "http://www.moe.gov.cn/srcsite/A22/s7065/200512/t20051223_82762.html"
                .to_string(),
            discipline_url: "https://zh.wikipedia.org/zh-hans/%E7%AC%AC%E4%B8%80%E8%BD%AE%E4%B8%96%E7%95%8C%E4%B8%80%E6%B5%81%E5%A4%A7%E5%AD%A6%E5%92%8C%E4%B8%80%E6%B5%81%E5%AD%A6%E7%A7%91%E5%BB%BA%E8%AE%BE%E9%AB%98%E6%A0%A1%E5%8F%8A%E5%BB%BA%E8%AE%BE%E5%AD%A6%E7%A7%91%E5%90%8D%E5%8D%95".to_string(),
            proxy_url: "http://127.0.0.1:4780".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dataset: String,
    pub list_985: String,
    pub list_211: String,
    pub disciplines: String,
    pub failures: String,
    /// Ignore present cache files and fetch everything again.
    pub refresh: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dataset: "majors.json".to_string(),
            list_985: "985.json".to_string(),
            list_211: "211.json".to_string(),
            disciplines: "levelmajors.json".to_string(),
            failures: "crawl_failures.json".to_string(),
            refresh: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Abort on the first failed page instead of recording it.
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub xlsx_filename: String,
    pub csv_filename: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            output_formats: vec![OutputFormat::Xlsx],
            xlsx_filename: "2024年普通高校招生专业选考科目要求.xlsx".to_string(),
            csv_filename: "2024年普通高校招生专业选考科目要求.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PROXY_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("sources.entry_url", &self.sources.entry_url)?;
        validation::validate_base_url("sources.origin", &self.sources.origin)?;
        validation::validate_url("sources.moe_985_url", &self.sources.moe_985_url)?;
        validation::validate_url("sources.moe_211_url", &self.sources.moe_211_url)?;
        validation::validate_url("sources.discipline_url", &self.sources.discipline_url)?;
        validation::validate_url("sources.proxy_url", &self.sources.proxy_url)?;

        validation::validate_file_extension("cache.dataset", &self.cache.dataset, "json")?;
        validation::validate_file_extension("cache.list_985", &self.cache.list_985, "json")?;
        validation::validate_file_extension("cache.list_211", &self.cache.list_211, "json")?;
        validation::validate_file_extension("cache.disciplines", &self.cache.disciplines, "json")?;
        validation::validate_file_extension("cache.failures", &self.cache.failures, "json")?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required (xlsx, csv)".to_string(),
            });
        }
        validation::validate_file_extension("load.xlsx_filename", &self.load.xlsx_filename, "xlsx")?;
        validation::validate_file_extension("load.csv_filename", &self.load.csv_filename, "csv")?;

        Ok(())
    }

    pub fn output_path(&self) -> &str {
        &self.load.output_path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
