pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use crate::utils::error::{EtlError, Result};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "xk-config.toml";

/// 命令列參數；指定的值覆蓋設定檔
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "xk-export")]
#[command(about = "Export subject requirements of university majors to a spreadsheet")]
pub struct CliConfig {
    /// TOML config file [default: xk-config.toml, skipped when absent]
    #[arg(long, short)]
    pub config: Option<String>,

    #[arg(long, help = "Directory for the exported files")]
    pub output_path: Option<String>,

    #[arg(long, help = "Ignore cache files and fetch everything again")]
    pub refresh: bool,

    #[arg(long, help = "Abort on the first failed page")]
    pub fail_fast: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// An explicitly given file must exist; the default one is optional.
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) if !Path::new(path).is_file() => {
                return Err(EtlError::MissingConfigError {
                    field: format!("--config {}", path),
                });
            }
            Some(path) => TomlConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                TomlConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("{} not found, using built-in defaults", DEFAULT_CONFIG_FILE);
                TomlConfig::default()
            }
        };

        self.apply_to(&mut config);
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        config.cache.refresh |= self.refresh;
        config.crawl.fail_fast |= self.fail_fast;
        config.monitoring.enabled |= self.monitor;
        config.monitoring.json_logs |= self.json_logs;
    }
}
