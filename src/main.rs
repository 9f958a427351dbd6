use clap::Parser;
use xk_export::utils::error::{EtlError, ErrorSeverity};
use xk_export::utils::{logger, validation::Validate};
use xk_export::{CliConfig, EtlEngine, HttpFetcher, LocalStorage, XkPipeline};

fn report_and_exit(e: &EtlError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    let loaded = cli.load_config();

    // 設定檔無法載入時只依命令列決定日誌格式
    let json_logs = loaded
        .as_ref()
        .map(|config| config.monitoring.json_logs)
        .unwrap_or(cli.json_logs);
    if json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting xk-export");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => report_and_exit(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        report_and_exit(&e);
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let fetcher = match HttpFetcher::new(&config.sources) {
        Ok(fetcher) => fetcher,
        Err(e) => report_and_exit(&e),
    };
    let storage = LocalStorage::new(".".to_string());
    let pipeline = XkPipeline::new(storage, fetcher, config);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Export completed successfully!");
            println!("✅ Export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => report_and_exit(&e),
    }
}
