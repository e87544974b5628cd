use clap::Parser;
use kse_tracker::config::file::FileConfig;
use kse_tracker::utils::{logger, validation::Validate};
use kse_tracker::{CliConfig, LocalStorage, TrackerConfig, TrackerEngine, TrackerPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting kse-tracker CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入 TOML 配置 (旗標優先於檔案)
    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match FileConfig::from_file(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let config = match cli.resolve(file_config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration resolution failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config);

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 存儲以工作目錄為根，投資組合路徑按用戶輸入解析
    let storage = LocalStorage::current_dir();
    let pipeline = TrackerPipeline::new(storage, config);

    // 創建追蹤引擎並運行
    let engine = TrackerEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Investment plan generated successfully!");
            tracing::info!("📁 Plan saved to: {}", output_path);
            println!("✅ Investment plan generated successfully!");
            println!("📁 Plan saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Tracking run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                kse_tracker::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                kse_tracker::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                kse_tracker::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                kse_tracker::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TrackerConfig) {
    println!("📋 Configuration Summary:");
    println!("  Index: {}", config.index_symbol);
    println!("  Source: {}", config.dps_url);
    println!("  Money to invest: {}", config.money_to_invest);
    println!("  Price threshold: {}", config.threshold);

    match &config.portfolio_path {
        Some(path) => println!("  Portfolio: {}", path),
        None => println!("  Portfolio: (none, assuming no holdings)"),
    }

    println!("  Output: {}", config.output_path);
    println!("  Snapshot: {}", config.snapshot_enabled);
    println!();
}
