use crate::utils::error::{Result, TrackerError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub source: Option<SourceSection>,
    pub plan: Option<PlanSection>,
    pub portfolio: Option<PortfolioSection>,
    pub output: Option<OutputSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    pub dps_url: Option<String>,
    pub index: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSection {
    pub money_to_invest: Option<Decimal>,
    pub threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: Option<String>,
    pub snapshot: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrackerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrackerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DPS_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;

        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 取得資料來源網址
    pub fn dps_url(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.dps_url.as_deref())
    }

    /// 取得指數代號
    pub fn index(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.index.as_deref())
    }

    /// 取得投資金額
    pub fn money_to_invest(&self) -> Option<Decimal> {
        self.plan.as_ref().and_then(|p| p.money_to_invest)
    }

    /// 取得價格門檻
    pub fn threshold(&self) -> Option<Decimal> {
        self.plan.as_ref().and_then(|p| p.threshold)
    }

    /// 取得投資組合路徑
    pub fn portfolio_path(&self) -> Option<&str> {
        self.portfolio.as_ref().and_then(|p| p.path.as_deref())
    }

    /// 取得輸出路徑
    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.path.as_deref())
    }

    /// 是否輸出指數快照
    pub fn snapshot(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.snapshot)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_config() {
        let toml_content = r#"
[source]
dps_url = "https://dps.psx.com.pk"
index = "KSE100"

[plan]
money_to_invest = 100000
threshold = "450.5"

[portfolio]
path = "holdings.csv"

[output]
path = "./reports"
snapshot = false
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.dps_url(), Some("https://dps.psx.com.pk"));
        assert_eq!(config.index(), Some("KSE100"));
        assert_eq!(config.money_to_invest(), Some(dec!(100000)));
        assert_eq!(config.threshold(), Some(dec!(450.5)));
        assert_eq!(config.portfolio_path(), Some("holdings.csv"));
        assert_eq!(config.output_path(), Some("./reports"));
        assert_eq!(config.snapshot(), Some(false));
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_all_sections_are_optional() {
        let config = FileConfig::from_toml_str("").unwrap();

        assert!(config.dps_url().is_none());
        assert!(config.money_to_invest().is_none());
        assert!(config.snapshot().is_none());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRACKER_TEST_PORTAL", "https://test.portal.com");

        let toml_content = r#"
[source]
dps_url = "${TRACKER_TEST_PORTAL}"
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dps_url(), Some("https://test.portal.com"));

        std::env::remove_var("TRACKER_TEST_PORTAL");
    }

    #[test]
    fn test_unknown_env_var_is_left_as_is() {
        let toml_content = r#"
[source]
dps_url = "${TRACKER_UNSET_VARIABLE}"
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dps_url(), Some("${TRACKER_UNSET_VARIABLE}"));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = FileConfig::from_toml_str("[plan\nmoney=").unwrap_err();
        assert!(matches!(err, TrackerError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[plan]
money_to_invest = 50000

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.money_to_invest(), Some(dec!(50000)));
        assert!(config.monitoring_enabled());
    }
}
