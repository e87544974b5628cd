use crate::core::{ConfigProvider, Storage};
use crate::utils::error::{Result, TrackerError};
use aws_sdk_s3::Client as S3Client;
use rust_decimal::Decimal;
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub dps_url: String,
    pub index_symbol: String,
    pub portfolio_key: Option<String>,
    pub money_to_invest: Decimal,
    pub threshold: Decimal,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    pub snapshot_enabled: bool,
}

impl LambdaConfig {
    /// Builds a config from the function environment. Required values such
    /// as the bucket and the money amount may arrive via the invocation
    /// payload instead, so this never rejects gaps; validate() does.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            dps_url: env::var("DPS_URL").unwrap_or_else(|_| "https://dps.psx.com.pk".to_string()),
            index_symbol: env::var("INDEX_SYMBOL").unwrap_or_else(|_| "KSE100".to_string()),
            portfolio_key: env::var("PORTFOLIO_KEY").ok(),
            money_to_invest: parse_decimal_env("MONEY_TO_INVEST")?.unwrap_or(Decimal::ZERO),
            threshold: parse_decimal_env("THRESHOLD")?.unwrap_or(Decimal::ZERO),
            s3_bucket: env::var("S3_BUCKET").unwrap_or_default(),
            s3_prefix: env::var("S3_PREFIX").unwrap_or_else(|_| "tracker-output".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "ap-southeast-2".to_string()),
            snapshot_enabled: env::var("SNAPSHOT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        })
    }
}

fn parse_decimal_env(name: &str) -> Result<Option<Decimal>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| TrackerError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl ConfigProvider for LambdaConfig {
    fn dps_url(&self) -> &str {
        &self.dps_url
    }

    fn index_symbol(&self) -> &str {
        &self.index_symbol
    }

    fn portfolio_path(&self) -> Option<&str> {
        self.portfolio_key.as_deref()
    }

    fn money_to_invest(&self) -> Decimal {
        self.money_to_invest
    }

    fn threshold(&self) -> Decimal {
        self.threshold
    }

    fn output_path(&self) -> &str {
        &self.s3_prefix
    }

    fn snapshot_enabled(&self) -> bool {
        self.snapshot_enabled
    }

    // The web form renders the plan in index order.
    fn sort_by_amount(&self) -> bool {
        false
    }
}

impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        // 驗證資料來源網址
        validate_url("dps_url", &self.dps_url)?;

        // 驗證指數代號
        validate_non_empty_string("index", &self.index_symbol)?;

        // 驗證S3 bucket名稱
        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;

        // 驗證S3前綴
        validate_non_empty_string("s3_prefix", &self.s3_prefix)?;

        // 驗證區域
        validate_aws_region("s3_region", &self.s3_region)?;

        // 驗證投資金額與門檻
        validate_positive_decimal("money_to_invest", self.money_to_invest)?;
        validate_non_negative_decimal("threshold", self.threshold)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.is_empty() {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot be empty".to_string(),
        });
    }

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    use crate::utils::validation::validate_non_empty_string;

    validate_non_empty_string(field_name, region)?;

    // AWS region format validation
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| TrackerError::ConfigError {
                message: format!("Failed to read from S3: {}", e),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| TrackerError::ConfigError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| TrackerError::ConfigError {
                message: format!("Failed to write to S3: {}", e),
            })?;

        Ok(())
    }
}
