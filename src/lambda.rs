#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use kse_tracker::config::lambda::{LambdaConfig, S3Storage};
#[cfg(feature = "lambda")]
use kse_tracker::core::{engine::TrackerEngine, pipeline::TrackerPipeline};
#[cfg(feature = "lambda")]
use kse_tracker::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use rust_decimal::Decimal;
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub money_to_invest: Option<Decimal>,
    pub threshold: Option<Decimal>,
    pub portfolio_key: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_prefix: Option<String>,
    pub index: Option<String>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub output_path: String,
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting tracker Lambda function");

    // 創建Lambda配置
    let mut config = LambdaConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    // 用事件負載覆蓋環境配置
    let request = event.payload;
    if let Some(money) = request.money_to_invest {
        config.money_to_invest = money;
    }
    if let Some(threshold) = request.threshold {
        config.threshold = threshold;
    }
    if let Some(key) = request.portfolio_key {
        config.portfolio_key = Some(key);
    }
    if let Some(bucket) = request.s3_bucket {
        config.s3_bucket = bucket;
    }
    if let Some(prefix) = request.s3_prefix {
        config.s3_prefix = prefix;
    }
    if let Some(index) = request.index {
        config.index_symbol = index;
    }

    // 驗證配置
    config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    // 創建AWS配置和S3客戶端
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let region = Region::new(config.s3_region.clone());
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .region(region)
        .force_path_style(true)
        .build();
    let s3_client = S3Client::from_conf(s3_config);

    // 創建存儲和管道
    let storage = S3Storage::new(s3_client, config.s3_bucket.clone());
    let pipeline = TrackerPipeline::new(storage, config);

    // 運行追蹤
    let engine = TrackerEngine::new(pipeline);
    let output_path = engine
        .run()
        .await
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    let response = Response {
        message: "Investment plan generated successfully".to_string(),
        output_path,
    };

    tracing::info!("Tracker Lambda function completed successfully");
    Ok(response)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
