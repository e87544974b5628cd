use crate::domain::model::{MarketData, PlanReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn dps_url(&self) -> &str;
    fn index_symbol(&self) -> &str;
    fn portfolio_path(&self) -> Option<&str>;
    fn money_to_invest(&self) -> Decimal;
    fn threshold(&self) -> Decimal;
    fn output_path(&self) -> &str;
    fn snapshot_enabled(&self) -> bool;
    fn sort_by_amount(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<MarketData>;
    async fn transform(&self, data: MarketData) -> Result<PlanReport>;
    async fn load(&self, report: PlanReport) -> Result<String>;
}
