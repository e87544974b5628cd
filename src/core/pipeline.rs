use crate::core::psx::PsxClient;
use crate::core::{allocation, ConfigProvider, MarketData, Pipeline, PlanReport, Storage};
use crate::domain::model::{IndexSnapshot, PlanRow, Portfolio};
use crate::utils::error::{Result, TrackerError};
use chrono::Datelike;

pub struct TrackerPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: PsxClient,
}

impl<S: Storage, C: ConfigProvider> TrackerPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let client = PsxClient::new(config.dps_url());
        Self {
            storage,
            config,
            client,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TrackerPipeline<S, C> {
    async fn extract(&self) -> Result<MarketData> {
        tracing::debug!(
            "Fetching {} constituents from {}",
            self.config.index_symbol(),
            self.config.dps_url()
        );
        let snapshot = self.client.fetch_index(self.config.index_symbol()).await?;
        let constituents = snapshot.constituents()?;
        tracing::info!(
            "🔍 Scraped {} constituents for {}",
            constituents.len(),
            self.config.index_symbol()
        );

        let portfolio = match self.config.portfolio_path() {
            Some(path) => {
                tracing::debug!("Reading portfolio from {}", path);
                let bytes = self.storage.read_file(path).await?;
                let portfolio = Portfolio::from_csv(&bytes)?;
                tracing::info!("📋 Loaded {} portfolio holdings", portfolio.len());
                portfolio
            }
            None => {
                tracing::debug!("No portfolio configured, assuming no holdings");
                Portfolio::empty()
            }
        };

        Ok(MarketData {
            snapshot,
            constituents,
            portfolio,
        })
    }

    async fn transform(&self, data: MarketData) -> Result<PlanReport> {
        // 計算每檔股票應投入的金額與股數
        let mut rows = allocation::compute_plan(
            &data.constituents,
            &data.portfolio,
            self.config.money_to_invest(),
            self.config.threshold(),
        )?;

        // 金額大的排前面
        if self.config.sort_by_amount() {
            rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        }

        // 生成CSV
        let plan_csv = plan_to_csv(&rows)?;
        let snapshot_csv = if self.config.snapshot_enabled() {
            Some(snapshot_to_csv(&data.snapshot)?)
        } else {
            None
        };

        Ok(PlanReport {
            rows,
            plan_csv,
            snapshot_csv,
        })
    }

    async fn load(&self, report: PlanReport) -> Result<String> {
        // 寫入投資計劃
        let plan_path = format!("{}/investment_plan.csv", self.config.output_path());
        tracing::debug!(
            "Writing investment plan ({} rows) to {}",
            report.rows.len(),
            plan_path
        );
        self.storage
            .write_file(&plan_path, report.plan_csv.as_bytes())
            .await?;

        // 保存當月指數快照
        if let Some(snapshot_csv) = &report.snapshot_csv {
            let snapshot_path = format!(
                "{}/{}_data_month_{}.csv",
                self.config.output_path(),
                self.config.index_symbol().to_lowercase(),
                chrono::Local::now().month()
            );
            tracing::debug!("Writing index snapshot to {}", snapshot_path);
            self.storage
                .write_file(&snapshot_path, snapshot_csv.as_bytes())
                .await?;
        }

        Ok(plan_path)
    }
}

fn plan_to_csv(rows: &[PlanRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    csv_into_string(writer)
}

fn snapshot_to_csv(snapshot: &IndexSnapshot) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&snapshot.headers)?;
    for row in &snapshot.rows {
        writer.write_record(row)?;
    }
    csv_into_string(writer)
}

fn csv_into_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| TrackerError::ProcessingError {
        message: format!("CSV output was not valid UTF-8: {}", e),
    })
}
