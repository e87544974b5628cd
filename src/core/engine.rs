use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct TrackerEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> TrackerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load in order and returns the path of
    /// the written plan.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting index tracking run");
        self.monitor.log_stats("Startup");

        tracing::info!("📡 Extracting market data...");
        let market_data = self.pipeline.extract().await?;
        tracing::info!(
            "📡 Extracted {} constituents, {} portfolio holdings",
            market_data.constituents.len(),
            market_data.portfolio.len()
        );
        self.monitor.log_stats("Extract phase");

        tracing::info!("📈 Computing investment plan...");
        let report = self.pipeline.transform(market_data).await?;
        tracing::info!("📈 Planned purchases for {} symbols", report.rows.len());
        self.monitor.log_stats("Transform phase");

        tracing::info!("📁 Writing reports...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("📁 Plan saved to: {}", output_path);
        self.monitor.log_stats("Load phase");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
