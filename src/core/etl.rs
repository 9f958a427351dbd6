use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting export...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("Extracting reference lists and majors...");
        let extracted = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} majors ({}), {} crawl failures",
            extracted.majors.len(),
            if extracted.from_cache { "cache" } else { "crawl" },
            extracted.failures.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("Classifying schools and majors...");
        let transformed = self.pipeline.transform(extracted).await?;
        tracing::info!("Assembled {} rows", transformed.rows.len());
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
