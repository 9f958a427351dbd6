use crate::adapters::sink::{CsvSink, XlsxSink};
use crate::config::toml_config::{OutputFormat, TomlConfig};
use crate::core::assembler::{assemble, COLUMNS};
use crate::core::cache::JsonCache;
use crate::core::classifier::Classifier;
use crate::core::crawler::Crawler;
use crate::core::reference::ReferenceLoader;
use crate::domain::model::{Extracted, Major, TransformResult};
use crate::domain::ports::{Fetcher, Pipeline, Storage, TableSink};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// 參考名單 + 選考資料爬取 → 分類 → 表格輸出
pub struct XkPipeline<S: Storage, F: Fetcher> {
    storage: S,
    fetcher: F,
    config: TomlConfig,
}

impl<S: Storage, F: Fetcher> XkPipeline<S, F> {
    pub fn new(storage: S, fetcher: F, config: TomlConfig) -> Self {
        Self {
            storage,
            fetcher,
            config,
        }
    }

    fn sinks(&self) -> Vec<Box<dyn TableSink>> {
        let load = &self.config.load;
        load.output_formats
            .iter()
            .map(|format| -> Box<dyn TableSink> {
                match format {
                    OutputFormat::Xlsx => Box::new(XlsxSink::new(load.xlsx_filename.clone())),
                    OutputFormat::Csv => Box::new(CsvSink::new(load.csv_filename.clone())),
                }
            })
            .collect()
    }

    fn output_file(&self, file_name: &str) -> String {
        Path::new(self.config.output_path())
            .join(file_name)
            .to_string_lossy()
            .to_string()
    }
}

#[async_trait]
impl<S: Storage, F: Fetcher> Pipeline for XkPipeline<S, F> {
    async fn extract(&self) -> Result<Extracted> {
        let references = ReferenceLoader::new(
            &self.fetcher,
            &self.storage,
            &self.config.sources,
            &self.config.cache,
        )
        .load_reference_lists()
        .await?;

        let cache = JsonCache::new(&self.storage);
        let dataset = &self.config.cache.dataset;

        if !self.config.cache.refresh {
            if let Some(majors) = cache.read_or_warn::<Vec<Major>>(dataset).await {
                tracing::info!("📦 Loaded {} majors from {}", majors.len(), dataset);
                return Ok(Extracted {
                    references,
                    majors,
                    failures: Vec::new(),
                    from_cache: true,
                });
            }
        }

        let crawler = Crawler::new(&self.fetcher, &self.config.sources, &self.config.crawl)?;
        let outcome = crawler.crawl().await?;

        // 不完整或空的資料不寫快取，否則下次執行會跳過爬取
        if !outcome.is_complete() {
            tracing::warn!(
                "⚠️ {} pages failed; {} not written",
                outcome.failures.len(),
                dataset
            );
        } else if outcome.majors.is_empty() {
            tracing::warn!(
                "⚠️ No majors found from {}; page layout may have changed, {} not written",
                self.config.sources.entry_url,
                dataset
            );
        } else {
            cache.write_or_warn(dataset, &outcome.majors).await;
        }

        Ok(Extracted {
            references,
            majors: outcome.majors,
            failures: outcome.failures,
            from_cache: false,
        })
    }

    async fn transform(&self, data: Extracted) -> Result<TransformResult> {
        let classifier = Classifier::new(&data.references);
        let rows = assemble(&data.majors, &classifier);
        tracing::debug!("Assembled {} rows from {} majors", rows.len(), data.majors.len());

        Ok(TransformResult {
            rows,
            failures: data.failures,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut written = Vec::new();

        for sink in self.sinks() {
            let bytes = sink.render(&result.rows, &COLUMNS)?;
            let path = self.output_file(sink.file_name());
            self.storage.write_file(&path, &bytes).await?;
            tracing::info!("💾 Wrote {} rows to {}", result.rows.len(), path);
            written.push(path);
        }

        if !result.failures.is_empty() {
            let report = &self.config.cache.failures;
            if JsonCache::new(&self.storage)
                .write_or_warn(report, &result.failures)
                .await
            {
                tracing::warn!(
                    "⚠️ {} pages failed, see {}",
                    result.failures.len(),
                    report
                );
            }
        }

        Ok(written.join(", "))
    }
}
