use crate::domain::model::{Column, ExportRow, Extracted, Route, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// 取得單一頁面的原始內容
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, route: Route) -> Result<String>;
}

/// Renders export rows into one output file.
pub trait TableSink: Send + Sync {
    fn file_name(&self) -> &str;
    fn render(&self, rows: &[ExportRow], columns: &[Column]) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extracted>;
    async fn transform(&self, data: Extracted) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
