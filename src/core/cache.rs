use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Pretty-printed JSON files kept in a [`Storage`].
///
/// A present file short-circuits the work that produced it, so reads report
/// whether the file existed separately from whether it parsed.
pub struct JsonCache<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> JsonCache<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// `Ok(None)` when the file is absent.
    pub async fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        if !self.storage.exists(file).await {
            return Ok(None);
        }
        let bytes = self
            .storage
            .read_file(file)
            .await
            .map_err(|e| EtlError::persistence(file, e))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| EtlError::persistence(file, e))?;
        Ok(Some(value))
    }

    pub async fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value).map_err(|e| EtlError::persistence(file, e))?;
        self.storage
            .write_file(file, &json)
            .await
            .map_err(|e| EtlError::persistence(file, e))
    }

    /// 讀取失敗只記錄警告，當作沒有快取
    pub async fn read_or_warn<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        match self.read(file).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable cache: {}", e);
                None
            }
        }
    }

    /// 寫入失敗只記錄警告，流程繼續使用記憶體中的資料
    pub async fn write_or_warn<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> bool {
        match self.write(file, value).await {
            Ok(()) => {
                tracing::debug!("Cache written: {}", file);
                true
            }
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                false
            }
        }
    }
}
