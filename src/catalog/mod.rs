pub mod base;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;
use log::info;

use crate::config::CatalogBackend;
use crate::errors::Result;
use base::CatalogStore;
use memory::MemoryCatalog;
use sqlite::SqliteCatalog;

/// 按配置创建目录存储；SQLite 后端在启动时建表并写入默认股票
pub async fn open_catalog(backend: &CatalogBackend) -> Result<Arc<dyn CatalogStore + Send + Sync>> {
    match backend {
        CatalogBackend::Memory => {
            info!("Using in-memory ticker catalog");
            Ok(Arc::new(MemoryCatalog::new()))
        }
        CatalogBackend::Sqlite { url } => {
            info!("Using SQLite ticker catalog at {}", url);
            let store = SqliteCatalog::connect(url).await?;
            let inserted = store.seed_defaults().await?;
            info!("Catalog seeded, {} new companies", inserted);
            Ok(Arc::new(store))
        }
    }
}
