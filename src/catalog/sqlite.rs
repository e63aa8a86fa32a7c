use crate::catalog::base::CatalogStore;
use crate::errors::Result;
use crate::models::company::{default_companies, Company};
use async_trait::async_trait;
use log::{debug, error};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

/// SQLite 持久化的股票目录
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// 连接数据库（文件不存在时自动创建）并建表
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to open catalog database {}: {}", url, e);
                e
            })?;

        Self::initialize_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                sector TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// 插入一家公司；代码已存在时忽略，返回是否新插入
    pub async fn insert_company(&self, company: &Company) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO companies (symbol, name, sector) VALUES (?, ?, ?)",
        )
        .bind(&company.symbol)
        .bind(&company.name)
        .bind(&company.sector)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 写入内置的 12 支股票，返回新插入的数量
    pub async fn seed_defaults(&self) -> Result<usize> {
        let mut inserted = 0;
        for company in default_companies() {
            if self.insert_company(&company).await? {
                inserted += 1;
            }
        }
        debug!("Seeded {} companies into catalog", inserted);
        Ok(inserted)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT symbol, name, sector FROM companies ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut companies = Vec::with_capacity(rows.len());
        for row in rows {
            let sector: Option<String> = row.try_get("sector")?;
            companies.push(Company {
                symbol: row.try_get("symbol")?,
                name: row.try_get("name")?,
                sector: sector.unwrap_or_else(|| "N/A".to_string()),
            });
        }
        Ok(companies)
    }
}
