use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{LeaveStore, MemoryLeaveStore, MySqlLeaveStore};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// MySQL when `DATABASE_URL` is set, otherwise a process-local store.
pub async fn init_store(config: &Config) -> Result<Arc<dyn LeaveStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            info!("Connected to MySQL leave store");
            Ok(Arc::new(MySqlLeaveStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, leave records are kept in memory only");
            Ok(MemoryLeaveStore::new_shared())
        }
    }
}
