use std::sync::Arc;

use crate::{config::Config, ports::database::DatabasePort};

pub mod lazy;
pub mod memory;
pub mod mongo;

use self::{lazy::LazyDatabase, memory::MemoryDatabase, mongo::MongoDatabase};

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("DATABASE_URL is not set")]
    MissingUrl,
    #[error("unsupported database URL {0:?}: expected mongodb://, mongodb+srv:// or memory://")]
    UnsupportedScheme(String),
    #[error("database error: {0}")]
    Database(#[from] crate::ports::database::Error),
}

/// Open the store named by the configuration
pub async fn connect(config: &Config) -> Result<Arc<dyn DatabasePort>, ConnectError> {
    let url = config.database_url.as_deref().ok_or(ConnectError::MissingUrl)?;

    if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
        let database = MongoDatabase::connect(url, &config.database_name).await?;
        return Ok(Arc::new(database));
    }

    if url.starts_with("memory://") {
        let database = match &config.lessons_seed_file {
            Some(path) => MemoryDatabase::from_seed_file(path)?,
            None => MemoryDatabase::default(),
        };
        tracing::info!(seed = ?config.lessons_seed_file, "using in-memory database");
        return Ok(Arc::new(database));
    }

    Err(ConnectError::UnsupportedScheme(url.to_string()))
}

/// Connect once and install the store into the shared handle
///
/// Failures are logged and leave the handle empty: data endpoints keep reporting internal
/// errors while the rest of the process carries on.
pub async fn establish(config: &Config, handle: &LazyDatabase) {
    match connect(config).await {
        Ok(database) => {
            if handle.install(database).is_err() {
                tracing::warn!("database handle was already installed");
            } else {
                tracing::info!("database ready");
            }
        }
        Err(err) => tracing::error!(error = %err, "failed to connect to the database"),
    }
}
