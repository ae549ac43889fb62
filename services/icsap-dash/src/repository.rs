use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use svckit::config::WarehouseConfig;
use svckit::database::{DatabaseFactory, QueryBuilder, QueryCache, WarehouseConnection};
use svckit::errors::DashError;
use svckit::metrics;
use svckit::types::{decode_rows, Dataset};

/// Loads the admissions table once per query text and serves it from cache
/// until explicitly refreshed.
pub struct AdmissionRepository {
    connection: Arc<dyn WarehouseConnection>,
    cache: QueryCache<Dataset>,
    query: String,
}

impl AdmissionRepository {
    pub fn new(connection: Arc<dyn WarehouseConnection>, query: impl Into<String>) -> Self {
        Self {
            connection,
            cache: QueryCache::new(),
            query: query.into(),
        }
    }

    pub fn from_config(config: &WarehouseConfig) -> Result<Self, DashError> {
        let connection = DatabaseFactory::create_from_config(config)?;
        let query = QueryBuilder::build_select_all(&config.project_id, &config.dataset, &config.table)?;
        info!(
            "Admissions repository using {} driver: {}",
            connection.driver_name(),
            query
        );
        Ok(Self::new(connection, query))
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn driver_name(&self) -> &str {
        self.connection.driver_name()
    }

    /// The full decoded dataset, fetched on first use.
    pub async fn fetch_admissions(&self) -> Result<Arc<Dataset>, DashError> {
        self.cache
            .get_or_try_fetch(&self.query, || self.load())
            .await
    }

    async fn load(&self) -> Result<Dataset, DashError> {
        let driver = self.connection.driver_name().to_string();
        let start = Instant::now();

        let result = match self.connection.query(&self.query).await {
            Ok(rows) => decode_rows(&rows),
            Err(e) => Err(e),
        };
        let duration = start.elapsed();
        metrics::record_operation("fetch_admissions", &driver, result.is_ok(), duration.as_secs_f64());

        match &result {
            Ok(dataset) => {
                metrics::record_dataset_rows(&driver, dataset.len());
                info!("Loaded {} admission grains via {} in {:?}", dataset.len(), driver, duration);
            }
            Err(e) => error!("Failed to load admissions via {}: {}", driver, e),
        }
        result
    }

    /// Drops the cached dataset and loads it again.
    pub async fn refresh(&self) -> Result<Arc<Dataset>, DashError> {
        self.cache.invalidate(&self.query);
        self.fetch_admissions().await
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn is_cached(&self) -> bool {
        !self.cache.is_empty()
    }

    pub async fn health_check(&self) -> Result<(), DashError> {
        self.connection.health_check().await
    }
}
