pub mod bigquery;
pub mod cache;
pub mod demo;
pub mod factory;
pub mod fixture;
pub mod query_builder;

pub use bigquery::BigQueryConnection;
pub use cache::QueryCache;
pub use demo::DemoConnection;
pub use factory::{DatabaseFactory, WarehouseConnection, WarehouseDriver};
pub use fixture::FixtureConnection;
pub use query_builder::QueryBuilder;
