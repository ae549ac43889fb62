pub mod aggregation;
pub mod api;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod filters;
pub mod labels;
pub mod repository;
pub mod stats;

pub use dashboard::{Dashboard, DashboardView};
pub use filters::{FilterOptions, FilterSelection};
pub use repository::AdmissionRepository;
