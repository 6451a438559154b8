pub mod aggregation;
pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::StoreError;
pub use store::AttendanceStore;
