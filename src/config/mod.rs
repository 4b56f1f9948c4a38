pub mod loader;
pub mod schema;

pub use schema::ScanConfig;
