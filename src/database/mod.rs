pub mod catalog;
pub mod manager;
pub mod models;
pub mod postgres;

pub use catalog::{Catalog, CatalogProvider};
pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgCatalogProvider;
