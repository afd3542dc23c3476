pub mod connectors;
pub mod models;
pub mod sync;
