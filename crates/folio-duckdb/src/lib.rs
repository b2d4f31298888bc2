pub mod backend;
pub mod engagement;
pub mod queries;
pub mod schema;
pub mod visits;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `folio_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
