pub mod config;
pub mod engagement;
pub mod error;
pub mod summary;
pub mod visit;
pub mod visitor;
