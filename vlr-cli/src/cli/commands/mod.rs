pub mod browse;
pub mod config;
pub mod delete;
pub mod form;
pub mod list;
pub mod schema;
