//! Form engine and backend client behind the `vlr` console
//!
//! - [`forms`]: per-content-kind schemas, tag input, validation, modal lifecycle
//! - [`list`]: paged, filterable lists with debounced search
//! - [`api`]: the LMS backend transport
//! - [`render`]: escaped HTML fragments

pub mod api;
pub mod cli;
pub mod config;
pub mod forms;
pub mod i18n;
pub mod list;
pub mod render;
