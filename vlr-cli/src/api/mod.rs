//! LMS backend access
//!
//! All reads and writes go through `index.php?controller=<Name>Controller&action=<action>`.
//! [`Backend`] abstracts the transport so list and form flows can run against
//! the real [`LmsClient`] or a scripted backend in tests.

pub mod backend;
pub mod client;
pub mod models;

#[cfg(test)]
pub mod mock;

pub use backend::{Backend, Route};
pub use client::LmsClient;
pub use models::{ApiResponse, PageResponse, value_text};
