//! Server-paged list views: query state, debounced search, stale-safe loading
//! and pagination controls.

pub mod debounce;
pub mod fetcher;
pub mod pagination;
pub mod query;
pub mod specs;

pub use debounce::SearchDebouncer;
pub use fetcher::{ListFetcher, LoadOutcome, RequestTicket};
pub use pagination::PaginationView;
pub use query::PageQuery;
pub use specs::{Column, ListKind, ListSpec};
