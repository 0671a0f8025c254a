//! Pagination module
//!
//! Supports: page tokens (`nextPageToken` / `pageToken`) and single-page
//! responses.
//!
//! # Overview
//!
//! A `Paginator` tells the client which fields to add to the next request
//! and decides from each response whether another page follows.

mod strategies;
mod types;

pub use strategies::{NoPaginator, PageTokenPaginator};
pub use types::{NextPage, PaginationState, Paginator};

#[cfg(test)]
mod tests;
