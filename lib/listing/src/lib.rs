//! Listing page fetcher for persona-chat.
//!
//! This crate provides:
//!
//! - **Listing Record**: the structured facts extracted from a listing page
//! - **Page Fetcher**: the `PageFetcher` trait and an HTTP implementation
//! - **HTML extraction**: generic metadata and microdata extraction

pub mod error;
pub mod fetcher;
pub mod html;
pub mod record;

pub use error::FetchError;
pub use fetcher::{FetcherConfig, HttpPageFetcher, PageFetcher};
pub use record::ListingRecord;
