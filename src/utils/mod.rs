// Utility functions
pub mod cache;
pub mod error;
pub mod image;
pub mod validation;

pub use cache::ListingCache;
