pub mod error;
pub mod time_value;
pub mod types;

pub mod asset;
pub mod assumptions;
pub mod documents;
pub mod offer;
pub mod underwriting;

#[cfg(feature = "render")]
pub mod render;

#[cfg(feature = "catalog")]
pub mod catalog;

pub use error::UnderwriteError;
pub use types::*;

/// Standard result type for all underwriting operations
pub type UnderwriteResult<T> = Result<T, UnderwriteError>;
