//! Common types used across the application.

pub mod currency;
pub mod id;
pub mod version;

pub use currency::CurrencyPosition;
pub use id::*;
pub use version::{ApiVersion, ParseApiVersionError};
