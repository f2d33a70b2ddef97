//! Error handling foundation for reservation-relay.
//!
//! Only the `Result` alias lives here. Each crate owns its domain error
//! enums and wraps them in a rootcause [`Report`] at layer boundaries.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
///
/// Layers attach their own error context as reports propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
