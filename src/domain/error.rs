//! Domain invariant violations.
//!
//! Returned by `try_new`-style constructors that validate inputs. The
//! state store maps book violations to its discard counter instead of
//! propagating them.

use thiserror::Error;

use super::money::{Price, Size};

/// Errors raised when a domain invariant is violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Order book level price must lie in `[0, 1]`.
    #[error("level price {price} outside [0, 1]")]
    PriceOutOfRange {
        /// The offending price.
        price: Price,
    },

    /// Order book level size must be positive.
    #[error("level size {size} must be positive")]
    NonPositiveLevelSize {
        /// The offending size.
        size: Size,
    },

    /// Bids must be strictly descending, asks strictly ascending.
    #[error("{side} levels out of order at price {price}")]
    UnsortedSide {
        /// `"bid"` or `"ask"`.
        side: &'static str,
        /// Price of the first out-of-order level.
        price: Price,
    },

    /// Opportunity fill size must be positive.
    #[error("fill size {size} must be positive")]
    NonPositiveFillSize {
        /// The offending size.
        size: Size,
    },

    /// A matched pair must span both venues.
    #[error("matched pair must hold one market per venue")]
    MismatchedPairVenues,
}
