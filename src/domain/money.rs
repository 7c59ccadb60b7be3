//! Decimal aliases for prices and sizes.
//!
//! Outcome token prices live in `[0, 1]` and sum to the $1 payout for a
//! resolved binary market, so exact decimal math matters more than speed.

use rust_decimal::Decimal;

/// Price of one outcome share, a decimal in `[0, 1]`.
pub type Price = Decimal;

/// Share quantity. Non-negative; fractional sizes are venue-legal.
pub type Size = Decimal;

/// Basis points per unit price ratio, used by slippage math.
pub const BPS_SCALE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
