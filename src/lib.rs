//! Tiered BCUBE token sale with treasury vesting and staking, run as a deterministic
//! accounting engine.
//!
//! Each contract is a plain struct whose operations take the [`ledger::Ledger`] they
//! settle against and a [`ledger::Context`] carrying the caller, the block time and
//! any attached native value. Failures are Solidity-compatible [`errors::Errors`]
//! and leave all state untouched.
//!
//! Amounts use three fixed-point scales:
//!
//! * USD: 8 decimals ("dollar units"), the precision of the price feeds
//! * BCUBE and the native coin: 18 decimals
//! * the stable asset: whatever its token declares (6 for USDC/USDT)

use alloy_primitives::U256;

pub mod config;
pub mod errors;
pub mod ledger;
pub mod oracle;
pub mod presets;
pub mod roles;
pub mod sale;
pub mod staking;
pub mod tiers;
pub mod token;
pub mod treasury;
pub mod vesting;

pub use errors::Errors;
pub use ledger::{Context, Ledger};
pub use sale::{Allocation, SaleConfig, SaleEngine};
pub use token::{CappedToken, Erc20};
pub use treasury::{Treasury, TreasuryConfig};

/// Decimals of USD amounts and of the price feeds.
pub const USD_DECIMALS: u8 = 8;

/// Decimals of BCUBE.
pub const TOKEN_DECIMALS: u8 = 18;

/// Decimals of the native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// One dollar in dollar units.
pub const DOLLAR_UNIT: U256 = U256::from_limbs([100_000_000, 0, 0, 0]);

/// One whole token in base units.
pub const TOKEN_UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// `n` whole dollars in dollar units.
pub fn dollars(n: u64) -> U256 {
    U256::from(n) * DOLLAR_UNIT
}

/// `n` whole tokens in base units.
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * TOKEN_UNIT
}
