//! The BCUBE sale variants, expressed as [`SaleConfig`] data.

use alloy_primitives::{Address, U256};

use crate::sale::{ContributionLimits, SaleConfig};
use crate::tiers::{Round, Tier};
use crate::{dollars, tokens, TOKEN_UNIT};

/// Dollar units for a price quoted in tenths of a cent.
const fn tenth_cents(n: u64) -> U256 {
    U256::from_limbs([n * 100_000, 0, 0, 0])
}

/// Private sale tiers: 2.5M tokens each at $0.04, $0.045, $0.05 and $0.055.
pub fn private_sale_tiers() -> Vec<Tier> {
    vec![
        Tier::new(Round::PrivateSale, tenth_cents(40), dollars(100_000)),
        Tier::new(Round::PrivateSale, tenth_cents(45), dollars(112_500)),
        Tier::new(Round::PrivateSale, tenth_cents(50), dollars(125_000)),
        Tier::new(Round::PrivateSale, tenth_cents(55), dollars(137_500)),
    ]
}

/// Tokens the public sale holds back for the launchpad.
pub fn launchpad_reserve() -> U256 {
    tokens(2_250_000)
}

/// Most tokens grantable through private allocations in the public sale.
pub fn private_allocation_cap() -> U256 {
    tokens(20_000_000) / U256::from(3u64)
}

/// Flat new-sale price in dollar units per token: $2,500 buys 15 BCUBE.
pub fn new_sale_price() -> U256 {
    dollars(2_500) * TOKEN_UNIT / tokens(15)
}

fn limits(min: u64, max: u64, ceiling: u64) -> ContributionLimits {
    ContributionLimits {
        min_contribution: dollars(min),
        max_contribution: dollars(max),
        participant_ceiling: dollars(ceiling),
    }
}

impl SaleConfig {
    /// Four-tier private sale, $500 to $25,000 per participant.
    pub fn private_sale(
        wallet: Address,
        opening_time: u64,
        closing_time: u64,
        eth_price_feed: Address,
        stable_price_feed: Address,
        stable_asset: Address,
    ) -> Self {
        Self {
            wallet,
            opening_time,
            closing_time,
            eth_price_feed,
            stable_price_feed,
            stable_asset,
            tiers: private_sale_tiers(),
            limits: limits(500, 25_000, 25_000),
            private_allocation_cap: U256::ZERO,
            reserve: U256::ZERO,
            pausable: false,
        }
    }

    /// Private round at $0.15 for $200,000, then a public round at $0.20 for 7M
    /// tokens less the launchpad reserve.
    pub fn public_sale(
        wallet: Address,
        opening_time: u64,
        closing_time: u64,
        eth_price_feed: Address,
        stable_price_feed: Address,
        stable_asset: Address,
    ) -> Self {
        Self {
            tiers: vec![
                Tier::new(Round::PrivateRound, tenth_cents(150), dollars(200_000)),
                Tier::new(Round::PublicRound, tenth_cents(200), dollars(1_400_000)),
            ],
            limits: limits(500, 50_000, 50_000),
            private_allocation_cap: private_allocation_cap(),
            reserve: launchpad_reserve(),
            ..Self::private_sale(
                wallet,
                opening_time,
                closing_time,
                eth_price_feed,
                stable_price_feed,
                stable_asset,
            )
        }
    }

    /// Single flat-rate tier raising up to $475,000, with tighter limits and pausing.
    pub fn new_sale(
        wallet: Address,
        opening_time: u64,
        closing_time: u64,
        eth_price_feed: Address,
        stable_price_feed: Address,
        stable_asset: Address,
    ) -> Self {
        Self {
            tiers: vec![Tier::new(Round::PrivateSale, new_sale_price(), dollars(475_000))],
            limits: limits(500, 2_500, 10_000),
            pausable: true,
            ..Self::private_sale(
                wallet,
                opening_time,
                closing_time,
                eth_price_feed,
                stable_price_feed,
                stable_asset,
            )
        }
    }

    /// Pre-ICO at $0.08 for $1,150,000, then ICO at $0.12 for $2,400,000.
    pub fn public_sale_treasury(
        wallet: Address,
        opening_time: u64,
        closing_time: u64,
        eth_price_feed: Address,
        stable_price_feed: Address,
        stable_asset: Address,
    ) -> Self {
        Self {
            tiers: vec![
                Tier::new(Round::PreIco, tenth_cents(80), dollars(1_150_000)),
                Tier::new(Round::Ico, tenth_cents(120), dollars(2_400_000)),
            ],
            limits: limits(500, 100_000, 100_000),
            ..Self::private_sale(
                wallet,
                opening_time,
                closing_time,
                eth_price_feed,
                stable_price_feed,
                stable_asset,
            )
        }
    }
}
