//! Chainlink-style USD price feeds and the conversion of payments into dollar units.

use alloy_primitives::{Address, U256};

use crate::errors::*;
use crate::ledger::Ledger;
use crate::USD_DECIMALS;

/// Read side of an aggregator contract.
pub trait AggregatorV3 {
    fn decimals(&self) -> u8;

    /// `(round_id, answer, started_at, updated_at, answered_in_round)`
    fn latest_round_data(&self) -> (u64, i128, u64, u64, u64);
}

/// A single USD price feed with a settable answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceFeed {
    decimals: u8,
    answer: i128,
    round_id: u64,
    updated_at: u64,
}

impl PriceFeed {
    pub fn new(decimals: u8, answer: i128, updated_at: u64) -> Self {
        Self {
            decimals,
            answer,
            round_id: 1,
            updated_at,
        }
    }

    /// Publish a new answer as the next round.
    pub fn set_answer(&mut self, answer: i128, updated_at: u64) {
        self.answer = answer;
        self.round_id += 1;
        self.updated_at = updated_at;
    }
}

impl AggregatorV3 for PriceFeed {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn latest_round_data(&self) -> (u64, i128, u64, u64, u64) {
        (
            self.round_id,
            self.answer,
            self.updated_at,
            self.updated_at,
            self.round_id,
        )
    }
}

/// Which of the two configured feeds a sale reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FeedKind {
    /// ETH/USD, prices the native coin.
    Native = 0,
    /// Stablecoin/USD, prices the stable asset.
    Stable = 1,
}

/// The pair of feed addresses a sale prices payments with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceOracle {
    pub eth_feed: Address,
    pub stable_feed: Address,
}

impl PriceOracle {
    pub fn new(eth_feed: Address, stable_feed: Address) -> Self {
        Self {
            eth_feed,
            stable_feed,
        }
    }

    pub fn feed_address(&self, kind: FeedKind) -> Address {
        match kind {
            FeedKind::Native => self.eth_feed,
            FeedKind::Stable => self.stable_feed,
        }
    }

    pub fn set_feed(&mut self, kind: FeedKind, feed: Address) {
        match kind {
            FeedKind::Native => self.eth_feed = feed,
            FeedKind::Stable => self.stable_feed = feed,
        }
    }

    /// Latest positive answer of the `kind` feed together with its decimals.
    pub fn fetch_price(&self, ledger: &Ledger, kind: FeedKind) -> Result<(U256, u8), Errors> {
        let feed = ledger.feed(self.feed_address(kind))?;
        let (_, answer, _, _, _) = feed.latest_round_data();
        if answer <= 0 {
            return Err(Errors::InvalidPrice(InvalidPrice {}));
        }
        Ok((U256::from(answer as u128), feed.decimals()))
    }
}

/// USD value, in 8-decimal dollar units, of `amount` base units of an asset
/// with `asset_decimals` decimals priced at `price` with `feed_decimals` decimals.
///
/// Rounds down.
pub fn usd_units(amount: U256, asset_decimals: u8, price: U256, feed_decimals: u8) -> Result<U256, Errors> {
    let scale = U256::from(10u64).pow(U256::from(USD_DECIMALS));
    let divisor = U256::from(10u64).pow(U256::from(asset_decimals as u64 + feed_decimals as u64));
    amount
        .checked_mul(price)
        .and_then(|v| v.checked_mul(scale))
        .map(|v| v / divisor)
        .ok_or(Errors::Overflow(Overflow {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dollars, tokens};
    use alloy_primitives::address;

    const ETH_USD: Address = address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");

    #[test]
    fn one_ether_at_two_thousand_dollars() {
        // 2000.00000000 USD per ETH
        let units = usd_units(tokens(1), 18, U256::from(200_000_000_000u64), 8).unwrap();
        assert_eq!(units, dollars(2_000));
    }

    #[test]
    fn stable_asset_with_six_decimals() {
        let amount = U256::from(2_500_000_000u64); // 2500 USDC
        let units = usd_units(amount, 6, U256::from(100_000_000u64), 8).unwrap();
        assert_eq!(units, dollars(2_500));
    }

    #[test]
    fn fetch_price_rejects_non_positive_answers() {
        let mut ledger = Ledger::new();
        ledger.deploy_feed(ETH_USD, PriceFeed::new(8, 0, 1));
        let oracle = PriceOracle::new(ETH_USD, Address::ZERO);

        assert!(matches!(
            oracle.fetch_price(&ledger, FeedKind::Native),
            Err(Errors::InvalidPrice(_))
        ));
        assert!(matches!(
            oracle.fetch_price(&ledger, FeedKind::Stable),
            Err(Errors::OracleUnavailable(_))
        ));

        ledger.feed_mut(ETH_USD).unwrap().set_answer(180_000_000_000, 2);
        let (price, decimals) = oracle.fetch_price(&ledger, FeedKind::Native).unwrap();
        assert_eq!(price, U256::from(180_000_000_000u64));
        assert_eq!(decimals, 8);
    }
}
