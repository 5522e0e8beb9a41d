//! Ordered pricing tiers and the tier walk that turns a USD amount into tokens.
//!
//! Prices are dollar units (8 decimals) per whole token and capacities are dollar
//! units, so a tier of capacity `c` at price `p` sells `c * 10^18 / p` base units.

use alloy_primitives::U256;
use tracing::debug;

use crate::errors::*;
use crate::TOKEN_UNIT;

/// Pricing round a tier belongs to; each round is tracked separately per participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Round {
    PrivateSale,
    PrivateRound,
    PublicRound,
    PreIco,
    Ico,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tier {
    pub round: Round,
    /// Dollar units per whole token.
    pub price: U256,
    /// Dollar units sellable in this tier.
    pub capacity: U256,
}

impl Tier {
    pub fn new(round: Round, price: U256, capacity: U256) -> Self {
        Self {
            round,
            price,
            capacity,
        }
    }
}

/// The share of one purchase that landed in a single tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fill {
    pub tier: usize,
    pub round: Round,
    pub dollar_units: U256,
    pub tokens: U256,
}

/// Tier table plus how much of each tier has been sold.
#[derive(Clone, Debug)]
pub struct TierBook {
    tiers: Vec<Tier>,
    sold: Vec<U256>,
    sold_tokens: Vec<U256>,
    reserve: U256,
}

/// Tokens bought with `dollar_units` at `price`, rounded down.
pub fn tokens_for(dollar_units: U256, price: U256) -> Result<U256, Errors> {
    dollar_units
        .checked_mul(TOKEN_UNIT)
        .map(|v| v / price)
        .ok_or(Errors::Overflow(Overflow {}))
}

/// Dollar units needed to buy `tokens` at `price`, rounded down.
pub fn dollar_units_for(tokens: U256, price: U256) -> Result<U256, Errors> {
    tokens
        .checked_mul(price)
        .map(|v| v / TOKEN_UNIT)
        .ok_or(Errors::Overflow(Overflow {}))
}

impl TierBook {
    /// Build a book over `tiers`, holding `reserve` tokens back from the final tier.
    ///
    /// Prices must be non-zero and strictly increasing, capacities non-zero, and the
    /// reserve must fit inside the final tier.
    pub fn new(tiers: Vec<Tier>, reserve: U256) -> Result<Self, Errors> {
        let invalid = || Errors::InvalidConfig(InvalidConfig {});
        let last = tiers.last().ok_or_else(invalid)?;
        if tiers
            .iter()
            .any(|tier| tier.price == U256::ZERO || tier.capacity == U256::ZERO)
        {
            return Err(invalid());
        }
        if tiers.windows(2).any(|pair| pair[0].price >= pair[1].price) {
            return Err(invalid());
        }
        if dollar_units_for(reserve, last.price)? >= last.capacity {
            return Err(invalid());
        }

        let len = tiers.len();
        Ok(Self {
            tiers,
            sold: vec![U256::ZERO; len],
            sold_tokens: vec![U256::ZERO; len],
            reserve,
        })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn reserve(&self) -> U256 {
        self.reserve
    }

    /// Dollar units sold in tier `index`.
    pub fn tier_sold(&self, index: usize) -> U256 {
        self.sold.get(index).copied().unwrap_or_default()
    }

    /// Dollar units sellable in tier `index`, the reserve already deducted.
    pub fn effective_capacity(&self, index: usize) -> U256 {
        let Some(tier) = self.tiers.get(index) else {
            return U256::ZERO;
        };
        if index + 1 < self.tiers.len() {
            return tier.capacity;
        }
        tier.capacity
            .saturating_sub(self.reserve.saturating_mul(tier.price) / TOKEN_UNIT)
    }

    /// First tier with capacity left, `None` once every tier is sold out.
    pub fn current_tier(&self) -> Option<usize> {
        (0..self.tiers.len()).find(|&i| self.sold[i] < self.effective_capacity(i))
    }

    /// Tokens sold across all tiers.
    pub fn net_sold_tokens(&self) -> U256 {
        self.sold_tokens.iter().fold(U256::ZERO, |acc, v| acc + v)
    }

    /// Dollar units sold across all tiers.
    pub fn net_sold_dollar_units(&self) -> U256 {
        self.sold.iter().fold(U256::ZERO, |acc, v| acc + v)
    }

    /// Most tokens this book can ever sell with the current reserve.
    pub fn hard_cap_tokens(&self) -> Result<U256, Errors> {
        let mut total = U256::ZERO;
        for (index, tier) in self.tiers.iter().enumerate() {
            total += tokens_for(self.effective_capacity(index), tier.price)?;
        }
        Ok(total)
    }

    /// Walk the tiers from the current one, spending `dollar_units`.
    ///
    /// Does not mutate the book; fails `HardCapExceeded` when spend is left over
    /// after the final tier.
    pub fn quote(&self, dollar_units: U256) -> Result<Vec<Fill>, Errors> {
        let mut fills = Vec::new();
        let mut to_spend = dollar_units;
        let mut index = self.current_tier().unwrap_or(self.tiers.len());

        while to_spend > U256::ZERO {
            let Some(tier) = self.tiers.get(index) else {
                return Err(Errors::HardCapExceeded(HardCapExceeded {}));
            };
            let remaining = self.effective_capacity(index).saturating_sub(self.sold[index]);
            let spent = to_spend.min(remaining);
            if spent > U256::ZERO {
                let tokens = tokens_for(spent, tier.price)?;
                debug!(tier = index, %spent, %tokens, "tier fill");
                fills.push(Fill {
                    tier: index,
                    round: tier.round,
                    dollar_units: spent,
                    tokens,
                });
            }
            to_spend -= spent;
            index += 1;
        }

        Ok(fills)
    }

    /// Record fills produced by [`TierBook::quote`].
    pub fn apply(&mut self, fills: &[Fill]) {
        for fill in fills {
            self.sold[fill.tier] += fill.dollar_units;
            self.sold_tokens[fill.tier] += fill.tokens;
        }
    }

    /// Shrink the launchpad reserve, extending the final tier.
    pub fn decrease_reserve(&mut self, new_reserve: U256) -> Result<U256, Errors> {
        if new_reserve >= self.reserve {
            return Err(Errors::MustDecrease(MustDecrease {}));
        }
        let previous = self.reserve;
        self.reserve = new_reserve;
        Ok(previous)
    }
}
