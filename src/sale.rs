//! Tiered token sale: converts native or stable-asset payments into per-round
//! token allocations at a price that depends on how much has been sold so far.
//!
//! Every sale variant is the same [`SaleEngine`] built from a different
//! [`SaleConfig`]; see [`crate::presets`].

use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use tracing::info;

use crate::errors::*;
use crate::ledger::{Context, Ledger};
use crate::oracle::{usd_units, FeedKind, PriceOracle};
use crate::roles::{Role, RoleRegistry};
use crate::tiers::{Fill, Round, Tier, TierBook};
use crate::token::Erc20;
use crate::NATIVE_DECIMALS;

/// Per-purchase bounds and the cumulative per-participant ceiling, in dollar units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContributionLimits {
    pub min_contribution: U256,
    pub max_contribution: U256,
    pub participant_ceiling: U256,
}

/// Construction parameters of a sale.
#[derive(Clone, Debug)]
pub struct SaleConfig {
    /// Team wallet receiving every payment.
    pub wallet: Address,
    pub opening_time: u64,
    pub closing_time: u64,
    pub eth_price_feed: Address,
    pub stable_price_feed: Address,
    pub stable_asset: Address,
    pub tiers: Vec<Tier>,
    pub limits: ContributionLimits,
    /// Most tokens that may be granted through `set_private_allocation`.
    pub private_allocation_cap: U256,
    /// Tokens held back from the final tier for the launchpad.
    pub reserve: U256,
    pub pausable: bool,
}

/// Everything a participant has paid and been allocated in one sale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    pub dollar_units_payed: U256,
    pub allocated_private_sale: U256,
    pub allocated_private_round: U256,
    pub allocated_public_round: U256,
    pub allocated_pre_ico: U256,
    pub allocated_ico: U256,
    pub allocated_private_allocation: U256,
}

impl Allocation {
    pub fn round(&self, round: Round) -> U256 {
        match round {
            Round::PrivateSale => self.allocated_private_sale,
            Round::PrivateRound => self.allocated_private_round,
            Round::PublicRound => self.allocated_public_round,
            Round::PreIco => self.allocated_pre_ico,
            Round::Ico => self.allocated_ico,
        }
    }

    fn round_mut(&mut self, round: Round) -> &mut U256 {
        match round {
            Round::PrivateSale => &mut self.allocated_private_sale,
            Round::PrivateRound => &mut self.allocated_private_round,
            Round::PublicRound => &mut self.allocated_public_round,
            Round::PreIco => &mut self.allocated_pre_ico,
            Round::Ico => &mut self.allocated_ico,
        }
    }

    /// Tokens bought in every round plus the administrative grant.
    pub fn total_tokens(&self) -> U256 {
        self.allocated_private_sale
            + self.allocated_private_round
            + self.allocated_public_round
            + self.allocated_pre_ico
            + self.allocated_ico
            + self.allocated_private_allocation
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaleState {
    NotYetOpen,
    Open,
    Closed,
}

/// Receipt of a successful purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub participant: Address,
    pub asset: FeedKind,
    /// Amount paid, in the paying asset's base units.
    pub paid: U256,
    pub dollar_units: U256,
    pub fills: Vec<Fill>,
    pub tokens: U256,
}

pub struct SaleEngine {
    address: Address,
    wallet: Address,
    opening_time: u64,
    closing_time: u64,
    oracle: PriceOracle,
    stable_asset: Address,
    roles: RoleRegistry,
    book: TierBook,
    limits: ContributionLimits,
    private_allocation_cap: U256,
    net_private_allocated: U256,
    pausable: bool,
    paused: bool,
    allocations: HashMap<Address, Allocation>,
    participants: Vec<Address>,
}

impl SaleEngine {
    /// Deploy a sale at `address`; the caller of `ctx` becomes the first admin.
    ///
    /// # Arguments
    ///
    /// * `address` - Address the sale is deployed at, the spender for stable-asset payments
    /// * `ctx` - Deployment context
    /// * `config` - Window, feeds, tier table and limits of the sale
    pub fn new(address: Address, ctx: &Context, config: SaleConfig) -> Result<Self, Errors> {
        // Perform required validation
        if config.wallet == Address::ZERO || address == Address::ZERO {
            return Err(Errors::InvalidConfig(InvalidConfig {}));
        }
        if config.closing_time <= config.opening_time {
            return Err(Errors::InvalidConfig(InvalidConfig {}));
        }
        Self::validate_limits(&config.limits)?;
        let book = TierBook::new(config.tiers, config.reserve)?;

        info!(%address, opening_time = config.opening_time, closing_time = config.closing_time, "sale deployed");
        Ok(Self {
            address,
            wallet: config.wallet,
            opening_time: config.opening_time,
            closing_time: config.closing_time,
            oracle: PriceOracle::new(config.eth_price_feed, config.stable_price_feed),
            stable_asset: config.stable_asset,
            roles: RoleRegistry::new(ctx.sender),
            book,
            limits: config.limits,
            private_allocation_cap: config.private_allocation_cap,
            net_private_allocated: U256::ZERO,
            pausable: config.pausable,
            paused: false,
            allocations: HashMap::new(),
            participants: Vec::new(),
        })
    }

    /// Buy tokens with the native value attached to `ctx`, forwarded to the team wallet.
    pub fn buy_using_native(&mut self, ledger: &mut Ledger, ctx: &Context) -> Result<Purchase, Errors> {
        self.try_buy_using_native(ledger, ctx)
            .map_err(|err| rejected("buy_using_native", err))
    }

    /// Buy tokens with `amount` of the stable asset, pulled from the caller with
    /// `transfer_from`; the caller must have approved the sale beforehand.
    pub fn buy_using_stable(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        amount: U256,
    ) -> Result<Purchase, Errors> {
        self.try_buy_using_stable(ledger, ctx, amount)
            .map_err(|err| rejected("buy_using_stable", err))
    }

    fn try_buy_using_native(&mut self, ledger: &mut Ledger, ctx: &Context) -> Result<Purchase, Errors> {
        self.validate_can_purchase(ctx)?;

        let (price, feed_decimals) = self.oracle.fetch_price(ledger, FeedKind::Native)?;
        let dollar_units = usd_units(ctx.value, NATIVE_DECIMALS, price, feed_decimals)?;
        let (allocation, fills) = self.allocate(ctx.sender, dollar_units)?;

        // Push the payment straight to the team wallet
        ledger.transfer_native(ctx.sender, self.wallet, ctx.value)?;

        Ok(self.record(ledger, ctx.sender, FeedKind::Native, ctx.value, dollar_units, allocation, fills))
    }

    fn try_buy_using_stable(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        amount: U256,
    ) -> Result<Purchase, Errors> {
        self.validate_can_purchase(ctx)?;

        let asset_decimals = ledger.token(self.stable_asset)?.decimals();
        let (price, feed_decimals) = self.oracle.fetch_price(ledger, FeedKind::Stable)?;
        let dollar_units = usd_units(amount, asset_decimals, price, feed_decimals)?;
        let (allocation, fills) = self.allocate(ctx.sender, dollar_units)?;

        let (spender, from, to) = (self.address, ctx.sender, self.wallet);
        let transferred = ledger.call_token(self.stable_asset, |token| {
            token.transfer_from(spender, from, to, amount)
        })?;
        if !transferred {
            return Err(Errors::TransferFailed(TransferFailed {}));
        }

        Ok(self.record(ledger, ctx.sender, FeedKind::Stable, amount, dollar_units, allocation, fills))
    }

    /// Check limits and walk the tiers without touching state.
    fn allocate(&self, participant: Address, dollar_units: U256) -> Result<(Allocation, Vec<Fill>), Errors> {
        if dollar_units == U256::ZERO {
            return Err(Errors::ZeroValueArgumentInjected(ZeroValueArgumentInjected {}));
        }
        if dollar_units < self.limits.min_contribution {
            return Err(Errors::BelowMinContribution(BelowMinContribution {}));
        }
        if dollar_units > self.limits.max_contribution {
            return Err(Errors::AboveMaxContribution(AboveMaxContribution {}));
        }

        let mut allocation = self.allocation(participant);
        allocation.dollar_units_payed = allocation
            .dollar_units_payed
            .checked_add(dollar_units)
            .ok_or(Errors::Overflow(Overflow {}))?;
        if allocation.dollar_units_payed > self.limits.participant_ceiling {
            return Err(Errors::GlobalCapExceeded(GlobalCapExceeded {}));
        }

        let fills = self.book.quote(dollar_units)?;
        for fill in &fills {
            let allocated = allocation.round_mut(fill.round);
            *allocated = allocated
                .checked_add(fill.tokens)
                .ok_or(Errors::Overflow(Overflow {}))?;
        }

        Ok((allocation, fills))
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        ledger: &mut Ledger,
        participant: Address,
        asset: FeedKind,
        paid: U256,
        dollar_units: U256,
        allocation: Allocation,
        fills: Vec<Fill>,
    ) -> Purchase {
        self.book.apply(&fills);
        self.store_allocation(participant, allocation);

        let tokens = fills.iter().fold(U256::ZERO, |acc, fill| acc + fill.tokens);
        ledger.emit(
            self.address,
            TokensPurchased {
                participant,
                dollar_units,
                tokens,
            },
        );
        info!(%participant, ?asset, %dollar_units, %tokens, "tokens purchased");

        Purchase {
            participant,
            asset,
            paid,
            dollar_units,
            fills,
            tokens,
        }
    }

    fn store_allocation(&mut self, participant: Address, allocation: Allocation) {
        if self.allocations.insert(participant, allocation).is_none() {
            self.participants.push(participant);
        }
    }

    /// Hand the caller's admin role over to `account`.
    pub fn set_admin(&mut self, ctx: &Context, account: Address) -> Result<(), Errors> {
        self.roles.set_admin(ctx.sender, account)
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Role registry of the sale; every mutation is gated on its `caller` argument.
    pub fn roles_mut(&mut self) -> &mut RoleRegistry {
        &mut self.roles
    }

    pub fn set_price_feed(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        kind: FeedKind,
        feed: Address,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        self.validate_address(feed)?;

        self.oracle.set_feed(kind, feed);
        ledger.emit(
            self.address,
            PriceFeedChanged {
                kind: kind as u8,
                feed,
            },
        );
        info!(?kind, %feed, "price feed changed");
        Ok(())
    }

    /// Replace both price feeds at once.
    pub fn set_price_feeds(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        eth_price_feed: Address,
        stable_price_feed: Address,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        self.validate_address(eth_price_feed)?;
        self.validate_address(stable_price_feed)?;

        self.set_price_feed(ledger, ctx, FeedKind::Native, eth_price_feed)?;
        self.set_price_feed(ledger, ctx, FeedKind::Stable, stable_price_feed)
    }

    /// Point stable-asset purchases at a different token contract.
    ///
    /// Allowances granted to the sale on the previous contract are not migrated.
    pub fn set_stable_asset(&mut self, ledger: &mut Ledger, ctx: &Context, asset: Address) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        self.validate_address(asset)?;

        self.stable_asset = asset;
        ledger.emit(self.address, StableAssetChanged { asset });
        info!(%asset, "stable asset changed");
        Ok(())
    }

    pub fn extend_closing_time(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        new_closing_time: u64,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if ctx.timestamp >= self.closing_time {
            return Err(Errors::SaleClosed(SaleClosed {}));
        }
        if new_closing_time <= self.closing_time {
            return Err(Errors::InvalidExtension(InvalidExtension {}));
        }

        let previous_closing_time = self.closing_time;
        self.closing_time = new_closing_time;
        ledger.emit(
            self.address,
            ClosingTimeExtended {
                previous_closing_time: U256::from(previous_closing_time),
                new_closing_time: U256::from(new_closing_time),
            },
        );
        info!(previous_closing_time, new_closing_time, "closing time extended");
        Ok(())
    }

    pub fn set_contribution_limits(&mut self, ctx: &Context, min: U256, max: U256) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        let limits = ContributionLimits {
            min_contribution: min,
            max_contribution: max,
            ..self.limits
        };
        Self::validate_limits(&limits)?;

        self.limits = limits;
        info!(%min, %max, "contribution limits changed");
        Ok(())
    }

    pub fn set_participant_ceiling(&mut self, ctx: &Context, ceiling: U256) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if ceiling == U256::ZERO {
            return Err(Errors::ZeroValueArgumentInjected(ZeroValueArgumentInjected {}));
        }

        self.limits.participant_ceiling = ceiling;
        info!(%ceiling, "participant ceiling changed");
        Ok(())
    }

    /// Lower the launchpad reserve to `new_reserve` tokens, raising the hard cap.
    pub fn decrease_hardcap_reserve(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        new_reserve: U256,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if self.state(ctx.timestamp) != SaleState::Open {
            return Err(Errors::NotOpen(NotOpen {}));
        }

        let previous_reserve = self.book.decrease_reserve(new_reserve)?;
        ledger.emit(
            self.address,
            ReserveDecreased {
                previous_reserve,
                new_reserve,
            },
        );
        info!(%previous_reserve, %new_reserve, "hardcap reserve decreased");
        Ok(())
    }

    /// Set the tokens granted to `participant` outside the tier table, replacing
    /// any earlier grant.
    pub fn set_private_allocation(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        participant: Address,
        amount: U256,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if ctx.timestamp >= self.closing_time {
            return Err(Errors::SaleClosed(SaleClosed {}));
        }
        self.validate_address(participant)?;

        let mut allocation = self.allocation(participant);
        let net_private_allocated = (self.net_private_allocated - allocation.allocated_private_allocation)
            .checked_add(amount)
            .ok_or(Errors::Overflow(Overflow {}))?;
        if net_private_allocated > self.private_allocation_cap {
            return Err(Errors::AllocationCapExceeded(AllocationCapExceeded {}));
        }

        allocation.allocated_private_allocation = amount;
        self.net_private_allocated = net_private_allocated;
        self.store_allocation(participant, allocation);
        ledger.emit(self.address, PrivateAllocationSet { participant, amount });
        info!(%participant, %amount, "private allocation set");
        Ok(())
    }

    pub fn pause(&mut self, ledger: &mut Ledger, ctx: &Context) -> Result<(), Errors> {
        self.validate_can_pause(ctx)?;
        self.paused = true;
        ledger.emit(self.address, Paused { account: ctx.sender });
        info!(account = %ctx.sender, "sale paused");
        Ok(())
    }

    pub fn unpause(&mut self, ledger: &mut Ledger, ctx: &Context) -> Result<(), Errors> {
        self.validate_can_pause(ctx)?;
        self.paused = false;
        ledger.emit(self.address, Unpaused { account: ctx.sender });
        info!(account = %ctx.sender, "sale unpaused");
        Ok(())
    }

    /// Allocation of `participant`, all zero if they never took part.
    pub fn allocation(&self, participant: Address) -> Allocation {
        self.allocations.get(&participant).copied().unwrap_or_default()
    }

    /// Participants in order of their first purchase or grant.
    pub fn participants(&self) -> &[Address] {
        &self.participants
    }

    pub fn allocations(&self) -> impl Iterator<Item = (Address, Allocation)> + '_ {
        self.participants
            .iter()
            .map(move |participant| (*participant, self.allocation(*participant)))
    }

    pub fn net_sold_tokens(&self) -> U256 {
        self.book.net_sold_tokens()
    }

    pub fn net_sold_dollar_units(&self) -> U256 {
        self.book.net_sold_dollar_units()
    }

    pub fn net_private_allocated(&self) -> U256 {
        self.net_private_allocated
    }

    pub fn private_allocation_cap(&self) -> U256 {
        self.private_allocation_cap
    }

    /// Tokens sellable through the tier table with the current reserve.
    pub fn current_hardcap(&self) -> Result<U256, Errors> {
        self.book.hard_cap_tokens()
    }

    pub fn hardcap_reserve(&self) -> U256 {
        self.book.reserve()
    }

    pub fn tiers(&self) -> &[Tier] {
        self.book.tiers()
    }

    pub fn tier_sold(&self, index: usize) -> U256 {
        self.book.tier_sold(index)
    }

    pub fn current_tier(&self) -> Option<usize> {
        self.book.current_tier()
    }

    pub fn state(&self, now: u64) -> SaleState {
        if now < self.opening_time {
            SaleState::NotYetOpen
        } else if now < self.closing_time {
            SaleState::Open
        } else {
            SaleState::Closed
        }
    }

    pub fn fetch_eth_price(&self, ledger: &Ledger) -> Result<(U256, u8), Errors> {
        self.oracle.fetch_price(ledger, FeedKind::Native)
    }

    pub fn fetch_stable_price(&self, ledger: &Ledger) -> Result<(U256, u8), Errors> {
        self.oracle.fetch_price(ledger, FeedKind::Stable)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    pub fn opening_time(&self) -> u64 {
        self.opening_time
    }

    pub fn closing_time(&self) -> u64 {
        self.closing_time
    }

    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    pub fn stable_asset(&self) -> Address {
        self.stable_asset
    }

    pub fn limits(&self) -> ContributionLimits {
        self.limits
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Function ensuring caller is whitelisted and the sale is open and not paused
    fn validate_can_purchase(&self, ctx: &Context) -> Result<(), Errors> {
        self.roles.require(Role::Whitelisted, ctx.sender)?;
        if self.paused || self.state(ctx.timestamp) != SaleState::Open {
            return Err(Errors::NotOpen(NotOpen {}));
        }

        Ok(())
    }

    /// Function ensuring the sale supports pausing and caller is a pauser
    fn validate_can_pause(&self, ctx: &Context) -> Result<(), Errors> {
        if !self.pausable {
            return Err(Errors::NotPausable(NotPausable {}));
        }
        self.roles.require(Role::Pauser, ctx.sender)
    }

    /// Function ensuring the contribution window is well formed
    fn validate_limits(limits: &ContributionLimits) -> Result<(), Errors> {
        if limits.max_contribution == U256::ZERO || limits.min_contribution > limits.max_contribution {
            return Err(Errors::InvalidLimits(InvalidLimits {}));
        }

        Ok(())
    }

    /// Function ensuring that a zero value is not supplied for an address
    fn validate_address(&self, value: Address) -> Result<(), Errors> {
        if value == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::PriceFeed;
    use crate::token::CappedToken;
    use crate::{dollars, tokens};
    use alloy_primitives::address;

    const SALE: Address = address!("0000000000000000000000000000000000005a1e");
    const ADMIN: Address = address!("00000000000000000000000000000000000000d0");
    const WALLET: Address = address!("B8ca88bFE9520e52C034D5901177a9F9504495A4");
    const ALICE: Address = address!("00000000000000000000000000000000000000a1");
    const ETH_USD: Address = address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");
    const USDC_USD: Address = address!("8fFfFfd4AfB6115b954Bd326cbe7B4BA576818f6");
    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    const OPEN: u64 = 1_000;
    const CLOSE: u64 = 10_000;

    fn setup(pausable: bool) -> (Ledger, SaleEngine) {
        let mut ledger = Ledger::new();
        ledger.deploy_feed(ETH_USD, PriceFeed::new(8, 200_000_000_000, OPEN));
        ledger.deploy_feed(USDC_USD, PriceFeed::new(8, 100_000_000, OPEN));
        let usdc = CappedToken::new(ADMIN, "USD Coin", "USDC", 6, U256::ZERO, U256::MAX).unwrap();
        ledger.deploy_token(USDC, usdc);
        ledger
            .call_token(USDC, |t| t.mint(ADMIN, ALICE, U256::from(100_000_000_000u64)))
            .unwrap();
        ledger.fund(ALICE, tokens(100));

        let mut config = SaleConfig::private_sale(WALLET, OPEN, CLOSE, ETH_USD, USDC_USD, USDC);
        config.pausable = pausable;
        let mut sale = SaleEngine::new(SALE, &Context::new(ADMIN, 0), config).unwrap();
        sale.roles_mut().add_whitelisted(ADMIN, ALICE).unwrap();
        (ledger, sale)
    }

    #[test]
    fn native_purchase_forwards_payment() {
        let (mut ledger, mut sale) = setup(false);
        // 1.25 ETH at $2000 = $2500
        let ctx = Context::new(ALICE, OPEN).with_value(U256::from(1_250_000_000_000_000_000u64));
        let purchase = sale.buy_using_native(&mut ledger, &ctx).unwrap();

        assert_eq!(purchase.dollar_units, dollars(2_500));
        assert_eq!(purchase.tokens, tokens(62_500));
        assert_eq!(ledger.native_balance(WALLET), ctx.value);
        assert_eq!(sale.allocation(ALICE).allocated_private_sale, tokens(62_500));
        assert_eq!(sale.participants(), &[ALICE]);
        assert_eq!(ledger.logs_of::<TokensPurchased>(SALE).count(), 1);
    }

    #[test]
    fn stable_purchase_requires_approval() {
        let (mut ledger, mut sale) = setup(false);
        let ctx = Context::new(ALICE, OPEN + 1);
        let amount = U256::from(1_000_000_000u64); // 1000 USDC

        let err = sale.buy_using_stable(&mut ledger, &ctx, amount).unwrap_err();
        assert!(matches!(err, Errors::InsufficientAllowance(_)));
        assert_eq!(sale.allocation(ALICE), Allocation::default());
        assert_eq!(sale.net_sold_tokens(), U256::ZERO);

        ledger
            .call_token(USDC, |t| t.approve(ALICE, SALE, amount))
            .unwrap();
        let purchase = sale.buy_using_stable(&mut ledger, &ctx, amount).unwrap();
        assert_eq!(purchase.tokens, tokens(25_000));
        assert_eq!(ledger.token(USDC).unwrap().balance_of(WALLET), amount);
    }

    #[test]
    fn purchases_outside_window_or_whitelist_fail() {
        let (mut ledger, mut sale) = setup(false);
        let value = tokens(1);

        let early = Context::new(ALICE, OPEN - 1).with_value(value);
        assert!(matches!(sale.buy_using_native(&mut ledger, &early), Err(Errors::NotOpen(_))));
        let late = Context::new(ALICE, CLOSE).with_value(value);
        assert!(matches!(sale.buy_using_native(&mut ledger, &late), Err(Errors::NotOpen(_))));
        let stranger = Context::new(ADMIN, OPEN).with_value(value);
        assert!(matches!(
            sale.buy_using_native(&mut ledger, &stranger),
            Err(Errors::NotWhitelisted(_))
        ));
        assert_eq!(ledger.native_balance(ALICE), tokens(100));
    }

    #[test]
    fn pause_closes_the_window() {
        let (mut ledger, mut sale) = setup(true);
        let admin = Context::new(ADMIN, OPEN);
        sale.pause(&mut ledger, &admin).unwrap();
        assert!(sale.is_paused());

        let ctx = Context::new(ALICE, OPEN).with_value(tokens(1));
        assert!(matches!(sale.buy_using_native(&mut ledger, &ctx), Err(Errors::NotOpen(_))));
        assert!(matches!(
            sale.unpause(&mut ledger, &Context::new(ALICE, OPEN)),
            Err(Errors::NotPauser(_))
        ));

        sale.unpause(&mut ledger, &admin).unwrap();
        assert!(sale.buy_using_native(&mut ledger, &ctx).is_ok());
    }

    #[test]
    fn pausing_requires_a_pausable_sale() {
        let (mut ledger, mut sale) = setup(false);
        assert!(matches!(
            sale.pause(&mut ledger, &Context::new(ADMIN, OPEN)),
            Err(Errors::NotPausable(_))
        ));
    }

    #[test]
    fn closing_time_only_moves_forward() {
        let (mut ledger, mut sale) = setup(false);
        let admin = Context::new(ADMIN, OPEN);
        assert!(matches!(
            sale.extend_closing_time(&mut ledger, &admin, CLOSE),
            Err(Errors::InvalidExtension(_))
        ));
        sale.extend_closing_time(&mut ledger, &admin, CLOSE + 100).unwrap();
        assert_eq!(sale.closing_time(), CLOSE + 100);
        assert_eq!(sale.state(CLOSE + 50), SaleState::Open);
        assert!(matches!(
            sale.extend_closing_time(&mut ledger, &Context::new(ALICE, OPEN), CLOSE + 200),
            Err(Errors::NotAdmin(_))
        ));
    }

    #[test]
    fn contribution_limits_are_validated() {
        let (_, mut sale) = setup(false);
        let admin = Context::new(ADMIN, OPEN);
        assert!(matches!(
            sale.set_contribution_limits(&admin, dollars(600), dollars(500)),
            Err(Errors::InvalidLimits(_))
        ));
        sale.set_contribution_limits(&admin, dollars(100), dollars(1_000)).unwrap();
        assert_eq!(sale.limits().min_contribution, dollars(100));
        assert_eq!(sale.limits().participant_ceiling, dollars(25_000));
    }

    #[test]
    fn zero_value_purchase_is_rejected_without_a_minimum() {
        let (mut ledger, mut sale) = setup(false);
        let admin = Context::new(ADMIN, OPEN);
        sale.set_contribution_limits(&admin, U256::ZERO, dollars(1_000)).unwrap();

        let ctx = Context::new(ALICE, OPEN);
        assert!(matches!(
            sale.buy_using_native(&mut ledger, &ctx),
            Err(Errors::ZeroValueArgumentInjected(_))
        ));
        assert!(matches!(
            sale.buy_using_stable(&mut ledger, &ctx, U256::ZERO),
            Err(Errors::ZeroValueArgumentInjected(_))
        ));
        assert!(sale.participants().is_empty());
        assert_eq!(ledger.logs_of::<TokensPurchased>(SALE).count(), 0);
    }

    #[test]
    fn zero_feed_address_is_rejected() {
        let (mut ledger, mut sale) = setup(false);
        let admin = Context::new(ADMIN, OPEN);
        assert!(matches!(
            sale.set_price_feed(&mut ledger, &admin, FeedKind::Native, Address::ZERO),
            Err(Errors::InvalidAddress(_))
        ));
        assert_eq!(sale.oracle().eth_feed, ETH_USD);
    }
}
