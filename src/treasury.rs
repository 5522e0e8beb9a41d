//! Post-sale custodian of BCUBE: releases organizational, advisor and participant
//! shares along the vesting schedule anchored at the listing time.

use alloy_primitives::{Address, U256};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::errors::*;
use crate::ledger::{Context, Ledger};
use crate::roles::{Role, RoleRegistry};
use crate::sale::{Allocation, SaleEngine, SaleState};
use crate::tiers::Round;
use crate::token::Erc20;
use crate::tokens;
use crate::vesting::VestingSchedule;

/// Independently vested share kinds held by the treasury.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Bucket {
    Team = 0,
    DevFund = 1,
    Reserves = 2,
    Bounty = 3,
    Community = 4,
    Advisor = 5,
    PrivateSale = 6,
    PublicSale = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    PreListing,
    PostListing,
}

/// Token amounts set aside for the organizational buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrgShares {
    pub team: U256,
    pub dev_fund: U256,
    pub reserves: U256,
    pub bounty: U256,
    pub community: U256,
}

impl OrgShares {
    pub fn bcube() -> Self {
        Self {
            team: tokens(7_500_000),
            dev_fund: tokens(5_000_000),
            reserves: tokens(7_000_000),
            bounty: tokens(500_000),
            community: tokens(2_000_000),
        }
    }

    fn of(&self, bucket: Bucket) -> U256 {
        match bucket {
            Bucket::Team => self.team,
            Bucket::DevFund => self.dev_fund,
            Bucket::Reserves => self.reserves,
            Bucket::Bounty => self.bounty,
            Bucket::Community => self.community,
            _ => U256::ZERO,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TreasuryConfig {
    pub token: Address,
    pub team_wallet: Address,
    pub listing_time: u64,
    pub shares: OrgShares,
    pub schedule: VestingSchedule,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Advisor {
    /// Tokens unlocked at each quarterly boundary.
    pub increase_in_allowance: U256,
    pub withdrawn: U256,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Participant {
    allocation: Allocation,
    private_sale_withdrawn: U256,
    public_sale_withdrawn: U256,
}

pub struct Treasury {
    address: Address,
    token: Address,
    team_wallet: Address,
    listing_time: u64,
    shares: OrgShares,
    schedule: VestingSchedule,
    roles: RoleRegistry,
    org_withdrawn: HashMap<Bucket, U256>,
    advisors: HashMap<Address, Advisor>,
    participants: HashMap<Address, Participant>,
    imported: HashSet<Address>,
}

impl Treasury {
    /// Deploy a treasury at `address`; the caller of `ctx` becomes the first admin.
    ///
    /// # Arguments
    ///
    /// * `address` - Address holding the treasury's tokens
    /// * `ctx` - Deployment context
    /// * `config` - Token, team wallet, listing time, organizational shares and vesting schedule
    pub fn new(address: Address, ctx: &Context, config: TreasuryConfig) -> Result<Self, Errors> {
        // Perform required validation
        if address == Address::ZERO || config.token == Address::ZERO || config.team_wallet == Address::ZERO {
            return Err(Errors::InvalidConfig(InvalidConfig {}));
        }
        config.schedule.validate()?;

        info!(%address, listing_time = config.listing_time, "treasury deployed");
        Ok(Self {
            address,
            token: config.token,
            team_wallet: config.team_wallet,
            listing_time: config.listing_time,
            shares: config.shares,
            schedule: config.schedule,
            roles: RoleRegistry::new(ctx.sender),
            org_withdrawn: HashMap::new(),
            advisors: HashMap::new(),
            participants: HashMap::new(),
            imported: HashSet::new(),
        })
    }

    pub fn team_share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::Team, amount)
    }

    pub fn dev_fund_share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::DevFund, amount)
    }

    pub fn reserves_share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::Reserves, amount)
    }

    pub fn bounty_share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::Bounty, amount)
    }

    pub fn community_share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::Community, amount)
    }

    pub fn advisor_share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::Advisor, amount)
    }

    /// Withdraw from the tokens bought in the private sale.
    pub fn private_sale_share_withdraw(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        amount: U256,
    ) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::PrivateSale, amount)
    }

    /// Withdraw from the tokens bought in the public rounds or granted as a private allocation.
    pub fn public_sale_share_withdraw(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        amount: U256,
    ) -> Result<(), Errors> {
        self.withdraw(ledger, ctx, Bucket::PublicSale, amount)
    }

    /// Same as [`Treasury::public_sale_share_withdraw`].
    pub fn share_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        self.public_sale_share_withdraw(ledger, ctx, amount)
    }

    fn withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, bucket: Bucket, amount: U256) -> Result<(), Errors> {
        self.try_withdraw(ledger, ctx, bucket, amount)
            .map_err(|err| rejected("share_withdraw", err))
    }

    fn try_withdraw(&mut self, ledger: &mut Ledger, ctx: &Context, bucket: Bucket, amount: U256) -> Result<(), Errors> {
        let holder = ctx.sender;
        let (unlocked, withdrawn) = self.share(bucket, holder, ctx.timestamp)?;
        if amount == U256::ZERO {
            return Err(Errors::ZeroValueArgumentInjected(ZeroValueArgumentInjected {}));
        }
        self.validate_listed(ctx.timestamp)?;

        let total_withdrawn = withdrawn
            .checked_add(amount)
            .ok_or(Errors::Overflow(Overflow {}))?;
        if total_withdrawn > unlocked {
            return Err(Errors::OutOfShare(OutOfShare {
                available: unlocked.saturating_sub(withdrawn),
            }));
        }

        let treasury = self.address;
        ledger.call_token(self.token, |token| token.transfer(treasury, holder, amount))?;

        // Record the withdrawal only once the tokens have moved
        self.set_withdrawn(bucket, holder, total_withdrawn);
        ledger.emit(
            self.address,
            ShareWithdrawn {
                holder,
                bucket: bucket as u8,
                amount,
            },
        );
        info!(%holder, ?bucket, %amount, "share withdrawn");
        Ok(())
    }

    /// `(unlocked, withdrawn)` of `holder`'s `bucket` at `now`, failing if `holder`
    /// does not hold that bucket.
    fn share(&self, bucket: Bucket, holder: Address, now: u64) -> Result<(U256, U256), Errors> {
        let elapsed = now.saturating_sub(self.listing_time);
        let schedule = &self.schedule;
        match bucket {
            Bucket::Team | Bucket::DevFund | Bucket::Reserves | Bucket::Bounty | Bucket::Community => {
                if holder != self.team_wallet {
                    return Err(Errors::NotTeam(NotTeam {}));
                }
                let curve = match bucket {
                    Bucket::Team => &schedule.team,
                    Bucket::DevFund => &schedule.dev_fund,
                    Bucket::Reserves => &schedule.reserves,
                    Bucket::Bounty => &schedule.bounty,
                    _ => &schedule.community,
                };
                let unlocked = curve.unlocked(self.shares.of(bucket), elapsed);
                Ok((unlocked, self.org_withdrawn.get(&bucket).copied().unwrap_or_default()))
            }
            Bucket::Advisor => {
                let advisor = self
                    .advisors
                    .get(&holder)
                    .ok_or(Errors::InvalidAdvisor(InvalidAdvisor {}))?;
                let total = advisor.increase_in_allowance.saturating_mul(U256::from(4u64));
                Ok((schedule.advisors.unlocked(total, elapsed), advisor.withdrawn))
            }
            Bucket::PrivateSale => {
                let participant = self.participant(holder)?;
                let unlocked = schedule
                    .private_sale
                    .unlocked(participant.allocation.allocated_private_sale, elapsed);
                Ok((unlocked, participant.private_sale_withdrawn))
            }
            Bucket::PublicSale => {
                let participant = self.participant(holder)?;
                let allocation = &participant.allocation;
                let unlocked = [Round::PrivateRound, Round::PublicRound, Round::PreIco, Round::Ico]
                    .into_iter()
                    .map(|round| schedule.round(round).unlocked(allocation.round(round), elapsed))
                    .fold(
                        schedule
                            .private_allocation
                            .unlocked(allocation.allocated_private_allocation, elapsed),
                        |acc, v| acc.saturating_add(v),
                    );
                Ok((unlocked, participant.public_sale_withdrawn))
            }
        }
    }

    fn participant(&self, holder: Address) -> Result<&Participant, Errors> {
        self.participants
            .get(&holder)
            .ok_or(Errors::NotParticipant(NotParticipant {}))
    }

    fn set_withdrawn(&mut self, bucket: Bucket, holder: Address, total_withdrawn: U256) {
        match bucket {
            Bucket::Advisor => {
                if let Some(advisor) = self.advisors.get_mut(&holder) {
                    advisor.withdrawn = total_withdrawn;
                }
            }
            Bucket::PrivateSale | Bucket::PublicSale => {
                if let Some(participant) = self.participants.get_mut(&holder) {
                    if bucket == Bucket::PrivateSale {
                        participant.private_sale_withdrawn = total_withdrawn;
                    } else {
                        participant.public_sale_withdrawn = total_withdrawn;
                    }
                }
            }
            _ => {
                self.org_withdrawn.insert(bucket, total_withdrawn);
            }
        }
    }

    /// Tokens `holder` could withdraw from `bucket` at `now`; zero for non-holders
    /// and before listing.
    pub fn withdrawable(&self, bucket: Bucket, holder: Address, now: u64) -> U256 {
        if now < self.listing_time {
            return U256::ZERO;
        }
        self.share(bucket, holder, now)
            .map(|(unlocked, withdrawn)| unlocked.saturating_sub(withdrawn))
            .unwrap_or_default()
    }

    /// Register `advisor` with `total_amount` tokens vesting in four quarters.
    pub fn add_advisor(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        advisor: Address,
        total_amount: U256,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if advisor == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }
        if self.is_advisor(advisor) {
            return Err(Errors::AdvisorExists(AdvisorExists {}));
        }

        self.update_advisor(ledger, advisor, total_amount / U256::from(4u64));
        Ok(())
    }

    pub fn set_advisor_allowance(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        advisor: Address,
        new_total: U256,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        self.validate_advisor(advisor)?;

        self.update_advisor(ledger, advisor, new_total / U256::from(4u64));
        Ok(())
    }

    /// Stop further vesting for `advisor`; tokens already withdrawn stay withdrawn.
    pub fn remove_advisor(&mut self, ledger: &mut Ledger, ctx: &Context, advisor: Address) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        self.validate_advisor(advisor)?;

        self.update_advisor(ledger, advisor, U256::ZERO);
        Ok(())
    }

    fn update_advisor(&mut self, ledger: &mut Ledger, advisor: Address, increase_in_allowance: U256) {
        self.advisors.entry(advisor).or_default().increase_in_allowance = increase_in_allowance;
        ledger.emit(
            self.address,
            AdvisorUpdated {
                advisor,
                increase_in_allowance,
            },
        );
        info!(%advisor, %increase_in_allowance, "advisor updated");
    }

    pub fn is_advisor(&self, account: Address) -> bool {
        self.advisors
            .get(&account)
            .is_some_and(|advisor| advisor.increase_in_allowance > U256::ZERO)
    }

    pub fn advisor(&self, account: Address) -> Option<Advisor> {
        self.advisors.get(&account).copied()
    }

    /// Copy the allocation ledger of a closed sale into the treasury.
    pub fn import_sale_allocations(
        &mut self,
        ledger: &mut Ledger,
        ctx: &Context,
        sale: &SaleEngine,
    ) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if sale.state(ctx.timestamp) != SaleState::Closed {
            return Err(Errors::SaleNotClosed(SaleNotClosed {}));
        }
        if ctx.timestamp >= self.listing_time {
            return Err(Errors::Unchangeable(Unchangeable {}));
        }
        if self.imported.contains(&sale.address()) {
            return Err(Errors::AlreadyImported(AlreadyImported {}));
        }

        // Merge into a scratch copy so a failure leaves the ledger untouched
        let mut participants = self.participants.clone();
        for (address, incoming) in sale.allocations() {
            let merged = &mut participants.entry(address).or_default().allocation;
            *merged = merge_allocations(merged, &incoming)?;
        }

        let count = sale.participants().len();
        self.participants = participants;
        self.imported.insert(sale.address());
        ledger.emit(
            self.address,
            AllocationsImported {
                sale: sale.address(),
                participants: U256::from(count),
            },
        );
        info!(sale = %sale.address(), count, "sale allocations imported");
        Ok(())
    }

    /// Combined allocation imported for `participant`, all zero if none.
    pub fn allocation(&self, participant: Address) -> Allocation {
        self.participants
            .get(&participant)
            .map(|p| p.allocation)
            .unwrap_or_default()
    }

    pub fn set_listing_time(&mut self, ledger: &mut Ledger, ctx: &Context, new_listing_time: u64) -> Result<(), Errors> {
        self.roles.require(Role::Admin, ctx.sender)?;
        if ctx.timestamp >= self.listing_time {
            return Err(Errors::Unchangeable(Unchangeable {}));
        }

        let previous_listing_time = self.listing_time;
        self.listing_time = new_listing_time;
        ledger.emit(
            self.address,
            ListingTimeChanged {
                previous_listing_time: U256::from(previous_listing_time),
                new_listing_time: U256::from(new_listing_time),
            },
        );
        info!(previous_listing_time, new_listing_time, "listing time changed");
        Ok(())
    }

    pub fn listing_time(&self) -> u64 {
        self.listing_time
    }

    pub fn phase(&self, now: u64) -> Phase {
        if now < self.listing_time {
            Phase::PreListing
        } else {
            Phase::PostListing
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn team_wallet(&self) -> Address {
        self.team_wallet
    }

    pub fn schedule(&self) -> &VestingSchedule {
        &self.schedule
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn roles_mut(&mut self) -> &mut RoleRegistry {
        &mut self.roles
    }

    /// Function ensuring the listing time has been reached
    fn validate_listed(&self, now: u64) -> Result<(), Errors> {
        if now < self.listing_time {
            return Err(Errors::OnlyAfterListing(OnlyAfterListing {}));
        }

        Ok(())
    }

    /// Function ensuring an address is a registered advisor
    fn validate_advisor(&self, advisor: Address) -> Result<(), Errors> {
        if !self.is_advisor(advisor) {
            return Err(Errors::InvalidAdvisor(InvalidAdvisor {}));
        }

        Ok(())
    }
}

fn merge_allocations(current: &Allocation, incoming: &Allocation) -> Result<Allocation, Errors> {
    let add = |a: U256, b: U256| a.checked_add(b).ok_or(Errors::Overflow(Overflow {}));
    Ok(Allocation {
        dollar_units_payed: add(current.dollar_units_payed, incoming.dollar_units_payed)?,
        allocated_private_sale: add(current.allocated_private_sale, incoming.allocated_private_sale)?,
        allocated_private_round: add(current.allocated_private_round, incoming.allocated_private_round)?,
        allocated_public_round: add(current.allocated_public_round, incoming.allocated_public_round)?,
        allocated_pre_ico: add(current.allocated_pre_ico, incoming.allocated_pre_ico)?,
        allocated_ico: add(current.allocated_ico, incoming.allocated_ico)?,
        allocated_private_allocation: add(
            current.allocated_private_allocation,
            incoming.allocated_private_allocation,
        )?,
    })
}
