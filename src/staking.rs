//! Stake registry: BCUBE locked by an account with the staking address.

use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use tracing::info;

use crate::errors::*;
use crate::ledger::{Context, Ledger};
use crate::token::Erc20;

pub struct Staking {
    address: Address,
    token: Address,
    stakes: HashMap<Address, U256>,
    total_staked: U256,
}

impl Staking {
    pub fn new(address: Address, token: Address) -> Result<Self, Errors> {
        if address == Address::ZERO || token == Address::ZERO {
            return Err(Errors::InvalidConfig(InvalidConfig {}));
        }

        Ok(Self {
            address,
            token,
            stakes: HashMap::new(),
            total_staked: U256::ZERO,
        })
    }

    /// Lock `amount` of the caller's tokens; the caller must have approved the
    /// staking address.
    pub fn stake(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        if amount == U256::ZERO {
            return Err(Errors::ZeroValueArgumentInjected(ZeroValueArgumentInjected {}));
        }
        let staked = self
            .stake_of(ctx.sender)
            .checked_add(amount)
            .ok_or(Errors::Overflow(Overflow {}))?;

        let (staking, staker) = (self.address, ctx.sender);
        ledger
            .call_token(self.token, |token| token.transfer_from(staking, staker, staking, amount))
            .map_err(|err| rejected("stake", err))?;

        self.stakes.insert(staker, staked);
        self.total_staked += amount;
        ledger.emit(self.address, Staked { account: staker, amount });
        info!(account = %staker, %amount, "staked");
        Ok(())
    }

    /// Return `amount` of the caller's staked tokens.
    pub fn unstake(&mut self, ledger: &mut Ledger, ctx: &Context, amount: U256) -> Result<(), Errors> {
        if amount == U256::ZERO {
            return Err(Errors::ZeroValueArgumentInjected(ZeroValueArgumentInjected {}));
        }
        let staked = self
            .stake_of(ctx.sender)
            .checked_sub(amount)
            .ok_or(Errors::InsufficientStake(InsufficientStake {}))?;

        let (staking, staker) = (self.address, ctx.sender);
        ledger
            .call_token(self.token, |token| token.transfer(staking, staker, amount))
            .map_err(|err| rejected("unstake", err))?;

        self.stakes.insert(staker, staked);
        self.total_staked -= amount;
        ledger.emit(self.address, Unstaked { account: staker, amount });
        info!(account = %staker, %amount, "unstaked");
        Ok(())
    }

    pub fn stake_of(&self, account: Address) -> U256 {
        self.stakes.get(&account).copied().unwrap_or_default()
    }

    pub fn total_staked(&self) -> U256 {
        self.total_staked
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::CappedToken;
    use crate::tokens;
    use alloy_primitives::address;

    const STAKING: Address = address!("000000000000000000000000000000000000057a");
    const BCUBE: Address = address!("000000000000000000000000000000000000bc0b");
    const OWNER: Address = address!("00000000000000000000000000000000000000d0");
    const STAKER: Address = address!("00000000000000000000000000000000000000a1");

    fn setup() -> (Ledger, Staking) {
        let mut ledger = Ledger::new();
        let token = CappedToken::new(OWNER, "b-cube.ai Token", "BCUBE", 18, U256::ZERO, tokens(50_000_000)).unwrap();
        ledger.deploy_token(BCUBE, token);
        ledger
            .call_token(BCUBE, |t| t.mint(OWNER, STAKER, tokens(6_000)))
            .unwrap();
        ledger
            .call_token(BCUBE, |t| t.approve(STAKER, STAKING, tokens(6_000)))
            .unwrap();
        (ledger, Staking::new(STAKING, BCUBE).unwrap())
    }

    #[test]
    fn stake_moves_tokens_to_the_staking_address() {
        let (mut ledger, mut staking) = setup();
        let ctx = Context::new(STAKER, 1);
        staking.stake(&mut ledger, &ctx, tokens(5_555)).unwrap();
        assert_eq!(staking.stake_of(STAKER), tokens(5_555));
        assert_eq!(ledger.token(BCUBE).unwrap().balance_of(STAKING), tokens(5_555));

        staking.stake(&mut ledger, &ctx, tokens(5)).unwrap();
        staking.unstake(&mut ledger, &ctx, tokens(5)).unwrap();
        assert_eq!(staking.stake_of(STAKER), tokens(5_555));
        assert_eq!(staking.total_staked(), tokens(5_555));
        assert_eq!(ledger.logs_of::<Staked>(STAKING).count(), 2);
    }

    #[test]
    fn unstaking_more_than_staked_fails() {
        let (mut ledger, mut staking) = setup();
        let ctx = Context::new(STAKER, 1);
        staking.stake(&mut ledger, &ctx, tokens(5_555)).unwrap();

        let err = staking
            .unstake(&mut ledger, &ctx, tokens(5_555) + U256::from(1u64))
            .unwrap_err();
        assert!(matches!(err, Errors::InsufficientStake(_)));
        assert!(matches!(
            staking.unstake(&mut ledger, &Context::new(OWNER, 1), tokens(1)),
            Err(Errors::InsufficientStake(_))
        ));
        assert!(matches!(
            staking.stake(&mut ledger, &ctx, U256::ZERO),
            Err(Errors::ZeroValueArgumentInjected(_))
        ));
    }
}
