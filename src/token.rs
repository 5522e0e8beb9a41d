//! Capped, owner-mintable fungible token (the BCUBE token and the stable asset).

use alloy_primitives::{Address, LogData, U256};
use alloy_sol_types::SolEvent;
use std::collections::HashMap;

use crate::errors::*;
use crate::ledger::encode_event;

/// ERC20 surface the sale, treasury and staking engines call into.
///
/// The caller of each state-changing method is passed explicitly as `sender`.
pub trait Erc20 {
    fn decimals(&self) -> u8;
    fn total_supply(&self) -> U256;
    fn balance_of(&self, account: Address) -> U256;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn transfer(&mut self, sender: Address, to: Address, amount: U256) -> Result<bool, Errors>;
    fn approve(&mut self, sender: Address, spender: Address, amount: U256) -> Result<bool, Errors>;
    fn transfer_from(
        &mut self,
        sender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, Errors>;
}

/// Fixed-decimals token whose supply can never exceed `cap`.
#[derive(Clone, Debug)]
pub struct CappedToken {
    name: String,
    symbol: String,
    decimals: u8,
    cap: U256,
    total_supply: U256,
    owner: Address,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    events: Vec<LogData>,
}

impl CappedToken {
    /// Deploy the token, minting `initial_supply` to `deployer`, who becomes the owner.
    pub fn new(
        deployer: Address,
        name: &str,
        symbol: &str,
        decimals: u8,
        initial_supply: U256,
        cap: U256,
    ) -> Result<Self, Errors> {
        if cap == U256::ZERO {
            return Err(Errors::InvalidConfig(InvalidConfig {}));
        }
        let mut token = Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            cap,
            total_supply: U256::ZERO,
            owner: deployer,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            events: Vec::new(),
        };
        if initial_supply > U256::ZERO {
            token.mint(deployer, deployer, initial_supply)?;
        }
        Ok(token)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn cap(&self) -> U256 {
        self.cap
    }

    /// Current owner, or the zero address once ownership is renounced.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Drain the logs emitted since the last call.
    pub fn take_events(&mut self) -> Vec<LogData> {
        std::mem::take(&mut self.events)
    }

    pub fn mint(&mut self, sender: Address, to: Address, amount: U256) -> Result<(), Errors> {
        self.validate_sender_is_owner(sender)?;
        if to == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(Errors::Overflow(Overflow {}))?;
        if total_supply > self.cap {
            return Err(Errors::CapExceeded(CapExceeded {}));
        }

        let balance = self.balance_of(to) + amount;
        self.total_supply = total_supply;
        self.balances.insert(to, balance);
        self.log(Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        });
        Ok(())
    }

    /// Destroy `amount` of the caller's own tokens.
    pub fn burn(&mut self, sender: Address, amount: U256) -> Result<(), Errors> {
        self.burn_balance(sender, amount)
    }

    /// Destroy `amount` of `account`'s tokens, spending the caller's allowance.
    pub fn burn_from(&mut self, sender: Address, account: Address, amount: U256) -> Result<(), Errors> {
        let remaining = self.checked_allowance(account, sender, amount)?;
        self.burn_balance(account, amount)?;
        self.allowances.insert((account, sender), remaining);
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        sender: Address,
        spender: Address,
        added: U256,
    ) -> Result<bool, Errors> {
        let allowance = self
            .allowance(sender, spender)
            .checked_add(added)
            .ok_or(Errors::Overflow(Overflow {}))?;
        self.set_allowance(sender, spender, allowance)?;
        Ok(true)
    }

    pub fn decrease_allowance(
        &mut self,
        sender: Address,
        spender: Address,
        subtracted: U256,
    ) -> Result<bool, Errors> {
        let allowance = self
            .allowance(sender, spender)
            .checked_sub(subtracted)
            .ok_or(Errors::InsufficientAllowance(InsufficientAllowance {}))?;
        self.set_allowance(sender, spender, allowance)?;
        Ok(true)
    }

    pub fn transfer_ownership(&mut self, sender: Address, new_owner: Address) -> Result<(), Errors> {
        self.validate_sender_is_owner(sender)?;
        if new_owner == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }
        self.set_owner(new_owner);
        Ok(())
    }

    /// Give up ownership for good; minting is impossible afterwards.
    pub fn renounce_ownership(&mut self, sender: Address) -> Result<(), Errors> {
        self.validate_sender_is_owner(sender)?;
        self.set_owner(Address::ZERO);
        Ok(())
    }

    /// Function ensuring sender is the current owner of the token
    fn validate_sender_is_owner(&self, sender: Address) -> Result<(), Errors> {
        if self.owner == Address::ZERO || sender != self.owner {
            return Err(Errors::NotOwner(NotOwner {}));
        }

        Ok(())
    }

    fn set_owner(&mut self, new_owner: Address) {
        let previous_owner = self.owner;
        self.owner = new_owner;
        self.log(OwnershipTransferred {
            previous_owner,
            new_owner,
        });
    }

    fn burn_balance(&mut self, account: Address, amount: U256) -> Result<(), Errors> {
        let balance = self
            .balance_of(account)
            .checked_sub(amount)
            .ok_or(Errors::InsufficientBalance(InsufficientBalance {}))?;
        self.balances.insert(account, balance);
        self.total_supply -= amount;
        self.log(Transfer {
            from: account,
            to: Address::ZERO,
            value: amount,
        });
        Ok(())
    }

    fn checked_allowance(&self, owner: Address, spender: Address, amount: U256) -> Result<U256, Errors> {
        self.allowance(owner, spender)
            .checked_sub(amount)
            .ok_or(Errors::InsufficientAllowance(InsufficientAllowance {}))
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, value: U256) -> Result<(), Errors> {
        if spender == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }
        self.allowances.insert((owner, spender), value);
        self.log(Approval {
            owner,
            spender,
            value,
        });
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Errors> {
        if from == Address::ZERO || to == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(Errors::InsufficientBalance(InsufficientBalance {}))?;
        self.balances.insert(from, from_balance);
        // Cannot overflow: the sum of all balances is bounded by `cap`.
        let to_balance = self.balance_of(to) + amount;
        self.balances.insert(to, to_balance);
        self.log(Transfer {
            from,
            to,
            value: amount,
        });
        Ok(())
    }

    fn log<E: SolEvent>(&mut self, event: E) {
        self.events.push(encode_event(&event));
    }
}

impl Erc20 for CappedToken {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(&mut self, sender: Address, to: Address, amount: U256) -> Result<bool, Errors> {
        self.move_balance(sender, to, amount)?;
        Ok(true)
    }

    fn approve(&mut self, sender: Address, spender: Address, amount: U256) -> Result<bool, Errors> {
        self.set_allowance(sender, spender, amount)?;
        Ok(true)
    }

    fn transfer_from(
        &mut self,
        sender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, Errors> {
        let remaining = self.checked_allowance(from, sender, amount)?;
        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, sender), remaining);
        Ok(true)
    }
}
