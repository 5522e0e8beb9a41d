//! The execution platform the engines run on: per-call context, native value,
//! token and price-feed contracts addressed by [`Address`], and the event log.

use alloy_primitives::{Address, Log, LogData, U256};
use alloy_sol_types::SolEvent;
use std::collections::HashMap;

use crate::errors::*;
use crate::oracle::PriceFeed;
use crate::token::CappedToken;

/// Caller identity, block time and attached native value of a single operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    pub sender: Address,
    pub timestamp: u64,
    pub value: U256,
}

impl Context {
    pub fn new(sender: Address, timestamp: u64) -> Self {
        Self {
            sender,
            timestamp,
            value: U256::ZERO,
        }
    }

    /// Same call, carrying `value` wei.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// In-memory ledger holding native balances, deployed contracts and emitted logs.
#[derive(Default)]
pub struct Ledger {
    native: HashMap<Address, U256>,
    tokens: HashMap<Address, CappedToken>,
    feeds: HashMap<Address, PriceFeed>,
    logs: Vec<Log>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit native coin to `account` out of thin air (genesis allocation).
    pub fn fund(&mut self, account: Address, amount: U256) {
        let balance = self.native.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.native.get(&account).copied().unwrap_or_default()
    }

    /// Move native coin between accounts; fails without touching either balance.
    pub fn transfer_native(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Errors> {
        if to == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }
        let from_balance = self.native_balance(from);
        if from_balance < amount {
            return Err(Errors::InsufficientBalance(InsufficientBalance {}));
        }
        let to_balance = self
            .native_balance(to)
            .checked_add(amount)
            .ok_or(Errors::Overflow(Overflow {}))?;

        self.native.insert(from, from_balance - amount);
        self.native.insert(to, to_balance);
        Ok(())
    }

    pub fn deploy_token(&mut self, address: Address, token: CappedToken) {
        self.tokens.insert(address, token);
    }

    pub fn token(&self, address: Address) -> Result<&CappedToken, Errors> {
        self.tokens
            .get(&address)
            .ok_or(Errors::UnknownContract(UnknownContract {}))
    }

    /// Run `call` against the token at `address` and record the logs it emitted.
    ///
    /// Logs of a failed call are discarded along with its state changes.
    pub fn call_token<R>(
        &mut self,
        address: Address,
        call: impl FnOnce(&mut CappedToken) -> Result<R, Errors>,
    ) -> Result<R, Errors> {
        let token = self
            .tokens
            .get_mut(&address)
            .ok_or(Errors::UnknownContract(UnknownContract {}))?;
        let mut scratch = token.clone();
        let result = call(&mut scratch)?;
        let events = scratch.take_events();
        *token = scratch;
        self.logs.extend(events.into_iter().map(|data| Log { address, data }));
        Ok(result)
    }

    pub fn deploy_feed(&mut self, address: Address, feed: PriceFeed) {
        self.feeds.insert(address, feed);
    }

    /// Price feed at `address`; an unset or zero address is reported as unavailable.
    pub fn feed(&self, address: Address) -> Result<&PriceFeed, Errors> {
        if address == Address::ZERO {
            return Err(Errors::OracleUnavailable(OracleUnavailable {}));
        }
        self.feeds
            .get(&address)
            .ok_or(Errors::OracleUnavailable(OracleUnavailable {}))
    }

    pub fn feed_mut(&mut self, address: Address) -> Result<&mut PriceFeed, Errors> {
        self.feeds
            .get_mut(&address)
            .ok_or(Errors::OracleUnavailable(OracleUnavailable {}))
    }

    /// Append `event` to the log as emitted by the contract at `emitter`.
    pub fn emit<E: SolEvent>(&mut self, emitter: Address, event: E) {
        self.logs.push(Log {
            address: emitter,
            data: encode_event(&event),
        });
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Logs of type `E` emitted by `emitter`, in emission order.
    pub fn logs_of<E: SolEvent>(&self, emitter: Address) -> impl Iterator<Item = &Log> + '_ {
        self.logs.iter().filter(move |log| {
            log.address == emitter && log.data.topics().first() == Some(&E::SIGNATURE_HASH)
        })
    }
}

/// ABI-encode `event` as the topics and data of a log entry.
pub(crate) fn encode_event<E: SolEvent>(event: &E) -> LogData {
    let topics = event.encode_topics().into_iter().map(|topic| topic.0).collect();
    LogData::new_unchecked(topics, event.encode_data().into())
}
