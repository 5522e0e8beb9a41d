#![allow(dead_code)]

use alloy_primitives::{address, Address, U256};
use bcube_token_sale::oracle::PriceFeed;
use bcube_token_sale::{tokens, CappedToken, Context, Ledger, SaleConfig, SaleEngine};

pub const ADMIN: Address = address!("00000000000000000000000000000000000000d0");
pub const WALLET: Address = address!("B8ca88bFE9520e52C034D5901177a9F9504495A4");
pub const SALE: Address = address!("0000000000000000000000000000000000005a1e");
pub const TREASURY: Address = address!("0000000000000000000000000000000000007ea5");
pub const BCUBE: Address = address!("000000000000000000000000000000000000bc0b");
pub const ETH_USD: Address = address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");
pub const USDT_USD: Address = address!("Ee9F2375b4bdF6387aa8265dD4FB8F16512A1d46");
pub const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
pub const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

pub const OPENING: u64 = 1_700_000_000;
pub const CLOSING: u64 = OPENING + 30 * 24 * 60 * 60;

/// $2000.00000000 per ETH
pub const ETH_PRICE: i128 = 200_000_000_000;

pub fn participant(n: u8) -> Address {
    Address::from([n; 20])
}

/// Wei worth `n` dollars at [`ETH_PRICE`].
pub fn eth_for(n: u64) -> U256 {
    tokens(n) / U256::from(2_000u64)
}

/// Base units of a 6-decimal stablecoin for `n` dollars.
pub fn stable(n: u64) -> U256 {
    U256::from(n) * U256::from(1_000_000u64)
}

/// Ledger with both feeds, BCUBE, USDT and USDC deployed and `ADMIN` owning the tokens.
pub fn ledger() -> eyre::Result<Ledger> {
    let mut ledger = Ledger::new();
    ledger.deploy_feed(ETH_USD, PriceFeed::new(8, ETH_PRICE, OPENING));
    ledger.deploy_feed(USDT_USD, PriceFeed::new(8, 100_000_000, OPENING));
    ledger.deploy_token(
        BCUBE,
        CappedToken::new(ADMIN, "b-cube.ai Token", "BCUBE", 18, tokens(1_000), tokens(50_000_000))?,
    );
    ledger.deploy_token(
        USDT,
        CappedToken::new(ADMIN, "Tether USD", "USDT", 6, U256::ZERO, U256::MAX)?,
    );
    ledger.deploy_token(
        USDC,
        CappedToken::new(ADMIN, "USD Coin", "USDC", 6, U256::ZERO, U256::MAX)?,
    );
    Ok(ledger)
}

/// Deploy a sale built by `preset`, whitelisting and funding participants `1..=count`.
pub fn sale(
    ledger: &mut Ledger,
    preset: fn(Address, u64, u64, Address, Address, Address) -> SaleConfig,
    count: u8,
) -> eyre::Result<SaleEngine> {
    let config = preset(WALLET, OPENING, CLOSING, ETH_USD, USDT_USD, USDT);
    let mut sale = SaleEngine::new(SALE, &Context::new(ADMIN, OPENING - 100), config)?;
    for n in 1..=count {
        let account = participant(n);
        sale.roles_mut().add_whitelisted(ADMIN, account)?;
        ledger.fund(account, tokens(1_000));
        ledger.call_token(USDT, |t| t.mint(ADMIN, account, stable(1_000_000)))?;
    }
    Ok(sale)
}

/// Buy `n` dollars worth with ETH as `account` at `at`.
pub fn buy_eth(
    ledger: &mut Ledger,
    sale: &mut SaleEngine,
    account: Address,
    n: u64,
    at: u64,
) -> Result<bcube_token_sale::sale::Purchase, bcube_token_sale::Errors> {
    let ctx = Context::new(account, at).with_value(eth_for(n));
    sale.buy_using_native(ledger, &ctx)
}
