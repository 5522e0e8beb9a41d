//! Per-network deployment addresses, loaded from the environment.
//!
//! `BCUBE_NETWORK` selects a constant table (`mainnet` or `goerli`); `ETH_USD_FEED`,
//! `STABLE_USD_FEED`, `STABLE_ASSET` and `TEAM_WALLET` override single entries.
//! A `.env` file in the working directory is read first when present.

use alloy_primitives::{address, Address};
use std::{env, fmt, str::FromStr};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
    #[error("{var} is not a valid address: {value:?}")]
    InvalidAddress { var: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Goerli,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "goerli" => Ok(Network::Goerli),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Goerli => f.write_str("goerli"),
        }
    }
}

/// External contracts a sale is wired to on one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub eth_usd_feed: Address,
    pub stable_usd_feed: Address,
    pub stable_asset: Address,
    /// Zero when the network has no default team wallet.
    pub team_wallet: Address,
}

impl NetworkConfig {
    /// Built-in constants for `network`.
    pub const fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self {
                network,
                eth_usd_feed: address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419"),
                stable_usd_feed: address!("8fFfFfd4AfB6115b954Bd326cbe7B4BA576818f6"),
                stable_asset: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
                team_wallet: Address::ZERO,
            },
            Network::Goerli => Self {
                network,
                eth_usd_feed: address!("D4a33860578De61DBAbDc8BFdb98FD742fA7028e"),
                stable_usd_feed: address!("Ab5c49580294Aff77670F839ea425f5b78ab3Ae7"),
                stable_asset: address!("b5B640E6414b6DeF4FC9B3C1EeF373925effeCcF"),
                team_wallet: address!("B8ca88bFE9520e52C034D5901177a9F9504495A4"),
            },
        }
    }

    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Resolve the configuration from an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let network: Network = lookup("BCUBE_NETWORK")
            .ok_or(ConfigError::MissingVar("BCUBE_NETWORK"))?
            .parse()?;
        let mut config = Self::for_network(network);

        let overrides: [(&'static str, &mut Address); 4] = [
            ("ETH_USD_FEED", &mut config.eth_usd_feed),
            ("STABLE_USD_FEED", &mut config.stable_usd_feed),
            ("STABLE_ASSET", &mut config.stable_asset),
            ("TEAM_WALLET", &mut config.team_wallet),
        ];
        for (var, slot) in overrides {
            if let Some(value) = lookup(var) {
                *slot = parse_address(var, &value)?;
            }
        }

        if config.team_wallet == Address::ZERO {
            return Err(ConfigError::MissingVar("TEAM_WALLET"));
        }
        Ok(config)
    }
}

/// Parse a 20-byte hex address, with or without the `0x` prefix.
pub fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        var,
        value: value.to_string(),
    };
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    if bytes.len() != 20 {
        return Err(invalid());
    }
    Ok(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn goerli_defaults() {
        let config = NetworkConfig::from_vars(vars(&[("BCUBE_NETWORK", "goerli")])).unwrap();
        assert_eq!(config, NetworkConfig::for_network(Network::Goerli));
    }

    #[test]
    fn mainnet_needs_a_team_wallet() {
        let err = NetworkConfig::from_vars(vars(&[("BCUBE_NETWORK", "mainnet")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("TEAM_WALLET"));

        let config = NetworkConfig::from_vars(vars(&[
            ("BCUBE_NETWORK", "Mainnet"),
            ("TEAM_WALLET", "0x00000000000000000000000000000000000000a1"),
            ("STABLE_ASSET", "dAC17F958D2ee523a2206206994597C13D831ec7"),
        ]))
        .unwrap();
        assert_eq!(config.team_wallet, address!("00000000000000000000000000000000000000a1"));
        assert_eq!(
            config.stable_asset,
            address!("dAC17F958D2ee523a2206206994597C13D831ec7")
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            NetworkConfig::from_vars(vars(&[])).unwrap_err(),
            ConfigError::MissingVar("BCUBE_NETWORK")
        );
        assert!(matches!(
            NetworkConfig::from_vars(vars(&[("BCUBE_NETWORK", "rinkeby")])),
            Err(ConfigError::UnknownNetwork(_))
        ));
        assert!(matches!(
            parse_address("TEAM_WALLET", "0x1234"),
            Err(ConfigError::InvalidAddress { var: "TEAM_WALLET", .. })
        ));
    }
}
