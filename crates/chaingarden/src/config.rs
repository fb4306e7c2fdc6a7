//! Client configuration.
//!
//! Every field has a default matching the public testnet deployment.
//! [`ClientConfig::from_env`] overrides them from `CHAIN_GARDENS_*`
//! variables. A value that doesn't parse is ignored with a warning rather
//! than failing startup.

use std::time::Duration;

use chaingarden_poll::{DEFAULT_POLL_INTERVAL, PollConfig};
use chaingarden_session::{ChainConfig, SessionConfig};
use chaingarden_transport::DEFAULT_REQUEST_TIMEOUT;

use crate::notice::DEFAULT_NOTICE_TTL;

pub const API_URL_VAR: &str = "CHAIN_GARDENS_API_URL";
pub const CHAIN_ID_VAR: &str = "CHAIN_GARDENS_CHAIN_ID";
pub const CHAIN_NAME_VAR: &str = "CHAIN_GARDENS_CHAIN_NAME";
pub const RPC_URL_VAR: &str = "CHAIN_GARDENS_RPC_URL";
pub const EXPLORER_URL_VAR: &str = "CHAIN_GARDENS_EXPLORER_URL";
pub const PAYMASTER_ADDRESS_VAR: &str = "CHAIN_GARDENS_PAYMASTER_ADDRESS";
pub const POLLING_INTERVAL_VAR: &str = "CHAIN_GARDENS_POLLING_INTERVAL";
pub const REQUEST_TIMEOUT_VAR: &str = "CHAIN_GARDENS_REQUEST_TIMEOUT";
pub const NOTICE_TTL_VAR: &str = "CHAIN_GARDENS_NOTICE_TTL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_PAYMASTER_ADDRESS: &str = "0x5407B5040dec3D339A9247f3654E59EEccbb6391";

/// Everything the client needs to know about its deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL; endpoint paths are appended to it.
    pub api_url: String,
    pub chain: ChainConfig,
    /// Paymaster sponsoring smart-wallet transactions. Handed to the
    /// smart-wallet factory by the embedding application.
    pub paymaster_address: String,
    pub polling_interval: Duration,
    pub request_timeout: Duration,
    pub notice_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chain: ChainConfig::default(),
            paymaster_address: DEFAULT_PAYMASTER_ADDRESS.to_string(),
            polling_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = var(API_URL_VAR) {
            config.api_url = url;
        }
        if let Some(raw) = var(CHAIN_ID_VAR) {
            match parse_chain_id(&raw) {
                Some(id) => config.chain.chain_id = id,
                None => tracing::warn!(
                    var = CHAIN_ID_VAR,
                    value = %raw,
                    default = config.chain.chain_id,
                    "invalid chain id, using default"
                ),
            }
        }
        if let Some(name) = var(CHAIN_NAME_VAR) {
            config.chain.chain_name = name;
        }
        if let Some(url) = var(RPC_URL_VAR) {
            config.chain.rpc_url = url;
        }
        if let Some(url) = var(EXPLORER_URL_VAR) {
            config.chain.explorer_url = url;
        }
        if let Some(address) = var(PAYMASTER_ADDRESS_VAR) {
            config.paymaster_address = address;
        }
        if let Some(ms) = var(POLLING_INTERVAL_VAR) {
            config.polling_interval = parse_millis(POLLING_INTERVAL_VAR, &ms, config.polling_interval);
        }
        if let Some(ms) = var(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = parse_millis(REQUEST_TIMEOUT_VAR, &ms, config.request_timeout);
        }
        if let Some(ms) = var(NOTICE_TTL_VAR) {
            config.notice_ttl = parse_millis(NOTICE_TTL_VAR, &ms, config.notice_ttl);
        }

        config
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            chain: self.chain.clone(),
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::with_interval(self.polling_interval)
    }
}

/// Parses a chain id given as `0x`-prefixed hex or as decimal.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

fn parse_millis(var: &str, raw: &str, default: Duration) -> Duration {
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            tracing::warn!(
                var,
                value = %raw,
                default_ms = default.as_millis() as u64,
                "invalid duration, using default"
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_testnet() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.chain.chain_id, 11124);
        assert_eq!(config.chain.chain_name, "Abstract Testnet");
        assert_eq!(config.polling_interval, Duration::from_millis(30_000));
        assert_eq!(config.request_timeout, Duration::from_millis(10_000));
        assert_eq!(config.notice_ttl, Duration::from_millis(3_000));
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        assert_eq!(ClientConfig::from_lookup(|_| None), ClientConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides_fields() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://api.example.test/api/v1"),
            (CHAIN_ID_VAR, "0xAA36A7"),
            (CHAIN_NAME_VAR, "Sepolia"),
            (POLLING_INTERVAL_VAR, "5000"),
            (PAYMASTER_ADDRESS_VAR, "0xpay"),
        ]));

        assert_eq!(config.api_url, "https://api.example.test/api/v1");
        assert_eq!(config.chain.chain_id, 11155111);
        assert_eq!(config.chain.chain_name, "Sepolia");
        assert_eq!(config.polling_interval, Duration::from_secs(5));
        assert_eq!(config.paymaster_address, "0xpay");
    }

    #[test]
    fn test_chain_id_accepts_decimal_and_hex() {
        assert_eq!(parse_chain_id("11124"), Some(11124));
        assert_eq!(parse_chain_id("0x2B74"), Some(11124));
        assert_eq!(parse_chain_id("0x2b74"), Some(11124));
        assert_eq!(parse_chain_id("abstract"), None);
        assert_eq!(parse_chain_id("0x"), None);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            (CHAIN_ID_VAR, "mainnet"),
            (POLLING_INTERVAL_VAR, "soon"),
            (REQUEST_TIMEOUT_VAR, "0"),
            (NOTICE_TTL_VAR, "-5"),
        ]));

        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "   ")]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_session_and_poll_config_follow_fields() {
        let config = ClientConfig {
            polling_interval: Duration::from_secs(7),
            ..ClientConfig::default()
        };
        assert_eq!(config.poll_config().interval, Duration::from_secs(7));
        assert_eq!(config.session_config().chain, config.chain);
    }
}
