//! Named network profiles for the deploy scripts.
//!
//! Each network resolves to a connection profile: an RPC endpoint, the
//! deployer's key, and any gas overrides pinned for that chain. Endpoints
//! for the public Ethereum networks come from the environment rather than
//! being committed to the repo.

use std::{
    env,
    fmt::{self, Display},
};

use clap::ValueEnum;

use crate::{
    constants::{
        ETHERSCAN_API_KEY_ENV_VAR, HOLESKY_EXPLORER_API_URL, LOCAL_RPC_URL, MAINNET_EXPLORER_API_URL,
        MATIC_EXPLORER_API_URL, MATIC_GAS_LIMIT, MATIC_GAS_PRICE, MATIC_RPC_URL, PRIVATE_KEY_ENV_VAR,
        RPC_URL_ENV_VAR,
    },
    errors::ScriptError,
};

/// The networks the scripts can deploy to
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// A local development node
    Hardhat,
    /// Ethereum mainnet
    Mainnet,
    /// The Holesky testnet
    Holesky,
    /// A generic testnet, with its RPC endpoint taken from the environment
    Testnet,
    /// The legacy Polygon Mumbai testnet
    Matic,
}

impl Network {
    /// Get the gas limit & gas price overrides pinned for the network, if any
    pub fn gas_overrides(&self) -> (Option<u64>, Option<u128>) {
        match self {
            Network::Matic => (Some(MATIC_GAS_LIMIT), Some(MATIC_GAS_PRICE)),
            _ => (None, None),
        }
    }

    /// Get the block explorer API endpoint for the network, if it has one
    pub fn explorer_api_url(&self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some(MAINNET_EXPLORER_API_URL),
            Network::Holesky => Some(HOLESKY_EXPLORER_API_URL),
            Network::Matic => Some(MATIC_EXPLORER_API_URL),
            Network::Hardhat | Network::Testnet => None,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Hardhat => write!(f, "hardhat"),
            Network::Mainnet => write!(f, "mainnet"),
            Network::Holesky => write!(f, "holesky"),
            Network::Testnet => write!(f, "testnet"),
            Network::Matic => write!(f, "matic"),
        }
    }
}

/// A resolved connection profile for a network
#[derive(Clone, Debug)]
pub struct NetworkProfile {
    /// The network the profile was resolved for
    pub network: Network,
    /// The RPC endpoint transactions are submitted through
    pub rpc_url: String,
    /// The deployer's private key, hex encoded with a `0x` prefix
    pub private_key: String,
    /// A gas limit override applied to every transaction, if any
    pub gas_limit: Option<u64>,
    /// A gas price override applied to every transaction, in wei, if any
    pub gas_price: Option<u128>,
}

/// Resolve the connection profile for the given network.
///
/// An explicit RPC URL takes precedence over the network's own endpoint.
/// Networks whose endpoint comes from the environment fail here, before any
/// remote call is attempted, when the variable is unset or empty.
pub fn network_profile(
    network: Network,
    rpc_url_override: Option<String>,
    raw_private_key: &str,
) -> Result<NetworkProfile, ScriptError> {
    let rpc_url = resolve_rpc_url(network, rpc_url_override, |var| env::var(var).ok())?;
    let private_key = normalize_private_key(raw_private_key)?;
    let (gas_limit, gas_price) = network.gas_overrides();

    Ok(NetworkProfile {
        network,
        rpc_url,
        private_key,
        gas_limit,
        gas_price,
    })
}

/// Resolve the block explorer API key from the environment
pub fn etherscan_api_key() -> Result<String, ScriptError> {
    lookup_required_var(ETHERSCAN_API_KEY_ENV_VAR, |var| env::var(var).ok())
}

/// Resolve the RPC URL for a network, with `env_lookup` supplying
/// environment variable values
fn resolve_rpc_url<F>(
    network: Network,
    rpc_url_override: Option<String>,
    env_lookup: F,
) -> Result<String, ScriptError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = rpc_url_override {
        return Ok(url);
    }

    match network {
        Network::Hardhat => Ok(LOCAL_RPC_URL.to_string()),
        Network::Matic => Ok(MATIC_RPC_URL.to_string()),
        Network::Mainnet | Network::Holesky | Network::Testnet => {
            lookup_required_var(RPC_URL_ENV_VAR, env_lookup)
        }
    }
}

/// Look up a required variable, treating an empty value the same as an
/// unset one
fn lookup_required_var<F>(var: &str, env_lookup: F) -> Result<String, ScriptError>
where
    F: Fn(&str) -> Option<String>,
{
    env_lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ScriptError::EnvVar(format!("{} is not set", var)))
}

/// Normalize a private key to `0x`-prefixed hex, as the signer expects it
fn normalize_private_key(raw_key: &str) -> Result<String, ScriptError> {
    let trimmed = raw_key.trim();
    if trimmed.is_empty() {
        return Err(ScriptError::EnvVar(format!(
            "{} is not set",
            PRIVATE_KEY_ENV_VAR
        )));
    }

    if trimmed.starts_with("0x") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("0x{}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{LOCAL_RPC_URL, MATIC_GAS_LIMIT, MATIC_GAS_PRICE, MATIC_RPC_URL};

    use super::{normalize_private_key, resolve_rpc_url, Network};

    /// A dummy private key used across the tests
    const DUMMY_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Env-backed networks must fail to resolve, rather than produce an
    /// empty endpoint, when the variable is unset or blank
    #[test]
    fn test_env_backed_networks_require_rpc_url() {
        for network in [Network::Mainnet, Network::Holesky, Network::Testnet] {
            assert!(resolve_rpc_url(network, None, |_| None).is_err());
            assert!(resolve_rpc_url(network, None, |_| Some(String::new())).is_err());
            assert!(resolve_rpc_url(network, None, |_| Some("  ".to_string())).is_err());
        }
    }

    /// Env-backed networks resolve to the variable's value when it is set
    #[test]
    fn test_env_backed_networks_use_env_url() {
        let url = resolve_rpc_url(Network::Mainnet, None, |_| {
            Some("https://rpc.example.com".to_string())
        })
        .unwrap();

        assert_eq!(url, "https://rpc.example.com");
    }

    /// Networks with fixed endpoints resolve without consulting the
    /// environment
    #[test]
    fn test_fixed_endpoint_networks() {
        let hardhat = resolve_rpc_url(Network::Hardhat, None, |_| None).unwrap();
        let matic = resolve_rpc_url(Network::Matic, None, |_| None).unwrap();

        assert_eq!(hardhat, LOCAL_RPC_URL);
        assert_eq!(matic, MATIC_RPC_URL);
    }

    /// An explicit RPC URL beats the network's own endpoint
    #[test]
    fn test_rpc_url_override_wins() {
        let url = resolve_rpc_url(
            Network::Matic,
            Some("http://localhost:9545".to_string()),
            |_| None,
        )
        .unwrap();

        assert_eq!(url, "http://localhost:9545");
    }

    /// Only the legacy Mumbai network carries gas overrides
    #[test]
    fn test_gas_overrides() {
        assert_eq!(
            Network::Matic.gas_overrides(),
            (Some(MATIC_GAS_LIMIT), Some(MATIC_GAS_PRICE))
        );
        for network in [
            Network::Hardhat,
            Network::Mainnet,
            Network::Holesky,
            Network::Testnet,
        ] {
            assert_eq!(network.gas_overrides(), (None, None));
        }
    }

    /// Keys are accepted with or without a `0x` prefix and normalized to
    /// prefixed form
    #[test]
    fn test_private_key_normalization() {
        let prefixed = format!("0x{}", DUMMY_KEY);

        assert_eq!(normalize_private_key(DUMMY_KEY).unwrap(), prefixed);
        assert_eq!(normalize_private_key(&prefixed).unwrap(), prefixed);
        assert!(normalize_private_key("").is_err());
        assert!(normalize_private_key("   ").is_err());
    }
}
