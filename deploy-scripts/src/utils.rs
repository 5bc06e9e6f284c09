//! Utilities for the deploy scripts.

use std::{fs, path::PathBuf, str::FromStr};

use alloy::{
    network::{Ethereum, EthereumWallet},
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::Address;
use serde_json::Value;

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError, network::NetworkProfile};

/// The provider type the scripts submit transactions through
pub type Client = DynProvider<Ethereum>;

/// Set up the client with which to send transactions, signing with the
/// profile's private key
pub fn setup_client(profile: &NetworkProfile) -> Result<Client, ScriptError> {
    let url = Url::parse(&profile.rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let signer = PrivateKeySigner::from_str(&profile.private_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    // The builder's recommended fillers cover gas, nonce, and chain id
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok(DynProvider::new(provider))
}

/// Parse an address from a hex string
pub fn parse_address(addr: &str) -> Result<Address, ScriptError> {
    Address::from_str(addr)
        .map_err(|e| ScriptError::CalldataConstruction(format!("invalid address {}: {}", addr, e)))
}

/// Parse the address recorded under the given key in the deployments file
pub fn read_deployed_address(
    file_path: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = read_deployments_file(file_path)?;

    let addr_str = parsed_json[DEPLOYMENTS_KEY][contract_key]
        .as_str()
        .ok_or_else(|| {
            ScriptError::ReadDeployments(format!(
                "no address recorded for {} in {}",
                contract_key, file_path
            ))
        })?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record a deployed address under the given key in the deployments file.
///
/// The file is created if it doesn't exist, and keys other than the one
/// being written are left untouched.
pub fn write_deployed_address(
    file_path: &str,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    // If the file doesn't exist, create it
    if !PathBuf::from(file_path).exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    }
    let mut parsed_json = read_deployments_file(file_path)?;

    // Indexing into anything other than an object would panic below, both
    // at the root and at the deployments key
    let root_indexable = parsed_json.is_object() || parsed_json.is_null();
    let deployments_indexable = matches!(
        parsed_json.get(DEPLOYMENTS_KEY),
        None | Some(Value::Null) | Some(Value::Object(_))
    );
    if !root_indexable || !deployments_indexable {
        return Err(ScriptError::WriteDeployments(format!(
            "malformed deployments file at {}",
            file_path
        )));
    }

    parsed_json[DEPLOYMENTS_KEY][contract_key] = Value::String(format!("{address:#x}"));

    let serialized = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, serialized).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

/// Read and parse the deployments file
fn read_deployments_file(file_path: &str) -> Result<Value, ScriptError> {
    let contents = fs::read_to_string(file_path)
        .map_err(|e| ScriptError::ReadDeployments(format!("error reading {}: {}", file_path, e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ReadDeployments(format!("error parsing {}: {}", file_path, e)))
}
