//! Implementations of the various deploy scripts

use std::{fs, str::FromStr};

use alloy::{network::TransactionBuilder, providers::Provider, rpc::types::TransactionRequest};
use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::{debug, info};

use crate::{
    artifacts::load_artifact,
    cli::{DeployArgs, DeployCrowdsaleArgs, UpgradeArgs, UpgradeTarget, VerifyArgs},
    constants::{
        CROWDSALE_CONTRACT_NAME, CROWDSALE_IMPL_CONTRACT_KEY, CROWDSALE_PROXY_CONTRACT_KEY,
        IMPLEMENTATION_STORAGE_SLOT, NUM_DEPLOY_CONFIRMATIONS, PROXY_CONTRACT_NAME,
        TOKEN_CONTRACT_NAME, TOKEN_IMPL_CONTRACT_KEY, TOKEN_PROXY_CONTRACT_KEY,
    },
    errors::ScriptError,
    etherscan::{verify_contract, VerificationRequest},
    network::{etherscan_api_key, NetworkProfile},
    solidity::{
        crowdsale_initialize_calldata, proxy_constructor_args, token_initialize_calldata,
        UupsProxy,
    },
    utils::{parse_address, read_deployed_address, write_deployed_address, Client},
};

// ------------
// | Commands |
// ------------

/// Deploy the token contract behind a fresh UUPS proxy
pub async fn deploy_token(
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<(), ScriptError> {
    let token_address = deploy_token_proxy(artifacts_path, deployments_path, client, profile).await?;
    println!("LAXCE Token Contract Address: {}", token_address);

    Ok(())
}

/// Deploy the crowdsale contract behind a fresh UUPS proxy
pub async fn deploy_crowdsale(
    args: DeployCrowdsaleArgs,
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<(), ScriptError> {
    // Sell the token deployed last unless one was given explicitly
    let token_address = match &args.token {
        Some(token) => parse_address(token)?,
        None => read_deployed_address(deployments_path, TOKEN_PROXY_CONTRACT_KEY)?,
    };
    let usdt_address = parse_address(&args.usdt)?;

    let crowdsale_address = deploy_crowdsale_proxy(
        U256::from(args.rate),
        token_address,
        usdt_address,
        artifacts_path,
        deployments_path,
        client,
        profile,
    )
    .await?;
    println!("ESTIA Crowdsale Contract Address: {}", crowdsale_address);

    Ok(())
}

/// Deploy the full stack, the token contract followed by the crowdsale
/// selling it
pub async fn deploy(
    args: DeployArgs,
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<(), ScriptError> {
    let usdt_address = parse_address(&args.usdt)?;

    // The crowdsale is initialized with the token's address, so the token
    // deploy must land first
    let token_address = deploy_token_proxy(artifacts_path, deployments_path, client, profile).await?;
    println!("LAXCE Token Contract Address: {}", token_address);

    let crowdsale_address = deploy_crowdsale_proxy(
        U256::from(args.rate),
        token_address,
        usdt_address,
        artifacts_path,
        deployments_path,
        client,
        profile,
    )
    .await?;
    println!("ESTIA Crowdsale Contract Address: {}", crowdsale_address);

    Ok(())
}

/// Upgrade a deployed proxy to a freshly deployed implementation
pub async fn upgrade(
    args: UpgradeArgs,
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<(), ScriptError> {
    let (contract_name, impl_key, proxy_key) = upgrade_target_keys(args.contract);

    // Find the proxy, an explicit address first, the recorded deployment
    // otherwise
    let recorded_proxy = read_deployed_address(deployments_path, proxy_key).ok();
    let proxy_address = match &args.proxy {
        Some(proxy) => parse_address(proxy)?,
        None => recorded_proxy.ok_or_else(|| {
            ScriptError::ReadDeployments(format!(
                "no {} recorded in {}",
                proxy_key, deployments_path
            ))
        })?,
    };

    // Use the given implementation, deploying a fresh one from the
    // artifacts otherwise
    let impl_address = match &args.implementation {
        Some(implementation) => parse_address(implementation)?,
        None => {
            let artifact = load_artifact(artifacts_path, contract_name)?;
            let impl_address =
                deploy_contract(artifact.creation_code()?, client, profile).await?;
            info!("new {} implementation deployed at {:#x}", contract_name, impl_address);
            impl_address
        }
    };

    // Point the proxy at it. Upgrade authorization lives in the
    // implementation, so the call goes straight to the proxy.
    debug!("upgrading {} proxy at {:#x}", contract_name, proxy_address);
    let data = parse_calldata(args.calldata.as_deref())?;
    let proxy = UupsProxy::new(proxy_address, client.clone());

    let mut call = proxy.upgradeToAndCall(impl_address, data);
    if let Some(gas_limit) = profile.gas_limit {
        call = call.gas(gas_limit);
    }
    if let Some(gas_price) = profile.gas_price {
        call = call.gas_price(gas_price);
    }

    let receipt = call
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "upgrade transaction {} reverted",
            receipt.transaction_hash
        )));
    }

    // Read the implementation slot back to make sure the upgrade took
    let wired_address = implementation_in_slot(proxy_address, client).await?;
    if wired_address != impl_address {
        return Err(ScriptError::ContractInteraction(format!(
            "proxy at {:#x} points at {:#x}, expected {:#x}",
            proxy_address, wired_address, impl_address
        )));
    }

    // Only track the new implementation for proxies the deployments file
    // already knows about
    if recorded_proxy == Some(proxy_address) {
        write_deployed_address(deployments_path, impl_key, impl_address)?;
    }

    info!(
        "{} proxy at {:#x} upgraded to {:#x}",
        contract_name, proxy_address, impl_address
    );

    Ok(())
}

/// Verify a deployed contract's source against the network's block explorer
pub async fn verify(args: VerifyArgs, profile: &NetworkProfile) -> Result<(), ScriptError> {
    let api_url = profile.network.explorer_api_url().ok_or_else(|| {
        ScriptError::ContractVerification(format!(
            "no block explorer API for the {} network",
            profile.network
        ))
    })?;
    let api_key = etherscan_api_key()?;

    let contract_address = parse_address(&args.address)?;
    let source_code = fs::read_to_string(&args.source).map_err(|e| {
        ScriptError::ContractVerification(format!("error reading {}: {}", args.source, e))
    })?;

    let request = VerificationRequest {
        contract_address: format!("{contract_address:#x}"),
        contract_name: args.contract_name,
        source_code,
        constructor_args: args
            .constructor_args
            .map(|args| args.strip_prefix("0x").unwrap_or(&args).to_string()),
    };

    verify_contract(api_url, &api_key, &request).await
}

// -----------
// | Helpers |
// -----------

/// Deploy the token implementation and a proxy wired to it, returning the
/// proxy's address
async fn deploy_token_proxy(
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<Address, ScriptError> {
    deploy_upgradeable(
        TOKEN_CONTRACT_NAME,
        token_initialize_calldata(),
        TOKEN_IMPL_CONTRACT_KEY,
        TOKEN_PROXY_CONTRACT_KEY,
        artifacts_path,
        deployments_path,
        client,
        profile,
    )
    .await
}

/// Deploy the crowdsale implementation and a proxy wired to it, returning
/// the proxy's address
async fn deploy_crowdsale_proxy(
    rate: U256,
    token_address: Address,
    usdt_address: Address,
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<Address, ScriptError> {
    deploy_upgradeable(
        CROWDSALE_CONTRACT_NAME,
        crowdsale_initialize_calldata(rate, token_address, usdt_address),
        CROWDSALE_IMPL_CONTRACT_KEY,
        CROWDSALE_PROXY_CONTRACT_KEY,
        artifacts_path,
        deployments_path,
        client,
        profile,
    )
    .await
}

/// Deploy an implementation contract and a UUPS proxy initialized with the
/// given calldata, recording both addresses in the deployments file
#[allow(clippy::too_many_arguments)]
async fn deploy_upgradeable(
    contract_name: &str,
    init_calldata: Vec<u8>,
    impl_key: &str,
    proxy_key: &str,
    artifacts_path: &str,
    deployments_path: &str,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<Address, ScriptError> {
    // Deploy the implementation contract
    debug!("deploying {} implementation", contract_name);
    let implementation = load_artifact(artifacts_path, contract_name)?;
    let impl_address = deploy_contract(implementation.creation_code()?, client, profile).await?;
    info!("{} implementation deployed at {:#x}", contract_name, impl_address);

    // Deploy the proxy, which initializes the implementation in its
    // constructor
    debug!("deploying {} proxy", contract_name);
    let proxy = load_artifact(artifacts_path, PROXY_CONTRACT_NAME)?;
    let creation_code = proxy_creation_code(proxy.creation_code()?, impl_address, init_calldata);
    let proxy_address = deploy_contract(creation_code, client, profile).await?;

    // Read the implementation slot back to catch a mis-wired deployment
    let wired_address = implementation_in_slot(proxy_address, client).await?;
    if wired_address != impl_address {
        return Err(ScriptError::ContractDeployment(format!(
            "proxy at {:#x} points at {:#x}, expected {:#x}",
            proxy_address, wired_address, impl_address
        )));
    }

    write_deployed_address(deployments_path, impl_key, impl_address)?;
    write_deployed_address(deployments_path, proxy_key, proxy_address)?;

    Ok(proxy_address)
}

/// Deploy a contract from its creation code, returning the address it
/// landed at
async fn deploy_contract(
    creation_code: Vec<u8>,
    client: &Client,
    profile: &NetworkProfile,
) -> Result<Address, ScriptError> {
    let mut tx = TransactionRequest::default().with_deploy_code(Bytes::from(creation_code));
    if let Some(gas_limit) = profile.gas_limit {
        tx = tx.with_gas_limit(gas_limit);
    }
    if let Some(gas_price) = profile.gas_price {
        tx = tx.with_gas_price(gas_price);
    }

    let receipt = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
        .with_required_confirmations(NUM_DEPLOY_CONFIRMATIONS)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "deploy transaction {} reverted",
            receipt.transaction_hash
        )));
    }

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment("no contract address in deploy receipt".to_string())
    })
}

/// Build the proxy's creation code for the given implementation address and
/// initializer calldata
fn proxy_creation_code(
    proxy_code: Vec<u8>,
    implementation: Address,
    init_calldata: Vec<u8>,
) -> Vec<u8> {
    let mut creation_code = proxy_code;
    creation_code.extend(proxy_constructor_args(implementation, init_calldata));
    creation_code
}

/// Read the implementation address a proxy holds in the ERC1967
/// implementation storage slot
async fn implementation_in_slot(
    proxy_address: Address,
    client: &Client,
) -> Result<Address, ScriptError> {
    // Can `unwrap` here since we know the storage slot constitutes a valid U256
    let slot = U256::from_str(IMPLEMENTATION_STORAGE_SLOT).unwrap();

    let slot_value = client
        .get_storage_at(proxy_address, slot)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(Address::from_word(B256::from(slot_value)))
}

/// Parse optional hex calldata, accepting a `0x` prefix
fn parse_calldata(calldata: Option<&str>) -> Result<Bytes, ScriptError> {
    match calldata {
        Some(calldata) => {
            let stripped = calldata.strip_prefix("0x").unwrap_or(calldata);
            hex::decode(stripped)
                .map(Bytes::from)
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
        }
        None => Ok(Bytes::new()),
    }
}

/// Get the contract name and deployments-file keys for an upgrade target
fn upgrade_target_keys(target: UpgradeTarget) -> (&'static str, &'static str, &'static str) {
    match target {
        UpgradeTarget::Token => (
            TOKEN_CONTRACT_NAME,
            TOKEN_IMPL_CONTRACT_KEY,
            TOKEN_PROXY_CONTRACT_KEY,
        ),
        UpgradeTarget::Crowdsale => (
            CROWDSALE_CONTRACT_NAME,
            CROWDSALE_IMPL_CONTRACT_KEY,
            CROWDSALE_PROXY_CONTRACT_KEY,
        ),
    }
}
