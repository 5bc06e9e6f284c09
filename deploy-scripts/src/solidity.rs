//! Definitions of Solidity functions and interfaces called during deployment

use alloy::{network::Ethereum, sol};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};

use crate::utils::Client;

/// The token contract's initializer, which takes no arguments
mod token {
    use alloy_sol_types::sol;

    sol! {
        function initialize() external;
    }
}

/// The crowdsale contract's initializer.
///
/// `rate` is the number of token units sold per unit of payment, `token` is
/// the token being sold, and `usdt` is the stablecoin payments are made in.
mod crowdsale {
    use alloy_sol_types::sol;

    sol! {
        function initialize(uint256 rate, address token, address usdt) external;
    }
}

sol! {
    /// The subset of the UUPS upgradeability interface the scripts call.
    ///
    /// Upgrade authorization lives in the implementation itself, upgrades
    /// are submitted directly to the proxy.
    #[sol(rpc)]
    interface IUUPSUpgradeable {
        function upgradeToAndCall(address newImplementation, bytes memory data) external payable;
    }
}

pub use IUUPSUpgradeable::*;

/// A UUPS proxy bound to the scripts' client
pub type UupsProxy = IUUPSUpgradeableInstance<(), Client, Ethereum>;

/// Prepare calldata for the token contract's `initialize` method
pub fn token_initialize_calldata() -> Vec<u8> {
    token::initializeCall::new(()).abi_encode()
}

/// Prepare calldata for the crowdsale contract's `initialize` method
pub fn crowdsale_initialize_calldata(
    rate: U256,
    token_address: Address,
    usdt_address: Address,
) -> Vec<u8> {
    crowdsale::initializeCall::new((rate, token_address, usdt_address)).abi_encode()
}

/// ABI-encode the proxy's constructor arguments.
///
/// The ERC1967 proxy is constructed with the implementation address and the
/// calldata the implementation is initialized with, these are appended to
/// the proxy's creation bytecode.
pub fn proxy_constructor_args(implementation: Address, init_calldata: Vec<u8>) -> Vec<u8> {
    (implementation, Bytes::from(init_calldata)).abi_encode_params()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address, Bytes, U256};
    use alloy_sol_types::SolCall;

    use crate::{
        constants::LOCAL_RPC_URL,
        network::{Network, NetworkProfile},
        utils::setup_client,
    };

    use super::{
        crowdsale, crowdsale_initialize_calldata, proxy_constructor_args,
        token_initialize_calldata, UupsProxy,
    };

    /// The token address used across the tests
    const TOKEN_ADDRESS: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    /// The payment token address used across the tests
    const USDT_ADDRESS: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
    /// A well-known dev-node private key used across the tests
    const DUMMY_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// The token initializer encodes to the well-known `initialize()`
    /// selector with no arguments
    #[test]
    fn test_token_initialize_calldata() {
        let calldata = token_initialize_calldata();
        assert_eq!(calldata, vec![0x81, 0x29, 0xfc, 0x1c]);
    }

    /// The crowdsale initializer carries the rate, token, and payment token
    /// in that order
    #[test]
    fn test_crowdsale_initialize_calldata() {
        let rate = U256::from(40_000u64);
        let calldata = crowdsale_initialize_calldata(rate, TOKEN_ADDRESS, USDT_ADDRESS);

        let decoded = crowdsale::initializeCall::abi_decode(&calldata, true).unwrap();
        assert_eq!(decoded.rate, rate);
        assert_eq!(decoded.token, TOKEN_ADDRESS);
        assert_eq!(decoded.usdt, USDT_ADDRESS);
    }

    /// Binding a proxy instance records the address upgrade calls are
    /// sent to
    #[test]
    fn test_uups_proxy_binding() {
        let profile = NetworkProfile {
            network: Network::Hardhat,
            rpc_url: LOCAL_RPC_URL.to_string(),
            private_key: DUMMY_KEY.to_string(),
            gas_limit: None,
            gas_price: None,
        };
        let client = setup_client(&profile).unwrap();

        let proxy = UupsProxy::new(TOKEN_ADDRESS, client);
        assert_eq!(*proxy.address(), TOKEN_ADDRESS);
    }

    /// The proxy constructor arguments decode back to the implementation
    /// address and initializer calldata they were built from
    #[test]
    fn test_proxy_constructor_args() {
        use alloy_sol_types::SolValue;

        let init_calldata = token_initialize_calldata();
        let encoded = proxy_constructor_args(TOKEN_ADDRESS, init_calldata.clone());

        let (implementation, data) =
            <(Address, Bytes)>::abi_decode_params(&encoded, true).unwrap();
        assert_eq!(implementation, TOKEN_ADDRESS);
        assert_eq!(data, Bytes::from(init_calldata));
    }
}
