//! Constants used in the deploy scripts

/// The name of the Laxce token contract artifact
pub const TOKEN_CONTRACT_NAME: &str = "Laxce";

/// The name of the Laxce crowdsale contract artifact
pub const CROWDSALE_CONTRACT_NAME: &str = "LaxceCrowdSale";

/// The name of the upgradeable proxy contract artifact.
///
/// This is the [`ERC1967Proxy`](https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Proxy.sol)
/// used for UUPS deployments, in which the upgrade logic lives in the
/// implementation contract rather than in a proxy admin.
pub const PROXY_CONTRACT_NAME: &str = "ERC1967Proxy";

/// The storage slot containing the implementation contract address in the
/// upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The number of confirmations to wait for on deployment transactions
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The name of the environment variable holding the remote RPC endpoint URL
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";

/// The name of the environment variable holding the deployer's private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The name of the environment variable holding the block explorer API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// The RPC URL assumed for a local development node
pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";

/// The RPC URL of the legacy Polygon Mumbai testnet
pub const MATIC_RPC_URL: &str = "https://matic-mumbai.chainstacklabs.com/";

/// The gas limit override applied on the Mumbai testnet
pub const MATIC_GAS_LIMIT: u64 = 2_100_000;

/// The gas price override applied on the Mumbai testnet, in wei
pub const MATIC_GAS_PRICE: u128 = 8_000_000_000;

/// The Etherscan API endpoint for Ethereum mainnet
pub const MAINNET_EXPLORER_API_URL: &str = "https://api.etherscan.io/api";

/// The Etherscan API endpoint for the Holesky testnet
pub const HOLESKY_EXPLORER_API_URL: &str = "https://api-holesky.etherscan.io/api";

/// The Polygonscan API endpoint for the Mumbai testnet
pub const MATIC_EXPLORER_API_URL: &str = "https://api-testnet.polygonscan.com/api";

/// The full version string of the compiler the contracts are built with,
/// as the block explorer expects it
pub const SOLC_VERSION: &str = "v0.8.24+commit.e11b9ed9";

/// The short version string of the compiler the contracts are built with
pub const SOLC_SHORT_VERSION: &str = "0.8.24";

/// The number of optimizer runs the contracts are compiled with
pub const OPTIMIZER_RUNS: u32 = 200;

/// The number of seconds to wait between verification status polls
pub const VERIFY_POLL_INTERVAL_SECS: u64 = 5;

/// The maximum number of verification status polls before giving up
pub const MAX_VERIFY_POLLS: usize = 20;

/// The default number of token units sold per payment unit in the crowdsale
pub const DEFAULT_CROWDSALE_RATE: u64 = 40_000;

/// The address of the USDT token contract on Ethereum mainnet, the default
/// payment token accepted by the crowdsale
pub const MAINNET_USDT_ADDRESS: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

/// The default directory compiled contract artifacts are read from
pub const DEFAULT_ARTIFACTS_PATH: &str = "artifacts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The deployments key in the deployments file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The token implementation contract key in the deployments file
pub const TOKEN_IMPL_CONTRACT_KEY: &str = "laxce_token_impl_contract";

/// The token proxy contract key in the deployments file
pub const TOKEN_PROXY_CONTRACT_KEY: &str = "laxce_token_proxy_contract";

/// The crowdsale implementation contract key in the deployments file
pub const CROWDSALE_IMPL_CONTRACT_KEY: &str = "crowdsale_impl_contract";

/// The crowdsale proxy contract key in the deployments file
pub const CROWDSALE_PROXY_CONTRACT_KEY: &str = "crowdsale_proxy_contract";
