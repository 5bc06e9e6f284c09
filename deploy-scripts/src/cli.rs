//! Definitions of CLI arguments and commands for deploy scripts

use std::fmt::{self, Display};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    commands::{deploy, deploy_crowdsale, deploy_token, upgrade, verify},
    constants::{
        DEFAULT_ARTIFACTS_PATH, DEFAULT_CROWDSALE_RATE, DEFAULT_DEPLOYMENTS_PATH,
        MAINNET_USDT_ADDRESS,
    },
    errors::ScriptError,
    network::{Network, NetworkProfile},
    utils::Client,
};

/// Scripts for deploying and upgrading the Laxce contracts
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    // TODO: Better key management
    #[arg(short, long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub priv_key: String,

    /// The network to deploy to
    #[arg(short, long, value_enum, default_value_t = Network::Mainnet)]
    pub network: Network,

    /// Network RPC URL, overriding the deploy network's own endpoint
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Path to the directory holding the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_PATH)]
    pub artifacts_path: String,

    /// Path to the file deployed addresses are recorded in
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The subcommands the deploy scripts expose
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the token contract behind a fresh UUPS proxy
    DeployToken,
    /// Deploy the crowdsale contract behind a fresh UUPS proxy
    DeployCrowdsale(DeployCrowdsaleArgs),
    /// Deploy the full stack, the token followed by the crowdsale selling it
    Deploy(DeployArgs),
    /// Upgrade a deployed proxy to a fresh implementation
    Upgrade(UpgradeArgs),
    /// Verify a deployed contract's source against the block explorer
    Verify(VerifyArgs),
}

impl Command {
    /// Dispatch to the selected command's implementation
    pub async fn run(
        self,
        client: Client,
        profile: NetworkProfile,
        artifacts_path: &str,
        deployments_path: &str,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployToken => {
                deploy_token(artifacts_path, deployments_path, &client, &profile).await
            }
            Command::DeployCrowdsale(args) => {
                deploy_crowdsale(args, artifacts_path, deployments_path, &client, &profile).await
            }
            Command::Deploy(args) => {
                deploy(args, artifacts_path, deployments_path, &client, &profile).await
            }
            Command::Upgrade(args) => {
                upgrade(args, artifacts_path, deployments_path, &client, &profile).await
            }
            Command::Verify(args) => verify(args, &profile).await,
        }
    }
}

/// Deploy the crowdsale contract behind a UUPS proxy.
///
/// The crowdsale is initialized with the token it sells, the stablecoin it
/// accepts, and the sale rate. When no token address is given, the one
/// recorded in the deployments file is used.
#[derive(Args)]
pub struct DeployCrowdsaleArgs {
    /// The number of token units sold per unit of payment
    #[arg(short, long, default_value_t = DEFAULT_CROWDSALE_RATE)]
    pub rate: u64,

    /// Address of the token being sold, in hex
    #[arg(short, long)]
    pub token: Option<String>,

    /// Address of the stablecoin payments are made in, in hex
    #[arg(short, long, default_value = MAINNET_USDT_ADDRESS)]
    pub usdt: String,
}

/// Deploy the token and crowdsale contracts in order, each behind its own
/// UUPS proxy.
///
/// The crowdsale's token address is taken from the token deploy, so the
/// second deploy is only attempted once the first has landed.
#[derive(Args)]
pub struct DeployArgs {
    /// The number of token units sold per unit of payment
    #[arg(short, long, default_value_t = DEFAULT_CROWDSALE_RATE)]
    pub rate: u64,

    /// Address of the stablecoin payments are made in, in hex
    #[arg(short, long, default_value = MAINNET_USDT_ADDRESS)]
    pub usdt: String,
}

/// Upgrade a proxy to a new implementation.
///
/// Unless an implementation address is given, a fresh implementation is
/// deployed from the local artifacts. `upgradeToAndCall` is then sent to
/// the proxy itself, as UUPS proxies carry their own upgrade logic.
#[derive(Args)]
pub struct UpgradeArgs {
    /// The contract to upgrade
    #[arg(short, long, value_enum)]
    pub contract: UpgradeTarget,

    /// Address of the proxy to upgrade, defaulting to the recorded
    /// deployment
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// Address of an already-deployed implementation to upgrade to,
    /// deploying a fresh one from the artifacts when omitted
    #[arg(short, long)]
    pub implementation: Option<String>,

    /// Optional calldata, in hex form, with which to call the new
    /// implementation when upgrading
    #[arg(long)]
    pub calldata: Option<String>,
}

/// The contracts that can be upgraded
#[derive(ValueEnum, Copy, Clone)]
pub enum UpgradeTarget {
    /// The Laxce token contract
    Token,
    /// The Laxce crowdsale contract
    Crowdsale,
}

impl Display for UpgradeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeTarget::Token => write!(f, "token"),
            UpgradeTarget::Crowdsale => write!(f, "crowdsale"),
        }
    }
}

/// Verify a deployed contract's source against the network's block
/// explorer
#[derive(Args)]
pub struct VerifyArgs {
    /// The fully qualified contract name, `<source path>:<contract name>`
    #[arg(short, long)]
    pub contract_name: String,

    /// Address of the deployed contract to verify, in hex
    #[arg(short, long)]
    pub address: String,

    /// Path to the standard JSON input the contract was compiled from
    #[arg(short, long)]
    pub source: String,

    /// ABI-encoded constructor arguments in hex, if the contract has any
    #[arg(long)]
    pub constructor_args: Option<String>,
}
