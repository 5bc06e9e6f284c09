use clap::Parser;
use deploy_scripts::{cli::Cli, errors::ScriptError, network::network_profile, utils::setup_client};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // Pick up credentials from a .env file when one is present
    dotenvy::dotenv().ok();

    let Cli {
        priv_key,
        network,
        rpc_url,
        artifacts_path,
        deployments_path,
        command,
    } = Cli::parse();

    // Logs go to stderr, stdout carries only the deployed addresses
    tracing_subscriber::fmt()
        .pretty()
        .with_writer(std::io::stderr)
        .init();

    let profile = network_profile(network, rpc_url, &priv_key)?;
    let client = setup_client(&profile)?;

    command
        .run(client, profile, &artifacts_path, &deployments_path)
        .await
}
