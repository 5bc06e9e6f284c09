//! Source verification through Etherscan-compatible block explorer APIs.
//!
//! Verification is a two-step exchange: the standard JSON input the
//! contracts were compiled from is submitted first, then the returned
//! request GUID is polled until the explorer accepts or rejects it.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    constants::{MAX_VERIFY_POLLS, OPTIMIZER_RUNS, SOLC_VERSION, VERIFY_POLL_INTERVAL_SECS},
    errors::ScriptError,
};

/// A single contract verification request
pub struct VerificationRequest {
    /// The address the contract is deployed at, `0x`-prefixed hex
    pub contract_address: String,
    /// The fully qualified contract name, `<source path>:<contract name>`
    pub contract_name: String,
    /// The standard JSON input the contract was compiled from
    pub source_code: String,
    /// The ABI-encoded constructor arguments, hex without a `0x` prefix
    pub constructor_args: Option<String>,
}

/// The envelope the explorer wraps every response in
#[derive(Deserialize)]
struct ExplorerResponse {
    /// `"1"` on success, `"0"` on failure
    status: String,
    /// A human-readable status message
    message: String,
    /// The payload, a request GUID or verification status text
    result: String,
}

/// Submit the contract's source for verification and poll until the
/// explorer accepts or rejects it
pub async fn verify_contract(
    api_url: &str,
    api_key: &str,
    request: &VerificationRequest,
) -> Result<(), ScriptError> {
    let client = Client::new();

    let guid = submit_verification(&client, api_url, api_key, request).await?;
    info!("verification of {} submitted, request id {}", request.contract_name, guid);

    poll_verification(&client, api_url, api_key, &guid).await
}

/// Build the form fields for a `verifysourcecode` submission
fn verification_form(api_key: &str, request: &VerificationRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("apikey", api_key.to_string()),
        ("module", "contract".to_string()),
        ("action", "verifysourcecode".to_string()),
        ("contractaddress", request.contract_address.clone()),
        ("sourceCode", request.source_code.clone()),
        ("codeformat", "solidity-standard-json-input".to_string()),
        ("contractname", request.contract_name.clone()),
        ("compilerversion", SOLC_VERSION.to_string()),
        ("optimizationUsed", "1".to_string()),
        ("runs", OPTIMIZER_RUNS.to_string()),
    ];
    // The misspelling is the API's own field name
    if let Some(args) = &request.constructor_args {
        form.push(("constructorArguements", args.clone()));
    }

    form
}

/// Submit the verification request, returning the GUID the explorer
/// assigns it
async fn submit_verification(
    client: &Client,
    api_url: &str,
    api_key: &str,
    request: &VerificationRequest,
) -> Result<String, ScriptError> {
    let response: ExplorerResponse = client
        .post(api_url)
        .form(&verification_form(api_key, request))
        .send()
        .await
        .map_err(|e| ScriptError::ContractVerification(e.to_string()))?
        .json()
        .await
        .map_err(|e| ScriptError::ContractVerification(e.to_string()))?;

    if response.status != "1" {
        return Err(ScriptError::ContractVerification(format!(
            "verification rejected: {} ({})",
            response.result, response.message
        )));
    }

    Ok(response.result)
}

/// Poll the explorer for the outcome of a submitted verification request
async fn poll_verification(
    client: &Client,
    api_url: &str,
    api_key: &str,
    guid: &str,
) -> Result<(), ScriptError> {
    for _ in 0..MAX_VERIFY_POLLS {
        tokio::time::sleep(Duration::from_secs(VERIFY_POLL_INTERVAL_SECS)).await;

        let response: ExplorerResponse = client
            .get(api_url)
            .query(&[
                ("apikey", api_key),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?
            .json()
            .await
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?;

        // The explorer reports in-flight requests as a "Pending" result
        // with a failure status, those are retried rather than surfaced
        if response.result.starts_with("Pending") {
            debug!("verification pending");
            continue;
        }

        return if response.status == "1" {
            info!("verification passed: {}", response.result);
            Ok(())
        } else {
            Err(ScriptError::ContractVerification(format!(
                "{} ({})",
                response.result, response.message
            )))
        };
    }

    Err(ScriptError::ContractVerification(format!(
        "verification still pending after {} polls",
        MAX_VERIFY_POLLS
    )))
}

#[cfg(test)]
mod tests {
    use crate::constants::{OPTIMIZER_RUNS, SOLC_VERSION};

    use super::{verification_form, ExplorerResponse, VerificationRequest};

    /// A request body used across the tests
    fn request(constructor_args: Option<String>) -> VerificationRequest {
        VerificationRequest {
            contract_address: "0xdac17f958d2ee523a2206206994597c13d831ec7".to_string(),
            contract_name: "contracts/laxce.sol:Laxce".to_string(),
            source_code: "{}".to_string(),
            constructor_args,
        }
    }

    /// The submission form pins the compiler version and optimizer settings
    /// the contracts are built with
    #[test]
    fn test_form_carries_compiler_settings() {
        let form = verification_form("key", &request(None));

        assert!(form.contains(&("compilerversion", SOLC_VERSION.to_string())));
        assert!(form.contains(&("optimizationUsed", "1".to_string())));
        assert!(form.contains(&("runs", OPTIMIZER_RUNS.to_string())));
        assert!(!form.iter().any(|(field, _)| *field == "constructorArguements"));
    }

    /// Constructor arguments are only submitted when the contract has some
    #[test]
    fn test_form_constructor_args() {
        let form = verification_form("key", &request(Some("8129fc1c".to_string())));

        assert!(form.contains(&("constructorArguements", "8129fc1c".to_string())));
    }

    /// A successful submission carries the request GUID in its result
    #[test]
    fn test_parse_submission_response() {
        let raw = r#"{"status":"1","message":"OK","result":"dd5mmpvsis3cz8dnbrdj4pv56zjzxvhcxfjvqbznbsdu9fnqzm"}"#;
        let response: ExplorerResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.status, "1");
        assert_eq!(response.result, "dd5mmpvsis3cz8dnbrdj4pv56zjzxvhcxfjvqbznbsdu9fnqzm");
    }

    /// A rejected submission carries the failure reason in its result
    #[test]
    fn test_parse_rejection_response() {
        let raw = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let response: ExplorerResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.status, "0");
        assert_eq!(response.message, "NOTOK");
        assert_eq!(response.result, "Invalid API Key");
    }

    /// In-flight verifications report a pending result, which the poll loop
    /// keys off of
    #[test]
    fn test_parse_pending_response() {
        let raw = r#"{"status":"0","message":"NOTOK","result":"Pending in queue"}"#;
        let response: ExplorerResponse = serde_json::from_str(raw).unwrap();

        assert!(response.result.starts_with("Pending"));
    }
}
