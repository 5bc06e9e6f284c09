//! Loading of compiled contract artifacts.
//!
//! The contracts themselves are compiled by the Solidity toolchain ahead of
//! time, the scripts only consume the artifacts it writes. An artifact is a
//! JSON file carrying the contract's ABI and creation bytecode.

use std::{fs::File, path::PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{constants::SOLC_SHORT_VERSION, errors::ScriptError};

/// A compiled contract artifact.
///
/// Only the fields the scripts consume are modeled, the rest of the
/// artifact JSON is ignored.
#[derive(Deserialize)]
pub struct ContractArtifact {
    /// The name of the compiled contract
    #[serde(rename = "contractName")]
    pub contract_name: String,
    /// The hex-encoded creation bytecode
    pub bytecode: String,
    /// Compiler metadata, recorded by some artifact formats
    #[serde(default)]
    pub compiler: Option<CompilerInfo>,
}

/// Compiler metadata attached to an artifact
#[derive(Deserialize)]
pub struct CompilerInfo {
    /// The compiler version string
    #[serde(default)]
    pub version: Option<String>,
}

impl ContractArtifact {
    /// Get the creation bytecode as raw bytes.
    ///
    /// Artifacts for abstract contracts and interfaces carry empty bytecode,
    /// deploying those is always a mistake so it is rejected here.
    pub fn creation_code(&self) -> Result<Vec<u8>, ScriptError> {
        let stripped = self
            .bytecode
            .strip_prefix("0x")
            .unwrap_or(&self.bytecode);

        if stripped.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "artifact for {} has no creation bytecode",
                self.contract_name
            )));
        }

        hex::decode(stripped).map_err(|e| {
            ScriptError::ArtifactParsing(format!(
                "invalid bytecode in artifact for {}: {}",
                self.contract_name, e
            ))
        })
    }
}

/// Load the artifact for the given contract from the artifacts directory.
///
/// Both the flat layout (`<name>.json`) and the nested layout the Solidity
/// toolchain writes (`<name>.sol/<name>.json`) are searched, in that order.
pub fn load_artifact(
    artifacts_dir: &str,
    contract_name: &str,
) -> Result<ContractArtifact, ScriptError> {
    let path = artifact_path(artifacts_dir, contract_name)?;
    let file = File::open(&path).map_err(|e| {
        ScriptError::ArtifactParsing(format!("error opening {}: {}", path.display(), e))
    })?;

    let artifact: ContractArtifact = serde_json::from_reader(file).map_err(|e| {
        ScriptError::ArtifactParsing(format!("error parsing {}: {}", path.display(), e))
    })?;

    check_compiler_version(&artifact);
    Ok(artifact)
}

/// Find the path of the artifact for the given contract
fn artifact_path(artifacts_dir: &str, contract_name: &str) -> Result<PathBuf, ScriptError> {
    let flat = PathBuf::from(artifacts_dir).join(format!("{}.json", contract_name));
    if flat.is_file() {
        return Ok(flat);
    }

    let nested = PathBuf::from(artifacts_dir)
        .join(format!("{}.sol", contract_name))
        .join(format!("{}.json", contract_name));
    if nested.is_file() {
        return Ok(nested);
    }

    Err(ScriptError::ArtifactParsing(format!(
        "no artifact for {} under {}",
        contract_name, artifacts_dir
    )))
}

/// Warn when an artifact was built with a compiler other than the one the
/// contracts are pinned to
fn check_compiler_version(artifact: &ContractArtifact) {
    let version = artifact
        .compiler
        .as_ref()
        .and_then(|compiler| compiler.version.as_deref());

    if let Some(version) = version {
        if !version.contains(SOLC_SHORT_VERSION) {
            warn!(
                "artifact for {} was built with solc {}, contracts are pinned to {}",
                artifact.contract_name, version, SOLC_SHORT_VERSION
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::load_artifact;

    /// A minimal artifact body for the given contract name
    fn artifact_json(name: &str, bytecode: &str) -> String {
        format!(
            r#"{{"contractName":"{}","sourceName":"contracts/{}.sol","abi":[],"bytecode":"{}"}}"#,
            name, name, bytecode
        )
    }

    /// Artifacts in the flat layout are found directly under the artifacts
    /// directory
    #[test]
    fn test_load_flat_artifact() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Laxce.json"),
            artifact_json("Laxce", "0x6080604052"),
        )
        .unwrap();

        let artifact = load_artifact(dir.path().to_str().unwrap(), "Laxce").unwrap();
        assert_eq!(artifact.contract_name, "Laxce");
        assert_eq!(
            artifact.creation_code().unwrap(),
            vec![0x60, 0x80, 0x60, 0x40, 0x52]
        );
    }

    /// Artifacts in the nested `<name>.sol/<name>.json` layout are found as
    /// a fallback
    #[test]
    fn test_load_nested_artifact() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("LaxceCrowdSale.sol");
        fs::create_dir(&nested).unwrap();
        fs::write(
            nested.join("LaxceCrowdSale.json"),
            artifact_json("LaxceCrowdSale", "0x60806040"),
        )
        .unwrap();

        let artifact = load_artifact(dir.path().to_str().unwrap(), "LaxceCrowdSale").unwrap();
        assert_eq!(artifact.contract_name, "LaxceCrowdSale");
    }

    /// A missing artifact is reported as an error naming the contract
    #[test]
    fn test_missing_artifact() {
        let dir = TempDir::new().unwrap();
        assert!(load_artifact(dir.path().to_str().unwrap(), "Laxce").is_err());
    }

    /// An artifact that isn't valid JSON is an error
    #[test]
    fn test_malformed_artifact() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Laxce.json"), "not json").unwrap();

        assert!(load_artifact(dir.path().to_str().unwrap(), "Laxce").is_err());
    }

    /// Empty bytecode, as written for abstract contracts, is rejected
    #[test]
    fn test_empty_bytecode_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Laxce.json"), artifact_json("Laxce", "0x")).unwrap();

        let artifact = load_artifact(dir.path().to_str().unwrap(), "Laxce").unwrap();
        assert!(artifact.creation_code().is_err());
    }

    /// Malformed bytecode is rejected rather than deployed truncated
    #[test]
    fn test_invalid_bytecode_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Laxce.json"),
            artifact_json("Laxce", "0x60zz"),
        )
        .unwrap();

        let artifact = load_artifact(dir.path().to_str().unwrap(), "Laxce").unwrap();
        assert!(artifact.creation_code().is_err());
    }
}
