use std::collections::HashMap;

use ethabi::Address;
use serde::Deserialize;
use sha3::{Digest, Keccak256};
use thiserror::Error;

pub const CONSTANT_PRODUCT_MARKET_SOURCE: &str = "AugurConstantProductMarket.sol";
pub const CONSTANT_PRODUCT_MARKET_CONTRACT: &str = "AugurConstantProductMarket";
pub const ARTIFACT_FILE: &str = "AugurConstantProductMarket.json";

/// Salt used for the deterministic deployment; fixed so every chain gets the
/// same address.
pub const DEPLOYMENT_SALT: [u8; 32] = [0u8; 32];

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact is not valid solc output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("artifact has no contract {contract} in {source_name}")]
    MissingContract { source_name: String, contract: String },
    #[error("bytecode is not hex: {0}")]
    Bytecode(#[from] hex::FromHexError),
    #[error("bytecode is empty")]
    EmptyBytecode,
}

#[derive(Debug, Deserialize)]
pub struct SolcOutput {
    #[serde(default)]
    pub contracts: HashMap<String, HashMap<String, CompiledContract>>,
    #[serde(default)]
    pub errors: Vec<SolcDiagnostic>,
}

#[derive(Debug, Deserialize)]
pub struct CompiledContract {
    #[serde(default)]
    pub abi: serde_json::Value,
    pub evm: Evm,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evm {
    pub bytecode: Bytecode,
    pub deployed_bytecode: Option<Bytecode>,
}

#[derive(Debug, Deserialize)]
pub struct Bytecode {
    pub object: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolcDiagnostic {
    pub severity: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl SolcDiagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }

    pub fn text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

impl SolcOutput {
    pub fn parse(json: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn errors(&self) -> impl Iterator<Item = &SolcDiagnostic> {
        self.errors.iter().filter(|d| d.is_error())
    }

    pub fn creation_bytecode(&self, source_name: &str, contract: &str) -> Result<Vec<u8>, ArtifactError> {
        let compiled = self.contracts.get(source_name).and_then(|c| c.get(contract)).ok_or_else(|| {
            ArtifactError::MissingContract { source_name: source_name.to_string(), contract: contract.to_string() }
        })?;
        let object = compiled.evm.bytecode.object.trim_start_matches("0x");
        if object.is_empty() {
            return Err(ArtifactError::EmptyBytecode);
        }
        Ok(hex::decode(object)?)
    }
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Address a CREATE2 deployment through `deployer` will land on.
pub fn create2_address(deployer: Address, salt: [u8; 32], init_code: &[u8]) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update([0xff]);
    hasher.update(deployer.as_bytes());
    hasher.update(salt);
    hasher.update(keccak256(init_code));
    let hash = hasher.finalize();
    Address::from_slice(&hash[12..])
}

/// Calldata for the deterministic deployment proxy: salt followed by init code.
pub fn proxy_deployment_calldata(salt: [u8; 32], init_code: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(32 + init_code.len());
    data.extend_from_slice(&salt);
    data.extend_from_slice(init_code);
    data
}
