use std::path::{Path, PathBuf};
use std::process::Stdio;

use augur_core::deployment::{ArtifactError, SolcOutput};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

/// Every source the constant product market build needs, by file name.
pub const SOURCES: [&str; 8] = [
    "AugurConstantProductMarket.sol",
    "AugurMock.sol",
    "Context.sol",
    "DaiMock.sol",
    "draft-IERC6093.sol",
    "ERC20.sol",
    "IERC20.sol",
    "IERC20Metadata.sol",
];

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read source {path}: {source}")]
    Source { path: PathBuf, source: std::io::Error },
    #[error("cannot run {solc}: {source}")]
    Spawn { solc: String, source: std::io::Error },
    #[error("solc exited with {0}")]
    Exit(std::process::ExitStatus),
    #[error(transparent)]
    Output(#[from] ArtifactError),
    #[error("solc reported {0} error(s)")]
    Diagnostics(usize),
}

/// Standard-JSON input: via-IR, optimizer at 500 runs with the inliner,
/// bytecode, deployed bytecode and ABI for every contract.
pub async fn standard_json_input(contracts_dir: &Path) -> Result<Value, CompileError> {
    let mut sources = Map::new();
    for name in SOURCES {
        let path = contracts_dir.join(name);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CompileError::Source { path: path.clone(), source })?;
        sources.insert(name.to_string(), json!({ "content": content }));
    }
    Ok(json!({
        "language": "Solidity",
        "sources": sources,
        "settings": {
            "viaIR": true,
            "optimizer": { "enabled": true, "runs": 500, "details": { "inliner": true } },
            "outputSelection": {
                "*": { "*": ["evm.bytecode.object", "evm.deployedBytecode.object", "abi"] }
            }
        }
    }))
}

/// Runs `solc --standard-json`, returning its raw stdout.
pub async fn run_solc(solc: &str, input: &Value) -> Result<String, CompileError> {
    let spawn_error = |source| CompileError::Spawn { solc: solc.to_string(), source };
    let mut child = Command::new(solc)
        .arg("--standard-json")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(spawn_error)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.to_string().as_bytes()).await.map_err(spawn_error)?;
    }
    let output = child.wait_with_output().await.map_err(spawn_error)?;
    if !output.status.success() {
        return Err(CompileError::Exit(output.status));
    }
    debug!(bytes = output.stdout.len(), "solc finished");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Rejects output carrying diagnostics of severity `error`; warnings pass.
pub fn check_output(raw: &str) -> Result<SolcOutput, CompileError> {
    let output = SolcOutput::parse(raw)?;
    let errors: Vec<_> = output.errors().collect();
    for diagnostic in &errors {
        error!(message = %diagnostic.text(), "solc error");
    }
    if !errors.is_empty() {
        return Err(CompileError::Diagnostics(errors.len()));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_core::deployment::{CONSTANT_PRODUCT_MARKET_CONTRACT, CONSTANT_PRODUCT_MARKET_SOURCE};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("augur-compiler-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn input_embeds_every_source() {
        let dir = scratch_dir("sources");
        for name in SOURCES {
            std::fs::write(dir.join(name), format!("// {name}")).unwrap();
        }
        let input = standard_json_input(&dir).await.unwrap();
        assert_eq!(input["sources"].as_object().unwrap().len(), 8);
        assert_eq!(input["sources"]["ERC20.sol"]["content"], "// ERC20.sol");
        assert_eq!(input["settings"]["viaIR"], true);
        assert_eq!(input["settings"]["optimizer"]["runs"], 500);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_source_is_reported() {
        let dir = scratch_dir("missing");
        std::fs::write(dir.join(SOURCES[0]), "").unwrap();
        match standard_json_input(&dir).await {
            Err(CompileError::Source { path, .. }) => assert!(path.ends_with(SOURCES[1])),
            other => panic!("unexpected {other:?}"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn unknown_compiler_fails_to_spawn() {
        let result = run_solc("/nonexistent/solc", &json!({})).await;
        assert!(matches!(result, Err(CompileError::Spawn { .. })));
    }

    #[test]
    fn errors_fail_the_build_and_warnings_do_not() {
        let failing = r#"{ "errors": [
            { "severity": "warning", "message": "shadowed" },
            { "severity": "error", "formattedMessage": "ParserError: expected ';'", "message": "expected ';'" }
        ] }"#;
        assert!(matches!(check_output(failing), Err(CompileError::Diagnostics(1))));

        let passing = r#"{ "errors": [ { "severity": "warning", "message": "shadowed" } ],
            "contracts": { "AugurConstantProductMarket.sol": { "AugurConstantProductMarket": {
                "abi": [], "evm": { "bytecode": { "object": "6080" } } } } } }"#;
        let output = check_output(passing).unwrap();
        assert!(output.creation_bytecode(CONSTANT_PRODUCT_MARKET_SOURCE, CONSTANT_PRODUCT_MARKET_CONTRACT).is_ok());
    }
}
