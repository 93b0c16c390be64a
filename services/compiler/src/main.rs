use std::path::PathBuf;

use augur_core::deployment::ARTIFACT_FILE;
use clap::Parser;
use tracing::info;

mod solc;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "contracts")]
    contracts_dir: PathBuf,

    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    #[arg(long, env = "SOLC", default_value = "solc")]
    solc: String,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("AUGUR_LOG_JSON").ok().as_deref() == Some("1");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    info!(contracts = %args.contracts_dir.display(), solc = %args.solc, "compiling");

    let input = solc::standard_json_input(&args.contracts_dir).await?;
    let raw = solc::run_solc(&args.solc, &input).await?;
    solc::check_output(&raw)?;

    if !tokio::fs::try_exists(&args.artifacts_dir).await? {
        tokio::fs::create_dir(&args.artifacts_dir).await?;
    }
    let artifact = args.artifacts_dir.join(ARTIFACT_FILE);
    tokio::fs::write(&artifact, raw).await?;
    info!(artifact = %artifact.display(), "artifact written");
    Ok(())
}
