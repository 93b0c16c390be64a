use std::path::PathBuf;

use augur_core::constants::{address, AUGUR_CONTRACT, GENESIS_UNIVERSE};
use augur_core::create_market::CreateYesNoMarketForm;
use augur_core::ethereum::{address_string, parse_address};
use augur_core::Address;
use clap::{Parser, Subcommand};
use tracing::info;

mod commands;
mod contracts;
mod rpc;

use contracts::{ContractAddresses, RpcContracts};
use rpc::HttpTransport;

#[derive(Parser, Debug)]
#[command(name = "augur", about = "Create, report on and dispute Augur markets")]
struct Args {
    #[arg(long, env = "AUGUR_RPC_URL", default_value = "http://localhost:8545")]
    rpc_url: String,

    /// Sending account; defaults to the node's first account.
    #[arg(long, env = "AUGUR_ACCOUNT", value_parser = parse_address)]
    account: Option<Address>,

    #[arg(long, env = "AUGUR_HOT_LOADING", value_parser = parse_address)]
    hot_loading: Option<Address>,

    #[arg(long, env = "AUGUR_FILL_ORDER", value_parser = parse_address)]
    fill_order: Option<Address>,

    #[arg(long, env = "AUGUR_ORDERS", value_parser = parse_address)]
    orders: Option<Address>,

    /// Contract receiving `redeemStake`; defaults to the genesis universe.
    #[arg(long, env = "AUGUR_REDEEM_STAKE", value_parser = parse_address)]
    redeem_stake: Option<Address>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct CreateMarketArgs {
    /// YYYY-MM-DD, midnight UTC
    #[arg(long)]
    end_date: String,
    /// Creator fee in percent
    #[arg(long, default_value = "0")]
    fee: String,
    #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
    affiliate_validator: String,
    #[arg(long, default_value = "0")]
    affiliate_fee_divisor: String,
    /// Defaults to the sending account.
    #[arg(long)]
    designated_reporter: Option<String>,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "")]
    long_description: String,
    /// Comma separated
    #[arg(long, default_value = "")]
    categories: String,
    /// Comma separated
    #[arg(long, default_value = "")]
    tags: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a Yes/No market in the genesis universe.
    CreateMarket(CreateMarketArgs),
    /// Allow the genesis universe to spend REP.
    ApproveRep,
    /// Allow the Augur contract to spend DAI.
    ApproveDai,
    /// Show a market.
    Market {
        #[arg(value_parser = parse_address)]
        market: Address,
    },
    /// Show outcomes with their stakes and dispute requirements.
    ReportingOptions {
        #[arg(value_parser = parse_address)]
        market: Address,
        #[arg(long)]
        select: Option<String>,
    },
    /// Report on or dispute a market outcome.
    Report {
        #[arg(value_parser = parse_address)]
        market: Address,
        #[arg(long)]
        outcome: String,
        /// REP; defaults to the largest allowed stake.
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Redeem stake from reporting participants and dispute windows.
    RedeemStake {
        #[arg(long, value_delimiter = ',', value_parser = parse_address)]
        participants: Vec<Address>,
        #[arg(long, value_delimiter = ',', value_parser = parse_address)]
        dispute_windows: Vec<Address>,
    },
    /// Deploy the constant product market through the deterministic deployment proxy.
    Deploy {
        #[arg(long, default_value = "artifacts/AugurConstantProductMarket.json")]
        artifact: PathBuf,
    },
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("AUGUR_LOG_JSON").ok().as_deref() == Some("1");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).with_writer(std::io::stderr).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    info!(rpc = %args.rpc_url, "augur starting");

    let addresses = ContractAddresses {
        augur: address(AUGUR_CONTRACT)?,
        hot_loading: args.hot_loading,
        fill_order: args.fill_order,
        orders: args.orders,
        redeem_stake: match args.redeem_stake {
            Some(redeem_stake) => redeem_stake,
            None => address(GENESIS_UNIVERSE)?,
        },
    };
    let client = RpcContracts::new(HttpTransport::new(&args.rpc_url), addresses)?;
    let explicit_account = args.account;
    let client_ref = &client;
    let account = move || async move {
        let account = commands::resolve_account(client_ref, explicit_account).await?;
        info!(account = %address_string(&account), "using account");
        anyhow::Ok(account)
    };

    let lines = match args.command {
        Command::CreateMarket(form) => {
            let account = account().await?;
            let form = CreateYesNoMarketForm {
                end_time: form.end_date,
                market_creator_fee: form.fee,
                affiliate_validator: form.affiliate_validator,
                affiliate_fee_divisor: form.affiliate_fee_divisor,
                designated_reporter_address: form.designated_reporter.unwrap_or_else(|| address_string(&account)),
                description: form.description,
                long_description: form.long_description,
                categories: form.categories,
                tags: form.tags,
            };
            commands::create_market(&client, account, &form).await?
        }
        Command::ApproveRep => commands::approve_rep(&client, account().await?).await?,
        Command::ApproveDai => commands::approve_dai(&client, account().await?).await?,
        Command::Market { market } => commands::show_market(&client, market).await?,
        Command::ReportingOptions { market, select } => {
            commands::reporting_options(&client, account().await?, market, select.as_deref()).await?
        }
        Command::Report { market, outcome, amount, description } => {
            commands::report(&client, account().await?, market, &outcome, amount.as_deref(), &description).await?
        }
        Command::RedeemStake { participants, dispute_windows } => {
            commands::redeem_stake(&client, account().await?, &participants, &dispute_windows).await?
        }
        Command::Deploy { artifact } => commands::deploy(&client, account().await?, &artifact).await?,
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
