//! One function per subcommand. Each returns the lines to print.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use augur_core::client::{fetch_market, load_reporting_options, outcome_options, submit_report};
use augur_core::constants::{
    address, APPROVAL_AMOUNT, AUGUR_CONTRACT, DAI_TOKEN_ADDRESS, GENESIS_UNIVERSE, REPV2_TOKEN_ADDRESS,
    TOKEN_DECIMALS,
};
use augur_core::create_market::CreateYesNoMarketForm;
use augur_core::deployment::{SolcOutput, CONSTANT_PRODUCT_MARKET_CONTRACT, CONSTANT_PRODUCT_MARKET_SOURCE};
use augur_core::ethereum::{address_string, decimal_string_to_u128, u128_to_decimal_string};
use augur_core::market::render_market;
use augur_core::reporting::options_without_stake;
use augur_core::{Address, AugurContracts, Hash, ReportAction, ReportingOptions};
use tracing::info;

fn tx_line(hash: &Hash) -> String {
    format!("transaction: 0x{}", hex::encode(hash.as_bytes()))
}

/// The explicit account, else the node's first account.
pub async fn resolve_account<C: AugurContracts>(client: &C, explicit: Option<Address>) -> anyhow::Result<Address> {
    if let Some(account) = explicit {
        return Ok(account);
    }
    let accounts = client.accounts().await?;
    accounts.first().copied().ok_or_else(|| anyhow!("missing account"))
}

pub async fn create_market<C: AugurContracts>(
    client: &C,
    from: Address,
    form: &CreateYesNoMarketForm,
) -> anyhow::Result<Vec<String>> {
    let params = form.validate()?;
    info!(end_time = params.end_time, fee = params.fee_per_cash_in_atto_cash, "creating yes/no market");
    let hash = client.create_yes_no_market(from, address(GENESIS_UNIVERSE)?, &params).await?;
    Ok(vec![tx_line(&hash)])
}

pub async fn approve_rep<C: AugurContracts>(client: &C, from: Address) -> anyhow::Result<Vec<String>> {
    let hash = client
        .approve_erc20_token(from, address(REPV2_TOKEN_ADDRESS)?, address(GENESIS_UNIVERSE)?, APPROVAL_AMOUNT)
        .await?;
    Ok(vec![tx_line(&hash)])
}

pub async fn approve_dai<C: AugurContracts>(client: &C, from: Address) -> anyhow::Result<Vec<String>> {
    let hash = client
        .approve_erc20_token(from, address(DAI_TOKEN_ADDRESS)?, address(AUGUR_CONTRACT)?, APPROVAL_AMOUNT)
        .await?;
    Ok(vec![tx_line(&hash)])
}

pub async fn show_market<C: AugurContracts>(client: &C, market: Address) -> anyhow::Result<Vec<String>> {
    let data = fetch_market(client, market).await?;
    Ok(render_market(&data)?)
}

async fn loaded_options<C: AugurContracts>(
    client: &C,
    account: Address,
    market: Address,
) -> anyhow::Result<(ReportingOptions, augur_core::MarketData)> {
    let data = fetch_market(client, market).await?;
    let options = ReportingOptions::new();
    load_reporting_options(client, account, &data, &options).await?;
    Ok((options, data))
}

pub async fn reporting_options<C: AugurContracts>(
    client: &C,
    account: Address,
    market: Address,
    select: Option<&str>,
) -> anyhow::Result<Vec<String>> {
    let (options, data) = loaded_options(client, account, market).await?;
    if options.are_options_disabled.get() && !options.can_initial_report.get() {
        let choices = outcome_options(&data.hot_loading_market_data);
        let mut lines = vec!["market is not open for reporting".to_string()];
        lines.extend(options_without_stake(&choices, select));
        return Ok(lines);
    }
    if let Some(name) = select {
        options.select(name)?;
    }
    let mut lines = vec![format!(
        "Total stake: {} REP",
        u128_to_decimal_string(options.total_stake(), TOKEN_DECIMALS, 2)
    )];
    lines.extend(options.render());
    if let Some(name) = select {
        if let Some(max) = options.max_stake_for(name) {
            lines.push(format!("Max stake for {name}: {} REP", u128_to_decimal_string(max, TOKEN_DECIMALS, 2)));
        }
    }
    Ok(lines)
}

pub async fn report<C: AugurContracts>(
    client: &C,
    account: Address,
    market: Address,
    outcome: &str,
    amount: Option<&str>,
    description: &str,
) -> anyhow::Result<Vec<String>> {
    let amount = amount
        .map(|a| decimal_string_to_u128(a, TOKEN_DECIMALS))
        .transpose()
        .context("invalid --amount")?;
    let (options, _) = loaded_options(client, account, market).await?;
    if options.are_options_disabled.get() && !options.can_initial_report.get() {
        bail!("market is not open for reporting");
    }
    options.select(outcome)?;
    let action = options.plan_report(amount)?;
    if matches!(action, ReportAction::InitialReport { .. }) && !options.can_initial_report.get() {
        bail!("only the designated reporter can report now");
    }
    let hash = submit_report(client, account, market, &action, description).await?;
    info!(market = %address_string(&market), outcome, amount = action.amount(), "report sent");
    Ok(vec![
        format!("{outcome}: {} REP", u128_to_decimal_string(action.amount(), TOKEN_DECIMALS, 2)),
        tx_line(&hash),
    ])
}

pub async fn redeem_stake<C: AugurContracts>(
    client: &C,
    from: Address,
    reporting_participants: &[Address],
    dispute_windows: &[Address],
) -> anyhow::Result<Vec<String>> {
    if reporting_participants.is_empty() && dispute_windows.is_empty() {
        bail!("nothing to redeem");
    }
    let hash = client.redeem_stake(from, reporting_participants, dispute_windows).await?;
    Ok(vec![tx_line(&hash)])
}

pub async fn deploy<C: AugurContracts>(client: &C, from: Address, artifact: &Path) -> anyhow::Result<Vec<String>> {
    let json = tokio::fs::read_to_string(artifact)
        .await
        .with_context(|| format!("reading {}", artifact.display()))?;
    let init_code = SolcOutput::parse(&json)?.creation_bytecode(CONSTANT_PRODUCT_MARKET_SOURCE, CONSTANT_PRODUCT_MARKET_CONTRACT)?;
    if client.is_constant_product_market_deployed(&init_code).await? {
        info!("constant product market already deployed");
        return Ok(vec!["already deployed".to_string()]);
    }
    let hash = client.deploy_constant_product_market(from, &init_code).await?;
    Ok(vec![tx_line(&hash)])
}
