use ethabi::Address;

use crate::constants::{MARKET_TYPES, REPORTING_STATES, TOKEN_DECIMALS, YES_NO_OPTIONS};
use crate::error::MarketViewError;
use crate::ethereum::{address_string, format_unix_timestamp_iso, u128_to_rounded_pretty_decimal_string};
use crate::extra_info::{parse_extra_info, ExtraInfo};
use crate::types::HotLoadingMarketData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketType {
    YesNo,
    Categorical,
    Scalar,
}

impl MarketType {
    pub fn from_index(index: u8) -> Result<Self, MarketViewError> {
        match index {
            0 => Ok(MarketType::YesNo),
            1 => Ok(MarketType::Categorical),
            2 => Ok(MarketType::Scalar),
            other => Err(MarketViewError::InvalidMarketType(other)),
        }
    }

    pub fn name(self) -> &'static str {
        MARKET_TYPES[self as usize]
    }
}

/// Everything the market panel shows.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub market_address: Address,
    pub parsed_extra_info: Option<ExtraInfo>,
    pub hot_loading_market_data: HotLoadingMarketData,
}

impl MarketData {
    pub fn new(market_address: Address, hot_loading_market_data: HotLoadingMarketData) -> Self {
        let parsed_extra_info = parse_extra_info(&hot_loading_market_data.extra_info);
        Self { market_address, parsed_extra_info, hot_loading_market_data }
    }

    pub fn market_type(&self) -> Result<MarketType, MarketViewError> {
        MarketType::from_index(self.hot_loading_market_data.market_type)
    }
}

fn dai(value: u128) -> String {
    u128_to_rounded_pretty_decimal_string(value, TOKEN_DECIMALS, 4)
}

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// `100 / divisor` as a percentage with two decimals.
pub fn format_fee_divisor(divisor: u128) -> String {
    if divisor == 0 {
        return "0.00%".to_string();
    }
    // hundredths of a percent, rounded half up
    let basis = (10_000u128 * 2 / divisor + 1) / 2;
    format!("{}.{:02}%", basis / 100, basis % 100)
}

pub fn format_volumes(market: &HotLoadingMarketData) -> Result<Vec<String>, MarketViewError> {
    let volumes = &market.outcome_volumes;
    match MarketType::from_index(market.market_type)? {
        MarketType::Categorical | MarketType::Scalar => Ok(vec![join(volumes)]),
        MarketType::YesNo => Ok(YES_NO_OPTIONS
            .iter()
            .enumerate()
            .map(|(index, option)| match volumes.get(index) {
                Some(volume) => format!("{option}: {} DAI", dai(*volume)),
                None => format!("{option}: undefined DAI"),
            })
            .collect()),
    }
}

pub fn format_winning_option(market: &HotLoadingMarketData) -> Result<String, MarketViewError> {
    let payouts = &market.winning_payout;
    match MarketType::from_index(market.market_type)? {
        MarketType::Categorical | MarketType::Scalar => Ok(join(payouts)),
        MarketType::YesNo => Ok(payouts
            .iter()
            .position(|payout| *payout > 0)
            .and_then(|index| YES_NO_OPTIONS.get(index))
            .map(|label| label.to_string())
            .unwrap_or_default()),
    }
}

fn reporting_state_name(index: u8) -> String {
    REPORTING_STATES.get(index as usize).map(|s| s.to_string()).unwrap_or_else(|| format!("Unknown({index})"))
}

/// Description, long description, categories and tags, or the raw blob when
/// it could not be parsed.
pub fn render_extra_info(data: &MarketData) -> Vec<String> {
    match &data.parsed_extra_info {
        None => vec![
            "Failed to parse Extra data, unparsed extra data:".to_string(),
            data.hot_loading_market_data.extra_info.clone(),
        ],
        Some(info) => vec![
            format!("Description: {}", info.description),
            format!("Long Description: {}", info.long_description.as_deref().unwrap_or_default()),
            format!("Categories: {}", info.categories_joined()),
            format!("Tags: {}", info.tags_joined()),
        ],
    }
}

pub fn render_market(data: &MarketData) -> Result<Vec<String>, MarketViewError> {
    let market = &data.hot_loading_market_data;
    let market_type = data.market_type()?;
    let end_time = format_unix_timestamp_iso(market.end_time).unwrap_or_else(|_| market.end_time.to_string());
    let volumes = format_volumes(market)?;
    let mut lines = vec![
        format!("Market Address: {}", address_string(&data.market_address)),
        format!("Market Creator: {}", address_string(&market.market_creator)),
        format!("Owner: {}", address_string(&market.owner)),
        format!("Outcomes: {}", market.outcomes.join(", ")),
        format!("Market Type: {}", market_type.name()),
        format!("Display Prices: {}", join(&market.display_prices)),
        format!("Designated Reporter: {}", address_string(&market.designated_reporter)),
        format!("Reporting State: {}", reporting_state_name(market.reporting_state)),
        format!("Dispute Round: {}", market.dispute_round),
        format!("Winning Outcome: {}", format_winning_option(market)?),
        format!("Volume: {} DAI", dai(market.volume)),
        format!("Open Interest: {} DAI", dai(market.open_interest)),
        format!("Last Traded Prices: {}", join(&market.last_traded_prices)),
        format!("Universe: {}", address_string(&market.universe)),
        format!("Num Ticks: {}", market.num_ticks),
        format!("Fee: {}", format_fee_divisor(market.fee_divisor)),
        format!("Affiliate Fee: {}", format_fee_divisor(market.affiliate_fee_divisor)),
        format!("End Time: {end_time}"),
        format!("Num Outcomes: {}", market.num_outcomes),
        format!("Validity Bond: {} REP", dai(market.validity_bond)),
        format!("Reporting Fee: {}", format_fee_divisor(market.reporting_fee_divisor)),
    ];
    if volumes.len() == 1 {
        lines.push(format!("Outcome Volumes: {}", volumes[0]));
    } else {
        lines.push("Outcome Volumes:".to_string());
        lines.extend(volumes.into_iter().map(|v| format!("  {v}")));
    }
    lines.extend(render_extra_info(data));
    Ok(lines)
}
