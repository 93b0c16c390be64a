use ethabi::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Winning,
    Losing,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Winning => f.write_str("Winning"),
            OutcomeStatus::Losing => f.write_str("Losing"),
        }
    }
}

/// Stake sitting in an outcome's open dispute crowdsourcer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub participant_address: Address,
    pub payout_numerators: Vec<u128>,
    pub stake: u128,
    pub size: u128,
}

/// One candidate outcome's standing in the current dispute round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeStake {
    pub outcome_name: String,
    /// atto-REP
    pub rep_stake: u128,
    pub status: OutcomeStatus,
    pub payout_numerators: Vec<u128>,
    pub already_contributed_to_outcome: Option<Contribution>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOutcomeOption {
    pub outcome_name: String,
    pub payout_numerators: Vec<u128>,
}

impl From<&OutcomeStake> for MarketOutcomeOption {
    fn from(stake: &OutcomeStake) -> Self {
        Self { outcome_name: stake.outcome_name.clone(), payout_numerators: stake.payout_numerators.clone() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkValues {
    pub fork_reputation_goal: u128,
    pub dispute_threshold_for_fork: u128,
    pub dispute_threshold_for_dispute_pacing: u128,
    pub initial_report_min_value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCompletedCrowdSourcer {
    pub participant_address: Address,
    pub payout_numerators: Vec<u128>,
    pub stake: u128,
    pub size: u128,
}

/// Market snapshot as returned by the hot-loading contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotLoadingMarketData {
    pub extra_info: String,
    pub market_creator: Address,
    pub owner: Address,
    pub outcomes: Vec<String>,
    pub market_type: u8,
    pub display_prices: Vec<i128>,
    pub designated_reporter: Address,
    pub reporting_state: u8,
    pub dispute_round: u128,
    pub winning_payout: Vec<u128>,
    pub volume: u128,
    pub open_interest: u128,
    pub last_traded_prices: Vec<u128>,
    pub universe: Address,
    pub num_ticks: u128,
    pub fee_divisor: u128,
    pub affiliate_fee_divisor: u128,
    pub end_time: u128,
    pub num_outcomes: u128,
    pub validity_bond: u128,
    pub reporting_fee_divisor: u128,
    pub outcome_volumes: Vec<u128>,
}
