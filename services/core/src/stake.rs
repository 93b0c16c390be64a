use crate::types::{LastCompletedCrowdSourcer, OutcomeStake, OutcomeStatus};

pub fn total_stake(outcome_stakes: &[OutcomeStake]) -> u128 {
    outcome_stakes.iter().fold(0u128, |sum, outcome| sum.saturating_add(outcome.rep_stake))
}

/// REP still needed for an outcome holding `outcome_rep_stake` to overtake
/// the rest of the round: `total - own - own`, floored at zero.
pub fn required_stake(total_stake: u128, outcome_rep_stake: u128) -> u128 {
    total_stake.saturating_sub(outcome_rep_stake).saturating_sub(outcome_rep_stake)
}

/// Largest new stake a contributor may place on `outcome_stake` this round.
///
/// The tentative winner can only receive pre-emptive stake while dispute
/// pacing is off and the market is below the pacing threshold; that stake is
/// capped at twice the size of the last completed crowdsourcer. A losing
/// outcome can take whatever its open crowdsourcer still lacks, or the full
/// required stake when no crowdsourcer is open yet.
pub fn max_stake_amount_for_outcome(
    outcome_stake: &OutcomeStake,
    total_stake: u128,
    is_slow_reporting: bool,
    preemptive_dispute_crowdsourcer_stake: u128,
    dispute_threshold_for_dispute_pacing: u128,
    last_completed_crowdsourcer: Option<&LastCompletedCrowdSourcer>,
) -> u128 {
    match outcome_stake.status {
        OutcomeStatus::Winning => {
            if is_slow_reporting || total_stake >= dispute_threshold_for_dispute_pacing {
                return 0;
            }
            let mut ceiling = dispute_threshold_for_dispute_pacing - total_stake;
            if let Some(last) = last_completed_crowdsourcer {
                ceiling = ceiling.min(last.size.saturating_mul(2));
            }
            ceiling.saturating_sub(preemptive_dispute_crowdsourcer_stake)
        }
        OutcomeStatus::Losing => match &outcome_stake.already_contributed_to_outcome {
            Some(crowdsourcer) => crowdsourcer.size.saturating_sub(crowdsourcer.stake),
            None => required_stake(total_stake, outcome_stake.rep_stake),
        },
    }
}
