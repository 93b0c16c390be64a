//! Outcome selection for reporting and disputing.

use crate::constants::TOKEN_DECIMALS;
use crate::error::ReportingError;
use crate::ethereum::u128_to_decimal_string;
use crate::signal::{Computed, OptionalSignal, Signal};
use crate::stake::{max_stake_amount_for_outcome, required_stake, total_stake};
use crate::types::{ForkValues, LastCompletedCrowdSourcer, MarketOutcomeOption, OutcomeStake, OutcomeStatus};

fn rep(value: u128) -> String {
    u128_to_decimal_string(value, TOKEN_DECIMALS, 2)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingOptionRow {
    pub outcome_name: String,
    pub status: OutcomeStatus,
    pub rep_stake: u128,
    /// `Prestaked: ..` for the tentative winner, `Required for Dispute: ..` otherwise.
    pub stake_label: String,
    pub already_contributed: Option<String>,
    pub checked: bool,
    pub disabled: bool,
    /// `None` until an outcome is selected and fork values are known.
    pub max_stake: Option<u128>,
}

pub struct ReportingOptions {
    pub selected_outcome: Signal<Option<String>>,
    pub outcome_stakes: OptionalSignal<Vec<OutcomeStake>>,
    pub preemptive_dispute_crowdsourcer_stake: OptionalSignal<u128>,
    pub is_slow_reporting: Signal<bool>,
    pub fork_values: OptionalSignal<ForkValues>,
    pub last_completed_crowdsourcer: OptionalSignal<LastCompletedCrowdSourcer>,
    pub are_options_disabled: Signal<bool>,
    pub can_initial_report: Signal<bool>,
    total_stake: Computed<u128>,
    max_stake_for_each_option: Computed<Vec<u128>>,
}

impl Default for ReportingOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportingOptions {
    pub fn new() -> Self {
        let selected_outcome: Signal<Option<String>> = Signal::new(None);
        let outcome_stakes: OptionalSignal<Vec<OutcomeStake>> = OptionalSignal::default();
        let preemptive_dispute_crowdsourcer_stake: OptionalSignal<u128> = OptionalSignal::default();
        let is_slow_reporting = Signal::new(false);
        let fork_values: OptionalSignal<ForkValues> = OptionalSignal::default();
        let last_completed_crowdsourcer: OptionalSignal<LastCompletedCrowdSourcer> = OptionalSignal::default();

        let total = {
            let stakes = outcome_stakes.clone();
            Computed::new(&[&outcome_stakes], move || {
                stakes.with(|stakes| stakes.map(|s| total_stake(s)).unwrap_or(0u128))
            })
        };

        let max_stake_for_each_option = {
            let selected = selected_outcome.clone();
            let stakes = outcome_stakes.clone();
            let total_value = total.signal().clone();
            let slow = is_slow_reporting.clone();
            let preemptive = preemptive_dispute_crowdsourcer_stake.clone();
            let fork = fork_values.clone();
            let last = last_completed_crowdsourcer.clone();
            Computed::new(
                &[
                    &selected_outcome,
                    &outcome_stakes,
                    &total,
                    &is_slow_reporting,
                    &preemptive_dispute_crowdsourcer_stake,
                    &fork_values,
                    &last_completed_crowdsourcer,
                ],
                move || {
                    if selected.with(Option::is_none) {
                        return Vec::new();
                    }
                    let Some(fork) = fork.deep_value() else {
                        return Vec::new();
                    };
                    let total = total_value.get();
                    let slow = slow.get();
                    let preemptive = preemptive.value_or(0);
                    let last = last.deep_value();
                    stakes.with(|stakes| {
                        stakes
                            .map(|stakes| {
                                stakes
                                    .iter()
                                    .map(|outcome| {
                                        max_stake_amount_for_outcome(
                                            outcome,
                                            total,
                                            slow,
                                            preemptive,
                                            fork.dispute_threshold_for_dispute_pacing,
                                            last.as_ref(),
                                        )
                                    })
                                    .collect::<Vec<u128>>()
                            })
                            .unwrap_or_default()
                    })
                },
            )
        };

        Self {
            selected_outcome,
            outcome_stakes,
            preemptive_dispute_crowdsourcer_stake,
            is_slow_reporting,
            fork_values,
            last_completed_crowdsourcer,
            are_options_disabled: Signal::new(false),
            can_initial_report: Signal::new(false),
            total_stake: total,
            max_stake_for_each_option,
        }
    }

    pub fn total_stake(&self) -> u128 {
        self.total_stake.get()
    }

    pub fn max_stake_for_each_option(&self) -> Vec<u128> {
        self.max_stake_for_each_option.get()
    }

    /// No stake in the round yet: the first report is an initial report.
    pub fn is_initial_reporting(&self) -> bool {
        self.total_stake() == 0
    }

    pub fn select(&self, outcome_name: &str) -> Result<(), ReportingError> {
        let known = self.outcome_stakes.with(|stakes| match stakes {
            None => Err(ReportingError::StakesNotLoaded),
            Some(stakes) => Ok(stakes.iter().any(|s| s.outcome_name == outcome_name)),
        })?;
        if !known {
            return Err(ReportingError::UnknownOutcome(outcome_name.to_string()));
        }
        self.selected_outcome.set(Some(outcome_name.to_string()));
        Ok(())
    }

    pub fn selected(&self) -> Option<OutcomeStake> {
        let name = self.selected_outcome.get()?;
        self.outcome_stakes
            .with(|stakes| stakes.and_then(|stakes| stakes.iter().find(|s| s.outcome_name == name).cloned()))
    }

    pub fn max_stake_for(&self, outcome_name: &str) -> Option<u128> {
        let index = self
            .outcome_stakes
            .with(|stakes| stakes.and_then(|stakes| stakes.iter().position(|s| s.outcome_name == outcome_name)))?;
        self.max_stake_for_each_option().get(index).copied()
    }

    /// Empty until outcome stakes have been loaded.
    pub fn rows(&self) -> Vec<ReportingOptionRow> {
        let total = self.total_stake();
        let maxima = self.max_stake_for_each_option();
        let selected = self.selected_outcome.get();
        let can_initial_report = self.can_initial_report.get();
        let options_disabled = self.are_options_disabled.get();
        let preemptive = self.preemptive_dispute_crowdsourcer_stake.value_or(0);
        self.outcome_stakes.with(|stakes| {
            let Some(stakes) = stakes else {
                return Vec::new();
            };
            stakes
                .iter()
                .enumerate()
                .map(|(index, outcome)| {
                    let max_stake = maxima.get(index).copied();
                    let required = required_stake(total, outcome.rep_stake);
                    let stake_label = match outcome.status {
                        OutcomeStatus::Winning => format!("Prestaked: {} REP", rep(preemptive)),
                        OutcomeStatus::Losing => format!("Required for Dispute: {} REP", rep(required)),
                    };
                    let already_contributed = outcome.already_contributed_to_outcome.as_ref().map(|c| {
                        format!("Already contributed: {} REP / {} REP", rep(c.stake), rep(required))
                    });
                    ReportingOptionRow {
                        outcome_name: outcome.outcome_name.clone(),
                        status: outcome.status,
                        rep_stake: outcome.rep_stake,
                        stake_label,
                        already_contributed,
                        checked: selected.as_deref() == Some(outcome.outcome_name.as_str()),
                        disabled: !can_initial_report && (options_disabled || max_stake == Some(0)),
                        max_stake,
                    }
                })
                .collect()
        })
    }

    /// Text form of the panel. Initial reporting omits status and stake.
    pub fn render(&self) -> Vec<String> {
        let initial = self.is_initial_reporting();
        self.rows()
            .into_iter()
            .map(|row| {
                let marker = match (row.checked, row.disabled) {
                    (true, _) => "(x)",
                    (false, true) => "(-)",
                    (false, false) => "( )",
                };
                let mut line = if initial {
                    format!("{marker} {}", row.outcome_name)
                } else {
                    format!("{marker} {} ({}) {} REP  {}", row.outcome_name, row.status, rep(row.rep_stake), row.stake_label)
                };
                if let Some(note) = row.already_contributed {
                    line.push_str(&format!("  ({note})"));
                }
                line
            })
            .collect()
    }
}

/// The transaction a report on the selected outcome turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportAction {
    InitialReport { payout_numerators: Vec<u128>, additional_stake: u128 },
    Contribute { payout_numerators: Vec<u128>, amount: u128 },
    ContributeToTentative { payout_numerators: Vec<u128>, amount: u128 },
}

impl ReportAction {
    pub fn amount(&self) -> u128 {
        match self {
            ReportAction::InitialReport { additional_stake, .. } => *additional_stake,
            ReportAction::Contribute { amount, .. } | ReportAction::ContributeToTentative { amount, .. } => *amount,
        }
    }
}

impl ReportingOptions {
    /// Chooses the report for the selected outcome. Without `amount` the
    /// full ceiling is staked; an explicit contribution must be nonzero and
    /// must not exceed it.
    pub fn plan_report(&self, amount: Option<u128>) -> Result<ReportAction, ReportingError> {
        if !self.outcome_stakes.is_present() {
            return Err(ReportingError::StakesNotLoaded);
        }
        let outcome = self.selected().ok_or(ReportingError::NoOutcomeSelected)?;
        let payout_numerators = outcome.payout_numerators.clone();
        if self.is_initial_reporting() {
            return Ok(ReportAction::InitialReport { payout_numerators, additional_stake: amount.unwrap_or(0) });
        }
        let maximum = self.max_stake_for(&outcome.outcome_name).unwrap_or(0);
        if maximum == 0 {
            return Err(ReportingError::NothingToStake(outcome.outcome_name));
        }
        let amount = amount.unwrap_or(maximum);
        if amount == 0 {
            return Err(ReportingError::ZeroStake(outcome.outcome_name));
        }
        if amount > maximum {
            return Err(ReportingError::StakeTooLarge { outcome: outcome.outcome_name, requested: amount, maximum });
        }
        Ok(match outcome.status {
            OutcomeStatus::Winning => ReportAction::ContributeToTentative { payout_numerators, amount },
            OutcomeStatus::Losing => ReportAction::Contribute { payout_numerators, amount },
        })
    }
}

/// Plain outcome choice for markets reported without stake information.
pub fn options_without_stake(options: &[MarketOutcomeOption], selected_outcome: Option<&str>) -> Vec<String> {
    options
        .iter()
        .map(|option| {
            let marker = if selected_outcome == Some(option.outcome_name.as_str()) { "(x)" } else { "( )" };
            format!("{marker} {}", option.outcome_name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ATTO;
    use crate::types::Contribution;
    use ethabi::Address;

    fn stakes() -> Vec<OutcomeStake> {
        let make = |name: &str, rep_stake: u128, status| OutcomeStake {
            outcome_name: name.to_string(),
            rep_stake,
            status,
            payout_numerators: vec![],
            already_contributed_to_outcome: None,
        };
        vec![
            make("Invalid", 0, OutcomeStatus::Losing),
            make("No", 30 * ATTO, OutcomeStatus::Losing),
            make("Yes", 70 * ATTO, OutcomeStatus::Winning),
        ]
    }

    fn fork(threshold: u128) -> ForkValues {
        ForkValues {
            fork_reputation_goal: 0,
            dispute_threshold_for_fork: 0,
            dispute_threshold_for_dispute_pacing: threshold,
            initial_report_min_value: 0,
        }
    }

    #[test]
    fn nothing_renders_before_stakes_load() {
        let options = ReportingOptions::new();
        assert!(options.rows().is_empty());
        assert_eq!(options.select("Yes"), Err(ReportingError::StakesNotLoaded));
    }

    #[test]
    fn maxima_wait_for_selection_and_fork_values() {
        let options = ReportingOptions::new();
        options.outcome_stakes.set_deep_value(Some(stakes()));
        assert_eq!(options.total_stake(), 100 * ATTO);
        assert!(options.max_stake_for_each_option().is_empty());

        options.select("No").unwrap();
        assert!(options.max_stake_for_each_option().is_empty());

        options.fork_values.set_deep_value(Some(fork(1_000 * ATTO)));
        assert_eq!(options.max_stake_for_each_option(), vec![100 * ATTO, 40 * ATTO, 900 * ATTO]);
    }

    #[test]
    fn maxima_follow_every_input() {
        let options = ReportingOptions::new();
        options.outcome_stakes.set_deep_value(Some(stakes()));
        options.fork_values.set_deep_value(Some(fork(1_000 * ATTO)));
        options.select("Yes").unwrap();
        assert_eq!(options.max_stake_for("Yes"), Some(900 * ATTO));

        options.preemptive_dispute_crowdsourcer_stake.set_deep_value(Some(100 * ATTO));
        assert_eq!(options.max_stake_for("Yes"), Some(800 * ATTO));

        options.is_slow_reporting.set(true);
        assert_eq!(options.max_stake_for("Yes"), Some(0));
        assert_eq!(options.max_stake_for("No"), Some(40 * ATTO));

        let mut grown = stakes();
        grown[1].rep_stake = 50 * ATTO;
        options.outcome_stakes.set_deep_value(Some(grown));
        assert_eq!(options.total_stake(), 120 * ATTO);
        assert_eq!(options.max_stake_for("No"), Some(20 * ATTO));
    }

    #[test]
    fn rows_carry_labels_and_disabled_state() {
        let options = ReportingOptions::new();
        let mut with_crowdsourcer = stakes();
        with_crowdsourcer[1].already_contributed_to_outcome = Some(Contribution {
            participant_address: Address::repeat_byte(0x22),
            payout_numerators: vec![],
            stake: 10 * ATTO,
            size: 40 * ATTO,
        });
        options.outcome_stakes.set_deep_value(Some(with_crowdsourcer));
        options.fork_values.set_deep_value(Some(fork(1_000 * ATTO)));
        options.is_slow_reporting.set(true);
        options.select("No").unwrap();

        let rows = options.rows();
        assert_eq!(rows[1].stake_label, "Required for Dispute: 40 REP");
        assert_eq!(rows[1].already_contributed.as_deref(), Some("Already contributed: 10 REP / 40 REP"));
        assert_eq!(rows[1].max_stake, Some(30 * ATTO));
        assert!(rows[1].checked);
        assert_eq!(rows[2].stake_label, "Prestaked: 0 REP");
        assert!(rows[2].disabled);
        assert!(!rows[0].disabled);

        options.can_initial_report.set(true);
        assert!(!options.rows()[2].disabled);
    }

    #[test]
    fn initial_reporting_renders_names_only() {
        let options = ReportingOptions::new();
        let empty: Vec<_> = stakes().into_iter().map(|s| OutcomeStake { rep_stake: 0, ..s }).collect();
        options.outcome_stakes.set_deep_value(Some(empty));
        assert!(options.is_initial_reporting());
        options.select("Yes").unwrap();
        assert_eq!(options.render(), vec!["( ) Invalid", "( ) No", "(x) Yes"]);
    }

    #[test]
    fn unknown_outcomes_cannot_be_selected() {
        let options = ReportingOptions::new();
        options.outcome_stakes.set_deep_value(Some(stakes()));
        assert_eq!(options.select("Maybe"), Err(ReportingError::UnknownOutcome("Maybe".into())));
        assert_eq!(options.selected(), None);
        options.select("No").unwrap();
        assert_eq!(options.selected().map(|s| s.rep_stake), Some(30 * ATTO));
    }

    #[test]
    fn reports_follow_round_state() {
        let options = ReportingOptions::new();
        assert_eq!(options.plan_report(None), Err(ReportingError::StakesNotLoaded));

        let fresh: Vec<_> = stakes().into_iter().map(|s| OutcomeStake { rep_stake: 0, ..s }).collect();
        options.outcome_stakes.set_deep_value(Some(fresh));
        assert_eq!(options.plan_report(None), Err(ReportingError::NoOutcomeSelected));
        options.select("No").unwrap();
        assert!(matches!(
            options.plan_report(Some(5)),
            Ok(ReportAction::InitialReport { additional_stake: 5, .. })
        ));

        options.outcome_stakes.set_deep_value(Some(stakes()));
        options.fork_values.set_deep_value(Some(fork(1_000 * ATTO)));
        assert_eq!(options.plan_report(None).map(|a| a.amount()), Ok(40 * ATTO));
        assert_eq!(
            options.plan_report(Some(41 * ATTO)),
            Err(ReportingError::StakeTooLarge { outcome: "No".into(), requested: 41 * ATTO, maximum: 40 * ATTO })
        );

        options.select("Yes").unwrap();
        assert!(matches!(options.plan_report(Some(ATTO)), Ok(ReportAction::ContributeToTentative { .. })));
        options.is_slow_reporting.set(true);
        assert_eq!(options.plan_report(None), Err(ReportingError::NothingToStake("Yes".into())));
    }

    #[test]
    fn zero_contributions_are_rejected() {
        let options = ReportingOptions::new();
        options.outcome_stakes.set_deep_value(Some(stakes()));
        options.fork_values.set_deep_value(Some(fork(1_000 * ATTO)));
        options.select("No").unwrap();
        assert_eq!(options.plan_report(Some(0)), Err(ReportingError::ZeroStake("No".into())));
        options.select("Yes").unwrap();
        assert_eq!(options.plan_report(Some(0)), Err(ReportingError::ZeroStake("Yes".into())));
        assert!(matches!(options.plan_report(None), Ok(ReportAction::ContributeToTentative { .. })));
    }

    #[test]
    fn options_without_stake_mark_selection() {
        let options: Vec<MarketOutcomeOption> = stakes().iter().map(MarketOutcomeOption::from).collect();
        assert_eq!(options_without_stake(&options, Some("No")), vec!["( ) Invalid", "(x) No", "( ) Yes"]);
    }
}
