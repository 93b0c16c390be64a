#![allow(async_fn_in_trait)]

use ethabi::{Address, Hash};
use tracing::debug;

use crate::constants::YES_NO_OPTIONS;
use crate::create_market::CreateYesNoMarketParams;
use crate::ethereum::address_string;
use crate::market::{MarketData, MarketType};
use crate::reporting::{ReportAction, ReportingOptions};
use crate::types::{ForkValues, HotLoadingMarketData, LastCompletedCrowdSourcer, MarketOutcomeOption, OutcomeStake};

/// Reporting states in which a report or contribution can land.
const DESIGNATED_REPORTING: u8 = 1;
const OPEN_REPORTING: u8 = 2;
const CROWDSOURCING_DISPUTE: u8 = 3;

pub trait AugurContracts {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Accounts the connected node can sign for.
    async fn accounts(&self) -> Result<Vec<Address>, Self::Error>;

    async fn fetch_hot_loading_market_data(&self, market: Address) -> Result<HotLoadingMarketData, Self::Error>;

    async fn get_fork_values(&self, universe: Address) -> Result<ForkValues, Self::Error>;

    async fn get_last_completed_crowdsourcer(
        &self,
        market: Address,
    ) -> Result<Option<LastCompletedCrowdSourcer>, Self::Error>;

    /// Stake standing of each outcome in the current round.
    async fn get_outcome_stakes(
        &self,
        market: Address,
        outcomes: &[MarketOutcomeOption],
    ) -> Result<Vec<OutcomeStake>, Self::Error>;

    async fn get_preemptive_dispute_crowdsourcer_stake(&self, market: Address) -> Result<u128, Self::Error>;

    async fn get_dispute_pacing_on(&self, market: Address) -> Result<bool, Self::Error>;

    async fn create_yes_no_market(
        &self,
        from: Address,
        universe: Address,
        params: &CreateYesNoMarketParams,
    ) -> Result<Hash, Self::Error>;

    async fn approve_erc20_token(
        &self,
        from: Address,
        token: Address,
        spender: Address,
        amount: u128,
    ) -> Result<Hash, Self::Error>;

    async fn contribute(
        &self,
        from: Address,
        market: Address,
        payout_numerators: &[u128],
        amount: u128,
        description: &str,
    ) -> Result<Hash, Self::Error>;

    async fn contribute_to_tentative(
        &self,
        from: Address,
        market: Address,
        payout_numerators: &[u128],
        amount: u128,
        description: &str,
    ) -> Result<Hash, Self::Error>;

    async fn do_initial_report(
        &self,
        from: Address,
        market: Address,
        payout_numerators: &[u128],
        description: &str,
        additional_stake: u128,
    ) -> Result<Hash, Self::Error>;

    async fn redeem_stake(
        &self,
        from: Address,
        reporting_participants: &[Address],
        dispute_windows: &[Address],
    ) -> Result<Hash, Self::Error>;

    async fn is_constant_product_market_deployed(&self, init_code: &[u8]) -> Result<bool, Self::Error>;

    async fn deploy_constant_product_market(&self, from: Address, init_code: &[u8]) -> Result<Hash, Self::Error>;
}

/// Payout vector paying everything to `index`.
fn full_payout(num_outcomes: usize, index: usize, num_ticks: u128) -> Vec<u128> {
    let mut numerators = vec![0; num_outcomes];
    numerators[index] = num_ticks;
    numerators
}

/// The outcomes a reporter can pick for a market. Scalar markets are offered
/// their two extremes only.
pub fn outcome_options(market: &HotLoadingMarketData) -> Vec<MarketOutcomeOption> {
    let labels: Vec<String> = match MarketType::from_index(market.market_type) {
        Ok(MarketType::YesNo) | Err(_) => YES_NO_OPTIONS.iter().map(|s| s.to_string()).collect(),
        Ok(MarketType::Categorical) => std::iter::once("Invalid".to_string())
            .chain(market.outcomes.iter().filter(|o| !o.is_empty()).cloned())
            .collect(),
        Ok(MarketType::Scalar) => vec!["Invalid".into(), "Lowest".into(), "Highest".into()],
    };
    let count = labels.len();
    labels
        .into_iter()
        .enumerate()
        .map(|(index, outcome_name)| MarketOutcomeOption {
            outcome_name,
            payout_numerators: full_payout(count, index, market.num_ticks),
        })
        .collect()
}

pub async fn fetch_market<C: AugurContracts>(client: &C, market: Address) -> Result<MarketData, C::Error> {
    let data = client.fetch_hot_loading_market_data(market).await?;
    debug!(market = %address_string(&market), reporting_state = data.reporting_state, "fetched market");
    Ok(MarketData::new(market, data))
}

/// Fetches everything the reporting panel observes and writes it into
/// `options`. Each write triggers recomputation of the stake ceilings.
pub async fn load_reporting_options<C: AugurContracts>(
    client: &C,
    account: Address,
    market: &MarketData,
    options: &ReportingOptions,
) -> Result<(), C::Error> {
    let address = market.market_address;
    let data = &market.hot_loading_market_data;

    let reportable = matches!(data.reporting_state, DESIGNATED_REPORTING | OPEN_REPORTING | CROWDSOURCING_DISPUTE);
    let can_initial_report = data.reporting_state == OPEN_REPORTING
        || (data.reporting_state == DESIGNATED_REPORTING && data.designated_reporter == account);
    options.are_options_disabled.set(!reportable);
    options.can_initial_report.set(can_initial_report);

    options.fork_values.set_deep_value(Some(client.get_fork_values(data.universe).await?));
    options.is_slow_reporting.set(client.get_dispute_pacing_on(address).await?);
    options
        .preemptive_dispute_crowdsourcer_stake
        .set_deep_value(Some(client.get_preemptive_dispute_crowdsourcer_stake(address).await?));
    options
        .last_completed_crowdsourcer
        .set_deep_value(client.get_last_completed_crowdsourcer(address).await?);
    let stakes = client.get_outcome_stakes(address, &outcome_options(data)).await?;
    options.outcome_stakes.set_deep_value(Some(stakes));

    debug!(
        market = %address_string(&address),
        total_stake = options.total_stake(),
        slow = options.is_slow_reporting.get(),
        "reporting options loaded"
    );
    Ok(())
}

pub async fn submit_report<C: AugurContracts>(
    client: &C,
    from: Address,
    market: Address,
    action: &ReportAction,
    description: &str,
) -> Result<Hash, C::Error> {
    let hash = match action {
        ReportAction::InitialReport { payout_numerators, additional_stake } => {
            client.do_initial_report(from, market, payout_numerators, description, *additional_stake).await?
        }
        ReportAction::Contribute { payout_numerators, amount } => {
            client.contribute(from, market, payout_numerators, *amount, description).await?
        }
        ReportAction::ContributeToTentative { payout_numerators, amount } => {
            client.contribute_to_tentative(from, market, payout_numerators, *amount, description).await?
        }
    };
    debug!(market = %address_string(&market), amount = action.amount(), tx = ?hash, "report submitted");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ATTO;
    use crate::market::tests::sample_market;
    use crate::types::OutcomeStatus;
    use std::cell::RefCell;

    #[derive(Debug, thiserror::Error)]
    #[error("fake client failure")]
    struct FakeError;

    #[derive(Default)]
    struct FakeClient {
        market: Option<HotLoadingMarketData>,
        pacing_on: bool,
        submitted: RefCell<Vec<String>>,
    }

    impl AugurContracts for FakeClient {
        type Error = FakeError;

        async fn accounts(&self) -> Result<Vec<Address>, FakeError> {
            Ok(vec![Address::repeat_byte(0x03)])
        }

        async fn fetch_hot_loading_market_data(&self, _market: Address) -> Result<HotLoadingMarketData, FakeError> {
            self.market.clone().ok_or(FakeError)
        }

        async fn get_fork_values(&self, _universe: Address) -> Result<ForkValues, FakeError> {
            Ok(ForkValues {
                fork_reputation_goal: 0,
                dispute_threshold_for_fork: 0,
                dispute_threshold_for_dispute_pacing: 1_000 * ATTO,
                initial_report_min_value: 0,
            })
        }

        async fn get_last_completed_crowdsourcer(
            &self,
            _market: Address,
        ) -> Result<Option<LastCompletedCrowdSourcer>, FakeError> {
            Ok(None)
        }

        async fn get_outcome_stakes(
            &self,
            _market: Address,
            outcomes: &[MarketOutcomeOption],
        ) -> Result<Vec<OutcomeStake>, FakeError> {
            let stakes = [0, 30 * ATTO, 70 * ATTO];
            Ok(outcomes
                .iter()
                .zip(stakes)
                .map(|(option, rep_stake)| OutcomeStake {
                    outcome_name: option.outcome_name.clone(),
                    rep_stake,
                    status: if option.outcome_name == "Yes" { OutcomeStatus::Winning } else { OutcomeStatus::Losing },
                    payout_numerators: option.payout_numerators.clone(),
                    already_contributed_to_outcome: None,
                })
                .collect())
        }

        async fn get_preemptive_dispute_crowdsourcer_stake(&self, _market: Address) -> Result<u128, FakeError> {
            Ok(0)
        }

        async fn get_dispute_pacing_on(&self, _market: Address) -> Result<bool, FakeError> {
            Ok(self.pacing_on)
        }

        async fn create_yes_no_market(
            &self,
            _from: Address,
            _universe: Address,
            _params: &CreateYesNoMarketParams,
        ) -> Result<Hash, FakeError> {
            self.submitted.borrow_mut().push("createYesNoMarket".into());
            Ok(Hash::zero())
        }

        async fn approve_erc20_token(
            &self,
            _from: Address,
            _token: Address,
            _spender: Address,
            _amount: u128,
        ) -> Result<Hash, FakeError> {
            self.submitted.borrow_mut().push("approve".into());
            Ok(Hash::zero())
        }

        async fn contribute(
            &self,
            _from: Address,
            _market: Address,
            payout_numerators: &[u128],
            amount: u128,
            _description: &str,
        ) -> Result<Hash, FakeError> {
            self.submitted.borrow_mut().push(format!("contribute {payout_numerators:?} {amount}"));
            Ok(Hash::repeat_byte(1))
        }

        async fn contribute_to_tentative(
            &self,
            _from: Address,
            _market: Address,
            _payout_numerators: &[u128],
            amount: u128,
            _description: &str,
        ) -> Result<Hash, FakeError> {
            self.submitted.borrow_mut().push(format!("contributeToTentative {amount}"));
            Ok(Hash::repeat_byte(2))
        }

        async fn do_initial_report(
            &self,
            _from: Address,
            _market: Address,
            _payout_numerators: &[u128],
            _description: &str,
            additional_stake: u128,
        ) -> Result<Hash, FakeError> {
            self.submitted.borrow_mut().push(format!("doInitialReport {additional_stake}"));
            Ok(Hash::repeat_byte(3))
        }

        async fn redeem_stake(
            &self,
            _from: Address,
            _reporting_participants: &[Address],
            _dispute_windows: &[Address],
        ) -> Result<Hash, FakeError> {
            Ok(Hash::zero())
        }

        async fn is_constant_product_market_deployed(&self, _init_code: &[u8]) -> Result<bool, FakeError> {
            Ok(false)
        }

        async fn deploy_constant_product_market(&self, _from: Address, _init_code: &[u8]) -> Result<Hash, FakeError> {
            Ok(Hash::zero())
        }
    }

    #[test]
    fn yes_no_options_pay_out_fully() {
        let options = outcome_options(&sample_market());
        let names: Vec<_> = options.iter().map(|o| o.outcome_name.as_str()).collect();
        assert_eq!(names, ["Invalid", "No", "Yes"]);
        assert_eq!(options[2].payout_numerators, vec![0, 0, 1000]);
    }

    #[test]
    fn categorical_options_follow_market_outcomes() {
        let market = HotLoadingMarketData {
            market_type: 1,
            num_ticks: 300,
            outcomes: vec!["Red".into(), "Blue".into()],
            ..sample_market()
        };
        let options = outcome_options(&market);
        assert_eq!(options.len(), 3);
        assert_eq!(options[1].outcome_name, "Red");
        assert_eq!(options[1].payout_numerators, vec![0, 300, 0]);
    }

    #[tokio::test]
    async fn fetch_market_parses_extra_info() {
        let client = FakeClient { market: Some(sample_market()), ..Default::default() };
        let data = fetch_market(&client, Address::repeat_byte(0xaa)).await.unwrap();
        assert_eq!(data.parsed_extra_info.unwrap().description, "Rain in Lisbon?");

        let missing = FakeClient::default();
        assert!(fetch_market(&missing, Address::zero()).await.is_err());
    }

    #[tokio::test]
    async fn loaded_options_drive_a_dispute() {
        let client = FakeClient { market: Some(sample_market()), ..Default::default() };
        let market = fetch_market(&client, Address::repeat_byte(0xaa)).await.unwrap();
        let options = ReportingOptions::new();
        load_reporting_options(&client, Address::repeat_byte(0x09), &market, &options).await.unwrap();

        assert_eq!(options.total_stake(), 100 * ATTO);
        assert!(!options.are_options_disabled.get());
        assert!(!options.can_initial_report.get());

        options.select("No").unwrap();
        let action = options.plan_report(None).unwrap();
        let hash = submit_report(&client, Address::repeat_byte(0x09), market.market_address, &action, "")
            .await
            .unwrap();
        assert_eq!(hash, Hash::repeat_byte(1));
        assert_eq!(client.submitted.borrow().as_slice(), [format!("contribute {:?} {}", vec![0u128, 1000, 0], 40 * ATTO)]);
    }

    #[tokio::test]
    async fn designated_reporter_may_report_first() {
        let market = HotLoadingMarketData { reporting_state: DESIGNATED_REPORTING, ..sample_market() };
        let client = FakeClient { market: Some(market), pacing_on: true, ..Default::default() };
        let data = fetch_market(&client, Address::repeat_byte(0xaa)).await.unwrap();
        let options = ReportingOptions::new();
        let designated = data.hot_loading_market_data.designated_reporter;
        load_reporting_options(&client, designated, &data, &options).await.unwrap();
        assert!(options.can_initial_report.get());
        assert!(options.is_slow_reporting.get());
    }
}
