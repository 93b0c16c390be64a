use augur_core::constants::{address, DETERMINISTIC_DEPLOYMENT_PROXY};
use augur_core::create_market::CreateYesNoMarketParams;
use augur_core::deployment::{create2_address, proxy_deployment_calldata, DEPLOYMENT_SALT};
use augur_core::ethereum::{address_string, u128_to_u256};
use augur_core::types::{Contribution, ForkValues, HotLoadingMarketData, LastCompletedCrowdSourcer};
use augur_core::{Address, AugurAbi, AugurContracts, Hash, Interface, MarketOutcomeOption, OutcomeStake, OutcomeStatus};
use ethabi::Token;
use serde_json::json;
use tracing::{debug, info};

use crate::rpc::{bytes_to_hex, hex_to_bytes, RpcError, Transport};

/// Where the contracts live on the connected chain.
#[derive(Debug, Clone)]
pub struct ContractAddresses {
    pub augur: Address,
    pub hot_loading: Option<Address>,
    pub fill_order: Option<Address>,
    pub orders: Option<Address>,
    pub redeem_stake: Address,
}

fn required(address: Option<Address>, name: &'static str) -> Result<Address, RpcError> {
    address.ok_or(RpcError::MissingAddress(name))
}

/// [`AugurContracts`] over Ethereum JSON-RPC.
pub struct RpcContracts<T> {
    transport: T,
    abi: AugurAbi,
    addresses: ContractAddresses,
}

impl<T: Transport> RpcContracts<T> {
    pub fn new(transport: T, addresses: ContractAddresses) -> Result<Self, RpcError> {
        Ok(Self { transport, abi: AugurAbi::load()?, addresses })
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let params = json!([{ "to": address_string(&to), "data": bytes_to_hex(&data) }, "latest"]);
        hex_to_bytes(&self.transport.request("eth_call", params).await?)
    }

    async fn send(&self, from: Address, to: Address, data: Vec<u8>) -> Result<Hash, RpcError> {
        let params = json!([{ "from": address_string(&from), "to": address_string(&to), "data": bytes_to_hex(&data) }]);
        let hash = hex_to_bytes(&self.transport.request("eth_sendTransaction", params).await?)?;
        if hash.len() != 32 {
            return Err(RpcError::Malformed(format!("transaction hash of {} bytes", hash.len())));
        }
        let hash = Hash::from_slice(&hash);
        info!(from = %address_string(&from), to = %address_string(&to), tx = ?hash, "transaction sent");
        Ok(hash)
    }

    async fn read(
        &self,
        to: Address,
        interface: Interface,
        function: &'static str,
        args: &[Token],
    ) -> Result<Vec<u8>, RpcError> {
        let data = self.abi.encode(interface, function, args)?;
        self.call(to, data).await
    }

    async fn read_u128(
        &self,
        to: Address,
        interface: Interface,
        function: &'static str,
        args: &[Token],
    ) -> Result<u128, RpcError> {
        let output = self.read(to, interface, function, args).await?;
        Ok(self.abi.decode_u128(interface, function, &output)?)
    }

    async fn read_address(
        &self,
        to: Address,
        interface: Interface,
        function: &'static str,
        args: &[Token],
    ) -> Result<Address, RpcError> {
        let output = self.read(to, interface, function, args).await?;
        Ok(self.abi.decode_address(interface, function, &output)?)
    }

    async fn payout_distribution_hash(&self, market: Address, payout_numerators: &[u128]) -> Result<[u8; 32], RpcError> {
        const F: &str = "derivePayoutDistributionHash";
        let output = self.call(market, self.abi.derive_payout_distribution_hash(payout_numerators)?).await?;
        Ok(self.abi.decode_bytes32(Interface::Market, F, &output)?)
    }

    async fn participant_stake_and_size(&self, participant: Address) -> Result<(u128, u128), RpcError> {
        let stake = self.read_u128(participant, Interface::ReportingParticipant, "getStake", &[]).await?;
        let size = self.read_u128(participant, Interface::ReportingParticipant, "getSize", &[]).await?;
        Ok((stake, size))
    }
}

impl<T: Transport> AugurContracts for RpcContracts<T> {
    type Error = RpcError;

    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        let value = self.transport.request("eth_accounts", json!([])).await?;
        let list = value.as_array().ok_or_else(|| RpcError::Malformed(format!("accounts: {value}")))?;
        list.iter()
            .map(|entry| {
                let bytes = hex_to_bytes(entry)?;
                if bytes.len() != 20 {
                    return Err(RpcError::Malformed(format!("account {entry}")));
                }
                Ok(Address::from_slice(&bytes))
            })
            .collect()
    }

    async fn fetch_hot_loading_market_data(&self, market: Address) -> Result<HotLoadingMarketData, RpcError> {
        let hot_loading = required(self.addresses.hot_loading, "hot loading")?;
        let fill_order = required(self.addresses.fill_order, "fill order")?;
        let orders = required(self.addresses.orders, "orders")?;
        let data = self.abi.get_market_data(self.addresses.augur, market, fill_order, orders)?;
        let output = self.call(hot_loading, data).await?;
        Ok(self.abi.decode_market_data(&output)?)
    }

    async fn get_fork_values(&self, universe: Address) -> Result<ForkValues, RpcError> {
        let read = |function| self.read_u128(universe, Interface::Universe, function, &[]);
        Ok(ForkValues {
            fork_reputation_goal: read("getForkReputationGoal").await?,
            dispute_threshold_for_fork: read("getDisputeThresholdForFork").await?,
            dispute_threshold_for_dispute_pacing: read("getDisputeThresholdForDisputePacing").await?,
            initial_report_min_value: read("getInitialReportMinValue").await?,
        })
    }

    async fn get_last_completed_crowdsourcer(
        &self,
        market: Address,
    ) -> Result<Option<LastCompletedCrowdSourcer>, RpcError> {
        let count = self.read_u128(market, Interface::Market, "getNumParticipants", &[]).await?;
        if count == 0 {
            return Ok(None);
        }
        let index = Token::Uint(u128_to_u256(count - 1));
        let participant = self.read_address(market, Interface::Market, "getReportingParticipant", &[index]).await?;
        let (stake, size) = self.participant_stake_and_size(participant).await?;
        const F: &str = "getPayoutNumerators";
        let output = self.read(participant, Interface::ReportingParticipant, F, &[]).await?;
        let payout_numerators = self.abi.decode_u128_array(Interface::ReportingParticipant, F, &output)?;
        Ok(Some(LastCompletedCrowdSourcer { participant_address: participant, payout_numerators, stake, size }))
    }

    async fn get_outcome_stakes(
        &self,
        market: Address,
        outcomes: &[MarketOutcomeOption],
    ) -> Result<Vec<OutcomeStake>, RpcError> {
        let winner = self.read_address(market, Interface::Market, "getWinningReportingParticipant", &[]).await?;
        let winning_hash = if winner.is_zero() {
            None
        } else {
            const F: &str = "getPayoutDistributionHash";
            let output = self.read(winner, Interface::ReportingParticipant, F, &[]).await?;
            Some(self.abi.decode_bytes32(Interface::ReportingParticipant, F, &output)?)
        };

        let mut stakes = Vec::with_capacity(outcomes.len());
        for option in outcomes {
            let hash = self.payout_distribution_hash(market, &option.payout_numerators).await?;
            let key = [Token::FixedBytes(hash.to_vec())];
            let rep_stake = self.read_u128(market, Interface::Market, "getStakeInOutcome", &key).await?;
            let crowdsourcer = self.read_address(market, Interface::Market, "getCrowdsourcer", &key).await?;
            let already_contributed_to_outcome = if crowdsourcer.is_zero() {
                None
            } else {
                let (stake, size) = self.participant_stake_and_size(crowdsourcer).await?;
                Some(Contribution {
                    participant_address: crowdsourcer,
                    payout_numerators: option.payout_numerators.clone(),
                    stake,
                    size,
                })
            };
            let status = if winning_hash == Some(hash) { OutcomeStatus::Winning } else { OutcomeStatus::Losing };
            debug!(outcome = %option.outcome_name, rep_stake, %status, "outcome stake");
            stakes.push(OutcomeStake {
                outcome_name: option.outcome_name.clone(),
                rep_stake,
                status,
                payout_numerators: option.payout_numerators.clone(),
                already_contributed_to_outcome,
            });
        }
        Ok(stakes)
    }

    async fn get_preemptive_dispute_crowdsourcer_stake(&self, market: Address) -> Result<u128, RpcError> {
        let crowdsourcer = self.read_address(market, Interface::Market, "preemptiveDisputeCrowdsourcer", &[]).await?;
        if crowdsourcer.is_zero() {
            return Ok(0);
        }
        self.read_u128(crowdsourcer, Interface::ReportingParticipant, "getStake", &[]).await
    }

    async fn get_dispute_pacing_on(&self, market: Address) -> Result<bool, RpcError> {
        const F: &str = "getDisputePacingOn";
        let output = self.read(market, Interface::Market, F, &[]).await?;
        Ok(self.abi.decode_bool(Interface::Market, F, &output)?)
    }

    async fn create_yes_no_market(
        &self,
        from: Address,
        universe: Address,
        params: &CreateYesNoMarketParams,
    ) -> Result<Hash, RpcError> {
        self.send(from, universe, self.abi.create_yes_no_market(params)?).await
    }

    async fn approve_erc20_token(
        &self,
        from: Address,
        token: Address,
        spender: Address,
        amount: u128,
    ) -> Result<Hash, RpcError> {
        self.send(from, token, self.abi.approve(spender, amount)?).await
    }

    async fn contribute(
        &self,
        from: Address,
        market: Address,
        payout_numerators: &[u128],
        amount: u128,
        description: &str,
    ) -> Result<Hash, RpcError> {
        self.send(from, market, self.abi.contribute(payout_numerators, amount, description)?).await
    }

    async fn contribute_to_tentative(
        &self,
        from: Address,
        market: Address,
        payout_numerators: &[u128],
        amount: u128,
        description: &str,
    ) -> Result<Hash, RpcError> {
        self.send(from, market, self.abi.contribute_to_tentative(payout_numerators, amount, description)?).await
    }

    async fn do_initial_report(
        &self,
        from: Address,
        market: Address,
        payout_numerators: &[u128],
        description: &str,
        additional_stake: u128,
    ) -> Result<Hash, RpcError> {
        self.send(from, market, self.abi.do_initial_report(payout_numerators, description, additional_stake)?).await
    }

    async fn redeem_stake(
        &self,
        from: Address,
        reporting_participants: &[Address],
        dispute_windows: &[Address],
    ) -> Result<Hash, RpcError> {
        let data = self.abi.redeem_stake(reporting_participants, dispute_windows)?;
        self.send(from, self.addresses.redeem_stake, data).await
    }

    async fn is_constant_product_market_deployed(&self, init_code: &[u8]) -> Result<bool, RpcError> {
        let target = create2_address(address(DETERMINISTIC_DEPLOYMENT_PROXY)?, DEPLOYMENT_SALT, init_code);
        let code = self.transport.request("eth_getCode", json!([address_string(&target), "latest"])).await?;
        Ok(!hex_to_bytes(&code)?.is_empty())
    }

    async fn deploy_constant_product_market(&self, from: Address, init_code: &[u8]) -> Result<Hash, RpcError> {
        let data = proxy_deployment_calldata(DEPLOYMENT_SALT, init_code);
        self.send(from, address(DETERMINISTIC_DEPLOYMENT_PROXY)?, data).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rpc::mock::MockNode;
    use augur_core::abi::encode_market_data;
    use augur_core::client::outcome_options;
    use augur_core::constants::ATTO;
    use ethabi::encode;

    pub(crate) const MARKET: Address = Address::repeat_byte(0xaa);
    pub(crate) const UNIVERSE: Address = Address::repeat_byte(0x04);
    const HOT_LOADING: Address = Address::repeat_byte(0x50);
    const WINNER: Address = Address::repeat_byte(0x60);
    const NO_CROWDSOURCER: Address = Address::repeat_byte(0x61);

    pub(crate) fn addresses() -> ContractAddresses {
        ContractAddresses {
            augur: Address::repeat_byte(0x10),
            hot_loading: Some(HOT_LOADING),
            fill_order: Some(Address::repeat_byte(0x11)),
            orders: Some(Address::repeat_byte(0x12)),
            redeem_stake: UNIVERSE,
        }
    }

    pub(crate) fn market() -> HotLoadingMarketData {
        HotLoadingMarketData {
            extra_info: r#"{"description":"Will it rain?"}"#.into(),
            market_creator: Address::repeat_byte(0x01),
            owner: Address::repeat_byte(0x01),
            outcomes: vec![],
            market_type: 0,
            display_prices: vec![0, ATTO as i128],
            designated_reporter: Address::repeat_byte(0x03),
            reporting_state: 3,
            dispute_round: 1,
            winning_payout: vec![0, 0, 1000],
            volume: 0,
            open_interest: 0,
            last_traded_prices: vec![],
            universe: UNIVERSE,
            num_ticks: 1000,
            fee_divisor: 100,
            affiliate_fee_divisor: 0,
            end_time: 1_704_067_200,
            num_outcomes: 3,
            validity_bond: 0,
            reporting_fee_divisor: 10_000,
            outcome_volumes: vec![0, 0, 0],
        }
    }

    fn uint(value: u128) -> Token {
        Token::Uint(u128_to_u256(value))
    }

    fn hash_of(index: usize) -> [u8; 32] {
        [index as u8 + 1; 32]
    }

    /// A market in its first dispute round: Yes tentatively won with 70 REP,
    /// No has 30 REP in an open crowdsourcer of size 40.
    pub(crate) fn disputed_market_node() -> MockNode {
        market_node(market(), [0, 30 * ATTO, 70 * ATTO])
    }

    /// Answers every read the reporting panel makes for `data`, with
    /// `stakes` in outcome order.
    pub(crate) fn market_node(data: HotLoadingMarketData, stakes: [u128; 3]) -> MockNode {
        let abi = AugurAbi::load().unwrap();
        let mut node = MockNode { accounts: vec![Address::repeat_byte(0x09)], ..Default::default() };
        let addrs = addresses();
        let read = |interface, function, args: &[Token]| abi.encode(interface, function, args).unwrap();

        node.answer(
            HOT_LOADING,
            abi.get_market_data(addrs.augur, MARKET, addrs.fill_order.unwrap(), addrs.orders.unwrap()).unwrap(),
            encode_market_data(&data),
        );
        for (function, value) in [
            ("getForkReputationGoal", 0),
            ("getDisputeThresholdForFork", 0),
            ("getDisputeThresholdForDisputePacing", 1_000 * ATTO),
            ("getInitialReportMinValue", 0),
        ] {
            node.answer(UNIVERSE, read(Interface::Universe, function, &[]), encode(&[uint(value)]));
        }
        node.answer(MARKET, read(Interface::Market, "getDisputePacingOn", &[]), encode(&[Token::Bool(false)]));
        node.answer(
            MARKET,
            read(Interface::Market, "preemptiveDisputeCrowdsourcer", &[]),
            encode(&[Token::Address(Address::zero())]),
        );
        node.answer(MARKET, read(Interface::Market, "getNumParticipants", &[]), encode(&[uint(0)]));
        node.answer(
            MARKET,
            read(Interface::Market, "getWinningReportingParticipant", &[]),
            encode(&[Token::Address(WINNER)]),
        );
        node.answer(
            WINNER,
            read(Interface::ReportingParticipant, "getPayoutDistributionHash", &[]),
            encode(&[Token::FixedBytes(hash_of(2).to_vec())]),
        );

        for (index, option) in outcome_options(&data).iter().enumerate() {
            let hash = hash_of(index);
            let key = [Token::FixedBytes(hash.to_vec())];
            node.answer(
                MARKET,
                abi.derive_payout_distribution_hash(&option.payout_numerators).unwrap(),
                encode(&[Token::FixedBytes(hash.to_vec())]),
            );
            node.answer(MARKET, read(Interface::Market, "getStakeInOutcome", &key), encode(&[uint(stakes[index])]));
            let crowdsourcer = if index == 1 { NO_CROWDSOURCER } else { Address::zero() };
            node.answer(MARKET, read(Interface::Market, "getCrowdsourcer", &key), encode(&[Token::Address(crowdsourcer)]));
        }
        node.answer(NO_CROWDSOURCER, read(Interface::ReportingParticipant, "getStake", &[]), encode(&[uint(10 * ATTO)]));
        node.answer(NO_CROWDSOURCER, read(Interface::ReportingParticipant, "getSize", &[]), encode(&[uint(40 * ATTO)]));
        node
    }

    #[tokio::test]
    async fn accounts_are_parsed() {
        let contracts = RpcContracts::new(disputed_market_node(), addresses()).unwrap();
        assert_eq!(contracts.accounts().await.unwrap(), vec![Address::repeat_byte(0x09)]);
    }

    #[tokio::test]
    async fn market_data_comes_from_hot_loading() {
        let contracts = RpcContracts::new(disputed_market_node(), addresses()).unwrap();
        assert_eq!(contracts.fetch_hot_loading_market_data(MARKET).await.unwrap(), market());

        let unconfigured = ContractAddresses { hot_loading: None, ..addresses() };
        let contracts = RpcContracts::new(disputed_market_node(), unconfigured).unwrap();
        assert!(matches!(
            contracts.fetch_hot_loading_market_data(MARKET).await,
            Err(RpcError::MissingAddress("hot loading"))
        ));
    }

    #[tokio::test]
    async fn outcome_stakes_mark_the_tentative_winner() {
        let contracts = RpcContracts::new(disputed_market_node(), addresses()).unwrap();
        let stakes = contracts.get_outcome_stakes(MARKET, &outcome_options(&market())).await.unwrap();
        let statuses: Vec<_> = stakes.iter().map(|s| s.status).collect();
        assert_eq!(statuses, [OutcomeStatus::Losing, OutcomeStatus::Losing, OutcomeStatus::Winning]);
        assert_eq!(stakes[1].rep_stake, 30 * ATTO);
        let contribution = stakes[1].already_contributed_to_outcome.as_ref().unwrap();
        assert_eq!((contribution.stake, contribution.size), (10 * ATTO, 40 * ATTO));
        assert!(stakes[0].already_contributed_to_outcome.is_none());
    }

    #[tokio::test]
    async fn reads_without_participants() {
        let contracts = RpcContracts::new(disputed_market_node(), addresses()).unwrap();
        assert_eq!(contracts.get_last_completed_crowdsourcer(MARKET).await.unwrap(), None);
        assert_eq!(contracts.get_preemptive_dispute_crowdsourcer_stake(MARKET).await.unwrap(), 0);
        assert!(!contracts.get_dispute_pacing_on(MARKET).await.unwrap());
        let fork = contracts.get_fork_values(UNIVERSE).await.unwrap();
        assert_eq!(fork.dispute_threshold_for_dispute_pacing, 1_000 * ATTO);
    }

    #[tokio::test]
    async fn unknown_calls_revert() {
        let contracts = RpcContracts::new(MockNode::default(), addresses()).unwrap();
        assert!(matches!(contracts.get_dispute_pacing_on(MARKET).await, Err(RpcError::Node { .. })));
    }

    #[tokio::test]
    async fn deployment_targets_the_proxy() {
        let init_code = [0x60, 0x80];
        let proxy = address(DETERMINISTIC_DEPLOYMENT_PROXY).unwrap();
        let target = create2_address(proxy, DEPLOYMENT_SALT, &init_code);

        let mut node = MockNode::default();
        node.code.insert(target, vec![0x60]);
        let contracts = RpcContracts::new(node, addresses()).unwrap();
        assert!(contracts.is_constant_product_market_deployed(&init_code).await.unwrap());

        let contracts = RpcContracts::new(MockNode::default(), addresses()).unwrap();
        assert!(!contracts.is_constant_product_market_deployed(&init_code).await.unwrap());
        let from = Address::repeat_byte(0x09);
        contracts.deploy_constant_product_market(from, &init_code).await.unwrap();
        let sent = contracts.transport.sent.borrow();
        assert_eq!(sent[0].0, from);
        assert_eq!(sent[0].1, proxy);
        assert_eq!(sent[0].2, proxy_deployment_calldata(DEPLOYMENT_SALT, &init_code));
    }

    #[tokio::test]
    async fn redeem_goes_to_the_configured_target() {
        let contracts = RpcContracts::new(MockNode::default(), addresses()).unwrap();
        let hash = contracts
            .redeem_stake(Address::repeat_byte(0x09), &[Address::repeat_byte(0x70)], &[])
            .await
            .unwrap();
        assert_eq!(hash, Hash::repeat_byte(1));
        assert_eq!(contracts.transport.sent.borrow()[0].1, UNIVERSE);
    }
}
