use ethabi::{Address, Contract, Token};

use crate::create_market::CreateYesNoMarketParams;
use crate::error::AbiError;
use crate::ethereum::{i256_to_i128, u128_to_u256, u256_to_u128};
use crate::types::HotLoadingMarketData;

pub const REDEEM_STAKE_ABI: &str = r#"[
    {
        "constant": false,
        "inputs": [
            { "internalType": "contract IReportingParticipant[]", "name": "_reportingParticipants", "type": "address[]" },
            { "internalType": "contract IDisputeWindow[]", "name": "_disputeWindows", "type": "address[]" }
        ],
        "name": "redeemStake",
        "outputs": [ { "internalType": "bool", "name": "", "type": "bool" } ],
        "payable": false,
        "stateMutability": "nonpayable",
        "type": "function"
    }
]"#;

pub const UNIVERSE_ABI: &str = r#"[
    {
        "inputs": [
            { "name": "_endTime", "type": "uint256" },
            { "name": "_feePerCashInAttoCash", "type": "uint256" },
            { "internalType": "contract IAffiliateValidator", "name": "_affiliateValidator", "type": "address" },
            { "name": "_affiliateFeeDivisor", "type": "uint256" },
            { "name": "_designatedReporterAddress", "type": "address" },
            { "name": "_extraInfo", "type": "string" }
        ],
        "name": "createYesNoMarket",
        "outputs": [ { "internalType": "contract IMarket", "name": "", "type": "address" } ],
        "stateMutability": "nonpayable",
        "type": "function"
    },
    { "inputs": [], "name": "getForkReputationGoal", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getDisputeThresholdForFork", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getDisputeThresholdForDisputePacing", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getInitialReportMinValue", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" }
]"#;

pub const ERC20_ABI: &str = r#"[
    {
        "inputs": [ { "name": "spender", "type": "address" }, { "name": "amount", "type": "uint256" } ],
        "name": "approve",
        "outputs": [ { "name": "", "type": "bool" } ],
        "stateMutability": "nonpayable",
        "type": "function"
    }
]"#;

pub const MARKET_ABI: &str = r#"[
    { "inputs": [], "name": "getNumParticipants", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [ { "name": "_index", "type": "uint256" } ], "name": "getReportingParticipant", "outputs": [ { "name": "", "type": "address" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getWinningReportingParticipant", "outputs": [ { "name": "", "type": "address" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getNumTicks", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getDisputePacingOn", "outputs": [ { "name": "", "type": "bool" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "preemptiveDisputeCrowdsourcer", "outputs": [ { "name": "", "type": "address" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [ { "name": "_payoutNumerators", "type": "uint256[]" } ], "name": "derivePayoutDistributionHash", "outputs": [ { "name": "", "type": "bytes32" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [ { "name": "_payoutDistributionHash", "type": "bytes32" } ], "name": "getStakeInOutcome", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [ { "name": "_payoutDistributionHash", "type": "bytes32" } ], "name": "getCrowdsourcer", "outputs": [ { "name": "", "type": "address" } ], "stateMutability": "view", "type": "function" },
    {
        "inputs": [ { "name": "_payoutNumerators", "type": "uint256[]" }, { "name": "_amount", "type": "uint256" }, { "name": "_description", "type": "string" } ],
        "name": "contribute",
        "outputs": [ { "name": "", "type": "bool" } ],
        "stateMutability": "nonpayable",
        "type": "function"
    },
    {
        "inputs": [ { "name": "_payoutNumerators", "type": "uint256[]" }, { "name": "_amount", "type": "uint256" }, { "name": "_description", "type": "string" } ],
        "name": "contributeToTentative",
        "outputs": [ { "name": "", "type": "bool" } ],
        "stateMutability": "nonpayable",
        "type": "function"
    },
    {
        "inputs": [ { "name": "_payoutNumerators", "type": "uint256[]" }, { "name": "_description", "type": "string" }, { "name": "_additionalStake", "type": "uint256" } ],
        "name": "doInitialReport",
        "outputs": [ { "name": "", "type": "bool" } ],
        "stateMutability": "nonpayable",
        "type": "function"
    }
]"#;

pub const REPORTING_PARTICIPANT_ABI: &str = r#"[
    { "inputs": [], "name": "getStake", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getSize", "outputs": [ { "name": "", "type": "uint256" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getPayoutNumerators", "outputs": [ { "name": "", "type": "uint256[]" } ], "stateMutability": "view", "type": "function" },
    { "inputs": [], "name": "getPayoutDistributionHash", "outputs": [ { "name": "", "type": "bytes32" } ], "stateMutability": "view", "type": "function" }
]"#;

pub const HOT_LOADING_ABI: &str = r#"[
    {
        "inputs": [
            { "name": "_augur", "type": "address" },
            { "name": "_market", "type": "address" },
            { "name": "_fillOrder", "type": "address" },
            { "name": "_orders", "type": "address" }
        ],
        "name": "getMarketData",
        "outputs": [
            {
                "name": "_marketData",
                "type": "tuple",
                "components": [
                    { "name": "extraInfo", "type": "string" },
                    { "name": "marketCreator", "type": "address" },
                    { "name": "owner", "type": "address" },
                    { "name": "outcomes", "type": "bytes32[]" },
                    { "name": "marketType", "type": "uint8" },
                    { "name": "displayPrices", "type": "int256[]" },
                    { "name": "designatedReporter", "type": "address" },
                    { "name": "reportingState", "type": "uint8" },
                    { "name": "disputeRound", "type": "uint256" },
                    { "name": "winningPayout", "type": "uint256[]" },
                    { "name": "volume", "type": "uint256" },
                    { "name": "openInterest", "type": "uint256" },
                    { "name": "lastTradedPrices", "type": "uint256[]" },
                    { "name": "universe", "type": "address" },
                    { "name": "numTicks", "type": "uint256" },
                    { "name": "feeDivisor", "type": "uint256" },
                    { "name": "affiliateFeeDivisor", "type": "uint256" },
                    { "name": "endTime", "type": "uint256" },
                    { "name": "numOutcomes", "type": "uint256" },
                    { "name": "validityBond", "type": "uint256" },
                    { "name": "reportingFeeDivisor", "type": "uint256" },
                    { "name": "outcomeVolumes", "type": "uint256[]" }
                ]
            }
        ],
        "stateMutability": "view",
        "type": "function"
    }
]"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    Universe,
    Erc20,
    Market,
    ReportingParticipant,
    HotLoading,
    RedeemStake,
}

/// All interfaces, parsed once.
#[derive(Debug, Clone)]
pub struct AugurAbi {
    universe: Contract,
    erc20: Contract,
    market: Contract,
    reporting_participant: Contract,
    hot_loading: Contract,
    redeem_stake: Contract,
}

fn uint(value: u128) -> Token {
    Token::Uint(u128_to_u256(value))
}

fn uint_array(values: &[u128]) -> Token {
    Token::Array(values.iter().copied().map(uint).collect())
}

fn unexpected(function: &'static str, reason: impl Into<String>) -> AbiError {
    AbiError::UnexpectedOutput { function, reason: reason.into() }
}

fn token_u128(function: &'static str, token: Token) -> Result<u128, AbiError> {
    let value = token.into_uint().ok_or_else(|| unexpected(function, "expected uint"))?;
    Ok(u256_to_u128(value)?)
}

fn token_address(function: &'static str, token: Token) -> Result<Address, AbiError> {
    token.into_address().ok_or_else(|| unexpected(function, "expected address"))
}

fn token_u128_array(function: &'static str, token: Token) -> Result<Vec<u128>, AbiError> {
    token
        .into_array()
        .ok_or_else(|| unexpected(function, "expected array"))?
        .into_iter()
        .map(|t| token_u128(function, t))
        .collect()
}

fn token_u8(function: &'static str, token: Token) -> Result<u8, AbiError> {
    let value = token_u128(function, token)?;
    u8::try_from(value).map_err(|_| unexpected(function, format!("{value} does not fit uint8")))
}

/// Outcome labels are right-padded `bytes32`.
fn bytes32_label(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl AugurAbi {
    pub fn load() -> Result<Self, AbiError> {
        Ok(Self {
            universe: Contract::load(UNIVERSE_ABI.as_bytes())?,
            erc20: Contract::load(ERC20_ABI.as_bytes())?,
            market: Contract::load(MARKET_ABI.as_bytes())?,
            reporting_participant: Contract::load(REPORTING_PARTICIPANT_ABI.as_bytes())?,
            hot_loading: Contract::load(HOT_LOADING_ABI.as_bytes())?,
            redeem_stake: Contract::load(REDEEM_STAKE_ABI.as_bytes())?,
        })
    }

    fn contract(&self, interface: Interface) -> &Contract {
        match interface {
            Interface::Universe => &self.universe,
            Interface::Erc20 => &self.erc20,
            Interface::Market => &self.market,
            Interface::ReportingParticipant => &self.reporting_participant,
            Interface::HotLoading => &self.hot_loading,
            Interface::RedeemStake => &self.redeem_stake,
        }
    }

    pub fn encode(&self, interface: Interface, function: &str, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        Ok(self.contract(interface).function(function)?.encode_input(args)?)
    }

    /// Decodes a function's return data, which must hold exactly one value.
    pub fn decode_single(&self, interface: Interface, function: &'static str, data: &[u8]) -> Result<Token, AbiError> {
        let mut tokens = self.contract(interface).function(function)?.decode_output(data)?;
        if tokens.len() != 1 {
            return Err(unexpected(function, format!("expected one value, got {}", tokens.len())));
        }
        Ok(tokens.remove(0))
    }

    pub fn decode_u128(&self, interface: Interface, function: &'static str, data: &[u8]) -> Result<u128, AbiError> {
        token_u128(function, self.decode_single(interface, function, data)?)
    }

    pub fn decode_address(
        &self,
        interface: Interface,
        function: &'static str,
        data: &[u8],
    ) -> Result<Address, AbiError> {
        token_address(function, self.decode_single(interface, function, data)?)
    }

    pub fn decode_bool(&self, interface: Interface, function: &'static str, data: &[u8]) -> Result<bool, AbiError> {
        self.decode_single(interface, function, data)?
            .into_bool()
            .ok_or_else(|| unexpected(function, "expected bool"))
    }

    pub fn decode_bytes32(
        &self,
        interface: Interface,
        function: &'static str,
        data: &[u8],
    ) -> Result<[u8; 32], AbiError> {
        let bytes = self
            .decode_single(interface, function, data)?
            .into_fixed_bytes()
            .ok_or_else(|| unexpected(function, "expected bytes32"))?;
        bytes.try_into().map_err(|_| unexpected(function, "expected 32 bytes"))
    }

    pub fn decode_u128_array(
        &self,
        interface: Interface,
        function: &'static str,
        data: &[u8],
    ) -> Result<Vec<u128>, AbiError> {
        token_u128_array(function, self.decode_single(interface, function, data)?)
    }

    pub fn create_yes_no_market(&self, params: &CreateYesNoMarketParams) -> Result<Vec<u8>, AbiError> {
        self.encode(
            Interface::Universe,
            "createYesNoMarket",
            &[
                uint(u128::from(params.end_time)),
                uint(params.fee_per_cash_in_atto_cash),
                Token::Address(params.affiliate_validator),
                uint(params.affiliate_fee_divisor),
                Token::Address(params.designated_reporter),
                Token::String(params.extra_info.clone()),
            ],
        )
    }

    pub fn approve(&self, spender: Address, amount: u128) -> Result<Vec<u8>, AbiError> {
        self.encode(Interface::Erc20, "approve", &[Token::Address(spender), uint(amount)])
    }

    pub fn redeem_stake(&self, reporting_participants: &[Address], dispute_windows: &[Address]) -> Result<Vec<u8>, AbiError> {
        let addresses = |list: &[Address]| Token::Array(list.iter().copied().map(Token::Address).collect());
        self.encode(
            Interface::RedeemStake,
            "redeemStake",
            &[addresses(reporting_participants), addresses(dispute_windows)],
        )
    }

    pub fn contribute(&self, payout_numerators: &[u128], amount: u128, description: &str) -> Result<Vec<u8>, AbiError> {
        self.encode(
            Interface::Market,
            "contribute",
            &[uint_array(payout_numerators), uint(amount), Token::String(description.to_string())],
        )
    }

    pub fn contribute_to_tentative(
        &self,
        payout_numerators: &[u128],
        amount: u128,
        description: &str,
    ) -> Result<Vec<u8>, AbiError> {
        self.encode(
            Interface::Market,
            "contributeToTentative",
            &[uint_array(payout_numerators), uint(amount), Token::String(description.to_string())],
        )
    }

    pub fn do_initial_report(
        &self,
        payout_numerators: &[u128],
        description: &str,
        additional_stake: u128,
    ) -> Result<Vec<u8>, AbiError> {
        self.encode(
            Interface::Market,
            "doInitialReport",
            &[uint_array(payout_numerators), Token::String(description.to_string()), uint(additional_stake)],
        )
    }

    pub fn derive_payout_distribution_hash(&self, payout_numerators: &[u128]) -> Result<Vec<u8>, AbiError> {
        self.encode(Interface::Market, "derivePayoutDistributionHash", &[uint_array(payout_numerators)])
    }

    pub fn get_market_data(
        &self,
        augur: Address,
        market: Address,
        fill_order: Address,
        orders: Address,
    ) -> Result<Vec<u8>, AbiError> {
        self.encode(
            Interface::HotLoading,
            "getMarketData",
            &[Token::Address(augur), Token::Address(market), Token::Address(fill_order), Token::Address(orders)],
        )
    }

    pub fn decode_market_data(&self, data: &[u8]) -> Result<HotLoadingMarketData, AbiError> {
        const F: &str = "getMarketData";
        let fields = self
            .decode_single(Interface::HotLoading, F, data)?
            .into_tuple()
            .ok_or_else(|| unexpected(F, "expected tuple"))?;
        let [extra_info, market_creator, owner, outcomes, market_type, display_prices, designated_reporter, reporting_state, dispute_round, winning_payout, volume, open_interest, last_traded_prices, universe, num_ticks, fee_divisor, affiliate_fee_divisor, end_time, num_outcomes, validity_bond, reporting_fee_divisor, outcome_volumes]: [Token; 22] =
            fields.try_into().map_err(|fields: Vec<Token>| unexpected(F, format!("expected 22 fields, got {}", fields.len())))?;

        let outcomes = outcomes
            .into_array()
            .ok_or_else(|| unexpected(F, "outcomes is not an array"))?
            .into_iter()
            .map(|t| t.into_fixed_bytes().map(|b| bytes32_label(&b)).ok_or_else(|| unexpected(F, "outcome is not bytes32")))
            .collect::<Result<Vec<_>, _>>()?;
        let display_prices = display_prices
            .into_array()
            .ok_or_else(|| unexpected(F, "displayPrices is not an array"))?
            .into_iter()
            .map(|t| {
                let word = t.into_int().ok_or_else(|| unexpected(F, "display price is not int256"))?;
                Ok(i256_to_i128(word)?)
            })
            .collect::<Result<Vec<_>, AbiError>>()?;

        Ok(HotLoadingMarketData {
            extra_info: extra_info.into_string().ok_or_else(|| unexpected(F, "extraInfo is not a string"))?,
            market_creator: token_address(F, market_creator)?,
            owner: token_address(F, owner)?,
            outcomes,
            market_type: token_u8(F, market_type)?,
            display_prices,
            designated_reporter: token_address(F, designated_reporter)?,
            reporting_state: token_u8(F, reporting_state)?,
            dispute_round: token_u128(F, dispute_round)?,
            winning_payout: token_u128_array(F, winning_payout)?,
            volume: token_u128(F, volume)?,
            open_interest: token_u128(F, open_interest)?,
            last_traded_prices: token_u128_array(F, last_traded_prices)?,
            universe: token_address(F, universe)?,
            num_ticks: token_u128(F, num_ticks)?,
            fee_divisor: token_u128(F, fee_divisor)?,
            affiliate_fee_divisor: token_u128(F, affiliate_fee_divisor)?,
            end_time: token_u128(F, end_time)?,
            num_outcomes: token_u128(F, num_outcomes)?,
            validity_bond: token_u128(F, validity_bond)?,
            reporting_fee_divisor: token_u128(F, reporting_fee_divisor)?,
            outcome_volumes: token_u128_array(F, outcome_volumes)?,
        })
    }
}

/// Encodes a market snapshot the way the hot-loading contract returns it.
/// Used by tests and the mock transport.
pub fn encode_market_data(market: &HotLoadingMarketData) -> Vec<u8> {
    let address = |a: &Address| Token::Address(*a);
    let label = |name: &String| {
        let mut word = name.as_bytes().to_vec();
        word.resize(32, 0);
        Token::FixedBytes(word)
    };
    let int = |value: &i128| {
        let magnitude = u128_to_u256(value.unsigned_abs());
        let word = if *value < 0 { (!magnitude).overflowing_add(ethabi::Uint::one()).0 } else { magnitude };
        Token::Int(word)
    };
    ethabi::encode(&[Token::Tuple(vec![
        Token::String(market.extra_info.clone()),
        address(&market.market_creator),
        address(&market.owner),
        Token::Array(market.outcomes.iter().map(label).collect()),
        uint(u128::from(market.market_type)),
        Token::Array(market.display_prices.iter().map(int).collect()),
        address(&market.designated_reporter),
        uint(u128::from(market.reporting_state)),
        uint(market.dispute_round),
        uint_array(&market.winning_payout),
        uint(market.volume),
        uint(market.open_interest),
        uint_array(&market.last_traded_prices),
        address(&market.universe),
        uint(market.num_ticks),
        uint(market.fee_divisor),
        uint(market.affiliate_fee_divisor),
        uint(market.end_time),
        uint(market.num_outcomes),
        uint(market.validity_bond),
        uint(market.reporting_fee_divisor),
        uint_array(&market.outcome_volumes),
    ])])
}
