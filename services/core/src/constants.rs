use ethabi::Address;

use crate::error::EthereumValueError;
use crate::ethereum::parse_address;

/// One token with 18 decimals.
pub const ATTO: u128 = 1_000_000_000_000_000_000;

/// REP and DAI use 18 decimals.
pub const TOKEN_DECIMALS: u32 = 18;

/// Allowance granted by the approve helpers.
pub const APPROVAL_AMOUNT: u128 = 10_000 * ATTO;

/// Creator fees are capped at 15% of each settled cash unit.
pub const MAX_FEE_PER_CASH_IN_ATTO_CASH: u128 = 15 * ATTO / 100;

pub const AUGUR_CONTRACT: &str = "0x23916a8F5C3846e3100e5f587FF14F3098722F5d";
pub const GENESIS_UNIVERSE: &str = "0x49244BD018Ca9fd1f06ecC07B9E9De773246e5AA";
pub const REPV2_TOKEN_ADDRESS: &str = "0x221657776846890989a759BA2973e427DfF5C9bB";
pub const DAI_TOKEN_ADDRESS: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

/// Deterministic deployment proxy (CREATE2 factory) present on most chains.
pub const DETERMINISTIC_DEPLOYMENT_PROXY: &str = "0x4e59b44847b379578588920ca78fbf26c0b4956c";

pub const MARKET_TYPES: [&str; 3] = ["Yes/No", "Categorical", "Scalar"];

pub const REPORTING_STATES: [&str; 9] = [
    "PreReporting",
    "DesignatedReporting",
    "OpenReporting",
    "CrowdsourcingDispute",
    "AwaitingNextWindow",
    "AwaitingFinalization",
    "Finalized",
    "Forking",
    "AwaitingForkMigration",
];

/// Yes/No outcome labels in payout-numerator order.
pub const YES_NO_OPTIONS: [&str; 3] = ["Invalid", "No", "Yes"];

/// Parses one of the address constants above.
pub fn address(constant: &str) -> Result<Address, EthereumValueError> {
    parse_address(constant)
}
