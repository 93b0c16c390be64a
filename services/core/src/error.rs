use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthereumValueError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("not a decimal string: {0}")]
    NotDecimal(String),
    #[error("{value} has more than {decimals} decimals")]
    TooManyDecimals { value: String, decimals: u32 },
    #[error("not an unsigned integer: {0}")]
    NotInteger(String),
    #[error("value does not fit in 128 bits: {0}")]
    Overflow(String),
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(u128),
}

/// Raised while validating the create-market form. Messages name the field
/// the user has to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("missing endTime")]
    EndTime,
    #[error("missing feePerCashInAttoCash")]
    CreatorFee,
    #[error("market creator fee {0} exceeds the 15% maximum")]
    CreatorFeeTooHigh(String),
    #[error("missing affiliateValidator")]
    AffiliateValidator,
    #[error("missing affiliateFeeDivisor")]
    AffiliateFeeDivisor,
    #[error("missing designatedReporterAddress")]
    DesignatedReporter,
    #[error("missing description")]
    Description,
    #[error("failed to serialize extra info: {0}")]
    ExtraInfo(String),
}

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("abi definition error: {0}")]
    Definition(#[from] ethabi::Error),
    #[error("unexpected return data for {function}: {reason}")]
    UnexpectedOutput { function: &'static str, reason: String },
    #[error(transparent)]
    Value(#[from] EthereumValueError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketViewError {
    #[error("invalid marketType: {0}")]
    InvalidMarketType(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportingError {
    #[error("unknown outcome: {0}")]
    UnknownOutcome(String),
    #[error("no outcome selected")]
    NoOutcomeSelected,
    #[error("outcome stakes not loaded")]
    StakesNotLoaded,
    #[error("stake of {requested} exceeds the maximum of {maximum} for {outcome}")]
    StakeTooLarge { outcome: String, requested: u128, maximum: u128 },
    #[error("no stake can be placed on {0} this round")]
    NothingToStake(String),
    #[error("stake on {0} must be greater than zero")]
    ZeroStake(String),
}
