use chrono::NaiveDate;
use ethabi::Address;
use tracing::debug;

use crate::constants::MAX_FEE_PER_CASH_IN_ATTO_CASH;
use crate::error::FormError;
use crate::ethereum::{decimal_string_to_u128, is_decimal_string, parse_address, parse_non_hex_u128};
use crate::extra_info::ExtraInfo;

/// Raw create-market input, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct CreateYesNoMarketForm {
    /// `YYYY-MM-DD`, interpreted as midnight UTC.
    pub end_time: String,
    /// Percent, e.g. `"1.5"`.
    pub market_creator_fee: String,
    pub affiliate_validator: String,
    pub affiliate_fee_divisor: String,
    pub designated_reporter_address: String,
    pub description: String,
    pub long_description: String,
    pub categories: String,
    pub tags: String,
}

/// Arguments of `Universe.createYesNoMarket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateYesNoMarketParams {
    pub end_time: u64,
    pub fee_per_cash_in_atto_cash: u128,
    pub affiliate_validator: Address,
    pub affiliate_fee_divisor: u128,
    pub designated_reporter: Address,
    pub extra_info: String,
}

/// Strict `YYYY-MM-DD` that names a real calendar day.
pub fn parse_end_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn is_valid_date(value: &str) -> bool {
    parse_end_date(value).is_some()
}

impl CreateYesNoMarketForm {
    pub fn validate(&self) -> Result<CreateYesNoMarketParams, FormError> {
        if !is_decimal_string(&self.market_creator_fee) {
            return Err(FormError::CreatorFee);
        }
        // percent input, so 16 decimals instead of 18
        let fee_per_cash_in_atto_cash =
            decimal_string_to_u128(&self.market_creator_fee, 16).map_err(|_| FormError::CreatorFee)?;
        if fee_per_cash_in_atto_cash > MAX_FEE_PER_CASH_IN_ATTO_CASH {
            return Err(FormError::CreatorFeeTooHigh(self.market_creator_fee.clone()));
        }
        let end_date = parse_end_date(&self.end_time).ok_or(FormError::EndTime)?;
        let end_time = end_date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp())
            .and_then(|ts| u64::try_from(ts).ok())
            .ok_or(FormError::EndTime)?;
        let affiliate_validator =
            parse_address(&self.affiliate_validator).map_err(|_| FormError::AffiliateValidator)?;
        let affiliate_fee_divisor =
            parse_non_hex_u128(&self.affiliate_fee_divisor).map_err(|_| FormError::AffiliateFeeDivisor)?;
        let designated_reporter =
            parse_address(&self.designated_reporter_address).map_err(|_| FormError::DesignatedReporter)?;
        if self.description.is_empty() {
            return Err(FormError::Description);
        }
        let extra_info = ExtraInfo::from_form(&self.description, &self.long_description, &self.categories, &self.tags)
            .to_json()
            .map_err(|e| FormError::ExtraInfo(e.to_string()))?;
        debug!(end_time, fee = fee_per_cash_in_atto_cash, "create market form validated");
        Ok(CreateYesNoMarketParams {
            end_time,
            fee_per_cash_in_atto_cash,
            affiliate_validator,
            affiliate_fee_divisor,
            designated_reporter,
            extra_info,
        })
    }
}
