//! Client-side core for Augur v2 markets: dispute-stake arithmetic, the
//! reactive reporting view-model, market creation validation and the ABI
//! marshalling behind the contract calls.

pub mod abi;
pub mod client;
pub mod constants;
pub mod create_market;
pub mod deployment;
pub mod error;
pub mod ethereum;
pub mod extra_info;
pub mod market;
pub mod reporting;
pub mod signal;
pub mod stake;
pub mod types;

pub use abi::{AugurAbi, Interface};
pub use client::AugurContracts;
pub use error::{AbiError, EthereumValueError, FormError, MarketViewError, ReportingError};
pub use ethabi::{Address, Hash};
pub use market::MarketData;
pub use reporting::{ReportAction, ReportingOptions};
pub use types::*;
