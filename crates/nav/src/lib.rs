//! NAV provider clients for Fintrack.
//!
//! Each ledger picks a provider through its `nav_service_type`:
//! - `india` - mfapi.in, keyed by AMFI scheme code
//! - `uk` - Alpha Vantage `GLOBAL_QUOTE`, keyed by ticker, needs an API key
//!
//! Response parsing is kept in pure functions so it can be tested against
//! recorded payloads without network access.

pub mod error;
pub mod india;
pub mod provider;
pub mod uk;

pub use error::NavError;
pub use india::MfApiProvider;
pub use provider::{NavFetchResult, NavProvider, NavQuote, fetch_bulk, provider_for};
pub use uk::AlphaVantageProvider;
