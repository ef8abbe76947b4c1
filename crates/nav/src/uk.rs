//! Alpha Vantage client for UK funds and ETFs.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::NavError;
use crate::provider::{NavProvider, NavQuote, parse_nav};

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
}

/// Client for `GLOBAL_QUOTE` lookups.
pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    /// Creates a provider using `client` against `base_url` with `api_key`.
    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl NavProvider for AlphaVantageProvider {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch(&self, code: &str) -> Result<NavQuote, NavError> {
        let symbol = code.trim();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NavError::RateLimited);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NavError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_global_quote(symbol, &body)
    }
}

/// Parses a `GLOBAL_QUOTE` payload. The symbol doubles as the fund name.
///
/// # Errors
///
/// Returns `NavError::Api` for `Error Message`/`Note` payloads,
/// `NavError::NoData` for an empty quote and `NavError::InvalidPayload` when
/// the price or date is missing or malformed.
pub fn parse_global_quote(symbol: &str, body: &str) -> Result<NavQuote, NavError> {
    let payload: QuoteResponse =
        serde_json::from_str(body).map_err(|e| NavError::InvalidPayload(e.to_string()))?;
    if let Some(message) = payload.error_message.or(payload.note) {
        return Err(NavError::Api(message));
    }
    let quote = payload
        .global_quote
        .ok_or_else(|| NavError::NoData(symbol.to_owned()))?;
    let (Some(price), Some(day)) = (quote.price, quote.latest_trading_day) else {
        return Err(NavError::NoData(symbol.to_owned()));
    };

    let nav_date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .map_err(|_| NavError::InvalidPayload(format!("Invalid trading day: {day}")))?;

    Ok(NavQuote {
        code: symbol.to_owned(),
        fund_name: Some(symbol.to_owned()),
        nav: parse_nav(&price)?,
        nav_date,
    })
}
