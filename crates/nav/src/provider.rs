//! Provider contract and bulk fetching.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use fintrack_core::pricing::NavServiceType;
use fintrack_shared::NavConfig;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::NavError;
use crate::india::MfApiProvider;
use crate::uk::AlphaVantageProvider;

/// Latest NAV of one fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavQuote {
    /// Scheme code or ticker the quote was requested for.
    pub code: String,
    /// Fund name reported by the provider, if any.
    pub fund_name: Option<String>,
    /// Net asset value per unit.
    pub nav: Decimal,
    /// Date the NAV applies to.
    pub nav_date: NaiveDate,
}

/// A source of fund NAVs.
#[async_trait]
pub trait NavProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetches the latest NAV for `code`.
    async fn fetch(&self, code: &str) -> Result<NavQuote, NavError>;
}

/// Outcome of one code in a bulk fetch.
#[derive(Debug)]
pub struct NavFetchResult {
    /// Requested code.
    pub code: String,
    /// Quote or the reason there is none.
    pub outcome: Result<NavQuote, NavError>,
}

impl NavFetchResult {
    /// Returns true if a quote was obtained.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Fetches `codes` one at a time, pausing `delay` between requests.
///
/// A failing code is reported in its own result and does not stop the batch.
pub async fn fetch_bulk(
    provider: &dyn NavProvider,
    codes: &[String],
    delay: Duration,
) -> Vec<NavFetchResult> {
    let mut results = Vec::with_capacity(codes.len());
    for (index, code) in codes.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let outcome = provider.fetch(code).await;
        match &outcome {
            Ok(quote) => tracing::debug!(
                provider = provider.name(),
                code = %code,
                nav = %quote.nav,
                nav_date = %quote.nav_date,
                "Fetched NAV"
            ),
            Err(e) => tracing::warn!(
                provider = provider.name(),
                code = %code,
                error = %e,
                "NAV fetch failed"
            ),
        }
        results.push(NavFetchResult {
            code: code.clone(),
            outcome,
        });
    }

    let successful = results.iter().filter(|r| r.is_success()).count();
    tracing::info!(
        provider = provider.name(),
        requested = codes.len(),
        successful,
        failed = codes.len() - successful,
        "Bulk NAV fetch finished"
    );
    results
}

/// Builds the provider a ledger is configured for.
///
/// # Errors
///
/// Returns `NavError::MissingApiKey` when the provider needs a key and none
/// is set, or `NavError::Http` if the HTTP client cannot be built.
pub fn provider_for(
    service: NavServiceType,
    api_key: Option<&str>,
    config: &NavConfig,
) -> Result<Box<dyn NavProvider>, NavError> {
    let client = http_client(config)?;
    match service {
        NavServiceType::India => Ok(Box::new(MfApiProvider::new(
            client,
            config.india_base_url.clone(),
        ))),
        NavServiceType::Uk => {
            let key = api_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .ok_or(NavError::MissingApiKey(service.as_str()))?;
            Ok(Box::new(AlphaVantageProvider::new(
                client,
                config.uk_base_url.clone(),
                key.to_owned(),
            )))
        }
    }
}

/// HTTP client with the configured per-request timeout.
///
/// # Errors
///
/// Returns `NavError::Http` if the TLS backend cannot be initialized.
pub fn http_client(config: &NavConfig) -> Result<Client, NavError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?)
}

/// Parses a decimal NAV string, rejecting non-positive values.
pub(crate) fn parse_nav(raw: &str) -> Result<Decimal, NavError> {
    let nav: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| NavError::InvalidPayload(format!("Invalid price format: {raw}")))?;
    if nav <= Decimal::ZERO {
        return Err(NavError::InvalidPayload(format!("Non-positive NAV: {raw}")));
    }
    Ok(nav)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct ScriptedProvider {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NavProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(&self, code: &str) -> Result<NavQuote, NavError> {
            self.calls.lock().unwrap().push(code.to_owned());
            if code == "missing" {
                return Err(NavError::NotFound(code.to_owned()));
            }
            Ok(NavQuote {
                code: code.to_owned(),
                fund_name: None,
                nav: dec!(10.5),
                nav_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            })
        }
    }

    #[tokio::test]
    async fn test_bulk_fetch_continues_past_failures() {
        let provider = ScriptedProvider {
            calls: Mutex::new(Vec::new()),
        };
        let codes = vec!["119551".to_owned(), "missing".to_owned(), "120503".to_owned()];

        let results = fetch_bulk(&provider, &codes, Duration::ZERO).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(matches!(results[1].outcome, Err(NavError::NotFound(_))));
        assert!(results[2].is_success());
        assert_eq!(*provider.calls.lock().unwrap(), codes);
    }

    #[test]
    fn test_uk_provider_requires_key() {
        let config = NavConfig::default();
        let err = provider_for(NavServiceType::Uk, Some("  "), &config)
            .err()
            .unwrap();
        assert!(matches!(err, NavError::MissingApiKey("uk")));

        let provider = provider_for(NavServiceType::Uk, Some("demo"), &config).unwrap();
        assert_eq!(provider.name(), "alpha_vantage");
    }

    #[test]
    fn test_india_provider_needs_no_key() {
        let provider = provider_for(NavServiceType::India, None, &NavConfig::default()).unwrap();
        assert_eq!(provider.name(), "mfapi");
    }

    #[test]
    fn test_parse_nav() {
        assert_eq!(parse_nav(" 41.2367 ").unwrap(), dec!(41.2367));
        assert!(parse_nav("N/A").is_err());
        assert!(parse_nav("0").is_err());
    }
}
