//! mfapi.in client for Indian mutual fund schemes.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::NavError;
use crate::provider::{NavProvider, NavQuote, parse_nav};

const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Deserialize)]
struct SchemeResponse {
    #[serde(default)]
    meta: SchemeMeta,
    #[serde(default)]
    data: Vec<NavPoint>,
}

#[derive(Debug, Default, Deserialize)]
struct SchemeMeta {
    scheme_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NavPoint {
    date: String,
    nav: String,
}

/// Client for `GET {base}/mf/{scheme_code}`.
pub struct MfApiProvider {
    client: Client,
    base_url: String,
}

impl MfApiProvider {
    /// Creates a provider using `client` against `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl NavProvider for MfApiProvider {
    fn name(&self) -> &'static str {
        "mfapi"
    }

    async fn fetch(&self, code: &str) -> Result<NavQuote, NavError> {
        let url = format!("{}/mf/{}", self.base_url, code.trim());
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(NavError::NotFound(code.to_owned()));
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NavError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_scheme(code, &body)
    }
}

/// Parses an mfapi.in scheme payload; the first data point is the latest.
///
/// # Errors
///
/// Returns `NavError::NoData` for an empty series or `NavError::InvalidPayload`
/// when the JSON, NAV or date cannot be read.
pub fn parse_scheme(code: &str, body: &str) -> Result<NavQuote, NavError> {
    let payload: SchemeResponse =
        serde_json::from_str(body).map_err(|e| NavError::InvalidPayload(e.to_string()))?;
    let latest = payload
        .data
        .first()
        .ok_or_else(|| NavError::NoData(code.to_owned()))?;

    let nav_date = NaiveDate::parse_from_str(latest.date.trim(), DATE_FORMAT)
        .map_err(|_| NavError::InvalidPayload(format!("Invalid NAV date: {}", latest.date)))?;

    Ok(NavQuote {
        code: code.to_owned(),
        fund_name: payload.meta.scheme_name.filter(|name| !name.is_empty()),
        nav: parse_nav(&latest.nav)?,
        nav_date,
    })
}
