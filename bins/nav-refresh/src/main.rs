//! NAV refresh job for Fintrack.
//!
//! For every ledger, fetches the latest NAV of each fund that has a scheme
//! code from the ledger's configured provider and revalues the fund.
//!
//! Usage: cargo run --bin nav-refresh

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveTime;
use fintrack_db::repositories::{LedgerRepository, MutualFundFilter, MutualFundRepository};
use fintrack_nav::{fetch_bulk, provider_for};
use fintrack_shared::types::{LedgerId, MutualFundId};
use fintrack_shared::{AppConfig, NavConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fintrack=info,nav_refresh=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let db = fintrack_db::connect_with(&config.database).await?;
    tracing::info!("Connected to database");

    let ledgers = LedgerRepository::new(db.clone());
    let funds = MutualFundRepository::new(db);

    let mut updated = 0usize;
    for ledger in ledgers.list_all().await? {
        let ledger_id = LedgerId::new(ledger.ledger_id);
        match refresh_ledger(&ledgers, &funds, ledger_id, &config.nav).await {
            Ok(count) => updated += count,
            // One ledger failing must not stop the others.
            Err(e) => tracing::error!(ledger_id = ledger.ledger_id, error = %e, "NAV refresh failed"),
        }
    }

    tracing::info!(updated, "NAV refresh complete");
    Ok(())
}

/// Refreshes every coded fund of one ledger. Returns how many were updated.
async fn refresh_ledger(
    ledgers: &LedgerRepository,
    funds: &MutualFundRepository,
    ledger_id: LedgerId,
    nav_config: &NavConfig,
) -> anyhow::Result<usize> {
    let coded = funds
        .list(
            ledger_id,
            MutualFundFilter {
                with_code: true,
                ..Default::default()
            },
        )
        .await?;
    if coded.is_empty() {
        return Ok(0);
    }

    let mut by_code: BTreeMap<String, Vec<MutualFundId>> = BTreeMap::new();
    for fund in &coded {
        if let Some(code) = fund.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            by_code
                .entry(code.to_owned())
                .or_default()
                .push(MutualFundId::new(fund.mutual_fund_id));
        }
    }

    let settings = ledgers.nav_settings(ledger_id).await?;
    let provider = provider_for(settings.service, settings.api_key.as_deref(), nav_config)?;
    let codes: Vec<String> = by_code.keys().cloned().collect();
    let results = fetch_bulk(
        provider.as_ref(),
        &codes,
        Duration::from_millis(nav_config.request_delay_ms),
    )
    .await;

    let mut updated = 0;
    for result in results {
        let Ok(quote) = result.outcome else {
            continue;
        };
        let at = quote.nav_date.and_time(NaiveTime::MIN);
        for fund_id in by_code.get(&result.code).into_iter().flatten() {
            match funds.update_nav(ledger_id, *fund_id, quote.nav, at).await {
                Ok(_) => updated += 1,
                Err(e) => tracing::warn!(
                    ledger_id = ledger_id.into_inner(),
                    mutual_fund_id = fund_id.into_inner(),
                    error = %e,
                    "Failed to store NAV"
                ),
            }
        }
    }

    tracing::info!(
        ledger_id = ledger_id.into_inner(),
        provider = provider.name(),
        funds = coded.len(),
        updated,
        "Ledger NAVs refreshed"
    );
    Ok(updated)
}
