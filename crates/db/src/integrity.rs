//! Integrity audit over stored holdings data.
//!
//! Loads the rows each rule needs and runs the predicates from
//! `fintrack_core::integrity` over them. Rules that span the generic
//! transactions table are evaluated in SQL.

use std::collections::HashMap;

use fintrack_core::fund::MfTransactionType;
use fintrack_core::integrity::{
    ChargeRow, DomainKind, IntegrityReport, IntegrityViolation, SwitchLegRow, check_charge_split,
    check_current_value, check_switch_pair, find_duplicate_fund_names,
};
use fintrack_shared::types::{LedgerId, MfTransactionId, MutualFundId, TransactionId};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    Statement,
};

use crate::entities::{mf_transactions, mutual_funds};

const UNFLAGGED_MF_SQL: &str = r"
SELECT t.transaction_id
FROM mf_transactions m
JOIN transactions t ON t.transaction_id = m.financial_transaction_id
WHERE NOT t.is_mf_transaction
  AND ($1::int IS NULL OR m.ledger_id = $1)
ORDER BY t.transaction_id";

const UNFLAGGED_ASSET_SQL: &str = r"
SELECT t.transaction_id
FROM asset_transactions a
JOIN transactions t ON t.transaction_id = a.financial_transaction_id
WHERE NOT t.is_asset_transaction
  AND ($1::int IS NULL OR a.ledger_id = $1)
ORDER BY t.transaction_id";

const FLAGGED_MF_SQL: &str = r"
SELECT t.transaction_id, COUNT(m.mf_transaction_id) AS reference_count
FROM transactions t
JOIN accounts acc ON acc.account_id = t.account_id
LEFT JOIN mf_transactions m ON m.financial_transaction_id = t.transaction_id
WHERE t.is_mf_transaction
  AND ($1::int IS NULL OR acc.ledger_id = $1)
GROUP BY t.transaction_id
HAVING COUNT(m.mf_transaction_id) <> 1
ORDER BY t.transaction_id";

const FLAGGED_ASSET_SQL: &str = r"
SELECT t.transaction_id, COUNT(a.asset_transaction_id) AS reference_count
FROM transactions t
JOIN accounts acc ON acc.account_id = t.account_id
LEFT JOIN asset_transactions a ON a.financial_transaction_id = t.transaction_id
WHERE t.is_asset_transaction
  AND ($1::int IS NULL OR acc.ledger_id = $1)
GROUP BY t.transaction_id
HAVING COUNT(a.asset_transaction_id) <> 1
ORDER BY t.transaction_id";

#[derive(Debug, FromQueryResult)]
struct TransactionRef {
    transaction_id: i32,
}

#[derive(Debug, FromQueryResult)]
struct ReferenceCount {
    transaction_id: i32,
    reference_count: i64,
}

/// Runs every consistency rule over one ledger or the whole database.
#[derive(Debug, Clone)]
pub struct IntegrityAudit {
    db: DatabaseConnection,
}

impl IntegrityAudit {
    /// Creates a new audit.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs the audit, restricted to `ledger_id` when given.
    pub async fn run(&self, ledger_id: Option<LedgerId>) -> Result<IntegrityReport, DbErr> {
        let mut report = IntegrityReport::default();

        let funds = self.load_funds(ledger_id).await?;
        report.extend(find_duplicate_fund_names(funds.iter().map(|f| {
            (LedgerId::new(f.ledger_id), f.name.as_str(), f.owner.as_deref())
        })));
        report.extend(funds.iter().filter_map(|f| {
            check_current_value(MutualFundId::new(f.mutual_fund_id), &f.position())
        }));

        let rows = self.load_fund_transactions(ledger_id).await?;
        report.extend(rows.iter().filter_map(|row| {
            check_charge_split(&ChargeRow {
                mf_transaction_id: MfTransactionId::new(row.mf_transaction_id),
                transaction_type: row.transaction_type.into(),
                total_amount: row.total_amount,
                amount_excluding_charges: row.amount_excluding_charges,
                other_charges: row.other_charges,
            })
        }));
        report.extend(switch_violations(&rows));

        let filter = ledger_id.map(LedgerId::into_inner);
        for (sql, domain) in [
            (UNFLAGGED_MF_SQL, DomainKind::MutualFund),
            (UNFLAGGED_ASSET_SQL, DomainKind::PhysicalAsset),
        ] {
            let found = TransactionRef::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [filter.into()],
            ))
            .all(&self.db)
            .await?;
            report.extend(found.into_iter().map(|r| {
                IntegrityViolation::UnflaggedLedgerTransaction {
                    transaction_id: TransactionId::new(r.transaction_id),
                    domain,
                }
            }));
        }
        for (sql, domain) in [
            (FLAGGED_MF_SQL, DomainKind::MutualFund),
            (FLAGGED_ASSET_SQL, DomainKind::PhysicalAsset),
        ] {
            let found = ReferenceCount::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [filter.into()],
            ))
            .all(&self.db)
            .await?;
            report.extend(found.into_iter().map(|r| {
                IntegrityViolation::FlaggedReferenceCount {
                    transaction_id: TransactionId::new(r.transaction_id),
                    domain,
                    references: r.reference_count,
                }
            }));
        }

        if report.is_clean() {
            tracing::info!(ledger_id = filter, "Integrity audit clean");
        } else {
            tracing::warn!(
                ledger_id = filter,
                violations = report.violations.len(),
                counts = ?report.counts_by_kind(),
                "Integrity audit found violations"
            );
        }
        Ok(report)
    }

    async fn load_funds(
        &self,
        ledger_id: Option<LedgerId>,
    ) -> Result<Vec<mutual_funds::Model>, DbErr> {
        let mut query = mutual_funds::Entity::find();
        if let Some(ledger_id) = ledger_id {
            query = query.filter(mutual_funds::Column::LedgerId.eq(ledger_id.into_inner()));
        }
        query.all(&self.db).await
    }

    async fn load_fund_transactions(
        &self,
        ledger_id: Option<LedgerId>,
    ) -> Result<Vec<mf_transactions::Model>, DbErr> {
        let mut query = mf_transactions::Entity::find();
        if let Some(ledger_id) = ledger_id {
            query = query.filter(mf_transactions::Column::LedgerId.eq(ledger_id.into_inner()));
        }
        query.all(&self.db).await
    }
}

fn leg_of(row: &mf_transactions::Model) -> SwitchLegRow {
    SwitchLegRow {
        mf_transaction_id: MfTransactionId::new(row.mf_transaction_id),
        transaction_type: row.transaction_type.into(),
        mutual_fund_id: MutualFundId::new(row.mutual_fund_id),
        target_fund_id: row.target_fund_id.map(MutualFundId::new),
        linked_transaction_id: row.linked_transaction_id.map(MfTransactionId::new),
        total_amount: row.total_amount,
    }
}

/// Checks every switch_out against its linked row, and reports switch_in
/// rows that no switch_out points back to.
fn switch_violations(rows: &[mf_transactions::Model]) -> Vec<IntegrityViolation> {
    let legs: HashMap<i32, SwitchLegRow> = rows
        .iter()
        .filter(|r| !MfTransactionType::from(r.transaction_type).is_trade())
        .map(|r| (r.mf_transaction_id, leg_of(r)))
        .collect();

    let mut violations = Vec::new();
    let mut ids: Vec<_> = legs.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        let leg = &legs[&id];
        let counterpart = leg
            .linked_transaction_id
            .and_then(|linked| legs.get(&linked.into_inner()));
        match leg.transaction_type {
            MfTransactionType::SwitchOut => {
                violations.extend(check_switch_pair(leg, counterpart));
            }
            MfTransactionType::SwitchIn => {
                let claimed = counterpart.is_some_and(|out| {
                    out.transaction_type == MfTransactionType::SwitchOut
                        && out.linked_transaction_id == Some(leg.mf_transaction_id)
                });
                if !claimed {
                    violations.push(IntegrityViolation::UnpairedSwitch {
                        mf_transaction_id: leg.mf_transaction_id,
                    });
                }
            }
            MfTransactionType::Buy | MfTransactionType::Sell => {}
        }
    }
    violations
}
