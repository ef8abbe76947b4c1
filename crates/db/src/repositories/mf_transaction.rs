//! Mutual fund transaction repository.
//!
//! Every financial event runs in one database transaction: the affected fund
//! rows are read `FOR UPDATE`, the position rules from `fintrack-core` compute
//! the new aggregates, and the transaction rows, ledger bookings and fund rows
//! are written together.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use fintrack_core::analytics::{fund_cash_flows, xirr};
use fintrack_core::fund::{
    ChargeSplit, FundError, SwitchInput, TradeInput, TradeSide, plan_switch,
};
use fintrack_core::integrity::DomainKind;
use fintrack_shared::AppError;
use fintrack_shared::types::{
    AccountId, CategoryId, LedgerId, MfTransactionId, MutualFundId, PageRequest, PageResponse,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::booking::{self, Booking};
use super::mutual_fund::{MutualFundError, find_in_ledger, lock_fund, lock_fund_pair, save_position};
use crate::entities::{
    categories, ledgers, mf_transactions, mutual_funds,
    sea_orm_active_enums::{CategoryType, MfTransactionType},
};

/// Error types for mutual fund transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum MfTransactionError {
    /// Transaction not found in the ledger.
    #[error("MF transaction not found: {0}")]
    NotFound(MfTransactionId),

    /// Account not found in the ledger.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Charges were given without a category to book them under.
    #[error("Expense category is required when other charges are present")]
    ChargeCategoryRequired,

    /// The charge category is not an expense category of the ledger owner.
    #[error("Invalid expense category for charges: {0}")]
    InvalidChargeCategory(CategoryId),

    /// Position rule rejected the event.
    #[error(transparent)]
    Fund(#[from] FundError),

    /// Fund lookup failed.
    #[error(transparent)]
    MutualFund(#[from] MutualFundError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<MfTransactionError> for AppError {
    fn from(err: MfTransactionError) -> Self {
        match err {
            MfTransactionError::NotFound(_) | MfTransactionError::AccountNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            MfTransactionError::ChargeCategoryRequired
            | MfTransactionError::InvalidChargeCategory(_) => Self::Validation(err.to_string()),
            MfTransactionError::Fund(e) => e.into(),
            MfTransactionError::MutualFund(e) => e.into(),
            MfTransactionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for a buy or sell against an account.
#[derive(Debug, Clone)]
pub struct RecordTradeInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Fund traded.
    pub mutual_fund_id: MutualFundId,
    /// Account paying for a buy or receiving a sell.
    pub account_id: AccountId,
    /// Buy or sell.
    pub side: TradeSide,
    /// Units traded.
    pub units: Decimal,
    /// Fund-level amount.
    pub amount_excluding_charges: Decimal,
    /// Charges booked separately.
    pub other_charges: Decimal,
    /// Expense category for the charges; required when there are any.
    pub expense_category_id: Option<CategoryId>,
    /// When the trade happened.
    pub transaction_date: NaiveDateTime,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for a fund-to-fund switch.
#[derive(Debug, Clone)]
pub struct SwitchUnitsInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Fund the units leave.
    pub source_fund_id: MutualFundId,
    /// Fund the value enters.
    pub target_fund_id: MutualFundId,
    /// Units switched out of the source fund.
    pub units: Decimal,
    /// Source NAV at the switch.
    pub source_nav: Decimal,
    /// Target NAV at the switch.
    pub target_nav: Decimal,
    /// When the switch happened.
    pub transaction_date: NaiveDateTime,
    /// Free text, stored on both legs.
    pub notes: Option<String>,
}

/// Both rows of a recorded switch.
#[derive(Debug, Clone)]
pub struct SwitchRecord {
    /// Row on the source fund.
    pub switch_out: mf_transactions::Model,
    /// Row on the target fund.
    pub switch_in: mf_transactions::Model,
}

/// Mutual fund transaction repository.
#[derive(Debug, Clone)]
pub struct MfTransactionRepository {
    db: DatabaseConnection,
}

impl MfTransactionRepository {
    /// Creates a new mutual fund transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a buy or sell.
    ///
    /// The fund-level amount is booked on the account as a ledger transaction
    /// flagged `is_mf_transaction`. Charges, when present, are booked as a
    /// second debit under the expense category and linked through
    /// `linked_charge_transaction_id`.
    pub async fn record_trade(
        &self,
        input: RecordTradeInput,
    ) -> Result<mf_transactions::Model, MfTransactionError> {
        let charges = ChargeSplit::new(input.amount_excluding_charges, input.other_charges)?;
        let ledger_id = input.ledger_id.into_inner();
        let account_id = input.account_id.into_inner();

        let txn = self.db.begin().await?;
        let fund = lock_fund(&txn, input.ledger_id, input.mutual_fund_id).await?;
        booking::lock_account(&txn, ledger_id, account_id)
            .await?
            .ok_or(MfTransactionError::AccountNotFound(input.account_id))?;
        let charge_category = if charges.has_charges() {
            let category_id = input
                .expense_category_id
                .ok_or(MfTransactionError::ChargeCategoryRequired)?;
            Some(expense_category(&txn, ledger_id, category_id).await?)
        } else {
            None
        };

        let mut position = fund.position();
        let outcome = position.apply_trade(&TradeInput {
            side: input.side,
            units: input.units,
            charges,
            transaction_date: input.transaction_date,
        })?;

        let label = match input.side {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        };
        let description = format!(
            "MF {label}: {} {} units at NAV {}",
            fund.name,
            outcome.units.round_dp(3),
            outcome.nav_per_unit.round_dp(2)
        );
        let amount = outcome.amount_excluding_charges;
        let main = match input.side {
            TradeSide::Buy => Booking::debit(account_id, amount, input.transaction_date, description),
            TradeSide::Sell => Booking::credit(account_id, amount, input.transaction_date, description),
        };
        let financial = booking::book(&txn, main.flagged(DomainKind::MutualFund)).await?;

        let charge = match charge_category {
            Some(category_id) => {
                let charge = Booking::debit(
                    account_id,
                    outcome.other_charges,
                    input.transaction_date,
                    format!("MF {label} Charges"),
                )
                .categorized(category_id);
                Some(booking::book(&txn, charge).await?)
            }
            None => None,
        };

        let (realized_gain, cost_basis) = match input.side {
            TradeSide::Buy => (None, None),
            TradeSide::Sell => (
                Some(outcome.realized_gain),
                Some(outcome.cost_basis_of_units_sold),
            ),
        };
        let row = mf_transactions::ActiveModel {
            ledger_id: Set(ledger_id),
            mutual_fund_id: Set(fund.mutual_fund_id),
            transaction_type: Set(MfTransactionType::from(
                fintrack_core::fund::MfTransactionType::from(input.side),
            )),
            units: Set(outcome.units),
            nav_per_unit: Set(outcome.nav_per_unit),
            total_amount: Set(outcome.total_amount),
            amount_excluding_charges: Set(outcome.amount_excluding_charges),
            other_charges: Set(outcome.other_charges),
            linked_charge_transaction_id: Set(charge.map(|c| c.transaction_id)),
            account_id: Set(Some(account_id)),
            target_fund_id: Set(None),
            financial_transaction_id: Set(Some(financial.transaction_id)),
            linked_transaction_id: Set(None),
            realized_gain: Set(realized_gain),
            cost_basis_of_units_sold: Set(cost_basis),
            transaction_date: Set(input.transaction_date),
            notes: Set(input.notes),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        save_position(&txn, fund, &position).await?;
        txn.commit().await?;

        tracing::info!(
            ledger_id,
            mutual_fund_id = row.mutual_fund_id,
            mf_transaction_id = row.mf_transaction_id,
            side = label,
            units = %row.units,
            "Recorded MF trade"
        );
        Ok(row)
    }

    /// Switches units from one fund to another.
    ///
    /// Writes a `switch_out` row on the source and a `switch_in` row on the
    /// target, linked to each other, and updates both funds.
    pub async fn switch_units(
        &self,
        input: SwitchUnitsInput,
    ) -> Result<SwitchRecord, MfTransactionError> {
        if input.source_fund_id == input.target_fund_id {
            return Err(FundError::SameFundSwitch.into());
        }
        let ledger_id = input.ledger_id.into_inner();

        let txn = self.db.begin().await?;
        let (source, target) = lock_fund_pair(
            &txn,
            input.ledger_id,
            input.source_fund_id,
            input.target_fund_id,
        )
        .await?;
        let plan = plan_switch(
            &source.position(),
            &target.position(),
            &SwitchInput {
                units: input.units,
                source_nav: input.source_nav,
                target_nav: input.target_nav,
                transaction_date: input.transaction_date,
            },
        )?;

        let now = Utc::now().naive_utc();
        let leg_row = |fund_id: i32, counterpart: i32, leg: &fintrack_core::fund::SwitchLeg| {
            mf_transactions::ActiveModel {
                ledger_id: Set(ledger_id),
                mutual_fund_id: Set(fund_id),
                transaction_type: Set(leg.transaction_type.into()),
                units: Set(leg.units),
                nav_per_unit: Set(leg.nav_per_unit),
                total_amount: Set(leg.total_amount),
                amount_excluding_charges: Set(leg.total_amount),
                other_charges: Set(Decimal::ZERO),
                linked_charge_transaction_id: Set(None),
                account_id: Set(None),
                target_fund_id: Set(Some(counterpart)),
                financial_transaction_id: Set(None),
                linked_transaction_id: Set(None),
                realized_gain: Set(leg.realized_gain),
                cost_basis_of_units_sold: Set(Some(leg.cost_basis_of_units_sold)),
                transaction_date: Set(input.transaction_date),
                notes: Set(input.notes.clone()),
                created_at: Set(now),
                ..Default::default()
            }
        };

        let switch_out = leg_row(source.mutual_fund_id, target.mutual_fund_id, &plan.switch_out)
            .insert(&txn)
            .await?;
        let mut switch_in = leg_row(target.mutual_fund_id, source.mutual_fund_id, &plan.switch_in);
        switch_in.linked_transaction_id = Set(Some(switch_out.mf_transaction_id));
        let switch_in = switch_in.insert(&txn).await?;

        let mut out_active = switch_out.into_active_model();
        out_active.linked_transaction_id = Set(Some(switch_in.mf_transaction_id));
        let switch_out = out_active.update(&txn).await?;

        save_position(&txn, source, &plan.source).await?;
        save_position(&txn, target, &plan.target).await?;
        txn.commit().await?;

        tracing::info!(
            ledger_id,
            switch_out_id = switch_out.mf_transaction_id,
            switch_in_id = switch_in.mf_transaction_id,
            value = %plan.value_switched,
            "Recorded MF switch"
        );
        Ok(SwitchRecord {
            switch_out,
            switch_in,
        })
    }

    /// Finds a transaction of the ledger.
    pub async fn find(
        &self,
        ledger_id: LedgerId,
        id: MfTransactionId,
    ) -> Result<mf_transactions::Model, MfTransactionError> {
        find_row(&self.db, ledger_id, id).await
    }

    /// Lists the transactions of a fund, newest first.
    pub async fn list_for_fund(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
    ) -> Result<Vec<mf_transactions::Model>, MfTransactionError> {
        Ok(mf_transactions::Entity::find()
            .filter(mf_transactions::Column::LedgerId.eq(ledger_id.into_inner()))
            .filter(mf_transactions::Column::MutualFundId.eq(fund_id.into_inner()))
            .order_by_desc(mf_transactions::Column::TransactionDate)
            .order_by_desc(mf_transactions::Column::MfTransactionId)
            .all(&self.db)
            .await?)
    }

    /// Lists the transactions of a ledger, newest first, one page at a time.
    pub async fn list(
        &self,
        ledger_id: LedgerId,
        page: &PageRequest,
    ) -> Result<PageResponse<mf_transactions::Model>, MfTransactionError> {
        let query = mf_transactions::Entity::find()
            .filter(mf_transactions::Column::LedgerId.eq(ledger_id.into_inner()));
        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(mf_transactions::Column::TransactionDate)
            .order_by_desc(mf_transactions::Column::MfTransactionId)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Replaces the notes of a transaction.
    ///
    /// Notes on the linked ledger transactions are generated and stay as is.
    pub async fn update_notes(
        &self,
        ledger_id: LedgerId,
        id: MfTransactionId,
        notes: Option<String>,
    ) -> Result<mf_transactions::Model, MfTransactionError> {
        let mut row = self.find(ledger_id, id).await?.into_active_model();
        row.notes = Set(notes);
        Ok(row.update(&self.db).await?)
    }

    /// Reverses and deletes a transaction.
    ///
    /// Undoes the recorded effect on the fund, deletes the linked ledger
    /// transactions (restoring account balances) and, for a switch, reverses
    /// and deletes the paired leg as well. Returns the ids of deleted rows.
    pub async fn reverse(
        &self,
        ledger_id: LedgerId,
        id: MfTransactionId,
    ) -> Result<Vec<MfTransactionId>, MfTransactionError> {
        let txn = self.db.begin().await?;
        let row = find_row(&txn, ledger_id, id).await?;
        let paired = match row.linked_transaction_id {
            Some(linked) => mf_transactions::Entity::find_by_id(linked).one(&txn).await?,
            None => None,
        };
        let rows: Vec<mf_transactions::Model> = std::iter::once(row).chain(paired).collect();

        // BTreeMap keeps the lock order by fund id.
        let mut funds: BTreeMap<i32, (mutual_funds::Model, fintrack_core::fund::FundPosition)> =
            BTreeMap::new();
        let mut fund_ids: Vec<i32> = rows.iter().map(|r| r.mutual_fund_id).collect();
        fund_ids.sort_unstable();
        fund_ids.dedup();
        for fund_id in fund_ids {
            let fund = lock_fund(&txn, ledger_id, MutualFundId::new(fund_id)).await?;
            let position = fund.position();
            funds.insert(fund_id, (fund, position));
        }
        for row in &rows {
            if let Some((_, position)) = funds.get_mut(&row.mutual_fund_id) {
                position.reverse(&row.recorded())?;
            }
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.mf_transaction_id).collect();
        if rows.len() > 1 {
            mf_transactions::Entity::update_many()
                .col_expr(
                    mf_transactions::Column::LinkedTransactionId,
                    Expr::value(Option::<i32>::None),
                )
                .filter(mf_transactions::Column::MfTransactionId.is_in(ids.clone()))
                .exec(&txn)
                .await?;
        }
        mf_transactions::Entity::delete_many()
            .filter(mf_transactions::Column::MfTransactionId.is_in(ids.clone()))
            .exec(&txn)
            .await?;

        for row in &rows {
            for transaction_id in [row.financial_transaction_id, row.linked_charge_transaction_id]
                .into_iter()
                .flatten()
            {
                booking::unbook(&txn, transaction_id).await?;
            }
        }
        for (fund, position) in funds.into_values() {
            save_position(&txn, fund, &position).await?;
        }
        txn.commit().await?;

        tracing::info!(
            ledger_id = ledger_id.into_inner(),
            mf_transaction_ids = ?ids,
            "Reversed MF transaction"
        );
        Ok(ids.into_iter().map(MfTransactionId::new).collect())
    }

    /// Annualized return of a fund as a percentage, valued at `as_of`.
    ///
    /// Zero when the fund has no transactions or the solver does not converge.
    pub async fn fund_xirr(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
        as_of: NaiveDate,
    ) -> Result<Decimal, MfTransactionError> {
        let fund = find_in_ledger(&self.db, ledger_id, fund_id).await?;
        let rows = mf_transactions::Entity::find()
            .filter(mf_transactions::Column::MutualFundId.eq(fund.mutual_fund_id))
            .order_by_asc(mf_transactions::Column::TransactionDate)
            .order_by_asc(mf_transactions::Column::MfTransactionId)
            .all(&self.db)
            .await?;
        let flows = fund_cash_flows(&rows, fund.current_value, as_of);
        Ok(xirr(&flows))
    }
}

async fn find_row<C: ConnectionTrait>(
    conn: &C,
    ledger_id: LedgerId,
    id: MfTransactionId,
) -> Result<mf_transactions::Model, MfTransactionError> {
    mf_transactions::Entity::find_by_id(id.into_inner())
        .filter(mf_transactions::Column::LedgerId.eq(ledger_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(MfTransactionError::NotFound(id))
}

/// Resolves an expense category owned by the ledger's user.
async fn expense_category<C: ConnectionTrait>(
    conn: &C,
    ledger_id: i32,
    category_id: CategoryId,
) -> Result<i32, MfTransactionError> {
    let invalid = MfTransactionError::InvalidChargeCategory(category_id);
    let Some(ledger) = ledgers::Entity::find_by_id(ledger_id).one(conn).await? else {
        return Err(invalid);
    };
    let category = categories::Entity::find_by_id(category_id.into_inner())
        .filter(categories::Column::UserId.eq(ledger.user_id))
        .filter(categories::Column::CategoryType.eq(CategoryType::Expense))
        .one(conn)
        .await?;
    category.map(|c| c.category_id).ok_or(invalid)
}
