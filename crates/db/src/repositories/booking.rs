//! Ledger transactions written on behalf of fund and asset trades.
//!
//! Every booking moves the account's `balance` and `net_balance` by
//! `credit - debit`; removing a booking moves them back.

use chrono::{NaiveDateTime, Utc};
use fintrack_core::integrity::DomainKind;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};

use crate::entities::{accounts, transactions};

/// A ledger transaction to write.
#[derive(Debug, Clone)]
pub(crate) struct Booking {
    pub account_id: i32,
    pub category_id: Option<i32>,
    pub credit: Decimal,
    pub debit: Decimal,
    pub date: NaiveDateTime,
    pub notes: String,
    /// Domain flag to set; `None` for plain rows such as charges.
    pub domain: Option<DomainKind>,
}

impl Booking {
    /// Money leaving `account_id`.
    pub(crate) fn debit(account_id: i32, amount: Decimal, date: NaiveDateTime, notes: String) -> Self {
        Self {
            account_id,
            category_id: None,
            credit: Decimal::ZERO,
            debit: amount,
            date,
            notes,
            domain: None,
        }
    }

    /// Money entering `account_id`.
    pub(crate) fn credit(account_id: i32, amount: Decimal, date: NaiveDateTime, notes: String) -> Self {
        Self {
            credit: amount,
            debit: Decimal::ZERO,
            ..Self::debit(account_id, Decimal::ZERO, date, notes)
        }
    }

    pub(crate) fn flagged(mut self, domain: DomainKind) -> Self {
        self.domain = Some(domain);
        self
    }

    pub(crate) fn categorized(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Locks an account row of `ledger_id` for the rest of the transaction.
pub(crate) async fn lock_account<C: ConnectionTrait>(
    conn: &C,
    ledger_id: i32,
    account_id: i32,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::LedgerId.eq(ledger_id))
        .lock_exclusive()
        .one(conn)
        .await
}

/// Inserts the ledger transaction and applies it to the account balance.
pub(crate) async fn book<C: ConnectionTrait>(
    conn: &C,
    booking: Booking,
) -> Result<transactions::Model, DbErr> {
    let delta = booking.credit - booking.debit;
    let row = transactions::ActiveModel {
        account_id: Set(booking.account_id),
        category_id: Set(booking.category_id),
        credit: Set(booking.credit),
        debit: Set(booking.debit),
        date: Set(booking.date),
        notes: Set(Some(booking.notes)),
        is_split: Set(false),
        is_transfer: Set(false),
        transfer_id: Set(None),
        transfer_type: Set(None),
        is_asset_transaction: Set(booking.domain == Some(DomainKind::PhysicalAsset)),
        is_mf_transaction: Set(booking.domain == Some(DomainKind::MutualFund)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    shift_balance(conn, booking.account_id, delta).await?;
    Ok(row)
}

/// Deletes a ledger transaction and reverts its effect on the account.
///
/// A missing row is not an error.
pub(crate) async fn unbook<C: ConnectionTrait>(conn: &C, transaction_id: i32) -> Result<(), DbErr> {
    let Some(row) = transactions::Entity::find_by_id(transaction_id).one(conn).await? else {
        tracing::warn!(transaction_id, "Linked ledger transaction already gone");
        return Ok(());
    };
    shift_balance(conn, row.account_id, row.debit - row.credit).await?;
    transactions::Entity::delete_by_id(transaction_id)
        .exec(conn)
        .await?;
    Ok(())
}

async fn shift_balance<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    delta: Decimal,
) -> Result<(), DbErr> {
    accounts::Entity::update_many()
        .col_expr(
            accounts::Column::Balance,
            Expr::col(accounts::Column::Balance).add(delta),
        )
        .col_expr(
            accounts::Column::NetBalance,
            Expr::col(accounts::Column::NetBalance).add(delta),
        )
        .col_expr(
            accounts::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(accounts::Column::AccountId.eq(account_id))
        .exec(conn)
        .await?;
    Ok(())
}
