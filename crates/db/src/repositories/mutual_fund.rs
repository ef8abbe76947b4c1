//! Mutual fund repository: fund catalogue, NAV updates and summaries.

use chrono::{NaiveDateTime, Utc};
use fintrack_core::analytics::FundSummary;
use fintrack_core::fund::{FundError, FundPosition};
use fintrack_shared::AppError;
use fintrack_shared::types::{AmcId, LedgerId, MutualFundId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::constraint::{ConstraintViolation, is_unique_violation};
use crate::entities::{amcs, mutual_funds};

const UNIQUE_NAME_OWNER: &str = "uq_mutual_funds_ledger_name_owner";

/// Error types for mutual fund operations.
#[derive(Debug, thiserror::Error)]
pub enum MutualFundError {
    /// Fund not found in the ledger.
    #[error("Mutual fund not found: {0}")]
    NotFound(MutualFundId),

    /// AMC not found in the ledger.
    #[error("AMC not found: {0}")]
    AmcNotFound(AmcId),

    /// Another fund of the ledger has the same name and owner.
    #[error("Mutual fund '{name}' already exists for owner '{owner}'")]
    DuplicateName {
        /// Fund name.
        name: String,
        /// Owner, empty for none.
        owner: String,
    },

    /// Fund still holds units.
    #[error("Cannot delete mutual fund: it still holds {0} units")]
    HasUnits(rust_decimal::Decimal),

    /// Fund still has recorded transactions.
    #[error("Cannot delete mutual fund: it has recorded transactions")]
    HasTransactions,

    /// Position rule rejected the change.
    #[error(transparent)]
    Fund(#[from] FundError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<MutualFundError> for AppError {
    fn from(err: MutualFundError) -> Self {
        match err {
            MutualFundError::NotFound(_) | MutualFundError::AmcNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            MutualFundError::DuplicateName { .. } => Self::Conflict(err.to_string()),
            MutualFundError::HasUnits(_) | MutualFundError::HasTransactions => {
                Self::BusinessRule(err.to_string())
            }
            MutualFundError::Fund(e) => e.into(),
            MutualFundError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a mutual fund.
#[derive(Debug, Clone)]
pub struct CreateMutualFundInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// AMC of the same ledger.
    pub amc_id: AmcId,
    /// Fund name.
    pub name: String,
    /// Optional holder, e.g. a family member.
    pub owner: Option<String>,
    /// Plan, e.g. "Direct Growth".
    pub plan: Option<String>,
    /// Provider code used to fetch the NAV.
    pub code: Option<String>,
    /// Asset class label.
    pub asset_class: Option<String>,
    /// Asset sub-class label.
    pub asset_sub_class: Option<String>,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for updating a mutual fund's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateMutualFundInput {
    /// New name.
    pub name: Option<String>,
    /// New owner.
    pub owner: Option<Option<String>>,
    /// New plan.
    pub plan: Option<Option<String>>,
    /// New provider code.
    pub code: Option<Option<String>>,
    /// New asset class.
    pub asset_class: Option<Option<String>>,
    /// New asset sub-class.
    pub asset_sub_class: Option<Option<String>>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing funds.
#[derive(Debug, Clone, Default)]
pub struct MutualFundFilter {
    /// Only funds of this AMC.
    pub amc_id: Option<AmcId>,
    /// Only funds of this owner; `Some(None)` for funds without one.
    pub owner: Option<Option<String>>,
    /// Only funds with a provider code.
    pub with_code: bool,
}

/// Mutual fund repository for CRUD and valuation.
#[derive(Debug, Clone)]
pub struct MutualFundRepository {
    db: DatabaseConnection,
}

impl MutualFundRepository {
    /// Creates a new mutual fund repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a fund under an AMC of the same ledger.
    pub async fn create(
        &self,
        input: CreateMutualFundInput,
    ) -> Result<mutual_funds::Model, MutualFundError> {
        let amc = amcs::Entity::find_by_id(input.amc_id.into_inner())
            .filter(amcs::Column::LedgerId.eq(input.ledger_id.into_inner()))
            .one(&self.db)
            .await?;
        if amc.is_none() {
            return Err(MutualFundError::AmcNotFound(input.amc_id));
        }

        let owner = normalize_owner(input.owner);
        let now = Utc::now().naive_utc();
        let fund = mutual_funds::ActiveModel {
            ledger_id: Set(input.ledger_id.into_inner()),
            amc_id: Set(input.amc_id.into_inner()),
            name: Set(input.name.clone()),
            owner: Set(owner.clone()),
            plan: Set(input.plan),
            code: Set(input.code),
            asset_class: Set(input.asset_class),
            asset_sub_class: Set(input.asset_sub_class),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match fund.insert(&self.db).await {
            Ok(fund) => {
                tracing::info!(
                    ledger_id = fund.ledger_id,
                    mutual_fund_id = fund.mutual_fund_id,
                    "Created mutual fund"
                );
                Ok(fund)
            }
            Err(e) if is_unique_violation(&e, UNIQUE_NAME_OWNER) => {
                Err(MutualFundError::DuplicateName {
                    name: input.name,
                    owner: owner.unwrap_or_default(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a fund of the ledger.
    pub async fn find(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
    ) -> Result<mutual_funds::Model, MutualFundError> {
        find_in_ledger(&self.db, ledger_id, fund_id).await
    }

    /// Lists the funds of a ledger by name.
    pub async fn list(
        &self,
        ledger_id: LedgerId,
        filter: MutualFundFilter,
    ) -> Result<Vec<mutual_funds::Model>, MutualFundError> {
        let mut query = mutual_funds::Entity::find()
            .filter(mutual_funds::Column::LedgerId.eq(ledger_id.into_inner()))
            .order_by_asc(mutual_funds::Column::Name)
            .order_by_asc(mutual_funds::Column::MutualFundId);

        if let Some(amc_id) = filter.amc_id {
            query = query.filter(mutual_funds::Column::AmcId.eq(amc_id.into_inner()));
        }
        match filter.owner {
            Some(Some(owner)) => query = query.filter(mutual_funds::Column::Owner.eq(owner)),
            Some(None) => query = query.filter(mutual_funds::Column::Owner.is_null()),
            None => {}
        }
        if filter.with_code {
            query = query
                .filter(mutual_funds::Column::Code.is_not_null())
                .filter(mutual_funds::Column::Code.ne(""));
        }

        Ok(query.all(&self.db).await?)
    }

    /// Updates a fund's descriptive fields.
    pub async fn update(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
        input: UpdateMutualFundInput,
    ) -> Result<mutual_funds::Model, MutualFundError> {
        let current = self.find(ledger_id, fund_id).await?;
        let name = input.name.clone().unwrap_or_else(|| current.name.clone());
        let owner = input
            .owner
            .clone()
            .map_or_else(|| current.owner.clone(), normalize_owner);

        let mut fund = current.into_active_model();
        fund.name = Set(name.clone());
        fund.owner = Set(owner.clone());
        if let Some(plan) = input.plan {
            fund.plan = Set(plan);
        }
        if let Some(code) = input.code {
            fund.code = Set(code);
        }
        if let Some(asset_class) = input.asset_class {
            fund.asset_class = Set(asset_class);
        }
        if let Some(asset_sub_class) = input.asset_sub_class {
            fund.asset_sub_class = Set(asset_sub_class);
        }
        if let Some(notes) = input.notes {
            fund.notes = Set(notes);
        }
        fund.updated_at = Set(Utc::now().naive_utc());

        match fund.update(&self.db).await {
            Ok(fund) => Ok(fund),
            Err(e) if is_unique_violation(&e, UNIQUE_NAME_OWNER) => {
                Err(MutualFundError::DuplicateName {
                    name,
                    owner: owner.unwrap_or_default(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a fund that holds no units and has no transactions.
    pub async fn delete(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
    ) -> Result<(), MutualFundError> {
        let fund = self.find(ledger_id, fund_id).await?;
        if !fund.total_units.is_zero() {
            return Err(MutualFundError::HasUnits(fund.total_units));
        }

        match mutual_funds::Entity::delete_by_id(fund.mutual_fund_id)
            .exec(&self.db)
            .await
        {
            Ok(_) => {
                tracing::info!(
                    ledger_id = fund.ledger_id,
                    mutual_fund_id = fund.mutual_fund_id,
                    "Deleted mutual fund"
                );
                Ok(())
            }
            Err(e) if ConstraintViolation::classify(&e).is_some_and(|v| v.is_foreign_key()) => {
                Err(MutualFundError::HasTransactions)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sets the latest NAV of a fund and revalues it.
    pub async fn update_nav(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
        nav: rust_decimal::Decimal,
        at: NaiveDateTime,
    ) -> Result<mutual_funds::Model, MutualFundError> {
        let txn = self.db.begin().await?;
        let fund = lock_fund(&txn, ledger_id, fund_id).await?;
        let mut position = fund.position();
        position.update_nav(nav, at)?;
        let fund = save_position(&txn, fund, &position).await?;
        txn.commit().await?;

        tracing::debug!(
            mutual_fund_id = fund.mutual_fund_id,
            nav = %fund.latest_nav,
            "Updated fund NAV"
        );
        Ok(fund)
    }

    /// Unrealized performance of one fund.
    pub async fn summary(
        &self,
        ledger_id: LedgerId,
        fund_id: MutualFundId,
    ) -> Result<FundSummary, MutualFundError> {
        let fund = self.find(ledger_id, fund_id).await?;
        Ok(FundSummary::of(&fund.position()))
    }

    /// Unrealized performance of every fund of an AMC combined.
    pub async fn amc_summary(
        &self,
        ledger_id: LedgerId,
        amc_id: AmcId,
    ) -> Result<FundSummary, MutualFundError> {
        let funds = self
            .list(
                ledger_id,
                MutualFundFilter {
                    amc_id: Some(amc_id),
                    ..Default::default()
                },
            )
            .await?;
        let summaries: Vec<FundSummary> = funds
            .iter()
            .map(|fund| FundSummary::of(&fund.position()))
            .collect();
        Ok(FundSummary::combine(&summaries))
    }
}

/// Empty or blank owners are stored as null.
fn normalize_owner(owner: Option<String>) -> Option<String> {
    owner
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
}

pub(crate) async fn find_in_ledger<C: ConnectionTrait>(
    conn: &C,
    ledger_id: LedgerId,
    fund_id: MutualFundId,
) -> Result<mutual_funds::Model, MutualFundError> {
    mutual_funds::Entity::find_by_id(fund_id.into_inner())
        .filter(mutual_funds::Column::LedgerId.eq(ledger_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(MutualFundError::NotFound(fund_id))
}

/// Reads a fund `FOR UPDATE`.
pub(crate) async fn lock_fund<C: ConnectionTrait>(
    conn: &C,
    ledger_id: LedgerId,
    fund_id: MutualFundId,
) -> Result<mutual_funds::Model, MutualFundError> {
    mutual_funds::Entity::find_by_id(fund_id.into_inner())
        .filter(mutual_funds::Column::LedgerId.eq(ledger_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(MutualFundError::NotFound(fund_id))
}

/// Reads two funds `FOR UPDATE`, lower id first.
pub(crate) async fn lock_fund_pair<C: ConnectionTrait>(
    conn: &C,
    ledger_id: LedgerId,
    first: MutualFundId,
    second: MutualFundId,
) -> Result<(mutual_funds::Model, mutual_funds::Model), MutualFundError> {
    if first <= second {
        let a = lock_fund(conn, ledger_id, first).await?;
        let b = lock_fund(conn, ledger_id, second).await?;
        Ok((a, b))
    } else {
        let b = lock_fund(conn, ledger_id, second).await?;
        let a = lock_fund(conn, ledger_id, first).await?;
        Ok((a, b))
    }
}

/// Writes a position back onto its fund row.
pub(crate) async fn save_position<C: ConnectionTrait>(
    conn: &C,
    fund: mutual_funds::Model,
    position: &FundPosition,
) -> Result<mutual_funds::Model, DbErr> {
    let mut active = fund.into_active_model();
    active.total_units = Set(position.total_units);
    active.average_cost_per_unit = Set(position.average_cost_per_unit);
    active.latest_nav = Set(position.latest_nav);
    active.last_nav_update = Set(position.last_nav_update);
    active.current_value = Set(position.current_value);
    active.total_realized_gain = Set(position.total_realized_gain);
    active.total_invested_cash = Set(position.total_invested_cash);
    active.external_cash_invested = Set(position.external_cash_invested);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(conn).await
}
