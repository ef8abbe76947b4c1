//! Demo data seeder for Fintrack development.
//!
//! Seeds a demo user with one ledger, a savings account, an HDFC AMC with
//! funds for two owners, a charged buy and a switch between funds. Running
//! it again leaves existing rows alone.
//!
//! Usage: cargo run --bin seeder

use chrono::{NaiveDate, NaiveDateTime};
use fintrack_core::fund::TradeSide;
use fintrack_db::entities::sea_orm_active_enums::{AccountType, CategoryType};
use fintrack_db::entities::{accounts, categories, ledgers, mutual_funds, users};
use fintrack_db::repositories::{
    AmcRepository, CreateAmcInput, CreateMutualFundInput, MfTransactionRepository,
    MutualFundFilter, MutualFundRepository, RecordTradeInput, SwitchUnitsInput,
};
use fintrack_shared::types::{AccountId, AmcId, CategoryId, LedgerId, MutualFundId};
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_USERNAME: &str = "demo";
const DEMO_LEDGER: &str = "Demo Ledger";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fintrack=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let db = fintrack_db::connect(&database_url).await?;

    let user_id = seed_user(&db).await?;
    let ledger_id = seed_ledger(&db, user_id).await?;
    let account_id = seed_account(&db, ledger_id).await?;
    let category_id = seed_charge_category(&db, user_id).await?;
    let amc_id = seed_amc(&db, ledger_id).await?;

    let mid_cap = seed_fund(&db, ledger_id, amc_id, "HDFC Mid Cap Fund", None).await?;
    let spouse_mid_cap =
        seed_fund(&db, ledger_id, amc_id, "HDFC Mid Cap Fund", Some("Spouse")).await?;
    let liquid = seed_fund(&db, ledger_id, amc_id, "HDFC Liquid Fund", None).await?;

    let transactions = MfTransactionRepository::new(db.clone());
    if transactions
        .list_for_fund(ledger_id, mid_cap)
        .await?
        .is_empty()
    {
        for (fund_id, units, amount, charges) in [
            (mid_cap, dec!(250.5), dec!(12525), dec!(0.63)),
            (spouse_mid_cap, dec!(80), dec!(4000), dec!(0.20)),
        ] {
            transactions
                .record_trade(RecordTradeInput {
                    ledger_id,
                    mutual_fund_id: fund_id,
                    account_id,
                    side: TradeSide::Buy,
                    units,
                    amount_excluding_charges: amount,
                    other_charges: charges,
                    expense_category_id: Some(category_id),
                    transaction_date: day(2025, 6, 3),
                    notes: Some("Seeded buy".to_string()),
                })
                .await?;
        }
        transactions
            .switch_units(SwitchUnitsInput {
                ledger_id,
                source_fund_id: mid_cap,
                target_fund_id: liquid,
                units: dec!(100),
                source_nav: dec!(52.3456),
                target_nav: dec!(3011.27),
                transaction_date: day(2025, 7, 15),
                notes: Some("Seeded switch".to_string()),
            })
            .await?;
        tracing::info!("Seeded demo transactions");
    } else {
        tracing::info!("Demo transactions already exist, skipping");
    }

    tracing::info!("Seeding complete");
    Ok(())
}

fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap_or_default()
}

async fn seed_user(db: &DatabaseConnection) -> anyhow::Result<i32> {
    if let Some(user) = users::Entity::find()
        .filter(users::Column::Username.eq(DEMO_USERNAME))
        .one(db)
        .await?
    {
        return Ok(user.user_id);
    }

    let user = users::ActiveModel {
        full_name: Set("Demo User".to_string()),
        username: Set(DEMO_USERNAME.to_string()),
        email: Set("demo@fintrack.dev".to_string()),
        hashed_password: Set("$2b$12$demo_hash".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(user_id = user.user_id, "Created demo user");
    Ok(user.user_id)
}

async fn seed_ledger(db: &DatabaseConnection, user_id: i32) -> anyhow::Result<LedgerId> {
    if let Some(ledger) = ledgers::Entity::find()
        .filter(ledgers::Column::UserId.eq(user_id))
        .filter(ledgers::Column::Name.eq(DEMO_LEDGER))
        .one(db)
        .await?
    {
        return Ok(LedgerId::new(ledger.ledger_id));
    }

    let ledger = ledgers::ActiveModel {
        user_id: Set(user_id),
        name: Set(DEMO_LEDGER.to_string()),
        currency_symbol: Set("₹".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(ledger_id = ledger.ledger_id, "Created demo ledger");
    Ok(LedgerId::new(ledger.ledger_id))
}

async fn seed_account(db: &DatabaseConnection, ledger_id: LedgerId) -> anyhow::Result<AccountId> {
    let name = "Savings Account";
    if let Some(account) = accounts::Entity::find()
        .filter(accounts::Column::LedgerId.eq(ledger_id.into_inner()))
        .filter(accounts::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(AccountId::new(account.account_id));
    }

    let opening = dec!(500000);
    let account = accounts::ActiveModel {
        ledger_id: Set(ledger_id.into_inner()),
        name: Set(name.to_string()),
        account_type: Set(AccountType::Asset),
        opening_balance: Set(opening),
        balance: Set(opening),
        net_balance: Set(opening),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(AccountId::new(account.account_id))
}

async fn seed_charge_category(db: &DatabaseConnection, user_id: i32) -> anyhow::Result<CategoryId> {
    let name = "Investment Charges";
    if let Some(category) = categories::Entity::find()
        .filter(categories::Column::UserId.eq(user_id))
        .filter(categories::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(CategoryId::new(category.category_id));
    }

    let category = categories::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        category_type: Set(CategoryType::Expense),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(CategoryId::new(category.category_id))
}

async fn seed_amc(db: &DatabaseConnection, ledger_id: LedgerId) -> anyhow::Result<AmcId> {
    let repo = AmcRepository::new(db.clone());
    if let Some(amc) = repo
        .list(ledger_id)
        .await?
        .into_iter()
        .find(|amc| amc.name == "HDFC")
    {
        return Ok(AmcId::new(amc.amc_id));
    }

    let amc = repo
        .create(CreateAmcInput {
            ledger_id,
            name: "HDFC".to_string(),
            notes: Some("HDFC Asset Management".to_string()),
        })
        .await?;
    Ok(AmcId::new(amc.amc_id))
}

async fn seed_fund(
    db: &DatabaseConnection,
    ledger_id: LedgerId,
    amc_id: AmcId,
    name: &str,
    owner: Option<&str>,
) -> anyhow::Result<MutualFundId> {
    let repo = MutualFundRepository::new(db.clone());
    let existing = repo
        .list(
            ledger_id,
            MutualFundFilter {
                amc_id: Some(amc_id),
                owner: Some(owner.map(str::to_string)),
                with_code: false,
            },
        )
        .await?
        .into_iter()
        .find(|fund: &mutual_funds::Model| fund.name == name);
    if let Some(fund) = existing {
        return Ok(MutualFundId::new(fund.mutual_fund_id));
    }

    let fund = repo
        .create(CreateMutualFundInput {
            ledger_id,
            amc_id,
            name: name.to_string(),
            owner: owner.map(str::to_string),
            plan: Some("Direct Growth".to_string()),
            code: None,
            asset_class: Some("Equity".to_string()),
            asset_sub_class: None,
            notes: None,
        })
        .await?;
    tracing::info!(
        mutual_fund_id = fund.mutual_fund_id,
        name,
        owner = owner.unwrap_or(""),
        "Created demo fund"
    );
    Ok(MutualFundId::new(fund.mutual_fund_id))
}
