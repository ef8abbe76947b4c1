//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod amc;
pub mod asset_transaction;
pub mod asset_type;
mod booking;
pub mod ledger;
pub mod mf_transaction;
pub mod mutual_fund;
pub mod physical_asset;

pub use amc::{AmcError, AmcRepository, CreateAmcInput, UpdateAmcInput};
pub use asset_transaction::{
    AssetTransactionError, AssetTransactionRepository, RecordAssetTradeInput,
};
pub use asset_type::{
    AssetTypeError, AssetTypeRepository, CreateAssetTypeInput, UpdateAssetTypeInput,
};
pub use ledger::{LedgerError, LedgerRepository, NavSettings};
pub use mf_transaction::{
    MfTransactionError, MfTransactionRepository, RecordTradeInput, SwitchRecord, SwitchUnitsInput,
};
pub use mutual_fund::{
    CreateMutualFundInput, MutualFundError, MutualFundFilter, MutualFundRepository,
    UpdateMutualFundInput,
};
pub use physical_asset::{
    CreatePhysicalAssetInput, PhysicalAssetError, PhysicalAssetRepository,
    UpdatePhysicalAssetInput,
};
