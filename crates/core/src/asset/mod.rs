//! Physical asset holdings.
//!
//! Positions are kept at weighted-average cost. A deleted trade is undone by
//! replaying every remaining trade from an empty position, so the stored
//! aggregates always equal what the surviving history implies.

pub mod error;
pub mod position;

#[cfg(test)]
mod position_props;

pub use error::AssetError;
pub use position::{
    AssetPosition, AssetTradeInput, AssetTransactionType, RecordedAssetTrade,
    ensure_sufficient_balance,
};
