//! Core holdings logic for Fintrack.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `precision` - Scale and rounding rules mirroring the NUMERIC columns
//! - `fund` - Mutual fund positions, trades, switches and reversals
//! - `asset` - Physical asset positions and trade replay
//! - `analytics` - XIRR and holding summaries
//! - `integrity` - Cross-row consistency predicates
//! - `pricing` - NAV provider selection

pub mod analytics;
pub mod asset;
pub mod fund;
pub mod integrity;
pub mod precision;
pub mod pricing;
