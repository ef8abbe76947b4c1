//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. Each step is applied once
//! through the `seaql_migrations` table, and every statement is additionally
//! guarded so that re-applying it against a migrated schema is a no-op.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_baseline;
mod m20250415_000001_physical_assets;
mod m20250602_000001_mutual_funds;
mod m20250620_000001_mf_switches;
mod m20250711_000001_mf_charges;
mod m20250805_000001_ledger_nav_service;
mod m20250901_000001_mf_owner;
mod m20250915_000001_mf_classification;
mod m20251003_000001_mf_cash_tracking;
mod m20251020_000001_mf_precision;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_baseline::Migration),
            Box::new(m20250415_000001_physical_assets::Migration),
            Box::new(m20250602_000001_mutual_funds::Migration),
            Box::new(m20250620_000001_mf_switches::Migration),
            Box::new(m20250711_000001_mf_charges::Migration),
            Box::new(m20250805_000001_ledger_nav_service::Migration),
            Box::new(m20250901_000001_mf_owner::Migration),
            Box::new(m20250915_000001_mf_classification::Migration),
            Box::new(m20251003_000001_mf_cash_tracking::Migration),
            Box::new(m20251020_000001_mf_precision::Migration),
        ]
    }
}

/// Ordered statement lists of every migration, keyed by migration name.
///
/// Used to re-apply the chain against an already migrated schema.
#[must_use]
pub fn statements() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("m20250301_000001_baseline", m20250301_000001_baseline::STATEMENTS),
        (
            "m20250415_000001_physical_assets",
            m20250415_000001_physical_assets::STATEMENTS,
        ),
        ("m20250602_000001_mutual_funds", m20250602_000001_mutual_funds::STATEMENTS),
        ("m20250620_000001_mf_switches", m20250620_000001_mf_switches::STATEMENTS),
        ("m20250711_000001_mf_charges", m20250711_000001_mf_charges::STATEMENTS),
        (
            "m20250805_000001_ledger_nav_service",
            m20250805_000001_ledger_nav_service::STATEMENTS,
        ),
        ("m20250901_000001_mf_owner", m20250901_000001_mf_owner::STATEMENTS),
        (
            "m20250915_000001_mf_classification",
            m20250915_000001_mf_classification::STATEMENTS,
        ),
        (
            "m20251003_000001_mf_cash_tracking",
            m20251003_000001_mf_cash_tracking::STATEMENTS,
        ),
        ("m20251020_000001_mf_precision", m20251020_000001_mf_precision::STATEMENTS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_lists_follow_migration_order() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let listed: Vec<&str> = statements().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, listed);
    }

    #[test]
    fn test_new_enum_values_are_never_used_in_sql() {
        // Values added with ALTER TYPE cannot be used in the same transaction.
        for (name, list) in statements() {
            for sql in list {
                if sql.contains("ADD VALUE") {
                    continue;
                }
                assert!(
                    !sql.contains("'switch_out'") && !sql.contains("'switch_in'"),
                    "{name} references a switch enum value"
                );
            }
        }
    }

    #[test]
    fn test_every_create_is_guarded() {
        for (name, list) in statements() {
            for sql in list {
                for line in sql.lines().map(str::trim) {
                    if line.starts_with("CREATE TABLE") || line.starts_with("CREATE INDEX") {
                        assert!(line.contains("IF NOT EXISTS"), "{name}: {line}");
                    }
                    if line.starts_with("CREATE TYPE") || line.starts_with("ADD CONSTRAINT") {
                        assert!(sql.contains("EXCEPTION WHEN duplicate_object"), "{name}: {line}");
                    }
                    if line.contains("ADD COLUMN") {
                        assert!(line.contains("IF NOT EXISTS"), "{name}: {line}");
                    }
                }
            }
        }
    }
}
