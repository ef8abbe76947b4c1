//! Cross-row consistency predicates.
//!
//! Each check takes plain row views and reports what is wrong with them, so
//! the same rules can run over rows loaded by the database audit or over
//! rows built in memory.

use std::collections::HashMap;

use fintrack_shared::types::{LedgerId, MfTransactionId, MutualFundId, TransactionId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::fund::{FundPosition, MfTransactionType};

/// Normalized owner used in the fund-name uniqueness key.
#[must_use]
pub fn owner_key(owner: Option<&str>) -> &str {
    owner.unwrap_or("")
}

/// Which domain table a flagged ledger transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    /// `mf_transactions`, flag `is_mf_transaction`.
    MutualFund,
    /// `asset_transactions`, flag `is_asset_transaction`.
    PhysicalAsset,
}

/// A broken consistency rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    /// Two or more funds share a ledger, name and owner.
    DuplicateFundName {
        /// Ledger holding the funds.
        ledger_id: LedgerId,
        /// Shared name.
        name: String,
        /// Shared owner, empty for none.
        owner_key: String,
        /// Number of funds sharing the key.
        count: i64,
    },
    /// A buy/sell whose total is not the amount plus charges.
    ChargeSplitMismatch {
        /// Offending row.
        mf_transaction_id: MfTransactionId,
        /// Stored total.
        total_amount: Decimal,
        /// Stored amount excluding charges.
        amount_excluding_charges: Decimal,
        /// Stored charges.
        other_charges: Decimal,
    },
    /// A switch leg without a valid counterpart.
    UnpairedSwitch {
        /// Offending row.
        mf_transaction_id: MfTransactionId,
    },
    /// A switch pair whose target fund does not match the incoming leg's fund.
    SwitchTargetMismatch {
        /// Outgoing leg.
        switch_out_id: MfTransactionId,
        /// Incoming leg.
        switch_in_id: MfTransactionId,
    },
    /// A switch pair whose legs carry different totals.
    SwitchAmountMismatch {
        /// Outgoing leg.
        switch_out_id: MfTransactionId,
        /// Incoming leg.
        switch_in_id: MfTransactionId,
        /// Total on the outgoing leg.
        out_amount: Decimal,
        /// Total on the incoming leg.
        in_amount: Decimal,
    },
    /// A domain row points at a ledger transaction that lacks its flag.
    UnflaggedLedgerTransaction {
        /// Ledger transaction.
        transaction_id: TransactionId,
        /// Domain table the row lives in.
        domain: DomainKind,
    },
    /// A flagged ledger transaction referenced by no domain row, or by several.
    FlaggedReferenceCount {
        /// Ledger transaction.
        transaction_id: TransactionId,
        /// Domain table named by the flag.
        domain: DomainKind,
        /// Number of domain rows referencing it.
        references: i64,
    },
    /// A fund whose stored value does not equal units times NAV.
    StaleCurrentValue {
        /// Offending fund.
        mutual_fund_id: MutualFundId,
        /// Stored value.
        stored: Decimal,
        /// Recomputed value.
        expected: Decimal,
    },
}

impl IntegrityViolation {
    /// Short machine-readable name of the rule.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateFundName { .. } => "duplicate_fund_name",
            Self::ChargeSplitMismatch { .. } => "charge_split_mismatch",
            Self::UnpairedSwitch { .. } => "unpaired_switch",
            Self::SwitchTargetMismatch { .. } => "switch_target_mismatch",
            Self::SwitchAmountMismatch { .. } => "switch_amount_mismatch",
            Self::UnflaggedLedgerTransaction { .. } => "unflagged_ledger_transaction",
            Self::FlaggedReferenceCount { .. } => "flagged_reference_count",
            Self::StaleCurrentValue { .. } => "stale_current_value",
        }
    }
}

/// Result of an audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Every violation found.
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    /// Returns true if nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Appends violations.
    pub fn extend(&mut self, violations: impl IntoIterator<Item = IntegrityViolation>) {
        self.violations.extend(violations);
    }

    /// Number of violations per rule.
    #[must_use]
    pub fn counts_by_kind(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for violation in &self.violations {
            *counts.entry(violation.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// The stored amounts of a fund transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRow {
    /// Row id.
    pub mf_transaction_id: MfTransactionId,
    /// Kind of the row.
    pub transaction_type: MfTransactionType,
    /// Stored total.
    pub total_amount: Decimal,
    /// Stored amount excluding charges.
    pub amount_excluding_charges: Decimal,
    /// Stored charges.
    pub other_charges: Decimal,
}

/// Checks `total_amount = amount_excluding_charges + other_charges` on buy/sell rows.
#[must_use]
pub fn check_charge_split(row: &ChargeRow) -> Option<IntegrityViolation> {
    let holds = !row.transaction_type.is_trade()
        || row.total_amount == row.amount_excluding_charges + row.other_charges;
    (!holds).then(|| IntegrityViolation::ChargeSplitMismatch {
        mf_transaction_id: row.mf_transaction_id,
        total_amount: row.total_amount,
        amount_excluding_charges: row.amount_excluding_charges,
        other_charges: row.other_charges,
    })
}

/// The pairing columns of a switch leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchLegRow {
    /// Row id.
    pub mf_transaction_id: MfTransactionId,
    /// `switch_out` or `switch_in`.
    pub transaction_type: MfTransactionType,
    /// Fund the row belongs to.
    pub mutual_fund_id: MutualFundId,
    /// Counterpart fund.
    pub target_fund_id: Option<MutualFundId>,
    /// Counterpart row.
    pub linked_transaction_id: Option<MfTransactionId>,
    /// Value switched.
    pub total_amount: Decimal,
}

/// Checks a switch_out leg against the row its link points to.
///
/// `switch_in` is `None` when the link is missing or dangling.
#[must_use]
pub fn check_switch_pair(
    switch_out: &SwitchLegRow,
    switch_in: Option<&SwitchLegRow>,
) -> Vec<IntegrityViolation> {
    let Some(switch_in) = switch_in.filter(|leg| {
        leg.transaction_type == MfTransactionType::SwitchIn
            && leg.linked_transaction_id == Some(switch_out.mf_transaction_id)
    }) else {
        return vec![IntegrityViolation::UnpairedSwitch {
            mf_transaction_id: switch_out.mf_transaction_id,
        }];
    };

    let mut violations = Vec::new();
    if switch_out.target_fund_id != Some(switch_in.mutual_fund_id) {
        violations.push(IntegrityViolation::SwitchTargetMismatch {
            switch_out_id: switch_out.mf_transaction_id,
            switch_in_id: switch_in.mf_transaction_id,
        });
    }
    if switch_out.total_amount != switch_in.total_amount {
        violations.push(IntegrityViolation::SwitchAmountMismatch {
            switch_out_id: switch_out.mf_transaction_id,
            switch_in_id: switch_in.mf_transaction_id,
            out_amount: switch_out.total_amount,
            in_amount: switch_in.total_amount,
        });
    }
    violations
}

/// Checks that a fund's stored value is its units times its NAV.
#[must_use]
pub fn check_current_value(
    mutual_fund_id: MutualFundId,
    position: &FundPosition,
) -> Option<IntegrityViolation> {
    let mut expected = position.clone();
    expected.revalue();
    (expected.current_value != position.current_value).then(|| {
        IntegrityViolation::StaleCurrentValue {
            mutual_fund_id,
            stored: position.current_value,
            expected: expected.current_value,
        }
    })
}

/// Finds funds sharing a `(ledger, name, owner)` key.
pub fn find_duplicate_fund_names<'a, I>(funds: I) -> Vec<IntegrityViolation>
where
    I: IntoIterator<Item = (LedgerId, &'a str, Option<&'a str>)>,
{
    let mut counts: HashMap<(LedgerId, &str, &str), i64> = HashMap::new();
    for (ledger_id, name, owner) in funds {
        *counts.entry((ledger_id, name, owner_key(owner))).or_insert(0) += 1;
    }
    let mut duplicates: Vec<_> = counts.into_iter().filter(|(_, count)| *count > 1).collect();
    duplicates.sort_unstable();
    duplicates
        .into_iter()
        .map(|((ledger_id, name, owner), count)| IntegrityViolation::DuplicateFundName {
            ledger_id,
            name: name.to_owned(),
            owner_key: owner.to_owned(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(
        id: i32,
        kind: MfTransactionType,
        fund: i32,
        target: Option<i32>,
        linked: Option<i32>,
        amount: Decimal,
    ) -> SwitchLegRow {
        SwitchLegRow {
            mf_transaction_id: MfTransactionId::new(id),
            transaction_type: kind,
            mutual_fund_id: MutualFundId::new(fund),
            target_fund_id: target.map(MutualFundId::new),
            linked_transaction_id: linked.map(MfTransactionId::new),
            total_amount: amount,
        }
    }

    #[test]
    fn test_owner_key() {
        assert_eq!(owner_key(None), "");
        assert_eq!(owner_key(Some("Spouse")), "Spouse");
    }

    #[test]
    fn test_duplicate_fund_names_treat_null_owner_as_empty() {
        let ledger = LedgerId::new(1);
        let funds = [
            (ledger, "HDFC Mid Cap Fund", None),
            (ledger, "HDFC Mid Cap Fund", Some("Spouse")),
            (ledger, "HDFC Mid Cap Fund", Some("")),
            (LedgerId::new(2), "HDFC Mid Cap Fund", None),
        ];

        let duplicates = find_duplicate_fund_names(funds);

        assert_eq!(
            duplicates,
            vec![IntegrityViolation::DuplicateFundName {
                ledger_id: ledger,
                name: "HDFC Mid Cap Fund".to_owned(),
                owner_key: String::new(),
                count: 2,
            }]
        );
    }

    #[test]
    fn test_charge_split_only_checked_on_trades() {
        let mut row = ChargeRow {
            mf_transaction_id: MfTransactionId::new(7),
            transaction_type: MfTransactionType::Buy,
            total_amount: dec!(1010),
            amount_excluding_charges: dec!(1000),
            other_charges: dec!(10),
        };
        assert_eq!(check_charge_split(&row), None);

        row.total_amount = dec!(990);
        assert!(matches!(
            check_charge_split(&row),
            Some(IntegrityViolation::ChargeSplitMismatch { .. })
        ));

        row.transaction_type = MfTransactionType::SwitchIn;
        assert_eq!(check_charge_split(&row), None);
    }

    #[test]
    fn test_valid_switch_pair() {
        let out = leg(1, MfTransactionType::SwitchOut, 10, Some(20), Some(2), dec!(5000));
        let inn = leg(2, MfTransactionType::SwitchIn, 20, Some(10), Some(1), dec!(5000));
        assert!(check_switch_pair(&out, Some(&inn)).is_empty());
    }

    #[test]
    fn test_switch_pair_mismatches() {
        let out = leg(1, MfTransactionType::SwitchOut, 10, Some(30), Some(2), dec!(5000));
        let inn = leg(2, MfTransactionType::SwitchIn, 20, Some(10), Some(1), dec!(4999.99));

        let kinds: Vec<_> = check_switch_pair(&out, Some(&inn))
            .iter()
            .map(IntegrityViolation::kind)
            .collect();

        assert_eq!(kinds, vec!["switch_target_mismatch", "switch_amount_mismatch"]);
    }

    #[test]
    fn test_switch_without_back_link_is_unpaired() {
        let out = leg(1, MfTransactionType::SwitchOut, 10, Some(20), Some(2), dec!(5000));
        let inn = leg(2, MfTransactionType::SwitchIn, 20, Some(10), None, dec!(5000));

        assert_eq!(
            check_switch_pair(&out, Some(&inn)),
            vec![IntegrityViolation::UnpairedSwitch {
                mf_transaction_id: MfTransactionId::new(1),
            }]
        );
        assert_eq!(check_switch_pair(&out, None).len(), 1);
    }

    #[test]
    fn test_stale_current_value() {
        let position = FundPosition {
            total_units: dec!(10),
            latest_nav: dec!(12),
            current_value: dec!(100),
            ..FundPosition::default()
        };
        assert_eq!(
            check_current_value(MutualFundId::new(3), &position),
            Some(IntegrityViolation::StaleCurrentValue {
                mutual_fund_id: MutualFundId::new(3),
                stored: dec!(100),
                expected: dec!(120),
            })
        );
    }

    #[test]
    fn test_report_counts() {
        let mut report = IntegrityReport::default();
        assert!(report.is_clean());
        report.extend([
            IntegrityViolation::UnpairedSwitch {
                mf_transaction_id: MfTransactionId::new(1),
            },
            IntegrityViolation::UnpairedSwitch {
                mf_transaction_id: MfTransactionId::new(2),
            },
        ]);
        assert!(!report.is_clean());
        assert_eq!(report.counts_by_kind().get("unpaired_switch"), Some(&2));
    }
}
