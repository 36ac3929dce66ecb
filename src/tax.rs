//! Tax bracket and deduction policy structures.
//!
//! The `tax` module defines the reference data every calculation
//! consumes: an ordered table of income tax brackets plus the
//! mandatory contribution rules (social insurance, health insurance,
//! housing fund).  Policy is data, not code — rates, caps and bracket
//! boundaries are supplied by the caller, typically loaded from
//! versioned JSON files, so a policy change never requires a code
//! change.  A loaded policy must be treated as an immutable snapshot
//! for the lifetime of a computation batch.

use crate::error::{PayrollError, PayrollResult};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single income bracket with its tax rate.
///
/// The interval is closed below and open above: an income `x` belongs
/// to the bracket when `min_income <= x < max_income`.  The top
/// bracket of a table carries `max_income: None` and is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the bracket.
    pub min_income: Decimal,
    /// Exclusive upper bound, or `None` for the open-ended top bracket.
    #[serde(default)]
    pub max_income: Option<Decimal>,
    /// Tax rate applied to the whole basic pay, e.g. `0.2` for 20%.
    pub rate: Decimal,
}

/// A validated, ordered set of tax brackets covering `[0, +inf)`.
///
/// Construction enforces the invariants once, so any `BracketTable`
/// reachable by the calculator is known to be sorted, contiguous and
/// anchored at zero income.  Deliberate policy choice: an income at or
/// above the last bracket's lower bound is taxed at the last bracket's
/// rate, even when the table author gave the last bracket a finite
/// upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates and wraps a list of brackets.
    ///
    /// Fails with [`PayrollError::InvalidBracketTable`] when the list
    /// is empty, does not start at zero income, is unsorted, has gaps
    /// or overlaps, has a non-positive-width bracket, carries a
    /// negative rate, or has an unbounded bracket anywhere but last.
    pub fn new(brackets: Vec<TaxBracket>) -> PayrollResult<Self> {
        let invalid = |msg: String| PayrollError::InvalidBracketTable(msg);
        if brackets.is_empty() {
            return Err(invalid("bracket table is empty".into()));
        }
        if brackets[0].min_income != Decimal::ZERO {
            return Err(invalid(format!(
                "first bracket must start at 0, got {}",
                brackets[0].min_income
            )));
        }
        for (i, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO {
                return Err(invalid(format!("bracket {i} has negative rate {}", bracket.rate)));
            }
            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(invalid(format!(
                        "bracket {i} is empty or inverted: [{}, {})",
                        bracket.min_income, max
                    )));
                }
                None if i != brackets.len() - 1 => {
                    return Err(invalid(format!(
                        "bracket {i} is unbounded but not the last bracket"
                    )));
                }
                _ => {}
            }
            if i > 0 {
                // Contiguity doubles as the sorted/non-overlapping check.
                let prev_max = brackets[i - 1].max_income.unwrap_or(Decimal::MAX);
                if bracket.min_income != prev_max {
                    return Err(invalid(format!(
                        "bracket {i} starts at {} but the previous bracket ends at {}",
                        bracket.min_income, prev_max
                    )));
                }
            }
        }
        Ok(BracketTable { brackets })
    }

    /// Locates the bracket containing `income` by binary search.
    ///
    /// Total over all inputs: negative incomes are clamped to zero and
    /// land in the first bracket, and incomes past the last bracket's
    /// upper bound fall back to the last bracket (open-ended top
    /// policy).  Validation guarantees the range in between is covered
    /// without gaps.
    pub fn bracket_for(&self, income: Decimal) -> &TaxBracket {
        if income <= Decimal::ZERO {
            return &self.brackets[0];
        }
        let last = self.brackets.last().expect("validated table is non-empty");
        if income >= last.min_income {
            return last;
        }
        let idx = self
            .brackets
            .binary_search_by(|bracket| {
                let max = bracket.max_income.unwrap_or(Decimal::MAX);
                if income < bracket.min_income {
                    std::cmp::Ordering::Greater
                } else if income >= max {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .expect("validated table covers [0, +inf)");
        &self.brackets[idx]
    }

    /// The brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = PayrollError;

    fn try_from(value: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        BracketTable::new(value)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(value: BracketTable) -> Self {
        value.brackets
    }
}

/// How a mandatory contribution is computed from basic pay.
///
/// Mirrors the two rule shapes of the deduction schedule: a percentage
/// of basic pay with an optional cap, or a fixed amount per period.
/// Rates, caps and amounts must be non-negative; [`DeductionPolicy`]
/// enforces this at construction so a contribution can never push a
/// deduction component below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContributionRule {
    /// `min(basic_pay * rate, cap)`, rounded to 2 decimal places.
    Percentage {
        rate: Decimal,
        #[serde(default)]
        cap: Option<Decimal>,
    },
    /// A flat amount per pay period.  Zero basic pay contributes
    /// nothing, so an all-zero input yields an all-zero result.
    Fixed { amount: Decimal },
}

impl ContributionRule {
    /// The contribution owed on `basic_pay` under this rule.
    pub fn amount_for(&self, basic_pay: Decimal) -> Decimal {
        if basic_pay.is_zero() {
            return Decimal::ZERO;
        }
        match self {
            ContributionRule::Percentage { rate, cap } => {
                let amount = (basic_pay * rate).round_dp(2);
                match cap {
                    Some(cap) if amount > *cap => *cap,
                    _ => amount,
                }
            }
            ContributionRule::Fixed { amount } => *amount,
        }
    }

    fn validate(&self, name: &str) -> PayrollResult<()> {
        let invalid =
            |what: &str, value: &Decimal| PayrollError::InvalidInput(format!("{name} rule has negative {what}: {value}"));
        match self {
            ContributionRule::Percentage { rate, cap } => {
                if *rate < Decimal::ZERO {
                    return Err(invalid("rate", rate));
                }
                if let Some(cap) = cap {
                    if *cap < Decimal::ZERO {
                        return Err(invalid("cap", cap));
                    }
                }
            }
            ContributionRule::Fixed { amount } => {
                if *amount < Decimal::ZERO {
                    return Err(invalid("amount", amount));
                }
            }
        }
        Ok(())
    }
}

/// The complete deduction policy for one jurisdiction and period:
/// income tax brackets plus the three mandatory contribution rules.
///
/// Passed explicitly into every calculation.  There is no global
/// policy; two concurrent batches may run against different snapshots.
/// Like [`BracketTable`], a policy is validated on the way in — both
/// [`DeductionPolicy::new`] and the serde boundary reject negative
/// rates, caps or amounts — so every policy the calculator sees keeps
/// all deduction components non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPolicy", into = "UncheckedPolicy")]
pub struct DeductionPolicy {
    brackets: BracketTable,
    social_insurance: ContributionRule,
    health_insurance: ContributionRule,
    housing_fund: ContributionRule,
}

impl DeductionPolicy {
    /// Validates and assembles a policy.
    ///
    /// The bracket table validates itself at its own construction;
    /// this checks the three contribution rules.
    pub fn new(
        brackets: BracketTable,
        social_insurance: ContributionRule,
        health_insurance: ContributionRule,
        housing_fund: ContributionRule,
    ) -> PayrollResult<Self> {
        social_insurance.validate("social insurance")?;
        health_insurance.validate("health insurance")?;
        housing_fund.validate("housing fund")?;
        Ok(DeductionPolicy {
            brackets,
            social_insurance,
            health_insurance,
            housing_fund,
        })
    }

    /// Income tax brackets.
    pub fn brackets(&self) -> &BracketTable {
        &self.brackets
    }

    /// Social insurance contribution rule (SSS).
    pub fn social_insurance(&self) -> &ContributionRule {
        &self.social_insurance
    }

    /// Health insurance contribution rule (PhilHealth).
    pub fn health_insurance(&self) -> &ContributionRule {
        &self.health_insurance
    }

    /// Housing fund contribution rule (Pag-IBIG).
    pub fn housing_fund(&self) -> &ContributionRule {
        &self.housing_fund
    }
}

/// The raw on-disk shape of a [`DeductionPolicy`], validated on the
/// way in.
#[doc(hidden)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncheckedPolicy {
    pub brackets: BracketTable,
    pub social_insurance: ContributionRule,
    pub health_insurance: ContributionRule,
    pub housing_fund: ContributionRule,
}

impl TryFrom<UncheckedPolicy> for DeductionPolicy {
    type Error = PayrollError;

    fn try_from(value: UncheckedPolicy) -> Result<Self, Self::Error> {
        DeductionPolicy::new(
            value.brackets,
            value.social_insurance,
            value.health_insurance,
            value.housing_fund,
        )
    }
}

impl From<DeductionPolicy> for UncheckedPolicy {
    fn from(value: DeductionPolicy) -> Self {
        UncheckedPolicy {
            brackets: value.brackets,
            social_insurance: value.social_insurance,
            health_insurance: value.health_insurance,
            housing_fund: value.housing_fund,
        }
    }
}

/// A named, versioned deduction policy as stored on disk.
///
/// Policy files are expected to be JSON documents of this shape,
/// e.g. `policies/ph_2024.json` with `"version": "2024"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Version string, e.g. `"2024"` or `"2024-Q1"`.
    pub version: String,
    /// The policy in force for that version.
    pub policy: DeductionPolicy,
}

/// Load a single policy snapshot from a JSON file.
pub fn load_policy_snapshot(path: &std::path::Path) -> Result<PolicySnapshot> {
    let data = std::fs::read_to_string(path)?;
    let snapshot = serde_json::from_str::<PolicySnapshot>(&data)?;
    Ok(snapshot)
}

/// Load all policy snapshots from a directory.
///
/// This helper scans a directory and attempts to parse any `.json`
/// files as [`PolicySnapshot`] objects.  The returned vector contains
/// one entry per file; files that fail to parse are logged and
/// skipped.  Duplicate versions are not checked; if you need
/// deduplication you should perform it on the caller side.
pub fn load_policy_snapshots_from_dir(path: &std::path::Path) -> Result<Vec<PolicySnapshot>> {
    let mut snapshots = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(ext) = entry.path().extension() {
                    if ext == "json" {
                        match load_policy_snapshot(&entry.path()) {
                            Ok(snapshot) => snapshots.push(snapshot),
                            Err(err) => {
                                tracing::warn!(path = ?entry.path(), %err, "skipping unparsable policy file");
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn two_bracket_table() -> BracketTable {
        BracketTable::new(vec![
            TaxBracket {
                min_income: dec!(0),
                max_income: Some(dec!(250000)),
                rate: dec!(0.2),
            },
            TaxBracket {
                min_income: dec!(250000),
                max_income: None,
                rate: dec!(0.3),
            },
        ])
        .unwrap()
    }

    fn valid_policy() -> DeductionPolicy {
        DeductionPolicy::new(
            two_bracket_table(),
            ContributionRule::Percentage {
                rate: dec!(0.02),
                cap: None,
            },
            ContributionRule::Percentage {
                rate: dec!(0.01),
                cap: Some(dec!(875)),
            },
            ContributionRule::Fixed { amount: dec!(100) },
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(
            BracketTable::new(vec![]),
            Err(PayrollError::InvalidBracketTable(_))
        ));
    }

    #[test]
    fn rejects_table_not_anchored_at_zero() {
        let result = BracketTable::new(vec![TaxBracket {
            min_income: dec!(1000),
            max_income: None,
            rate: dec!(0.2),
        }]);
        assert!(matches!(result, Err(PayrollError::InvalidBracketTable(_))));
    }

    #[test]
    fn rejects_gapped_or_overlapping_tables() {
        // Gap between 100 and 200.
        let gapped = BracketTable::new(vec![
            TaxBracket {
                min_income: dec!(0),
                max_income: Some(dec!(100)),
                rate: dec!(0.1),
            },
            TaxBracket {
                min_income: dec!(200),
                max_income: None,
                rate: dec!(0.2),
            },
        ]);
        assert!(matches!(gapped, Err(PayrollError::InvalidBracketTable(_))));

        // Overlap at [50, 100).
        let overlapping = BracketTable::new(vec![
            TaxBracket {
                min_income: dec!(0),
                max_income: Some(dec!(100)),
                rate: dec!(0.1),
            },
            TaxBracket {
                min_income: dec!(50),
                max_income: None,
                rate: dec!(0.2),
            },
        ]);
        assert!(matches!(overlapping, Err(PayrollError::InvalidBracketTable(_))));
    }

    #[test]
    fn rejects_unbounded_bracket_in_the_middle() {
        let result = BracketTable::new(vec![
            TaxBracket {
                min_income: dec!(0),
                max_income: None,
                rate: dec!(0.1),
            },
            TaxBracket {
                min_income: dec!(100),
                max_income: None,
                rate: dec!(0.2),
            },
        ]);
        assert!(matches!(result, Err(PayrollError::InvalidBracketTable(_))));
    }

    #[test]
    fn boundary_income_lands_in_the_upper_bracket() {
        let table = two_bracket_table();
        // Closed-lower / open-upper: exactly 250000 belongs to the
        // second bracket, not the first.
        assert_eq!(table.bracket_for(dec!(249999.99)).rate, dec!(0.2));
        assert_eq!(table.bracket_for(dec!(250000)).rate, dec!(0.3));
        assert_eq!(table.bracket_for(dec!(0)).rate, dec!(0.2));
    }

    #[test]
    fn negative_income_clamps_to_the_first_bracket() {
        let table = two_bracket_table();
        assert_eq!(table.bracket_for(dec!(-1)).rate, dec!(0.2));
    }

    #[test]
    fn income_past_a_bounded_top_bracket_uses_the_last_rate() {
        let table = BracketTable::new(vec![
            TaxBracket {
                min_income: dec!(0),
                max_income: Some(dec!(100)),
                rate: dec!(0.1),
            },
            TaxBracket {
                min_income: dec!(100),
                max_income: Some(dec!(200)),
                rate: dec!(0.2),
            },
        ])
        .unwrap();
        assert_eq!(table.bracket_for(dec!(1000)).rate, dec!(0.2));
    }

    #[test]
    fn percentage_rule_applies_rate_and_cap() {
        let rule = ContributionRule::Percentage {
            rate: dec!(0.045),
            cap: Some(dec!(1125)),
        };
        assert_eq!(rule.amount_for(dec!(10000)), dec!(450));
        assert_eq!(rule.amount_for(dec!(50000)), dec!(1125));
        assert_eq!(rule.amount_for(dec!(0)), dec!(0));
    }

    #[test]
    fn fixed_rule_is_zero_on_zero_pay() {
        let rule = ContributionRule::Fixed { amount: dec!(100) };
        assert_eq!(rule.amount_for(dec!(50000)), dec!(100));
        assert_eq!(rule.amount_for(dec!(0)), dec!(0));
    }

    #[test]
    fn negative_contribution_rules_are_rejected_at_construction() {
        let negative_rate = DeductionPolicy::new(
            two_bracket_table(),
            ContributionRule::Percentage {
                rate: dec!(-0.02),
                cap: None,
            },
            ContributionRule::Fixed { amount: dec!(0) },
            ContributionRule::Fixed { amount: dec!(0) },
        );
        assert!(matches!(negative_rate, Err(PayrollError::InvalidInput(_))));

        let negative_amount = DeductionPolicy::new(
            two_bracket_table(),
            ContributionRule::Fixed { amount: dec!(0) },
            ContributionRule::Fixed { amount: dec!(0) },
            ContributionRule::Fixed { amount: dec!(-100) },
        );
        assert!(matches!(negative_amount, Err(PayrollError::InvalidInput(_))));

        let negative_cap = DeductionPolicy::new(
            two_bracket_table(),
            ContributionRule::Percentage {
                rate: dec!(0.02),
                cap: Some(dec!(-1)),
            },
            ContributionRule::Fixed { amount: dec!(0) },
            ContributionRule::Fixed { amount: dec!(0) },
        );
        assert!(matches!(negative_cap, Err(PayrollError::InvalidInput(_))));
    }

    #[test]
    fn negative_contribution_rule_json_fails_deserialisation() {
        let json = r#"{"brackets":[{"min_income":"0","rate":"0.1"}],
            "social_insurance":{"type":"percentage","rate":"-0.02"},
            "health_insurance":{"type":"fixed","amount":"0"},
            "housing_fund":{"type":"fixed","amount":"-100"}}"#;
        assert!(serde_json::from_str::<DeductionPolicy>(json).is_err());
    }

    #[test]
    fn policy_round_trips_through_json() {
        let policy = valid_policy();
        let json = serde_json::to_string(&policy).unwrap();
        let back: DeductionPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn invalid_bracket_json_fails_deserialisation() {
        // A table whose first bracket starts above zero must be
        // rejected at the serde boundary, not at first use.
        let json = r#"{"brackets":[{"min_income":"10","rate":"0.2"}],
            "social_insurance":{"type":"fixed","amount":"0"},
            "health_insurance":{"type":"fixed","amount":"0"},
            "housing_fund":{"type":"fixed","amount":"0"}}"#;
        assert!(serde_json::from_str::<DeductionPolicy>(json).is_err());
    }

    #[test]
    fn dir_loader_reads_snapshots_and_skips_unparsable_files() {
        crate::logging::init_test();
        let dir = tempfile::tempdir().unwrap();

        let snapshot = PolicySnapshot {
            version: "2024".into(),
            policy: valid_policy(),
        };
        std::fs::write(
            dir.path().join("ph_2024.json"),
            serde_json::to_string(&snapshot).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_policy_snapshots_from_dir(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], snapshot);
    }

    #[test]
    fn dir_loader_returns_empty_for_a_missing_directory() {
        let loaded =
            load_policy_snapshots_from_dir(std::path::Path::new("/nonexistent/policies")).unwrap();
        assert!(loaded.is_empty());
    }
}
